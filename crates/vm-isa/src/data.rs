//! Assembled data records and their JSON wire format.

use crate::error::Error;
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// The tag carried by an assembled data word.
///
/// `string` literals never survive assembly as a record of this type — they
/// are expanded into a run of `char` records terminated by NUL — so only `Num`/`Char` are ever actually emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A plain signed integer.
    Num,
    /// A character, stored as its code point.
    Char,
}

/// A single assembled data word, as placed in the data image.
///
/// `l2l` ("label-to-label") marks a word whose initializer was another
/// label; the loader relocates its `val` by the data segment's load offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    /// Cosmetic name, retained only for diagnostics.
    pub name: String,
    /// Word type.
    pub word_type: DataType,
    /// Raw value before relocation.
    pub val: i64,
    /// Whether `val` is another label's address and needs relocating.
    pub l2l: bool,
}

impl DataRecord {
    /// The word this record encodes, ignoring relocation.
    #[must_use]
    pub fn to_word(&self) -> Word {
        match self.word_type {
            DataType::Num => Word::Num(self.val),
            DataType::Char => Word::Char(self.val as u32),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataRecordWire {
    name: String,
    #[serde(rename = "type")]
    word_type: DataType,
    val: String,
    l2l: bool,
}

impl From<DataRecord> for DataRecordWire {
    fn from(rec: DataRecord) -> Self {
        Self {
            name: rec.name,
            word_type: rec.word_type,
            val: rec.val.to_string(),
            l2l: rec.l2l,
        }
    }
}

impl TryFrom<DataRecordWire> for DataRecord {
    type Error = Error;

    fn try_from(wire: DataRecordWire) -> Result<Self, Error> {
        let val = wire
            .val
            .parse::<i64>()
            .map_err(|_| Error::MalformedImage(format!("invalid data val {:?}", wire.val)))?;
        Ok(DataRecord {
            name: wire.name,
            word_type: wire.word_type,
            val,
            l2l: wire.l2l,
        })
    }
}

impl Serialize for DataRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DataRecordWire::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DataRecord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = DataRecordWire::deserialize(deserializer)?;
        DataRecord::try_from(wire).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_record_roundtrips_through_json() {
        let rec = DataRecord {
            name: "hello_0".to_string(),
            word_type: DataType::Char,
            val: 104,
            l2l: false,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"name":"hello_0","type":"char","val":"104","l2l":false}"#);
        let back: DataRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn to_word_respects_tag() {
        let num = DataRecord { name: "n".into(), word_type: DataType::Num, val: -3, l2l: false };
        assert_eq!(num.to_word(), Word::Num(-3));
        let ch = DataRecord { name: "c".into(), word_type: DataType::Char, val: 104, l2l: false };
        assert_eq!(ch.to_word(), Word::Char(104));
    }
}
