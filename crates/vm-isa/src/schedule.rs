//! The timed input schedule: a YAML sequence of `[tick, char]`
//! pairs, ordered by non-decreasing tick.

use crate::error::{Error, Result};
use std::path::Path;

/// One scheduled input event: a character due no earlier than `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledInput {
    /// The tick at or after which this character becomes available.
    pub tick: u64,
    /// The character to deliver.
    pub ch: char,
}

/// A finite, tick-ordered stream of input characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchedule {
    entries: Vec<ScheduledInput>,
}

impl InputSchedule {
    /// Parse a schedule from raw `[tick, char]` pairs, rejecting negative
    /// ticks and out-of-order entries.
    pub fn from_pairs(pairs: Vec<(i64, String)>) -> Result<Self> {
        let mut entries = Vec::with_capacity(pairs.len());
        let mut last_tick = 0u64;
        for (i, (tick, s)) in pairs.into_iter().enumerate() {
            if tick < 0 {
                return Err(Error::InvalidSchedule(format!(
                    "entry {i}: negative tick {tick} is not allowed"
                )));
            }
            let tick = tick as u64;
            let mut chars = s.chars();
            let ch = chars
                .next()
                .ok_or_else(|| Error::InvalidSchedule(format!("entry {i}: empty character")))?;
            if chars.next().is_some() {
                return Err(Error::InvalidSchedule(format!(
                    "entry {i}: {s:?} is not a single character"
                )));
            }
            if i > 0 && tick < last_tick {
                return Err(Error::InvalidSchedule(format!(
                    "entry {i}: tick {tick} is out of order (previous was {last_tick})"
                )));
            }
            last_tick = tick;
            entries.push(ScheduledInput { tick, ch });
        }
        Ok(Self { entries })
    }

    /// Load a schedule from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse a schedule from a YAML document's text.
    pub fn parse(text: &str) -> Result<Self> {
        let pairs: Vec<(i64, String)> = serde_yaml::from_str(text)?;
        Self::from_pairs(pairs)
    }

    /// The entries in schedule order.
    #[must_use]
    pub fn entries(&self) -> &[ScheduledInput] {
        &self.entries
    }

    /// Whether the schedule has no more entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The next (earliest) entry, if any.
    #[must_use]
    pub fn peek(&self) -> Option<ScheduledInput> {
        self.entries.first().copied()
    }

    /// Remove and return the next entry.
    pub fn pop(&mut self) -> Option<ScheduledInput> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_schedule() {
        let yaml = "- [1, 'h']\n- [10, 'e']\n";
        let sched = InputSchedule::parse(yaml).unwrap();
        assert_eq!(sched.entries().len(), 2);
        assert_eq!(sched.entries()[0], ScheduledInput { tick: 1, ch: 'h' });
    }

    #[test]
    fn rejects_negative_tick() {
        let err = InputSchedule::from_pairs(vec![(-1, "h".to_string())]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_out_of_order_ticks() {
        let err = InputSchedule::from_pairs(vec![(5, "a".to_string()), (1, "b".to_string())]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_multi_character_entries() {
        let err = InputSchedule::from_pairs(vec![(0, "ab".to_string())]);
        assert!(err.is_err());
    }

    #[test]
    fn pop_drains_in_order() {
        let mut sched = InputSchedule::from_pairs(vec![(0, "a".to_string()), (1, "b".to_string())]).unwrap();
        assert_eq!(sched.pop().unwrap().ch, 'a');
        assert_eq!(sched.pop().unwrap().ch, 'b');
        assert!(sched.pop().is_none());
        assert!(sched.is_empty());
    }

    #[test]
    fn nul_escape_is_a_valid_single_character() {
        let yaml = "- [5, \"\\0\"]\n";
        let sched = InputSchedule::parse(yaml).unwrap();
        assert_eq!(sched.entries()[0].ch, '\0');
    }
}
