//! The two-pass assembler: source text in, instruction and
//! data records out.
//!
//! State is owned entirely by a fresh [`Translator`] per call to
//! [`assemble`] — no module-level accumulators, so two translations never
//! leak state into each other.

use std::collections::HashMap;

use vm_isa::{AddressType, DataRecord, DataType, Error, Instruction, Opcode, Result};

/// Assemble source text into instruction and data records, in emission
/// order (data records as declared, then instructions as declared).
///
/// # Errors
///
/// Returns [`vm_isa::Error::Syntax`] if no `.text` section is present or a
/// `string` literal is missing its `\0` terminator, [`vm_isa::Error::Parse`]
/// on an unrecognized mnemonic or data type, and
/// [`vm_isa::Error::UndefinedLabel`] when an operand names a label that was
/// never declared.
pub fn assemble(source: &str) -> Result<(Vec<Instruction>, Vec<DataRecord>)> {
    let mut t = Translator::new(source)?;
    t.parse_labels()?;
    t.parse_instructions()?;
    Ok((t.instructions, t.labels))
}

struct Translator<'a> {
    lines: Vec<&'a str>,
    labels: Vec<DataRecord>,
    instructions: Vec<Instruction>,
    label_pos: HashMap<String, i64>,
}

impl<'a> Translator<'a> {
    fn new(source: &'a str) -> Result<Self> {
        let body = section_body(source)?;
        Ok(Self {
            lines: preprocess(body),
            labels: Vec::new(),
            instructions: Vec::new(),
            label_pos: HashMap::new(),
        })
    }

    /// Pass A: walk every line once, recording each label's resolved
    /// address and accumulating data records. Instruction lines only
    /// advance the instruction pointer; they're emitted in pass B.
    fn parse_labels(&mut self) -> Result<()> {
        let mut data_ptr: i64 = 0;
        let mut instr_ptr: i64 = 0;

        for (line_no, line) in self.lines.iter().enumerate() {
            let line_no = line_no + 1;
            let Some(colon) = line.find(':') else {
                instr_ptr += 1;
                continue;
            };

            let (head, literal) = match line.find('\'') {
                Some(q) => (&line[..q], Some(&line[q..])),
                None => (*line, None),
            };
            let name = head[..colon].trim().to_string();
            let tokens: Vec<&str> = head.split_whitespace().collect();

            if tokens.len() == 1 && literal.is_none() {
                self.label_pos.insert(name, instr_ptr);
                continue;
            }

            let type_tok = tokens.get(1).copied().ok_or_else(|| Error::Syntax {
                line: line_no,
                message: "data declaration is missing its type".to_string(),
            })?;
            let value_tok = tokens.get(2).copied().unwrap_or("");

            match type_tok {
                "string" => {
                    let literal = literal.ok_or_else(|| Error::Syntax {
                        line: line_no,
                        message: "string declaration is missing its literal".to_string(),
                    })?;
                    self.label_pos.insert(name.clone(), data_ptr);
                    let chars = expand_string(literal, line_no)?;
                    for ch in &chars {
                        self.labels.push(DataRecord {
                            name: ch.to_string(),
                            word_type: DataType::Char,
                            val: i64::from(u32::from(*ch)),
                            l2l: false,
                        });
                    }
                    data_ptr += chars.len() as i64;
                }
                "char" => {
                    let literal = literal.ok_or_else(|| Error::Syntax {
                        line: line_no,
                        message: "char declaration is missing its literal".to_string(),
                    })?;
                    let ch = parse_char_literal(literal, line_no)?;
                    self.labels.push(DataRecord {
                        name: name.clone(),
                        word_type: DataType::Char,
                        val: i64::from(u32::from(ch)),
                        l2l: false,
                    });
                    self.label_pos.insert(name, data_ptr);
                    data_ptr += 1;
                }
                "num" => {
                    let (val, l2l) = match self.label_pos.get(value_tok) {
                        Some(&target) => (target, true),
                        None => {
                            let parsed = value_tok.parse::<i64>().map_err(|_| Error::Parse {
                                line: line_no,
                                message: format!("not an integer literal: {value_tok:?}"),
                            })?;
                            (parsed, false)
                        }
                    };
                    self.labels.push(DataRecord { name: name.clone(), word_type: DataType::Num, val, l2l });
                    self.label_pos.insert(name, data_ptr);
                    data_ptr += 1;
                }
                other => {
                    return Err(Error::Parse {
                        line: line_no,
                        message: format!("unknown data type {other:?}"),
                    })
                }
            }
        }

        Ok(())
    }

    /// Pass B: every non-label line is an instruction; all labels are
    /// already resolved by now regardless of declaration order.
    fn parse_instructions(&mut self) -> Result<()> {
        for (line_no, line) in self.lines.iter().enumerate() {
            let line_no = line_no + 1;
            if line.contains(':') {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(&mnemonic) = tokens.first() else { continue };
            let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| Error::Parse {
                line: line_no,
                message: format!("unknown mnemonic {mnemonic:?}"),
            })?;

            let (arg, address_type, relocatable) = match tokens.get(1) {
                None => (None, AddressType::Direct, true),
                Some(operand) => {
                    let (operand, address_type) = match operand.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                        Some(inner) => (inner, AddressType::Indirect),
                        None => (*operand, AddressType::Direct),
                    };
                    // A bare numeral names an absolute address (a memory-mapped
                    // port); a label names a position in this segment's own
                    // data, which the loader relocates.
                    let (resolved, relocatable) = if operand.chars().all(|c| c.is_ascii_digit()) && !operand.is_empty()
                    {
                        let literal = operand.parse::<i64>().map_err(|_| Error::Parse {
                            line: line_no,
                            message: format!("not an integer literal: {operand:?}"),
                        })?;
                        (literal, false)
                    } else {
                        let label = *self.label_pos.get(operand).ok_or_else(|| Error::UndefinedLabel {
                            line: line_no,
                            label: operand.to_string(),
                        })?;
                        (label, true)
                    };
                    (Some(resolved), address_type, relocatable)
                }
            };

            self.instructions.push(Instruction { opcode, arg, address_type, relocatable });
        }

        Ok(())
    }
}

/// Cut the source down to its `.data`/`.text` body, starting at whichever
/// section header comes first. A missing `.text` is a hard error — every
/// program needs at least an entry point.
fn section_body(source: &str) -> Result<&str> {
    let text_pos = source.find(".text");
    let Some(text_pos) = text_pos else {
        return Err(Error::Syntax { line: 0, message: "source has no .text section".to_string() });
    };
    let data_pos = source.find(".data");
    Ok(match data_pos {
        Some(d) => &source[d..],
        None => &source[text_pos..],
    })
}

/// Strip comments, trim whitespace, and drop blank lines and bare section
/// headers, preserving source order.
fn preprocess(body: &str) -> Vec<&str> {
    body.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == ".text" || trimmed == ".data" || trimmed == ".text:" || trimmed == ".data:" {
                return None;
            }
            let code = match trimmed.find(';') {
                Some(pos) => trimmed[..pos].trim_end(),
                None => trimmed,
            };
            if code.is_empty() {
                None
            } else {
                Some(code)
            }
        })
        .collect()
}

/// Parse a `'...'` char literal, recognizing the `\n`/`\0` escapes; any
/// other single character is taken by its own code point.
fn parse_char_literal(literal: &str, line: usize) -> Result<char> {
    let body = literal.replace('\'', "");
    match body.as_str() {
        "\\n" => Ok('\n'),
        "\\0" => Ok('\0'),
        other => other.chars().next().ok_or_else(|| Error::Syntax {
            line,
            message: "empty char literal".to_string(),
        }),
    }
}

/// Parse a `'...\0'` string literal into its expanded, NUL-terminated
/// character sequence.
fn expand_string(literal: &str, line: usize) -> Result<Vec<char>> {
    let body = literal.replace('\'', "");
    let Some(nul_pos) = body.find("\\0") else {
        return Err(Error::Syntax { line, message: "string literal missing \\0 terminator".to_string() });
    };
    let mut chars: Vec<char> = body[..nul_pos].chars().collect();
    chars.push('\0');
    Ok(chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_instructions_assemble_with_no_operand() {
        let (instrs, data) = assemble(".text\nhlt\n").unwrap();
        assert_eq!(instrs, vec![Instruction::bare(Opcode::Hlt)]);
        assert!(data.is_empty());
    }

    #[test]
    fn numeric_operand_is_taken_literally() {
        let (instrs, _) = assemble(".text\nload 42\n").unwrap();
        assert_eq!(instrs, vec![Instruction::with_literal_arg(Opcode::Load, 42, AddressType::Direct)]);
    }

    #[test]
    fn bracketed_operand_is_indirect() {
        let (instrs, _) = assemble(".data\nptr: num 0\n.text\nload [ptr]\n").unwrap();
        assert_eq!(instrs, vec![Instruction::with_arg(Opcode::Load, 0, AddressType::Indirect)]);
    }

    #[test]
    fn unknown_mnemonic_is_a_parse_error() {
        let err = assemble(".text\nfrob 1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn undefined_label_operand_is_rejected() {
        let err = assemble(".text\nload missing\n").unwrap_err();
        assert!(matches!(err, Error::UndefinedLabel { .. }));
    }

    #[test]
    fn num_declaration_with_label_value_is_marked_l2l() {
        let (_, data) = assemble(".data\nword: num 7\nptr: num word\n.text\nhlt\n").unwrap();
        assert_eq!(data[0], DataRecord { name: "word".into(), word_type: DataType::Num, val: 7, l2l: false });
        assert_eq!(data[1], DataRecord { name: "ptr".into(), word_type: DataType::Num, val: 0, l2l: true });
    }

    #[test]
    fn char_declaration_recognizes_escapes() {
        let (_, data) = assemble(".data\nnl: char '\\n'\nnul: char '\\0'\na: char 'a'\n.text\nhlt\n").unwrap();
        assert_eq!(data[0].val, i64::from(u32::from('\n')));
        assert_eq!(data[1].val, 0);
        assert_eq!(data[2].val, i64::from(u32::from('a')));
    }

    #[test]
    fn string_expands_into_nul_terminated_chars() {
        let (_, data) = assemble(".data\nw: string 'ab\\0'\n.text\nhlt\n").unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].val, i64::from(u32::from('a')));
        assert_eq!(data[1].val, i64::from(u32::from('b')));
        assert_eq!(data[2].val, 0);
    }

    #[test]
    fn string_missing_nul_terminator_is_a_syntax_error() {
        let err = assemble(".data\nw: string 'ab'\n.text\nhlt\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn bare_label_resolves_to_the_following_instruction() {
        let (instrs, _) = assemble(".text\nloop:\njmp loop\n").unwrap();
        assert_eq!(instrs, vec![Instruction::with_arg(Opcode::Jmp, 0, AddressType::Direct)]);
    }

    #[test]
    fn missing_text_section_is_a_syntax_error() {
        let err = assemble(".data\nx: num 1\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let (instrs, _) = assemble(".text\n; a comment\n\nhlt ; trailing comment\n").unwrap();
        assert_eq!(instrs, vec![Instruction::bare(Opcode::Hlt)]);
    }
}
