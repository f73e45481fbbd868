//! The memory-mapped input and output devices.

use vm_isa::{Error, InputSchedule, Result, ScheduledInput, Word};

/// The input port: a finite, timed queue of characters mapped at `DMEM[0]`.
#[derive(Debug, Clone, Default)]
pub struct InputPort {
    schedule: InputSchedule,
}

impl InputPort {
    /// Wrap a parsed input schedule.
    #[must_use]
    pub fn new(schedule: InputSchedule) -> Self {
        Self { schedule }
    }

    /// The head of the queue, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<ScheduledInput> {
        self.schedule.peek()
    }

    /// Pop the head of the queue and return it as a character word.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputExhausted`] if the queue is empty.
    pub fn send_char(&mut self) -> Result<Word> {
        let entry = self.schedule.pop().ok_or(Error::InputExhausted)?;
        log::debug!("CHAR_IN: {}", log_friendly(entry.ch));
        Ok(Word::Char(entry.ch as u32))
    }

    /// Whether any input remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }
}

/// One value appended to the output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    /// A character write.
    Char(char),
    /// A numeric write.
    Num(i64),
}

/// The output port: an append-only sink mapped at `DMEM[1]`.
#[derive(Debug, Clone, Default)]
pub struct OutputPort {
    events: Vec<OutputEvent>,
    word_buffer: String,
}

impl OutputPort {
    /// Write an ACC word to the output port, dispatching on its tag.
    pub fn write(&mut self, word: Word) {
        match word {
            Word::Char(code) => {
                let ch = char::from_u32(code).unwrap_or('\u{FFFD}');
                log::debug!("CHAR_OUT: {}", log_friendly(ch));
                self.events.push(OutputEvent::Char(ch));
                if ch == '\0' {
                    log::debug!("THE WHOLE WORD: {}", self.word_buffer);
                    self.word_buffer.clear();
                } else {
                    self.word_buffer.push(ch);
                }
            }
            Word::Num(n) => {
                log::debug!("INT_OUT: {n}");
                self.events.push(OutputEvent::Num(n));
            }
        }
    }

    /// The accumulated output, in write order.
    #[must_use]
    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }
}

fn log_friendly(ch: char) -> String {
    if ch == '\0' {
        "null".to_string()
    } else {
        ch.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_isa::InputSchedule;

    #[test]
    fn send_char_drains_in_order() {
        let sched = InputSchedule::from_pairs(vec![(0, "h".into()), (1, "i".into())]).unwrap();
        let mut port = InputPort::new(sched);
        assert_eq!(port.send_char().unwrap(), Word::Char('h' as u32));
        assert_eq!(port.send_char().unwrap(), Word::Char('i' as u32));
        assert!(matches!(port.send_char(), Err(Error::InputExhausted)));
    }

    #[test]
    fn peek_does_not_consume() {
        let sched = InputSchedule::from_pairs(vec![(3, "x".into())]).unwrap();
        let port = InputPort::new(sched);
        assert_eq!(port.peek().unwrap().tick, 3);
        assert_eq!(port.peek().unwrap().tick, 3);
    }

    #[test]
    fn output_port_records_chars_and_nums() {
        let mut out = OutputPort::default();
        out.write(Word::Char('h' as u32));
        out.write(Word::Num(42));
        out.write(Word::Char('\0' as u32));
        assert_eq!(
            out.events(),
            &[
                OutputEvent::Char('h'),
                OutputEvent::Num(42),
                OutputEvent::Char('\0'),
            ]
        );
    }
}
