use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// map of keyboard characters to what the chip8 expects, using the
/// left-hand side of a qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// How many polls a key stays "pressed" after its last event. Terminals
/// only deliver repeats, not key-up, so a held key is simulated by
/// retaining the last press for a while.
const CHIP8_KEY_HOLD_POLLS: u32 = 40;

/// Reads keypresses. Polled once per run-loop iteration, independent of the
/// tick cadence.
pub trait Input {
    /// Drain pending key events and update the pressed-key state.
    fn poll(&mut self) -> Result<(), io::Error>;

    /// The key currently held down, if any.
    fn pressed_key(&self) -> Option<u8>;
}

/// Terminal implementation of Input over crossterm events.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    current: Option<u8>,
    age: u32,
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            current: None,
            age: 0,
        })
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        self.age += 1;
        let mut latest: Option<u8> = None;
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => {
                        if let Some(mapped) = self.keymap.get(&key) {
                            latest = Some(*mapped);
                        }
                    }
                    KeyCode::Esc => {
                        return Err(io::Error::new(
                            io::ErrorKind::Interrupted,
                            "escape pressed",
                        ));
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // simulate a held key: a repeat of the current key resets its age,
        // and a key that has gone quiet for long enough is released
        if latest.is_some() && latest == self.current {
            self.age = 0;
        }
        if self.age > CHIP8_KEY_HOLD_POLLS {
            self.age = 0;
            self.current = None;
        }
        if latest.is_some() {
            self.current = latest;
        }
        Ok(())
    }

    fn pressed_key(&self) -> Option<u8> {
        self.current
    }
}

/// Scripted Input implementation for testing: each poll takes the next
/// entry in the script, and the last one sticks.
pub struct DummyInput {
    script: VecDeque<Option<u8>>,
    current: Option<u8>,
}

impl DummyInput {
    pub fn new(script: &[Option<u8>]) -> Self {
        DummyInput {
            script: script.iter().copied().collect(),
            current: None,
        }
    }

    /// No key, ever.
    pub fn idle() -> Self {
        Self::new(&[])
    }

    /// One key held down indefinitely.
    pub fn pressing(key: u8) -> Self {
        DummyInput {
            script: VecDeque::new(),
            current: Some(key),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
        Ok(())
    }

    fn pressed_key(&self) -> Option<u8> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_input_idle() {
        let mut input = DummyInput::idle();
        input.poll().unwrap();
        assert_eq!(input.pressed_key(), None);
    }

    #[test]
    fn test_dummy_input_pressing() {
        let mut input = DummyInput::pressing(0x7);
        input.poll().unwrap();
        input.poll().unwrap();
        assert_eq!(input.pressed_key(), Some(0x7));
    }

    #[test]
    fn test_dummy_input_script_advances_per_poll() {
        let mut input = DummyInput::new(&[None, Some(0xa), None]);
        input.poll().unwrap();
        assert_eq!(input.pressed_key(), None);
        input.poll().unwrap();
        assert_eq!(input.pressed_key(), Some(0xa));
        input.poll().unwrap();
        assert_eq!(input.pressed_key(), None);
        // script exhausted: last state sticks
        input.poll().unwrap();
        assert_eq!(input.pressed_key(), None);
    }

    #[test]
    fn test_keymap_is_complete() {
        let keys: Vec<u8> = CHIP8_CONVENTIONAL_KEYMAP.iter().map(|&(_, k)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 16);
    }
}
