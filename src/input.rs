use crate::machine::KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// CHIP-8 keypad mapped onto the left-hand side of a qwerty keyboard:
///
/// ```text
/// 1 2 3 C    1 2 3 4
/// 4 5 6 D    q w e r
/// 7 8 9 E    a s d f
/// A 0 B F    z x c v
/// ```
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

/// what the driver should do after sampling input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Continue,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// sample the device; called once per frame before the machine runs
    fn poll(&mut self) -> Result<InputEvent, io::Error>;

    /// which of the 16 keys are currently down
    fn keys(&self) -> [bool; KEY_COUNT];
}

/// Terminals only report presses, never releases, so a key counts as held
/// for a few frames after each press. Auto-repeat keeps it held for as
/// long as the real key is down.
pub struct KeyLatch {
    hold_frames: u8,
    remaining: [u8; KEY_COUNT],
}

impl KeyLatch {
    pub fn new(hold_frames: u8) -> Self {
        KeyLatch {
            hold_frames,
            remaining: [0; KEY_COUNT],
        }
    }

    pub fn press(&mut self, key: u8) {
        if let Some(r) = self.remaining.get_mut(key as usize) {
            *r = self.hold_frames;
        }
    }

    /// age every held key by one frame
    pub fn tick(&mut self) {
        for r in self.remaining.iter_mut() {
            *r = r.saturating_sub(1);
        }
    }

    pub fn pressed(&self) -> [bool; KEY_COUNT] {
        self.remaining.map(|r| r > 0)
    }
}

/// keyboard input from the terminal, using crossterm; raw mode is on for
/// as long as this lives
pub struct TermInput {
    latch: KeyLatch,
    keymap: HashMap<char, u8>,
}

impl TermInput {
    pub fn new(hold_frames: u8) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            latch: KeyLatch::new(hold_frames),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }

    fn handle_key(&mut self, evt: KeyEvent) -> InputEvent {
        match evt.code {
            KeyCode::Esc => return InputEvent::Quit,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                return InputEvent::Quit
            }
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => self.latch.press(*mapped_key),
                None => log::trace!("can't map {:?} to a CHIP-8 key", key),
            },
            other => log::trace!("ignoring key {:?}", other),
        }
        InputEvent::Continue
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<InputEvent, io::Error> {
        self.latch.tick();
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                if self.handle_key(evt) == InputEvent::Quit {
                    return Ok(InputEvent::Quit);
                }
            }
        }
        Ok(InputEvent::Continue)
    }

    fn keys(&self) -> [bool; KEY_COUNT] {
        self.latch.pressed()
    }
}

/// dummy Input implementation for testing: holds the given keys down and
/// optionally asks to quit after a number of polls
pub struct DummyInput {
    keys: [bool; KEY_COUNT],
    polls: u64,
    quit_after: Option<u64>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        let mut held = [false; KEY_COUNT];
        for key in keys {
            if let Some(k) = held.get_mut(*key as usize) {
                *k = true;
            }
        }
        DummyInput {
            keys: held,
            polls: 0,
            quit_after: None,
        }
    }

    pub fn quit_after(mut self, polls: u64) -> Self {
        self.quit_after = Some(polls);
        self
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<InputEvent, io::Error> {
        self.polls += 1;
        match self.quit_after {
            Some(limit) if self.polls > limit => Ok(InputEvent::Quit),
            _ => Ok(InputEvent::Continue),
        }
    }

    fn keys(&self) -> [bool; KEY_COUNT] {
        self.keys
    }
}
