use std::time::{Duration, Instant};

use crate::components::{Direction, Point};

/// A terminal only reports presses and repeats, so a key counts as held
/// for this long after its last report.
pub const INPUT_HOLD_MS: u64 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Arrow(Direction),
    Escape,
    Digit(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    PointerMoved(Point),
    PointerClicked(Point),
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
    pub boost_held: bool,
    pub brake_held: bool,
}

/// Tracks when Up and Down were last reported to emulate held keys.
#[derive(Debug, Default)]
pub struct KeyHold {
    last_seen: [Option<Instant>; 2],
}

impl KeyHold {
    pub fn press(&mut self, dir: Direction, now: Instant) {
        if let Some(slot) = slot_for(dir) {
            self.last_seen[slot] = Some(now);
        }
    }

    pub fn is_held(&self, dir: Direction, now: Instant) -> bool {
        let Some(slot) = slot_for(dir) else {
            return false;
        };
        self.last_seen[slot]
            .map(|t| now.duration_since(t) <= Duration::from_millis(INPUT_HOLD_MS))
            .unwrap_or(false)
    }
}

fn slot_for(dir: Direction) -> Option<usize> {
    match dir {
        Direction::Up => Some(0),
        Direction::Down => Some(1),
        Direction::Left | Direction::Right => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_expires_after_window() {
        let start = Instant::now();
        let mut hold = KeyHold::default();
        assert!(!hold.is_held(Direction::Up, start));
        hold.press(Direction::Up, start);
        assert!(hold.is_held(Direction::Up, start + Duration::from_millis(100)));
        assert!(!hold.is_held(Direction::Down, start + Duration::from_millis(100)));
        assert!(!hold.is_held(Direction::Up, start + Duration::from_millis(INPUT_HOLD_MS + 1)));
    }

    #[test]
    fn sideways_keys_are_never_held() {
        let now = Instant::now();
        let mut hold = KeyHold::default();
        hold.press(Direction::Left, now);
        assert!(!hold.is_held(Direction::Left, now));
    }
}
