//! Input snapshots
//!
//! The scheduler consumes cursor and key state as one poll-per-tick
//! snapshot. A source that momentarily cannot read the cursor returns
//! `None` and the scheduler keeps working from the last good snapshot.

use stria_paint::Point;

/// Cursor and key state captured at the start of a tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub cursor: Point,
    /// The configured trigger key is held
    pub trigger_held: bool,
    /// The configured pause key is held
    pub pause_held: bool,
    /// The configured lock key is toggled on
    pub pause_toggled: bool,
}

impl InputSnapshot {
    /// A snapshot with nothing pressed and the cursor at `position`
    pub fn at(position: Point) -> Self {
        Self {
            cursor: position,
            ..Self::default()
        }
    }
}

/// Non-blocking input poll. Implementations must never block the frame
/// scheduler; on a transient read failure they return `None`.
pub trait InputSource {
    fn poll(&mut self) -> Option<InputSnapshot>;
}

/// Replays a prerecorded snapshot sequence; used by the headless runner
/// and tests. Once exhausted it keeps reporting the final snapshot with
/// the trigger released, so a scripted stroke fades out naturally.
pub struct ScriptedInput {
    frames: std::vec::IntoIter<InputSnapshot>,
    last: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(frames: Vec<InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter(),
            last: InputSnapshot::default(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<InputSnapshot> {
        match self.frames.next() {
            Some(frame) => {
                self.last = frame;
                Some(frame)
            }
            None => {
                let mut frame = self.last;
                frame.trigger_held = false;
                Some(frame)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_input_replays_then_releases() {
        let held = InputSnapshot {
            cursor: Point::new(10.0, 10.0),
            trigger_held: true,
            ..InputSnapshot::default()
        };
        let mut source = ScriptedInput::new(vec![held]);

        assert_eq!(source.poll(), Some(held));

        let after = source.poll().unwrap();
        assert!(!after.trigger_held);
        assert_eq!(after.cursor, held.cursor);
    }
}
