use crate::model::pin::PinSet;
use crate::model::throw::Throw;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FRAME_COUNT: usize = 10;
pub const TENTH_FRAME: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    number: u8,
    throws: Vec<Throw>,
    #[serde(default)]
    is_pocket_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    ThrowIndexOutOfRange { index: usize, recorded: usize },
    TooManyThrows { frame: u8, max: usize },
    FrameFinished { frame: u8 },
    PinsNotStanding { frame: u8, index: usize, knocked: PinSet, standing: PinSet },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::ThrowIndexOutOfRange { index, recorded } => {
                write!(f, "throw index {index} skips ahead of {recorded} recorded throws")
            }
            FrameError::TooManyThrows { frame, max } => {
                write!(f, "frame {frame} holds at most {max} throws")
            }
            FrameError::FrameFinished { frame } => {
                write!(f, "frame {frame} expects no further throws")
            }
            FrameError::PinsNotStanding {
                frame,
                index,
                knocked,
                standing,
            } => write!(
                f,
                "frame {frame} throw {index} knocked [{knocked}] but only [{standing}] were standing"
            ),
        }
    }
}

impl std::error::Error for FrameError {}

impl Frame {
    /// Creates an empty frame. Numbers outside 1-10 are a programming error.
    pub fn new(number: u8) -> Self {
        assert!(
            (1..=TENTH_FRAME).contains(&number),
            "frame number {number} outside 1-10"
        );
        Self {
            number,
            throws: Vec::with_capacity(3),
            is_pocket_hit: false,
        }
    }

    /// Builds a frame from recorded throws, checking every rule on the way.
    pub fn with_throws(number: u8, throws: &[Throw]) -> Result<Self, FrameError> {
        let mut frame = Frame::new(number);
        for throw in throws {
            frame.push(*throw)?;
        }
        Ok(frame)
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_tenth(&self) -> bool {
        self.number == TENTH_FRAME
    }

    pub fn throws(&self) -> &[Throw] {
        &self.throws
    }

    pub fn throw(&self, index: usize) -> Option<&Throw> {
        self.throws.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.throws.is_empty()
    }

    pub fn is_pocket_hit(&self) -> bool {
        self.is_pocket_hit
    }

    pub fn set_pocket_hit(&mut self, hit: bool) {
        self.is_pocket_hit = hit;
    }

    pub fn max_throws(&self) -> usize {
        if self.is_tenth() { 3 } else { 2 }
    }

    pub fn first_ball_pins(&self) -> Option<u8> {
        self.throws.first().map(Throw::pin_count)
    }

    pub fn is_strike(&self) -> bool {
        self.first_ball_pins() == Some(10)
    }

    pub fn is_spare(&self) -> bool {
        match self.throws.as_slice() {
            [first, second, ..] => {
                first.pin_count() < 10 && first.pin_count() + second.pin_count() == 10
            }
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.throws.len() >= 2 && !self.is_strike() && !self.is_spare()
    }

    /// Tenth frame only: the first two balls cleared ten pins, so a third is owed.
    pub fn earns_bonus_ball(&self) -> bool {
        self.is_tenth()
            && match self.throws.as_slice() {
                [first, second, ..] => {
                    first.pin_count() == 10 || first.pin_count() + second.pin_count() == 10
                }
                _ => false,
            }
    }

    /// No further throws are expected in this frame.
    pub fn is_finished(&self) -> bool {
        is_finished(self.number, &self.throws)
    }

    /// Sum of the frame's own credited pins, without any bonus.
    pub fn pin_total(&self) -> u32 {
        self.throws.iter().map(|t| t.pin_count() as u32).sum()
    }

    /// Pins standing before the zero-based delivery `index`.
    ///
    /// Only recorded throws before `index` are taken into account. In the
    /// tenth frame a cleared rack is reset to ten pins for the next ball.
    pub fn standing_before(&self, index: usize) -> PinSet {
        standing_before(self.number, &self.throws, index)
    }

    /// Whether delivery `index` is the first ball at a newly set rack.
    ///
    /// True for the opening ball of every frame, and in the tenth for a ball
    /// following a cleared rack. A ball after a foul faces re-spotted pins,
    /// not a fresh rack.
    pub fn is_fresh_rack(&self, index: usize) -> bool {
        index == 0
            || (self.is_tenth()
                && index < self.max_throws()
                && self.standing_after(index - 1) == Some(PinSet::EMPTY))
    }

    /// Pins left standing once the throw at `index` has been delivered.
    pub fn standing_after(&self, index: usize) -> Option<PinSet> {
        let throw = self.throws.get(index)?;
        Some(self.standing_before(index).difference(throw.counted()))
    }

    /// Writes `throw` at `index`, dropping anything recorded after it.
    pub fn record(&mut self, index: usize, throw: Throw) -> Result<(), FrameError> {
        if index > self.throws.len() {
            return Err(FrameError::ThrowIndexOutOfRange {
                index,
                recorded: self.throws.len(),
            });
        }
        if index >= self.max_throws() {
            return Err(FrameError::TooManyThrows {
                frame: self.number,
                max: self.max_throws(),
            });
        }
        let before = &self.throws[..index];
        if is_finished(self.number, before) {
            return Err(FrameError::FrameFinished { frame: self.number });
        }
        let standing = standing_before(self.number, before, index);
        if !throw.knocked().is_subset(standing) {
            return Err(FrameError::PinsNotStanding {
                frame: self.number,
                index,
                knocked: throw.knocked(),
                standing,
            });
        }

        self.throws.truncate(index);
        self.throws.push(throw);
        Ok(())
    }

    pub fn push(&mut self, throw: Throw) -> Result<(), FrameError> {
        self.record(self.throws.len(), throw)
    }

    pub fn truncate(&mut self, len: usize) {
        self.throws.truncate(len);
    }

    /// Empties the frame, dropping its pocket flag with the throws.
    pub fn clear(&mut self) {
        self.throws.clear();
        self.is_pocket_hit = false;
    }

    /// Re-checks recorded throws, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), FrameError> {
        Frame::with_throws(self.number, &self.throws).map(|_| ())
    }
}

fn is_finished(number: u8, throws: &[Throw]) -> bool {
    if number < TENTH_FRAME {
        return match throws {
            [] => false,
            [first] => first.pin_count() == 10,
            _ => true,
        };
    }
    match throws {
        [first, second] => first.pin_count() != 10 && first.pin_count() + second.pin_count() < 10,
        _ => throws.len() >= 3,
    }
}

fn standing_before(number: u8, throws: &[Throw], index: usize) -> PinSet {
    let mut rack = PinSet::FULL_RACK;
    for throw in throws.iter().take(index) {
        rack = rack.difference(throw.counted());
        if rack.is_empty() && number == TENTH_FRAME {
            rack = PinSet::FULL_RACK;
        }
    }
    rack
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameError};
    use crate::model::pin::PinSet;
    use crate::model::throw::Throw;

    fn knock(numbers: &[u8]) -> Throw {
        Throw::pins(PinSet::from_numbers(numbers).unwrap())
    }

    fn strike() -> Throw {
        Throw::pins(PinSet::FULL_RACK)
    }

    #[test]
    fn strike_finishes_regular_frame() {
        let frame = Frame::with_throws(3, &[strike()]).unwrap();
        assert!(frame.is_strike());
        assert!(frame.is_finished());
        assert!(frame.standing_before(1).is_empty());
    }

    #[test]
    fn second_ball_faces_leave() {
        let frame = Frame::with_throws(1, &[knock(&[1, 2, 3, 5, 6, 9])]).unwrap();
        assert!(!frame.is_finished());
        assert_eq!(
            frame.standing_before(1),
            PinSet::from_numbers(&[4, 7, 8, 10]).unwrap()
        );
    }

    #[test]
    fn spare_and_open_frames() {
        let spare =
            Frame::with_throws(2, &[knock(&[1, 2, 3, 4, 5, 6, 7]), knock(&[8, 9, 10])]).unwrap();
        assert!(spare.is_spare());
        assert!(!spare.is_open());

        let open = Frame::with_throws(2, &[knock(&[1, 2, 3]), Throw::miss()]).unwrap();
        assert!(open.is_open());
        assert_eq!(open.pin_total(), 3);
    }

    #[test]
    fn foul_pins_are_respotted() {
        let frame = Frame::with_throws(4, &[Throw::foul()]).unwrap();
        assert_eq!(frame.standing_before(1), PinSet::FULL_RACK);
        let spare = Frame::with_throws(4, &[Throw::foul(), strike()]).unwrap();
        assert!(spare.is_spare());
    }

    #[test]
    fn tenth_frame_reracks_after_marks() {
        let after_strike = Frame::with_throws(10, &[strike()]).unwrap();
        assert_eq!(after_strike.standing_before(1), PinSet::FULL_RACK);
        assert!(!after_strike.is_finished());

        let after_spare =
            Frame::with_throws(10, &[knock(&[1, 2, 3]), knock(&[4, 5, 6, 7, 8, 9, 10])]).unwrap();
        assert_eq!(after_spare.standing_before(2), PinSet::FULL_RACK);
        assert!(!after_spare.is_finished());

        let strike_then_five =
            Frame::with_throws(10, &[strike(), knock(&[1, 2, 3, 4, 5])]).unwrap();
        assert_eq!(
            strike_then_five.standing_before(2),
            PinSet::from_numbers(&[6, 7, 8, 9, 10]).unwrap()
        );
    }

    #[test]
    fn fresh_racks() {
        let frame = Frame::with_throws(10, &[strike(), knock(&[1, 2])]).unwrap();
        assert!(frame.is_fresh_rack(0));
        assert!(frame.is_fresh_rack(1));
        assert!(!frame.is_fresh_rack(2));

        let after_foul = Frame::with_throws(5, &[Throw::foul()]).unwrap();
        assert!(!after_foul.is_fresh_rack(1));
    }

    #[test]
    fn tenth_frame_open_ends_after_two() {
        let frame = Frame::with_throws(10, &[knock(&[1, 2]), knock(&[3])]).unwrap();
        assert!(frame.is_finished());
        assert_eq!(
            frame.clone().push(Throw::miss()),
            Err(FrameError::FrameFinished { frame: 10 })
        );
    }

    #[test]
    fn tenth_frame_allows_three_strikes() {
        let frame = Frame::with_throws(10, &[strike(), strike(), strike()]).unwrap();
        assert!(frame.is_finished());
        assert_eq!(frame.pin_total(), 30);
    }

    #[test]
    fn rejects_pins_already_down() {
        let mut frame = Frame::with_throws(1, &[knock(&[1, 2])]).unwrap();
        assert!(matches!(
            frame.push(knock(&[2])),
            Err(FrameError::PinsNotStanding { index: 1, .. })
        ));
    }

    #[test]
    fn regular_frame_rejects_third_throw() {
        let mut frame = Frame::with_throws(1, &[knock(&[1]), Throw::miss()]).unwrap();
        assert_eq!(
            frame.record(2, Throw::miss()),
            Err(FrameError::TooManyThrows { frame: 1, max: 2 })
        );
    }

    #[test]
    fn record_replaces_and_truncates() {
        let mut frame = Frame::with_throws(1, &[knock(&[1]), knock(&[2])]).unwrap();
        frame.record(0, strike()).unwrap();
        assert_eq!(frame.throws(), &[strike()]);
        assert!(matches!(
            frame.record(3, Throw::miss()),
            Err(FrameError::ThrowIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn clear_resets_pocket_flag() {
        let mut frame = Frame::with_throws(2, &[knock(&[1, 2, 3]), Throw::miss()]).unwrap();
        frame.set_pocket_hit(true);
        frame.clear();
        assert!(frame.is_empty());
        assert!(!frame.is_pocket_hit());
    }

    #[test]
    #[should_panic(expected = "outside 1-10")]
    fn frame_number_out_of_range_panics() {
        let _ = Frame::new(11);
    }
}
