//! Ten-pin scoring: frame values with strike/spare look-ahead and running totals.

use crate::model::frame::{FRAME_COUNT, Frame};

pub const PERFECT_GAME: u32 = 300;

/// Value of the frame at zero-based `index`, bonus included.
///
/// `None` while the frame itself is unfinished or its bonus balls have not
/// been thrown yet.
pub fn frame_value(frames: &[Frame; FRAME_COUNT], index: usize) -> Option<u32> {
    let frame = &frames[index];
    if !frame.is_finished() {
        return None;
    }
    if frame.is_tenth() {
        return Some(frame.pin_total());
    }

    let bonus_balls = if frame.is_strike() {
        2
    } else if frame.is_spare() {
        1
    } else {
        0
    };
    let bonus = bonus_pins(&frames[index + 1..], bonus_balls)?;
    Some(frame.pin_total() + bonus)
}

fn bonus_pins(following: &[Frame], balls: usize) -> Option<u32> {
    if balls == 0 {
        return Some(0);
    }
    let mut taken = 0usize;
    let mut pins = 0u32;
    for frame in following {
        for throw in frame.throws() {
            pins += u32::from(throw.pin_count());
            taken += 1;
            if taken == balls {
                return Some(pins);
            }
        }
        if !frame.is_finished() {
            break;
        }
    }
    None
}

/// Running total through each frame; absent from the first unresolved frame on.
pub fn cumulative_scores(frames: &[Frame; FRAME_COUNT]) -> [Option<u32>; FRAME_COUNT] {
    let mut totals = [None; FRAME_COUNT];
    let mut running = 0u32;
    for (index, slot) in totals.iter_mut().enumerate() {
        match frame_value(frames, index) {
            Some(value) => {
                running += value;
                *slot = Some(running);
            }
            None => break,
        }
    }
    totals
}

/// Last resolved running total, or zero before anything can be scored.
pub fn total_score(frames: &[Frame; FRAME_COUNT]) -> u32 {
    cumulative_scores(frames)
        .iter()
        .rev()
        .find_map(|total| *total)
        .unwrap_or(0)
}

pub fn is_game_complete(frames: &[Frame; FRAME_COUNT]) -> bool {
    frames[FRAME_COUNT - 1].is_finished()
}

/// Resolved running totals for one game, as shown on a score sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCard {
    totals: [Option<u32>; FRAME_COUNT],
    complete: bool,
}

impl ScoreCard {
    pub fn from_frames(frames: &[Frame; FRAME_COUNT]) -> Self {
        Self {
            totals: cumulative_scores(frames),
            complete: is_game_complete(frames),
        }
    }

    /// Running total through the 1-based frame `number`.
    pub fn through(&self, number: u8) -> Option<u32> {
        self.totals[usize::from(number) - 1]
    }

    pub fn totals(&self) -> &[Option<u32>; FRAME_COUNT] {
        &self.totals
    }

    pub fn total(&self) -> u32 {
        self.totals
            .iter()
            .rev()
            .find_map(|total| *total)
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_perfect(&self) -> bool {
        self.complete && self.total() == PERFECT_GAME
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreCard, cumulative_scores, frame_value, is_game_complete, total_score};
    use crate::model::frame::{FRAME_COUNT, Frame};
    use crate::model::pin::{Pin, PinSet};
    use crate::model::throw::Throw;
    use std::array;

    fn count(pins: u8) -> Throw {
        Throw::pins(Pin::ALL.iter().copied().take(pins as usize).collect())
    }

    fn second(first: u8, pins: u8) -> Throw {
        Throw::pins(
            Pin::ALL
                .iter()
                .copied()
                .skip(first as usize)
                .take(pins as usize)
                .collect(),
        )
    }

    fn strike() -> Throw {
        Throw::pins(PinSet::FULL_RACK)
    }

    fn empty_frames() -> [Frame; FRAME_COUNT] {
        array::from_fn(|i| Frame::new(i as u8 + 1))
    }

    fn open_game(first: u8, second_ball: u8) -> [Frame; FRAME_COUNT] {
        let mut frames = empty_frames();
        for frame in frames.iter_mut() {
            frame.push(count(first)).unwrap();
            frame.push(second(first, second_ball)).unwrap();
        }
        frames
    }

    #[test]
    fn empty_game_scores_nothing() {
        let frames = empty_frames();
        assert_eq!(cumulative_scores(&frames), [None; FRAME_COUNT]);
        assert_eq!(total_score(&frames), 0);
        assert!(!is_game_complete(&frames));
    }

    #[test]
    fn open_frames_sum_pins() {
        let frames = open_game(3, 4);
        let totals = cumulative_scores(&frames);
        assert_eq!(totals[0], Some(7));
        assert_eq!(totals[9], Some(70));
        assert!(is_game_complete(&frames));
    }

    #[test]
    fn spare_takes_next_ball() {
        let mut frames = empty_frames();
        frames[0].push(count(6)).unwrap();
        frames[0].push(second(6, 4)).unwrap();
        assert_eq!(frame_value(&frames, 0), None);
        frames[1].push(count(5)).unwrap();
        assert_eq!(frame_value(&frames, 0), Some(15));
        assert_eq!(cumulative_scores(&frames)[1], None);
    }

    #[test]
    fn strike_takes_next_two_balls_across_frames() {
        let mut frames = empty_frames();
        frames[0].push(strike()).unwrap();
        frames[1].push(strike()).unwrap();
        assert_eq!(frame_value(&frames, 0), None);
        frames[2].push(count(7)).unwrap();
        assert_eq!(frame_value(&frames, 0), Some(27));
        assert_eq!(frame_value(&frames, 1), None);
        frames[2].push(second(7, 2)).unwrap();
        assert_eq!(cumulative_scores(&frames)[..3], [Some(27), Some(46), Some(55)]);
    }

    #[test]
    fn strike_waits_for_unfinished_next_frame() {
        let mut frames = empty_frames();
        frames[3].push(strike()).unwrap();
        frames[4].push(count(4)).unwrap();
        assert_eq!(frame_value(&frames, 3), None);
    }

    #[test]
    fn ninth_frame_strike_reads_tenth_frame_balls() {
        let mut frames = empty_frames();
        frames[8].push(strike()).unwrap();
        frames[9].push(strike()).unwrap();
        frames[9].push(count(3)).unwrap();
        assert_eq!(frame_value(&frames, 8), Some(23));
        assert_eq!(frame_value(&frames, 9), None);
    }

    #[test]
    fn perfect_game_is_three_hundred() {
        let mut frames = empty_frames();
        for frame in frames.iter_mut().take(9) {
            frame.push(strike()).unwrap();
        }
        for _ in 0..3 {
            frames[9].push(strike()).unwrap();
        }
        let totals = cumulative_scores(&frames);
        for (index, total) in totals.iter().enumerate() {
            assert_eq!(*total, Some(30 * (index as u32 + 1)));
        }
        let card = ScoreCard::from_frames(&frames);
        assert_eq!(card.total(), 300);
        assert!(card.is_perfect());
    }

    #[test]
    fn fouls_score_zero() {
        let mut frames = empty_frames();
        frames[0].push(Throw::foul()).unwrap();
        frames[0].push(count(8)).unwrap();
        assert_eq!(frame_value(&frames, 0), Some(8));
    }

    #[test]
    fn scorecard_reports_running_totals() {
        let frames = open_game(9, 0);
        let card = ScoreCard::from_frames(&frames);
        assert_eq!(card.through(1), Some(9));
        assert_eq!(card.through(10), Some(90));
        assert!(card.is_complete());
        assert!(!card.is_perfect());
    }
}
