use crate::model::frame::Frame;
use crate::split::split_throw_indexes;
use core::fmt;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowMark {
    Strike,
    Spare,
    Foul,
    Miss,
    Pins(u8),
}

impl fmt::Display for ThrowMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThrowMark::Strike => f.write_str("X"),
            ThrowMark::Spare => f.write_str("/"),
            ThrowMark::Foul => f.write_str("F"),
            ThrowMark::Miss => f.write_str("-"),
            ThrowMark::Pins(count) => write!(f, "{count}"),
        }
    }
}

impl Serialize for ThrowMark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Score-sheet view of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSymbols {
    pub marks: Vec<ThrowMark>,
    pub split_indexes: Vec<usize>,
}

impl fmt::Display for FrameSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in &self.marks {
            write!(f, "{mark}")?;
        }
        Ok(())
    }
}

pub fn throw_mark(frame: &Frame, index: usize) -> Option<ThrowMark> {
    let throw = frame.throw(index)?;
    if throw.is_foul() {
        return Some(ThrowMark::Foul);
    }
    let standing = frame.standing_before(index);
    let pins = throw.pin_count();
    let mark = if pins == 0 {
        ThrowMark::Miss
    } else if pins == standing.len() && frame.is_fresh_rack(index) {
        ThrowMark::Strike
    } else if pins == standing.len() {
        ThrowMark::Spare
    } else {
        ThrowMark::Pins(pins)
    };
    Some(mark)
}

pub fn frame_symbols(frame: &Frame) -> FrameSymbols {
    FrameSymbols {
        marks: (0..frame.throws().len())
            .filter_map(|index| throw_mark(frame, index))
            .collect(),
        split_indexes: split_throw_indexes(frame),
    }
}
