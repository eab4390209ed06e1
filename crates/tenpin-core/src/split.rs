//! Split classification for first-ball leaves.
//!
//! A leave is a split when the head pin is down and the standing pins fall
//! apart into separate clusters. Two standing pins belong together when one
//! stands diagonally right behind the other, or directly behind it two rows
//! back with no pin spot between them (2-8, 3-9).

use crate::model::frame::Frame;
use crate::model::pin::{Pin, PinSet};

/// Whether the pins left after `throw_index` form a split.
///
/// Only a ball thrown at a full rack can leave a split, so second balls in
/// frames 1-9 and shots at a partial rack in the tenth never qualify.
pub fn is_split_leave(frame: &Frame, throw_index: usize) -> bool {
    if !frame.is_fresh_rack(throw_index) {
        return false;
    }
    match frame.standing_after(throw_index) {
        Some(leave) => is_split(leave),
        None => false,
    }
}

/// Throw indexes in `frame` whose leave is a split.
pub fn split_throw_indexes(frame: &Frame) -> Vec<usize> {
    (0..frame.throws().len())
        .filter(|index| is_split_leave(frame, *index))
        .collect()
}

/// Classifies a set of standing pins.
pub fn is_split(leave: PinSet) -> bool {
    if leave.is_empty() || leave.contains(Pin::HEAD) {
        return false;
    }
    cluster_count(leave) > 1
}

fn connected(a: Pin, b: Pin) -> bool {
    let linked = |back: Pin, front: Pin| {
        back.forward_neighbors().contains(front) || back.sleeper_front() == Some(front)
    };
    linked(a, b) || linked(b, a)
}

fn cluster_count(leave: PinSet) -> usize {
    let mut unvisited = leave;
    let mut clusters = 0;
    while let Some(seed) = unvisited.iter().next() {
        clusters += 1;
        let mut frontier = vec![seed];
        unvisited.remove(seed);
        while let Some(pin) = frontier.pop() {
            for other in unvisited.iter() {
                if connected(pin, other) {
                    unvisited.remove(other);
                    frontier.push(other);
                }
            }
        }
    }
    clusters
}
