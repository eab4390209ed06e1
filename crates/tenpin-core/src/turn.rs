//! Interactive score entry.
//!
//! `ScoringSession` owns the game being scored, the `(frame, throw)` cursor
//! and the uncommitted working throw. Every player action is total: illegal
//! input leaves the state untouched and reports `Transition::Ignored`.
//!
//! Undo only rewinds the cursor. The throw at the rewound slot stays recorded
//! until the next commit overwrites it; committing an identical throw keeps
//! everything after it, committing a different one clears the later throws.

use crate::model::frame::TENTH_FRAME;
use crate::model::game::{Game, SessionSetup};
use crate::model::pin::{Pin, PinSet};
use crate::model::throw::Throw;
use crate::score::{self, ScoreCard};
use core::fmt;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// 1-based frame and throw the session is accepting input for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    frame: u8,
    throw: u8,
}

impl Cursor {
    pub const START: Cursor = Cursor { frame: 1, throw: 1 };

    pub const fn new(frame: u8, throw: u8) -> Option<Self> {
        let max_throw = if frame == TENTH_FRAME { 3 } else { 2 };
        if frame >= 1 && frame <= TENTH_FRAME && throw >= 1 && throw <= max_throw {
            Some(Cursor { frame, throw })
        } else {
            None
        }
    }

    pub const fn frame(self) -> u8 {
        self.frame
    }

    pub const fn throw(self) -> u8 {
        self.throw
    }

    /// Zero-based throw index inside the frame.
    pub const fn throw_index(self) -> usize {
        (self.throw - 1) as usize
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} ball {}", self.frame, self.throw)
    }
}

/// The in-progress, uncommitted throw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkingThrow {
    pub knocked: PinSet,
    pub is_foul: bool,
}

impl WorkingThrow {
    fn toggled_pin(self, pin: Pin) -> Self {
        let mut knocked = self.knocked;
        knocked.toggle(pin);
        Self { knocked, ..self }
    }

    fn toggled_foul(self) -> Self {
        Self {
            knocked: PinSet::EMPTY,
            is_foul: !self.is_foul,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePin(Pin),
    ToggleFoul,
    Commit { knocked: PinSet, is_foul: bool },
    CommitWorking,
    Miss,
    Foul,
    StrikeOrSpare,
    Undo,
    PocketHit(bool),
}

impl Action {
    pub const fn label(&self) -> &'static str {
        match self {
            Action::TogglePin(_) => "toggle_pin",
            Action::ToggleFoul => "toggle_foul",
            Action::Commit { .. } => "commit",
            Action::CommitWorking => "commit_working",
            Action::Miss => "miss",
            Action::Foul => "foul",
            Action::StrikeOrSpare => "strike_or_spare",
            Action::Undo => "undo",
            Action::PocketHit(_) => "pocket_hit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    GameComplete,
    PinNotStanding,
    FoulSelected,
    FoulWithPins,
    NothingStanding,
    AtStart,
}

impl IgnoredReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            IgnoredReason::GameComplete => "game_complete",
            IgnoredReason::PinNotStanding => "pin_not_standing",
            IgnoredReason::FoulSelected => "foul_selected",
            IgnoredReason::FoulWithPins => "foul_with_pins",
            IgnoredReason::NothingStanding => "nothing_standing",
            IgnoredReason::AtStart => "at_start",
        }
    }
}

/// Outcome of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The working throw or pocket flag changed; the cursor did not move.
    Edited,
    Committed { at: Cursor, next: Cursor },
    Completed { at: Cursor },
    Rewound { from: Cursor, to: Cursor },
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringSession {
    game: Game,
    cursor: Cursor,
    working: WorkingThrow,
}

impl ScoringSession {
    pub fn new(setup: SessionSetup) -> Self {
        Self::from_game(Game::new(setup))
    }

    /// Continues scoring a game, placing the cursor on its next empty slot.
    pub fn from_game(mut game: Game) -> Self {
        if !game.is_complete() && score::is_game_complete(game.frames()) {
            game.mark_complete();
        }
        let cursor = if game.is_complete() {
            let recorded = game.frame(TENTH_FRAME).throws().len() as u8;
            Cursor {
                frame: TENTH_FRAME,
                throw: recorded.max(1),
            }
        } else {
            game.frames()
                .iter()
                .find(|frame| !frame.is_finished())
                .map(|frame| Cursor {
                    frame: frame.number(),
                    throw: frame.throws().len() as u8 + 1,
                })
                .unwrap_or(Cursor::START)
        };
        Self {
            game,
            cursor,
            working: WorkingThrow::default(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_game(self) -> Game {
        self.game
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn working(&self) -> WorkingThrow {
        self.working
    }

    pub fn is_complete(&self) -> bool {
        self.game.is_complete()
    }

    pub fn scores(&self) -> ScoreCard {
        ScoreCard::from_frames(self.game.frames())
    }

    /// Pins standing in front of the bowler for the cursor's delivery.
    pub fn standing_pins(&self) -> PinSet {
        self.game
            .frame(self.cursor.frame)
            .standing_before(self.cursor.throw_index())
    }

    pub fn apply(&mut self, action: Action) -> Transition {
        let transition = match action {
            Action::TogglePin(pin) => self.toggle_pin(pin),
            Action::ToggleFoul => self.toggle_foul(),
            Action::Commit { knocked, is_foul } => self.commit(knocked, is_foul),
            Action::CommitWorking => self.commit_working(),
            Action::Miss => self.declare_miss(),
            Action::Foul => self.declare_foul(),
            Action::StrikeOrSpare => self.declare_strike_or_spare(),
            Action::Undo => self.undo(),
            Action::PocketHit(hit) => self.set_pocket_hit(hit),
        };
        log_transition(&action, &transition);
        transition
    }

    pub fn toggle_pin(&mut self, pin: Pin) -> Transition {
        if self.is_complete() {
            return Transition::Ignored(IgnoredReason::GameComplete);
        }
        if self.working.is_foul {
            return Transition::Ignored(IgnoredReason::FoulSelected);
        }
        if !self.standing_pins().contains(pin) {
            return Transition::Ignored(IgnoredReason::PinNotStanding);
        }
        self.working = self.working.toggled_pin(pin);
        Transition::Edited
    }

    /// Flips the working foul flag; a foul delivery never selects pins.
    pub fn toggle_foul(&mut self) -> Transition {
        if self.is_complete() {
            return Transition::Ignored(IgnoredReason::GameComplete);
        }
        self.working = self.working.toggled_foul();
        Transition::Edited
    }

    pub fn set_pocket_hit(&mut self, hit: bool) -> Transition {
        if self.is_complete() {
            return Transition::Ignored(IgnoredReason::GameComplete);
        }
        self.game.frame_mut(self.cursor.frame).set_pocket_hit(hit);
        Transition::Edited
    }

    pub fn commit_working(&mut self) -> Transition {
        let WorkingThrow { knocked, is_foul } = self.working;
        self.commit(knocked, is_foul)
    }

    pub fn declare_miss(&mut self) -> Transition {
        self.commit(PinSet::EMPTY, false)
    }

    pub fn declare_foul(&mut self) -> Transition {
        self.commit(PinSet::EMPTY, true)
    }

    pub fn declare_strike_or_spare(&mut self) -> Transition {
        let standing = self.standing_pins();
        if standing.is_empty() {
            return Transition::Ignored(IgnoredReason::NothingStanding);
        }
        self.commit(standing, false)
    }

    pub fn commit(&mut self, knocked: PinSet, is_foul: bool) -> Transition {
        if self.is_complete() {
            return Transition::Ignored(IgnoredReason::GameComplete);
        }
        if is_foul && !knocked.is_empty() {
            return Transition::Ignored(IgnoredReason::FoulWithPins);
        }
        if !knocked.is_subset(self.standing_pins()) {
            return Transition::Ignored(IgnoredReason::PinNotStanding);
        }

        let at = self.cursor;
        let throw = Throw::new(knocked, is_foul);
        let index = at.throw_index();
        let unchanged = self.game.frame(at.frame).throw(index) == Some(&throw);
        if !unchanged {
            self.game
                .frame_mut(at.frame)
                .record(index, throw)
                .expect("cursor addresses a legal throw slot");
            for number in at.frame + 1..=TENTH_FRAME {
                self.game.frame_mut(number).clear();
            }
        }
        self.working = WorkingThrow::default();

        match self.next_cursor(at) {
            Some(next) => {
                self.cursor = next;
                Transition::Committed { at, next }
            }
            None => {
                self.game.frame_mut(at.frame).truncate(index + 1);
                self.game.mark_complete();
                Transition::Completed { at }
            }
        }
    }

    pub fn undo(&mut self) -> Transition {
        if self.is_complete() {
            return Transition::Ignored(IgnoredReason::GameComplete);
        }
        if self.cursor == Cursor::START {
            return Transition::Ignored(IgnoredReason::AtStart);
        }

        let from = self.cursor;
        let to = if from.throw > 1 {
            Cursor {
                frame: from.frame,
                throw: from.throw - 1,
            }
        } else {
            let previous = from.frame - 1;
            let throw = if self.game.frame(previous).is_strike() { 1 } else { 2 };
            Cursor {
                frame: previous,
                throw,
            }
        };
        self.cursor = to;
        self.working = WorkingThrow::default();
        Transition::Rewound { from, to }
    }

    fn next_cursor(&self, at: Cursor) -> Option<Cursor> {
        let frame = self.game.frame(at.frame);
        if at.frame < TENTH_FRAME {
            let next = if at.throw == 1 && !frame.is_strike() {
                Cursor {
                    frame: at.frame,
                    throw: 2,
                }
            } else {
                Cursor {
                    frame: at.frame + 1,
                    throw: 1,
                }
            };
            return Some(next);
        }

        match at.throw {
            1 => Some(Cursor {
                frame: TENTH_FRAME,
                throw: 2,
            }),
            2 if frame.earns_bonus_ball() => Some(Cursor {
                frame: TENTH_FRAME,
                throw: 3,
            }),
            _ => None,
        }
    }
}

fn log_transition(action: &Action, transition: &Transition) {
    if !tracing::enabled!(target: "tenpin_core::turn", Level::DEBUG) {
        return;
    }

    match transition {
        Transition::Ignored(reason) => event!(
            target: "tenpin_core::turn",
            Level::DEBUG,
            action = action.label(),
            ignored = reason.as_str(),
        ),
        Transition::Committed { at, next } => event!(
            target: "tenpin_core::turn",
            Level::DEBUG,
            action = action.label(),
            frame = at.frame,
            throw = at.throw,
            next_frame = next.frame,
            next_throw = next.throw,
        ),
        Transition::Completed { at } => event!(
            target: "tenpin_core::turn",
            Level::DEBUG,
            action = action.label(),
            frame = at.frame,
            throw = at.throw,
            completed = true,
        ),
        Transition::Rewound { from, to } => event!(
            target: "tenpin_core::turn",
            Level::DEBUG,
            action = action.label(),
            from = %from,
            to = %to,
        ),
        Transition::Edited => event!(
            target: "tenpin_core::turn",
            Level::TRACE,
            action = action.label(),
        ),
    }
}
