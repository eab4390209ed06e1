use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tenpin_core::model::pin::PinSet;
use tenpin_core::turn::{Action, ScoringSession, Transition};

use crate::config::SimulationConfig;

const FOUL_RATE: f64 = 0.01;

/// Actions a bowler applied to a session, and how many of them were ignored.
#[derive(Debug, Default)]
pub struct BowledGame {
    pub actions: Vec<Action>,
    pub ignored: usize,
}

/// Seeded bowler; identical seeds bowl identical games.
pub struct Bowler {
    rng: StdRng,
    strike_rate: f64,
    spare_rate: f64,
    pocket_rate: f64,
}

impl Bowler {
    pub fn new(seed: u64, config: &SimulationConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            strike_rate: config.strike_rate,
            spare_rate: config.spare_rate,
            pocket_rate: config.pocket_rate,
        }
    }

    /// Actions for the next delivery at the session's cursor.
    pub fn deliver(&mut self, session: &ScoringSession) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        let standing = session.standing_pins();
        if self.rng.gen_bool(FOUL_RATE) {
            actions.push(Action::Foul);
            return actions;
        }

        if standing.is_full_rack() {
            if session.cursor().throw() == 1 {
                actions.push(Action::PocketHit(self.rng.gen_bool(self.pocket_rate)));
            }
            if self.rng.gen_bool(self.strike_rate) {
                actions.push(Action::StrikeOrSpare);
            } else {
                actions.push(self.partial(standing));
            }
        } else if self.rng.gen_bool(self.spare_rate) {
            actions.push(Action::StrikeOrSpare);
        } else {
            actions.push(self.partial(standing));
        }
        actions
    }

    /// Bowls a whole game, returning every action applied.
    pub fn play(&mut self, session: &mut ScoringSession) -> BowledGame {
        let mut bowled = BowledGame::default();
        while !session.is_complete() {
            for action in self.deliver(session) {
                if let Transition::Ignored(_) = session.apply(action) {
                    bowled.ignored += 1;
                }
                bowled.actions.push(action);
            }
        }
        bowled
    }

    /// Knocks fewer than all standing pins.
    fn partial(&mut self, standing: PinSet) -> Action {
        let count = self.rng.gen_range(0..usize::from(standing.len()));
        let knocked: PinSet = standing
            .iter()
            .choose_multiple(&mut self.rng, count)
            .into_iter()
            .collect();
        Action::Commit {
            knocked,
            is_foul: false,
        }
    }
}
