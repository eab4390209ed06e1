//! Whitespace-separated action scripts.
//!
//! | Token        | Action                                              |
//! |--------------|-----------------------------------------------------|
//! | `X` or `/`   | strike or spare (knock every standing pin)          |
//! | `-`          | miss                                                |
//! | `F`          | foul                                                |
//! | `U`          | undo                                                |
//! | `P`          | mark the frame under the cursor as a pocket hit     |
//! | `0`-`9`      | knock that many standing pins, lowest numbers first |
//! | `leave:7,10` | knock every standing pin except the listed ones     |

use tenpin_core::model::pin::{PinSet, PinSetError};
use tenpin_core::turn::Action;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    StrikeOrSpare,
    Miss,
    Foul,
    Undo,
    PocketHit,
    Knock(u8),
    Leave(PinSet),
}

impl Step {
    /// Turns the step into a session action against the pins now standing.
    ///
    /// A count larger than what is standing produces a commit naming fallen
    /// pins, which the session ignores.
    pub fn action(self, standing: PinSet) -> Action {
        match self {
            Step::StrikeOrSpare => Action::StrikeOrSpare,
            Step::Miss => Action::Miss,
            Step::Foul => Action::Foul,
            Step::Undo => Action::Undo,
            Step::PocketHit => Action::PocketHit(true),
            Step::Knock(count) => {
                let lowest: PinSet = standing.iter().take(usize::from(count)).collect();
                let knocked = if lowest.len() < count {
                    PinSet::FULL_RACK
                } else {
                    lowest
                };
                Action::Commit {
                    knocked,
                    is_foul: false,
                }
            }
            Step::Leave(left) => Action::Commit {
                knocked: standing.difference(left),
                is_foul: false,
            },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("token {position} '{token}' is not a known action")]
    UnknownToken { position: usize, token: String },
    #[error("token {position} '{token}' names an invalid pin: {source}")]
    InvalidPin {
        position: usize,
        token: String,
        #[source]
        source: PinSetError,
    },
    #[error("token {position} '{token}' lists no pins to leave")]
    EmptyLeave { position: usize, token: String },
}

impl ScriptError {
    /// 1-based position of the offending token.
    pub fn position(&self) -> usize {
        match self {
            ScriptError::UnknownToken { position, .. }
            | ScriptError::InvalidPin { position, .. }
            | ScriptError::EmptyLeave { position, .. } => *position,
        }
    }
}

pub fn parse(script: &str) -> Result<Vec<Step>, ScriptError> {
    script
        .split_whitespace()
        .enumerate()
        .map(|(index, token)| parse_token(index + 1, token))
        .collect()
}

fn parse_token(position: usize, token: &str) -> Result<Step, ScriptError> {
    let step = match token {
        "X" | "x" | "/" => Step::StrikeOrSpare,
        "-" => Step::Miss,
        "F" | "f" => Step::Foul,
        "U" | "u" => Step::Undo,
        "P" | "p" => Step::PocketHit,
        _ => {
            if let Some(list) = token.strip_prefix("leave:") {
                return parse_leave(position, token, list);
            }
            match token.parse::<u8>() {
                Ok(count) if count <= 9 && token.len() == 1 => Step::Knock(count),
                _ => {
                    return Err(ScriptError::UnknownToken {
                        position,
                        token: token.to_string(),
                    });
                }
            }
        }
    };
    Ok(step)
}

fn parse_leave(position: usize, token: &str, list: &str) -> Result<Step, ScriptError> {
    let mut numbers = Vec::new();
    for part in list.split(',').filter(|part| !part.is_empty()) {
        let number = part
            .parse::<u8>()
            .map_err(|_| ScriptError::UnknownToken {
                position,
                token: token.to_string(),
            })?;
        numbers.push(number);
    }
    if numbers.is_empty() {
        return Err(ScriptError::EmptyLeave {
            position,
            token: token.to_string(),
        });
    }
    let pins = PinSet::from_numbers(&numbers).map_err(|source| ScriptError::InvalidPin {
        position,
        token: token.to_string(),
        source,
    })?;
    Ok(Step::Leave(pins))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins(numbers: &[u8]) -> PinSet {
        PinSet::from_numbers(numbers).unwrap()
    }

    #[test]
    fn parses_every_token_kind() {
        let steps = parse("X / - F U P 7 leave:7,10").expect("parse");
        assert_eq!(
            steps,
            vec![
                Step::StrikeOrSpare,
                Step::StrikeOrSpare,
                Step::Miss,
                Step::Foul,
                Step::Undo,
                Step::PocketHit,
                Step::Knock(7),
                Step::Leave(pins(&[7, 10])),
            ]
        );
    }

    #[test]
    fn empty_script_is_empty() {
        assert!(parse("  \n ").expect("parse").is_empty());
    }

    #[test]
    fn reports_position_of_bad_token() {
        let err = parse("X 9 - 12").expect_err("12 is not a token");
        assert_eq!(err.position(), 4);
        assert!(matches!(err, ScriptError::UnknownToken { token, .. } if token == "12"));
    }

    #[test]
    fn rejects_out_of_range_leave() {
        let err = parse("leave:7,11").expect_err("pin 11");
        assert!(matches!(
            err,
            ScriptError::InvalidPin {
                position: 1,
                source: PinSetError::OutOfRange(11),
                ..
            }
        ));
        assert!(matches!(
            parse("- leave:").expect_err("empty"),
            ScriptError::EmptyLeave { position: 2, .. }
        ));
    }

    #[test]
    fn knock_takes_lowest_standing_pins() {
        let standing = pins(&[4, 6, 7, 10]);
        assert_eq!(
            Step::Knock(2).action(standing),
            Action::Commit {
                knocked: pins(&[4, 6]),
                is_foul: false
            }
        );
        assert_eq!(
            Step::Knock(5).action(standing),
            Action::Commit {
                knocked: PinSet::FULL_RACK,
                is_foul: false
            }
        );
    }

    #[test]
    fn leave_knocks_everything_else() {
        assert_eq!(
            Step::Leave(pins(&[7, 10])).action(PinSet::FULL_RACK),
            Action::Commit {
                knocked: pins(&[1, 2, 3, 4, 5, 6, 8, 9]),
                is_foul: false
            }
        );
    }
}
