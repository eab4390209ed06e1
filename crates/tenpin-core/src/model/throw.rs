use crate::model::pin::PinSet;
use serde::{Deserialize, Serialize};

/// One delivery of the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Throw {
    knocked: PinSet,
    #[serde(default)]
    is_foul: bool,
}

impl Throw {
    pub const fn new(knocked: PinSet, is_foul: bool) -> Self {
        Self { knocked, is_foul }
    }

    pub const fn pins(knocked: PinSet) -> Self {
        Self::new(knocked, false)
    }

    pub const fn miss() -> Self {
        Self::new(PinSet::EMPTY, false)
    }

    pub const fn foul() -> Self {
        Self::new(PinSet::EMPTY, true)
    }

    pub const fn knocked(&self) -> PinSet {
        self.knocked
    }

    pub const fn is_foul(&self) -> bool {
        self.is_foul
    }

    /// Pins credited toward the score; a foul delivery is worth nothing.
    pub const fn counted(&self) -> PinSet {
        if self.is_foul {
            PinSet::EMPTY
        } else {
            self.knocked
        }
    }

    pub const fn pin_count(&self) -> u8 {
        self.counted().len()
    }
}

#[cfg(test)]
mod tests {
    use super::Throw;
    use crate::model::pin::PinSet;

    #[test]
    fn foul_counts_zero_even_with_pins() {
        let throw = Throw::new(PinSet::FULL_RACK, true);
        assert_eq!(throw.pin_count(), 0);
        assert!(throw.counted().is_empty());
        assert_eq!(throw.knocked(), PinSet::FULL_RACK);
    }

    #[test]
    fn clean_throw_counts_knocked_pins() {
        let knocked = PinSet::from_numbers(&[1, 2, 3]).unwrap();
        assert_eq!(Throw::pins(knocked).pin_count(), 3);
        assert_eq!(Throw::miss().pin_count(), 0);
    }

    #[test]
    fn legacy_json_without_foul_flag_defaults_to_clean() {
        let throw: Throw = serde_json::from_str(r#"{"knocked":[1,2]}"#).unwrap();
        assert!(!throw.is_foul());
        assert_eq!(throw.pin_count(), 2);
    }
}
