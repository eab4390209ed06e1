use core::fmt;
use serde::{Deserialize, Serialize};

/// Row (0 is the head pin) and lateral offset of every pin, indexed by `number - 1`.
///
/// Offsets step by two inside a row so that a pin sits exactly between the two
/// pins behind it.
const LAYOUT: [(u8, i8); 10] = [
    (0, 0),
    (1, -1),
    (1, 1),
    (2, -2),
    (2, 0),
    (2, 2),
    (3, -3),
    (3, -1),
    (3, 1),
    (3, 3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pin(u8);

impl Pin {
    pub const HEAD: Pin = Pin(1);

    pub const ALL: [Pin; 10] = [
        Pin(1),
        Pin(2),
        Pin(3),
        Pin(4),
        Pin(5),
        Pin(6),
        Pin(7),
        Pin(8),
        Pin(9),
        Pin(10),
    ];

    pub const fn new(number: u8) -> Option<Self> {
        match number {
            1..=10 => Some(Pin(number)),
            _ => None,
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Row counted from the head pin: 0 for pin 1, 3 for the back row.
    pub const fn row(self) -> u8 {
        LAYOUT[self.index()].0
    }

    pub const fn offset(self) -> i8 {
        LAYOUT[self.index()].1
    }

    /// Pins one row nearer the head pin that this pin stands diagonally behind.
    pub fn forward_neighbors(self) -> PinSet {
        Pin::ALL
            .iter()
            .copied()
            .filter(|other| {
                other.row() + 1 == self.row() && (other.offset() - self.offset()).abs() == 1
            })
            .collect()
    }

    /// Pin standing directly in front of this one, two rows nearer the head pin.
    pub fn sleeper_front(self) -> Option<Pin> {
        Pin::ALL
            .iter()
            .copied()
            .find(|other| other.row() + 2 == self.row() && other.offset() == self.offset())
    }
}

impl TryFrom<u8> for Pin {
    type Error = PinSetError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Pin::new(number).ok_or(PinSetError::OutOfRange(number))
    }
}

impl From<Pin> for u8 {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinSetError {
    OutOfRange(u8),
    Duplicate(u8),
}

impl fmt::Display for PinSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinSetError::OutOfRange(number) => write!(f, "pin {number} is outside 1-10"),
            PinSetError::Duplicate(number) => write!(f, "pin {number} listed more than once"),
        }
    }
}

impl std::error::Error for PinSetError {}

/// Set of pins packed into the low ten bits of a `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PinSet(u16);

impl PinSet {
    pub const EMPTY: Self = Self(0);
    pub const FULL_RACK: Self = Self(0b11_1111_1111);

    pub fn from_pins(pins: &[Pin]) -> Self {
        pins.iter().copied().collect()
    }

    /// Builds a set from raw pin numbers, rejecting anything outside the rack.
    pub fn from_numbers(numbers: &[u8]) -> Result<Self, PinSetError> {
        let mut set = PinSet::EMPTY;
        for &number in numbers {
            let pin = Pin::try_from(number)?;
            if set.contains(pin) {
                return Err(PinSetError::Duplicate(number));
            }
            set.insert(pin);
        }
        Ok(set)
    }

    const fn bit(pin: Pin) -> u16 {
        1 << pin.index()
    }

    pub const fn contains(self, pin: Pin) -> bool {
        self.0 & Self::bit(pin) != 0
    }

    pub fn insert(&mut self, pin: Pin) {
        self.0 |= Self::bit(pin);
    }

    pub fn remove(&mut self, pin: Pin) {
        self.0 &= !Self::bit(pin);
    }

    pub fn toggle(&mut self, pin: Pin) {
        self.0 ^= Self::bit(pin);
    }

    pub const fn with(self, pin: Pin) -> Self {
        Self(self.0 | Self::bit(pin))
    }

    pub const fn len(self) -> u8 {
        self.0.count_ones() as u8
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_full_rack(self) -> bool {
        self.0 == Self::FULL_RACK.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Pins in ascending number order.
    pub fn iter(self) -> impl Iterator<Item = Pin> {
        Pin::ALL.into_iter().filter(move |pin| self.contains(*pin))
    }
}

impl FromIterator<Pin> for PinSet {
    fn from_iter<I: IntoIterator<Item = Pin>>(iter: I) -> Self {
        let mut set = PinSet::EMPTY;
        for pin in iter {
            set.insert(pin);
        }
        set
    }
}

impl TryFrom<Vec<u8>> for PinSet {
    type Error = PinSetError;

    fn try_from(numbers: Vec<u8>) -> Result<Self, Self::Error> {
        PinSet::from_numbers(&numbers)
    }
}

impl From<PinSet> for Vec<u8> {
    fn from(set: PinSet) -> Self {
        set.iter().map(Pin::number).collect()
    }
}

impl fmt::Display for PinSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pin in self.iter() {
            if !first {
                f.write_str("-")?;
            }
            write!(f, "{pin}")?;
            first = false;
        }
        Ok(())
    }
}
