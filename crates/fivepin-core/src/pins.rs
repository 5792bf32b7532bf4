//! Pin positions and pin vectors.
//!
//! A 5-pin rack stands five pins in a fixed left-to-right order. A
//! [`PinVector`] is the set of pins that are *down*. Its text form is a five
//! character key of `0` (up) and `1` (down) in positional order, so `"11000"`
//! means both left pins are down. The key form is what gets serialized and
//! what the symbol table is keyed by.
//!
//! ```text
//!   LeftTwo  LeftThree  Center  RightThree  RightTwo
//!      2         3         5         3          2
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParsePinsError;

/// Number of pins in a rack.
pub const PIN_COUNT: usize = 5;

/// Point value of a full rack.
pub const RACK_VALUE: u8 = 15;

/// A pin position, in rack order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pin {
    /// Leftmost corner pin (2 points).
    LeftTwo,
    /// Left three pin (3 points).
    LeftThree,
    /// Head pin (5 points).
    Center,
    /// Right three pin (3 points).
    RightThree,
    /// Rightmost corner pin (2 points).
    RightTwo,
}

impl Pin {
    /// All pins in positional order.
    pub const ALL: [Pin; PIN_COUNT] =
        [Pin::LeftTwo, Pin::LeftThree, Pin::Center, Pin::RightThree, Pin::RightTwo];

    /// Position of this pin in a [`PinVector`] key.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Point value of this pin.
    pub const fn value(self) -> u8 {
        match self {
            Pin::LeftTwo | Pin::RightTwo => 2,
            Pin::LeftThree | Pin::RightThree => 3,
            Pin::Center => 5,
        }
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pin::LeftTwo => "left two",
            Pin::LeftThree => "left three",
            Pin::Center => "center",
            Pin::RightThree => "right three",
            Pin::RightTwo => "right two",
        };
        f.write_str(name)
    }
}

/// Set of pins that are down.
///
/// Bit `i` is set when `Pin::ALL[i]` is down. Only the low five bits are ever
/// set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinVector(u8);

impl PinVector {
    /// Every pin standing.
    pub const EMPTY: Self = Self(0);

    /// Every pin down.
    pub const ALL: Self = Self(0b1_1111);

    /// Builds a vector from a raw bit mask, discarding bits above the rack.
    pub const fn from_mask(mask: u8) -> Self {
        Self(mask & Self::ALL.0)
    }

    /// Builds a vector from per-position down flags.
    pub fn from_bits(bits: [bool; PIN_COUNT]) -> Self {
        Pin::ALL.iter().zip(bits).filter(|(_, down)| *down).fold(Self::EMPTY, |v, (p, _)| v.with(*p))
    }

    /// Raw bit mask.
    pub const fn mask(self) -> u8 {
        self.0
    }

    /// Per-position down flags.
    pub fn to_bits(self) -> [bool; PIN_COUNT] {
        Pin::ALL.map(|p| self.is_down(p))
    }

    /// Whether `pin` is down.
    pub const fn is_down(self, pin: Pin) -> bool {
        self.0 & pin.bit() != 0
    }

    /// This vector with `pin` marked down.
    #[must_use]
    pub const fn with(self, pin: Pin) -> Self {
        Self(self.0 | pin.bit())
    }

    /// Pins down in either vector.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Pins down in `self` but not in `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Pins standing in `self`, as a down-vector.
    #[must_use]
    pub const fn standing(self) -> Self {
        Self::ALL.without(self)
    }

    /// Whether any pin is down in both vectors.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no pin is down.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every pin is down.
    pub const fn is_all_down(self) -> bool {
        self.0 == Self::ALL.0
    }

    /// Number of pins down.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Sum of point values of the pins down.
    pub fn value(self) -> u8 {
        self.pins().map(Pin::value).sum()
    }

    /// Pins down, in positional order.
    pub fn pins(self) -> impl Iterator<Item = Pin> {
        Pin::ALL.into_iter().filter(move |p| self.is_down(*p))
    }

    /// Five character `0`/`1` key in positional order.
    pub fn key(self) -> String {
        Pin::ALL.iter().map(|p| if self.is_down(*p) { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for PinVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl fmt::Debug for PinVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinVector({})", self.key())
    }
}

impl FromStr for PinVector {
    type Err = ParsePinsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != PIN_COUNT {
            return Err(ParsePinsError::Length(s.chars().count()));
        }

        let mut vector = Self::EMPTY;
        for (pin, c) in Pin::ALL.into_iter().zip(s.chars()) {
            match c {
                '1' => vector = vector.with(pin),
                '0' => {},
                other => return Err(ParsePinsError::Character(other)),
            }
        }
        Ok(vector)
    }
}

impl TryFrom<String> for PinVector {
    type Error = ParsePinsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PinVector> for String {
    fn from(value: PinVector) -> Self {
        value.key()
    }
}

impl From<Pin> for PinVector {
    fn from(pin: Pin) -> Self {
        Self::EMPTY.with(pin)
    }
}

impl FromIterator<Pin> for PinVector {
    fn from_iter<T: IntoIterator<Item = Pin>>(iter: T) -> Self {
        iter.into_iter().fold(Self::EMPTY, PinVector::with)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn full_rack_is_worth_fifteen() {
        assert_eq!(PinVector::ALL.value(), RACK_VALUE);
        assert_eq!(PinVector::EMPTY.value(), 0);
    }

    #[test]
    fn key_follows_positional_order() {
        let v: PinVector = [Pin::LeftTwo, Pin::LeftThree].into_iter().collect();
        assert_eq!(v.key(), "11000");
        assert_eq!(v.value(), 5);

        let head: PinVector = "00100".parse().unwrap();
        assert_eq!(head, PinVector::from(Pin::Center));
        assert_eq!(head.value(), 5);
    }

    #[test]
    fn parse_rejects_bad_keys() {
        assert_eq!("1100".parse::<PinVector>(), Err(ParsePinsError::Length(4)));
        assert_eq!("11x00".parse::<PinVector>(), Err(ParsePinsError::Character('x')));
    }

    #[test]
    fn serializes_as_key() {
        let v = PinVector::from_bits([false, false, true, true, false]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"00110\"");
        let back: PinVector = serde_json::from_str("\"00110\"").unwrap();
        assert_eq!(back, v);
    }

    proptest! {
        #[test]
        fn mask_and_bits_agree(mask in 0u8..32) {
            let v = PinVector::from_mask(mask);
            prop_assert_eq!(PinVector::from_bits(v.to_bits()), v);
            prop_assert_eq!(v.key().parse::<PinVector>().unwrap(), v);
            prop_assert_eq!(v.value() + v.standing().value(), RACK_VALUE);
        }

        #[test]
        fn without_never_intersects(a in 0u8..32, b in 0u8..32) {
            let (a, b) = (PinVector::from_mask(a), PinVector::from_mask(b));
            prop_assert!(!a.without(b).intersects(b));
            prop_assert_eq!(a.without(b).union(b), a.union(b));
        }
    }
}
