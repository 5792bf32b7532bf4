//! Ball evaluation.
//!
//! Sensors report the cumulative set of pins down since the rack was last
//! set. The evaluator subtracts what earlier balls on the same rack already
//! knocked down, scores the difference and picks a display symbol.
//!
//! A rack is *fresh* at the start of a frame and again after any ball that
//! leaves every pin down (the pinsetter then sets a full rack, which only
//! matters in the 10th frame). Balls at a fresh rack are named from the
//! [`SymbolTable`]; the frame's second ball is a spare when it clears what
//! the first left standing. Any other ball is shown by its value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pins::{PinVector, RACK_VALUE};

/// Display symbol for all five pins on a fresh rack.
pub const STRIKE: &str = "X";

/// Display symbol for clearing the rack with the frame's second ball.
pub const SPARE: &str = "/";

/// Display symbol for a ball that knocks nothing down at a fresh rack.
pub const MISS: &str = "-";

/// One recorded ball.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    /// Pins this ball knocked down (not the cumulative rack).
    pub pins: PinVector,
    /// Point value of `pins`, 0..=15.
    pub value: u8,
    /// Display symbol.
    pub symbol: String,
}

impl Ball {
    /// Whether this ball knocked down a full rack by itself.
    pub fn is_full_rack(&self) -> bool {
        self.value == RACK_VALUE
    }
}

/// Pins down on the current rack and how many balls were thrown at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rack {
    /// Pins knocked down since the rack was last set.
    pub down: PinVector,
    /// Balls thrown at this rack.
    pub balls: usize,
}

impl Rack {
    /// Rack state after `balls`, resetting whenever every pin went down.
    pub fn after(balls: &[Ball]) -> Self {
        balls.iter().fold(Self::default(), |rack, ball| {
            let down = rack.down.union(ball.pins);
            if down.is_all_down() { Self::default() } else { Self { down, balls: rack.balls + 1 } }
        })
    }

    /// Whether no ball has been thrown at this rack yet.
    pub fn is_fresh(self) -> bool {
        self.balls == 0
    }
}

/// Pattern names for first-ball leaves, keyed by the pins knocked down.
///
/// The default table names the common 5-pin leaves. Patterns missing from
/// the table fall back to the numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    patterns: BTreeMap<PinVector, String>,
}

impl SymbolTable {
    /// Table with no patterns.
    pub fn empty() -> Self {
        Self { patterns: BTreeMap::new() }
    }

    /// Standard 5-pin pattern names.
    pub fn standard() -> Self {
        [
            (0b0_0111, "C\\O"),
            (0b1_1100, "C/O"),
            (0b0_1110, "A"),
            (0b1_1110, "L"),
            (0b0_1111, "R"),
            (0b0_0100, "HP"),
            (0b0_0110, "SL"),
            (0b0_1100, "SR"),
            (0b1_1111, STRIKE),
            (0b0_0000, MISS),
        ]
        .into_iter()
        .fold(Self::empty(), |table, (mask, symbol)| {
            table.with(PinVector::from_mask(mask), symbol)
        })
    }

    /// Adds or replaces the symbol for `pins`.
    #[must_use]
    pub fn with(mut self, pins: PinVector, symbol: impl Into<String>) -> Self {
        self.patterns.insert(pins, symbol.into());
        self
    }

    /// Symbol for `pins`, if the table names it.
    pub fn lookup(&self, pins: PinVector) -> Option<&str> {
        self.patterns.get(&pins).map(String::as_str)
    }

    /// Number of named patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the table names no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Symbol for a ball thrown at a fresh rack.
    fn fresh_rack_symbol(&self, pins: PinVector) -> String {
        if let Some(symbol) = self.lookup(pins) {
            return symbol.to_string();
        }
        if pins.is_all_down() {
            STRIKE.to_string()
        } else if pins.is_empty() {
            MISS.to_string()
        } else {
            pins.value().to_string()
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Evaluates a raw sensor reading against the balls already in the frame.
///
/// `raw` is the cumulative set of pins the sensors report down. Pins that
/// were already down on the current rack are not counted again, so
/// evaluating the same reading twice yields a zero-value second ball.
pub fn evaluate(raw: PinVector, prior: &[Ball], symbols: &SymbolTable) -> Ball {
    let rack = Rack::after(prior);
    let pins = raw.without(rack.down);
    let value = pins.value();

    let symbol = if rack.is_fresh() {
        symbols.fresh_rack_symbol(pins)
    } else if prior.len() == 1 && rack.down.union(pins).is_all_down() {
        SPARE.to_string()
    } else {
        value.to_string()
    };

    tracing::trace!(%raw, rack = %rack.down, %pins, value, %symbol, "ball evaluated");

    Ball { pins, value, symbol }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins(key: &str) -> PinVector {
        key.parse().unwrap()
    }

    #[test]
    fn first_ball_uses_pattern_table() {
        let table = SymbolTable::standard();
        let ball = evaluate(pins("01110"), &[], &table);
        assert_eq!(ball.value, 11);
        assert_eq!(ball.symbol, "A");

        let strike = evaluate(PinVector::ALL, &[], &table);
        assert_eq!(strike.value, 15);
        assert_eq!(strike.symbol, STRIKE);

        let miss = evaluate(PinVector::EMPTY, &[], &table);
        assert_eq!(miss.symbol, MISS);
    }

    #[test]
    fn unnamed_first_ball_is_numeric() {
        let ball = evaluate(pins("11000"), &[], &SymbolTable::standard());
        assert_eq!(ball.value, 5);
        assert_eq!(ball.symbol, "5");
    }

    #[test]
    fn later_balls_count_only_new_pins() {
        let table = SymbolTable::standard();
        let first = evaluate(pins("11000"), &[], &table);
        let second = evaluate(pins("11110"), std::slice::from_ref(&first), &table);

        assert_eq!(second.pins, pins("00110"));
        assert_eq!(second.value, 8);
        assert_eq!(second.symbol, "8");
    }

    #[test]
    fn second_ball_clearing_rack_is_spare() {
        let table = SymbolTable::standard();
        let first = evaluate(pins("00100"), &[], &table);
        let second = evaluate(PinVector::ALL, std::slice::from_ref(&first), &table);
        assert_eq!(second.value, 10);
        assert_eq!(second.symbol, SPARE);
    }

    #[test]
    fn third_ball_clearing_rack_is_numeric() {
        let table = SymbolTable::standard();
        let first = evaluate(pins("00100"), &[], &table);
        let second = evaluate(pins("01100"), std::slice::from_ref(&first), &table);
        let third = evaluate(PinVector::ALL, &[first, second], &table);
        assert_eq!(third.value, 7);
        assert_eq!(third.symbol, "7");
    }

    #[test]
    fn tenth_frame_clear_after_strike_is_numeric() {
        let table = SymbolTable::standard();
        let strike = evaluate(PinVector::ALL, &[], &table);
        let head_pin = evaluate(pins("00100"), std::slice::from_ref(&strike), &table);
        let clear = evaluate(PinVector::ALL, &[strike, head_pin], &table);

        assert_eq!(clear.value, 10);
        assert_eq!(clear.symbol, "10");
    }

    #[test]
    fn ball_after_strike_sees_fresh_rack() {
        let table = SymbolTable::standard();
        let strike = evaluate(PinVector::ALL, &[], &table);
        let next = evaluate(pins("00100"), std::slice::from_ref(&strike), &table);
        assert_eq!(next.value, 5);
        assert_eq!(next.symbol, "HP");
        assert_eq!(Rack::after(&[strike, next]), Rack { down: pins("00100"), balls: 1 });
    }

    #[test]
    fn unchanged_reading_scores_zero() {
        let table = SymbolTable::standard();
        let first = evaluate(pins("10010"), &[], &table);
        let again = evaluate(pins("10010"), std::slice::from_ref(&first), &table);
        assert_eq!(again.value, 0);
        assert!(again.pins.is_empty());
    }

    #[test]
    fn custom_table_overrides_standard() {
        let table = SymbolTable::standard().with(pins("11000"), "LL");
        assert_eq!(evaluate(pins("11000"), &[], &table).symbol, "LL");
        assert_eq!(table.len(), SymbolTable::standard().len() + 1);
    }

    #[test]
    fn table_serializes_by_key() {
        let table = SymbolTable::empty().with(pins("00100"), "HP");
        insta::assert_json_snapshot!(table, @r#"
        {
          "00100": "HP"
        }
        "#);
    }
}
