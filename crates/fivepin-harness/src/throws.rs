//! Seeded ball generator.

use fivepin_core::{GameSession, Pin, PinVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::rack_down;

/// Produces reproducible throws from a seed.
///
/// Each standing pin falls independently with probability `pin_rate`; with
/// probability `strike_rate` the whole rack falls.
#[derive(Debug, Clone)]
pub struct ThrowGenerator {
    rng: ChaCha8Rng,
    strike_rate: f64,
    pin_rate: f64,
}

impl ThrowGenerator {
    /// Generator with a 20% strike rate and 50% per-pin rate.
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), strike_rate: 0.2, pin_rate: 0.5 }
    }

    /// Sets the whole-rack probability.
    #[must_use]
    pub fn with_strike_rate(mut self, rate: f64) -> Self {
        self.strike_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-pin probability.
    #[must_use]
    pub fn with_pin_rate(mut self, rate: f64) -> Self {
        self.pin_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Pins knocked from those still `standing`.
    pub fn next_knock(&mut self, standing: PinVector) -> PinVector {
        if self.rng.gen_bool(self.strike_rate) {
            return standing;
        }
        standing.pins().filter(|_| self.rng.gen_bool(self.pin_rate)).collect()
    }

    /// Cumulative sensor reading for the next ball in `session`.
    pub fn next_reading(&mut self, session: &GameSession) -> PinVector {
        let down = rack_down(session);
        down.union(self.next_knock(down.standing()))
    }

    /// A single random pin, for tests that need one.
    pub fn any_pin(&mut self) -> Pin {
        Pin::ALL[self.rng.gen_range(0..Pin::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_throws() {
        let mut a = ThrowGenerator::new(7);
        let mut b = ThrowGenerator::new(7);
        for _ in 0..50 {
            assert_eq!(a.next_knock(PinVector::ALL), b.next_knock(PinVector::ALL));
        }
    }

    #[test]
    fn knocks_only_standing_pins() {
        let mut throws = ThrowGenerator::new(3).with_strike_rate(0.0).with_pin_rate(1.0);
        let standing = PinVector::from_mask(0b0_0110);
        assert_eq!(throws.next_knock(standing), standing);
        assert!(ThrowGenerator::new(9).next_knock(PinVector::EMPTY).is_empty());
    }
}
