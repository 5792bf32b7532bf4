//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must hold after every ball, correction or
//! machine command, whatever sequence led there. A test takes a
//! [`SystemSnapshot`] of its lanes and runs a registry against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = SystemSnapshot::single(LaneSnapshot::from_session(&session));
//! registry.assert_all(&snapshot, "after ball 12");
//! ```

mod checks;
mod snapshot;

use fivepin_core::GameSession;

pub use checks::{
    BallsPerFrame, CumulativeMonotonic, CurrentBowlerValid, RecalculationStable, SafeActuatorLevels,
    SpareBonus, StrikeFrames, TenthFrameNoBonus, TotalsMonotonic,
};
pub use snapshot::{LaneSnapshot, ScoreHistory, SystemSnapshot};

/// Outcome of one check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant. The message names the lane, bowler and frame.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Snake-case invariant name.
    pub invariant: &'static str,
    /// Where and how it broke.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property every lane snapshot must satisfy.
pub trait Invariant: Send + Sync {
    /// Snake-case name used in reports.
    fn name(&self) -> &'static str;

    /// First violation found, if any.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Set of invariants run together.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Registry with nothing in it.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Registry with every scoring and machine invariant.
    pub fn standard() -> Self {
        let mut registry = Self::scoring();
        registry.add(SafeActuatorLevels);
        registry
    }

    /// Scoring invariants only, for lanes whose hardware is expected to
    /// misbehave.
    pub fn scoring() -> Self {
        let mut registry = Self::new();
        registry.add(StrikeFrames);
        registry.add(SpareBonus);
        registry.add(TenthFrameNoBonus);
        registry.add(BallsPerFrame);
        registry.add(CumulativeMonotonic);
        registry.add(TotalsMonotonic);
        registry.add(RecalculationStable);
        registry.add(CurrentBowlerValid);
        registry
    }

    /// Checks a bare session with no machine or history attached.
    pub fn assert_session(&self, session: &GameSession, context: &str) {
        self.assert_all(&SystemSnapshot::single(LaneSnapshot::from_session(session)), context);
    }

    /// Adds an invariant.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Every violation in `state`, across all lanes.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> = self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(|v| v.to_string()).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
