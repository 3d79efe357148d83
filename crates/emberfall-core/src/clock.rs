//! Step timing: the injected time collaborator and the per-step delta clock.
//!
//! The map core itself is step-driven — `Map::update` takes an integer
//! millisecond delta — so the only timing machinery it needs is a way to
//! produce that delta from whatever clock the host supplies.

use std::time::Instant;

/// Monotonic millisecond clock supplied by the host.
pub trait TimeSource {
    /// Milliseconds elapsed since some fixed origin.
    fn now_ms(&self) -> u64;
}

/// [`TimeSource`] backed by [`std::time::Instant`], anchored at creation.
#[derive(Debug)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Create a source whose zero point is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Produces the millisecond delta between consecutive steps.
///
/// The first call yields zero (there is no previous step to measure from);
/// a time source that jumps backwards yields zero rather than wrapping.
///
/// # Example
///
/// ```
/// use emberfall_core::clock::{StepClock, TimeSource};
///
/// struct Fixed(u64);
/// impl TimeSource for Fixed {
///     fn now_ms(&self) -> u64 {
///         self.0
///     }
/// }
///
/// let mut clock = StepClock::new();
/// assert_eq!(clock.advance(&Fixed(100)), 0);
/// assert_eq!(clock.advance(&Fixed(116)), 16);
/// ```
#[derive(Debug, Default)]
pub struct StepClock {
    last_ms: Option<u64>,
}

impl StepClock {
    /// Create a clock with no previous step recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the source and return milliseconds since the previous call.
    pub fn advance(&mut self, source: &dyn TimeSource) -> u32 {
        let now = source.now_ms();
        let delta = match self.last_ms {
            Some(prev) => now.saturating_sub(prev),
            None => 0,
        };
        self.last_ms = Some(now);
        u32::try_from(delta).unwrap_or(u32::MAX)
    }
}
