//! Euclidean rhythm generator
//!
//! Distributes `k` pulses over `n` steps as evenly as possible with the
//! bucket (Bresenham) method: add `k` to an accumulator every step and emit
//! a pulse whenever it reaches `n`. The accumulator starts at `n - k` so
//! every non-empty pattern begins on a pulse.

use heapless::Vec;
use ostinato_core::program::ProgramError;

/// Longest supported pattern
pub const MAX_STEPS: usize = 64;

/// Invalid Euclidean parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EuclidError {
    /// Requires `0 <= pulses <= steps` and `0 < steps <= MAX_STEPS`
    InvalidParameters { pulses: usize, steps: usize },
}

impl From<EuclidError> for ProgramError {
    fn from(_: EuclidError) -> Self {
        ProgramError::InvalidParameters
    }
}

/// Distribute `pulses` hits over `steps` slots
///
/// Pure function of its inputs.
///
/// # Example
/// ```
/// use ostinato_programs::euclid::distribute;
///
/// let tresillo = distribute(3, 8).unwrap();
/// assert_eq!(
///     tresillo.as_slice(),
///     &[true, false, false, true, false, false, true, false]
/// );
/// ```
pub fn distribute(pulses: usize, steps: usize) -> Result<Vec<bool, MAX_STEPS>, EuclidError> {
    if steps == 0 || steps > MAX_STEPS || pulses > steps {
        return Err(EuclidError::InvalidParameters { pulses, steps });
    }

    let mut pattern = Vec::new();
    let mut bucket = if pulses > 0 { steps - pulses } else { 0 };
    for _ in 0..steps {
        bucket += pulses;
        let hit = bucket >= steps;
        if hit {
            bucket -= steps;
        }
        // Capacity checked above
        let _ = pattern.push(hit);
    }
    Ok(pattern)
}

/// A cached Euclidean pattern with a play position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EuclideanPattern {
    pulses: usize,
    hits: Vec<bool, MAX_STEPS>,
    position: usize,
}

impl EuclideanPattern {
    /// Build a pattern positioned on its first step
    pub fn new(pulses: usize, steps: usize) -> Result<Self, EuclidError> {
        Ok(Self {
            pulses,
            hits: distribute(pulses, steps)?,
            position: 0,
        })
    }

    /// Number of steps
    pub fn steps(&self) -> usize {
        self.hits.len()
    }

    /// Number of pulses
    pub fn pulses(&self) -> usize {
        self.pulses
    }

    /// Current play position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if a step is a pulse
    pub fn is_hit(&self, step: usize) -> bool {
        self.hits.get(step).copied().unwrap_or(false)
    }

    /// Check if the pattern already has these parameters
    pub fn matches(&self, pulses: usize, steps: usize) -> bool {
        self.pulses == pulses && self.steps() == steps
    }

    /// Return whether the current step is a pulse, then move to the next
    pub fn advance(&mut self) -> bool {
        let hit = self.is_hit(self.position);
        self.position = (self.position + 1) % self.steps();
        hit
    }

    /// Go back to the first step
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_documented_example() {
        let p = distribute(3, 8).unwrap();
        assert_eq!(p.as_slice(), &[true, false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_edges() {
        assert!(distribute(0, 5).unwrap().iter().all(|h| !h));
        assert!(distribute(5, 5).unwrap().iter().all(|h| *h));
        assert_eq!(distribute(1, 1).unwrap().as_slice(), &[true]);
        assert_eq!(distribute(0, 1).unwrap().as_slice(), &[false]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            distribute(4, 3),
            Err(EuclidError::InvalidParameters { pulses: 4, steps: 3 })
        );
        assert!(distribute(0, 0).is_err());
        assert!(distribute(1, MAX_STEPS + 1).is_err());
        assert_eq!(
            ProgramError::from(EuclidError::InvalidParameters { pulses: 1, steps: 0 }),
            ProgramError::InvalidParameters
        );
    }

    #[test]
    fn test_pattern_playback() {
        let mut p = EuclideanPattern::new(5, 8).unwrap();
        let played: heapless::Vec<bool, 16> = (0..16).map(|_| p.advance()).collect();
        assert_eq!(played.iter().filter(|h| **h).count(), 10);
        // Wraps back to the start
        assert_eq!(&played[..8], &played[8..]);
        assert!(p.matches(5, 8));
        assert!(!p.matches(5, 9));
    }

    #[test]
    fn test_reset() {
        let mut p = EuclideanPattern::new(2, 4).unwrap();
        p.advance();
        p.advance();
        p.reset();
        assert_eq!(p.position(), 0);
        assert!(p.advance());
    }

    fn gaps(pattern: &[bool]) -> heapless::Vec<usize, MAX_STEPS> {
        // Distances between consecutive pulses, wrapping around
        let hits: heapless::Vec<usize, MAX_STEPS> = pattern
            .iter()
            .enumerate()
            .filter(|(_, h)| **h)
            .map(|(i, _)| i)
            .collect();
        let mut out = heapless::Vec::new();
        for (i, &pos) in hits.iter().enumerate() {
            let next = hits[(i + 1) % hits.len()];
            let gap = (next + pattern.len() - pos - 1) % pattern.len();
            out.push(gap).unwrap();
        }
        out
    }

    proptest! {
        #[test]
        fn prop_length_and_count(steps in 1usize..=MAX_STEPS, k in 0usize..=MAX_STEPS) {
            let pulses = k % (steps + 1);
            let p = distribute(pulses, steps).unwrap();
            prop_assert_eq!(p.len(), steps);
            prop_assert_eq!(p.iter().filter(|h| **h).count(), pulses);
        }

        #[test]
        fn prop_deterministic(steps in 1usize..=MAX_STEPS, k in 0usize..=MAX_STEPS) {
            let pulses = k % (steps + 1);
            prop_assert_eq!(distribute(pulses, steps), distribute(pulses, steps));
        }

        #[test]
        fn prop_even_gaps(steps in 1usize..=MAX_STEPS, k in 1usize..=MAX_STEPS) {
            let pulses = 1 + k % steps;
            let p = distribute(pulses, steps).unwrap();
            let g = gaps(&p);
            let min = g.iter().min().copied().unwrap_or(0);
            let max = g.iter().max().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn prop_starts_on_pulse(steps in 1usize..=MAX_STEPS, k in 1usize..=MAX_STEPS) {
            let pulses = 1 + k % steps;
            prop_assert!(distribute(pulses, steps).unwrap()[0]);
        }
    }
}
