//! Phase accumulation.

/// Advance `phase` by `frequency * sample_interval`.
///
/// Returns `(new_phase, output_phase)`: the output phase is the value to
/// evaluate for the current sample (the phase before the increment), and the
/// new phase is wrapped into `[0, 1)` so precision never degrades on long runs.
#[inline]
pub fn advance(phase: f64, frequency: f32, sample_interval: f32) -> (f64, f32) {
    let next = phase + frequency as f64 * sample_interval as f64;
    (wrap(next), phase as f32)
}

/// Fold any phase into `[0, 1)`. Non-finite phases become 0.
#[inline]
pub fn wrap(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase - phase.floor();
    // `x - floor(x)` rounds up to 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// A wrapping phase in cycles, kept in double precision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
}

impl PhaseAccumulator {
    pub fn new(phase: f64) -> Self {
        PhaseAccumulator { phase: wrap(phase) }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn set(&mut self, phase: f64) {
        self.phase = wrap(phase);
    }

    /// Advance one sample and return the phase to render it at.
    #[inline]
    pub fn step(&mut self, frequency: f32, sample_interval: f32) -> f32 {
        let (next, output) = advance(self.phase, frequency, sample_interval);
        self.phase = next;
        output
    }
}
