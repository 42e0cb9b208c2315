//! Closed-form harmonic series for each waveform family.
//!
//! Every function sums an arbitrary contiguous harmonic range, so the same
//! code builds the tiers (one increment at a time) and corrects a tier to an
//! exact harmonic count at runtime.

use std::f64::consts::PI;

use super::sine::SineEvaluator;

/// A harmonic series with a partial-sum implementation.
///
/// Pulse has no series of its own; it is derived from two saw evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    Saw,
    ReverseSaw,
    Square,
    Triangle,
    SawTriangle,
}

impl Series {
    /// Whether harmonic `i` contributes to this series at all.
    pub fn uses_harmonic(self, i: u32) -> bool {
        match self {
            Series::Square | Series::Triangle => i % 2 == 1,
            Series::Saw | Series::ReverseSaw | Series::SawTriangle => i >= 1,
        }
    }

    /// Signed sine coefficient of harmonic `i` in the normalized series.
    pub fn coefficient(self, i: u32) -> f64 {
        if i == 0 || !self.uses_harmonic(i) {
            return 0.0;
        }
        let n = i as f64;
        let saw = 2.0 / (PI * n);
        let triangle = triangle_sign(i) * 8.0 / (PI * PI * n * n);
        match self {
            Series::Saw => -saw,
            Series::ReverseSaw => saw,
            Series::Square => 4.0 / (PI * n),
            Series::Triangle => triangle,
            Series::SawTriangle if i % 2 == 1 => triangle - saw,
            Series::SawTriangle => -saw,
        }
    }

    /// Peak amplitude of harmonic `i` in the normalized series.
    pub fn amplitude(self, i: u32) -> f64 {
        self.coefficient(i).abs()
    }

    /// Sum of harmonics `start..=end` of this series at `phase`.
    ///
    /// Returns 0 for an empty range. A `start` of 0 is treated as 1.
    pub fn partial_sum(self, sine: &SineEvaluator, start: u32, end: u32, phase: f64) -> f64 {
        let start = start.max(1);
        if start > end {
            return 0.0;
        }
        match self {
            Series::Saw => -2.0 * saw_sum(sine, start, end, phase) / PI,
            Series::ReverseSaw => 2.0 * saw_sum(sine, start, end, phase) / PI,
            Series::Square => 4.0 * square_sum(sine, start, end, phase) / PI,
            Series::Triangle => 8.0 * triangle_sum(sine, start, end, phase) / (PI * PI),
            Series::SawTriangle => saw_triangle(sine, start, end, phase),
        }
    }

    /// Reference value: harmonics `1..=harmonics` summed directly.
    pub fn direct_sum(self, sine: &SineEvaluator, harmonics: u32, phase: f64) -> f64 {
        self.partial_sum(sine, 1, harmonics, phase)
    }
}

#[inline]
fn harmonic(sine: &SineEvaluator, i: u32, phase: f64) -> f64 {
    sine.sin2pi(i as f64 * phase)
}

/// First odd index at or after `start`.
#[inline]
fn first_odd(start: u32) -> u32 {
    start | 1
}

#[inline]
fn triangle_sign(i: u32) -> f64 {
    if i % 4 == 3 { -1.0 } else { 1.0 }
}

fn saw_sum(sine: &SineEvaluator, start: u32, end: u32, phase: f64) -> f64 {
    (start..=end)
        .map(|i| harmonic(sine, i, phase) / i as f64)
        .sum()
}

fn square_sum(sine: &SineEvaluator, start: u32, end: u32, phase: f64) -> f64 {
    (first_odd(start)..=end)
        .step_by(2)
        .map(|i| harmonic(sine, i, phase) / i as f64)
        .sum()
}

fn triangle_sum(sine: &SineEvaluator, start: u32, end: u32, phase: f64) -> f64 {
    (first_odd(start)..=end)
        .step_by(2)
        .map(|i| {
            let n = i as f64;
            triangle_sign(i) * harmonic(sine, i, phase) / (n * n)
        })
        .sum()
}

/// Triangle and saw accumulated in one pass over the range.
fn saw_triangle(sine: &SineEvaluator, start: u32, end: u32, phase: f64) -> f64 {
    let mut saw = 0.0;
    let mut triangle = 0.0;
    for i in start..=end {
        let s = harmonic(sine, i, phase);
        let n = i as f64;
        saw += s / n;
        if i % 2 == 1 {
            triangle += triangle_sign(i) * s / (n * n);
        }
    }
    2.0 * (4.0 * triangle / PI - saw) / PI
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXACT: SineEvaluator<'static> = SineEvaluator::Exact;

    const ALL: [Series; 5] = [
        Series::Saw,
        Series::ReverseSaw,
        Series::Square,
        Series::Triangle,
        Series::SawTriangle,
    ];

    #[test]
    fn partial_sums_are_additive() {
        for series in ALL {
            for phase in [0.03, 0.27, 0.5, 0.81] {
                let whole = series.partial_sum(&EXACT, 1, 40, phase);
                let split = series.partial_sum(&EXACT, 1, 17, phase)
                    + series.partial_sum(&EXACT, 18, 40, phase);
                assert!(
                    (whole - split).abs() < 1e-12,
                    "{series:?} at {phase}: {whole} vs {split}"
                );
            }
        }
    }

    #[test]
    fn odd_only_series_ignore_even_ranges() {
        for series in [Series::Square, Series::Triangle] {
            let v = series.partial_sum(&EXACT, 4, 4, 0.13);
            assert_eq!(v, 0.0, "{series:?} harmonic 4 should be silent");
        }
    }

    #[test]
    fn empty_range_is_zero() {
        for series in ALL {
            assert_eq!(series.partial_sum(&EXACT, 10, 9, 0.3), 0.0);
        }
    }

    #[test]
    fn saw_and_reverse_saw_are_mirrored() {
        for phase in [0.1, 0.4, 0.77] {
            let saw = Series::Saw.direct_sum(&EXACT, 50, phase);
            let rsaw = Series::ReverseSaw.direct_sum(&EXACT, 50, phase);
            assert!((saw + rsaw).abs() < 1e-12);
        }
    }

    #[test]
    fn many_harmonics_approach_ideal_shapes() {
        // Away from discontinuities the series converge on the naive shapes
        let saw = Series::Saw.direct_sum(&EXACT, 2000, 0.25);
        assert!((saw - -0.5).abs() < 0.01, "saw(0.25)={saw}");

        let square = Series::Square.direct_sum(&EXACT, 2001, 0.25);
        assert!((square - 1.0).abs() < 0.01, "square(0.25)={square}");

        let triangle = Series::Triangle.direct_sum(&EXACT, 201, 0.25);
        assert!((triangle - 1.0).abs() < 0.01, "triangle(0.25)={triangle}");

        let triangle = Series::Triangle.direct_sum(&EXACT, 201, 0.0);
        assert!(triangle.abs() < 0.01, "triangle(0)={triangle}");
    }

    #[test]
    fn saw_triangle_blends_both_series() {
        let phase = 0.37;
        let blend = Series::SawTriangle.direct_sum(&EXACT, 99, phase);
        let triangle = Series::Triangle.direct_sum(&EXACT, 99, phase);
        let rsaw = Series::ReverseSaw.direct_sum(&EXACT, 99, phase);
        assert!((blend - (triangle - rsaw)).abs() < 1e-9, "blend={blend}");
    }

    #[test]
    fn coefficients_reproduce_partial_sums() {
        for series in ALL {
            for phase in [0.07, 0.5, 0.91] {
                let summed: f64 = (1..=33)
                    .map(|i| series.coefficient(i) * EXACT.sin2pi(i as f64 * phase))
                    .sum();
                let expected = series.direct_sum(&EXACT, 33, phase);
                assert!(
                    (summed - expected).abs() < 1e-12,
                    "{series:?} at {phase}: {summed} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn amplitudes_follow_series() {
        assert_eq!(Series::Square.amplitude(2), 0.0);
        assert!((Series::Square.amplitude(3) - 4.0 / (3.0 * PI)).abs() < 1e-15);
        assert!(Series::Saw.amplitude(10) < Series::Saw.amplitude(9));
    }
}
