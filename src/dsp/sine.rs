//! sin(2πx) evaluation, exact or via an interpolated lookup table.
//!
//! Table construction always uses the exact evaluator. Everything on the
//! per-sample path goes through the table.

use std::f64::consts::TAU;

use crate::config::GUARD;
use crate::error::BandlimitedError;

/// One cycle of sin(2πx), `size` samples plus `GUARD` wrap-around samples.
#[derive(Debug, Clone)]
pub struct SineTable {
    samples: Vec<f32>,
    size: usize,
}

impl SineTable {
    /// Build the table and verify that lookups reproduce known values.
    pub fn new(size: usize) -> Result<Self, BandlimitedError> {
        let samples = (0..size + GUARD)
            .map(|i| SineEvaluator::Exact.sin2pi(i as f64 / size as f64) as f32)
            .collect();
        let table = SineTable { samples, size };
        table.self_check()?;
        Ok(table)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Split a phase into a table index and an interpolation fraction.
    ///
    /// The index is in `[0, size]`; `size` itself only occurs when a tiny
    /// negative phase wraps up to exactly 1.0 and lands on a guard sample.
    #[inline]
    pub fn split(&self, phase: f64) -> (usize, f64) {
        let wrapped = phase - phase.floor();
        let scaled = wrapped * self.size as f64;
        let index = scaled as usize;
        (index, scaled - index as f64)
    }

    #[inline]
    pub fn lookup(&self, phase: f64) -> f64 {
        let (index, frac) = self.split(phase);
        let a = self.samples[index] as f64;
        let b = self.samples[index + 1] as f64;
        a + frac * (b - a)
    }

    fn self_check(&self) -> Result<(), BandlimitedError> {
        let half = self.size / 2;
        let probe = 0.5 + 0.5 / self.size as f64;
        let (index, frac) = self.split(probe);
        if index != half || frac != 0.5 {
            return Err(BandlimitedError::InterpolationCheck {
                expected: half as f64 + 0.5,
                found: index as f64 + frac,
            });
        }

        // Worst-case linear interpolation error for one sine cycle
        let step = TAU / self.size as f64;
        let tolerance = step * step / 8.0 + 1e-6;
        for phase in [0.0, 0.125, 0.25, probe, 0.8, 0.999_999, -0.25] {
            let expected = SineEvaluator::Exact.sin2pi(phase);
            let found = self.lookup(phase);
            if (expected - found).abs() > tolerance {
                return Err(BandlimitedError::InterpolationCheck { expected, found });
            }
        }
        Ok(())
    }
}

/// How `sin2pi` is computed.
#[derive(Debug, Clone, Copy)]
pub enum SineEvaluator<'a> {
    /// The platform `sin`. Only used while building tables.
    Exact,
    /// Linear interpolation into a prebuilt table.
    Table(&'a SineTable),
}

impl SineEvaluator<'_> {
    /// sin(2πx), periodic with period 1.
    #[inline]
    pub fn sin2pi(&self, x: f64) -> f64 {
        match self {
            SineEvaluator::Exact => (TAU * (x - x.floor())).sin(),
            SineEvaluator::Table(table) => table.lookup(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_std_sin() {
        for i in 0..100 {
            let x = i as f64 / 37.0 - 1.0;
            let expected = (TAU * x).sin();
            let found = SineEvaluator::Exact.sin2pi(x);
            assert!((expected - found).abs() < 1e-9, "x={x}: {expected} vs {found}");
        }
    }

    #[test]
    fn table_is_accurate() {
        let table = SineTable::new(4096).unwrap();
        let fast = SineEvaluator::Table(&table);
        for i in 0..10_000 {
            let x = i as f64 / 9_973.0;
            let expected = SineEvaluator::Exact.sin2pi(x);
            let found = fast.sin2pi(x);
            assert!((expected - found).abs() < 1e-4, "x={x}: {expected} vs {found}");
        }
    }

    #[test]
    fn table_handles_negative_and_large_phases() {
        let table = SineTable::new(1024).unwrap();
        let fast = SineEvaluator::Table(&table);
        for x in [-3.75, -0.1, -1e-18, 12.3, 733.0 * 0.4567] {
            let expected = SineEvaluator::Exact.sin2pi(x);
            let found = fast.sin2pi(x);
            assert!((expected - found).abs() < 1e-4, "x={x}: {expected} vs {found}");
        }
    }

    #[test]
    fn split_is_exact_on_grid() {
        let table = SineTable::new(256).unwrap();
        assert_eq!(table.split(0.0), (0, 0.0));
        assert_eq!(table.split(0.25), (64, 0.0));
        assert_eq!(table.split(1.25), (64, 0.0));
        let (index, frac) = table.split(0.5 + 0.25 / 256.0);
        assert_eq!(index, 128);
        assert!((frac - 0.25).abs() < 1e-12, "frac={frac}");
    }

    #[test]
    fn wrap_to_one_lands_on_guard() {
        let table = SineTable::new(64).unwrap();
        let (index, _) = table.split(-1e-18);
        assert!(index <= table.size());
        assert!(table.lookup(-1e-18).abs() < 1e-6);
    }
}
