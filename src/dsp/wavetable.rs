//! Tiered harmonic wavetables.
//!
//! Each table family holds `tiers` single-cycle tables. Tier `k` contains
//! the first `k * increment` harmonics and is built by adding one
//! increment's partial sum to tier `k - 1`, so building costs one pass over
//! the harmonics rather than one pass per tier.
//!
//! At runtime a harmonic budget picks the nearest tier; exact mode then
//! adds or removes the few harmonics between the tier and the budget.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::debug;

use crate::config::{GUARD, TableLayout};
use crate::error::BandlimitedError;

use super::harmonics::Series;
use super::oscillator::Waveform;
use super::sine::{SineEvaluator, SineTable};

/// Cache for the default layout, alive as long as some oscillator holds it.
static SHARED: Mutex<Weak<TableCache>> = Mutex::new(Weak::new());

/// One cycle of a periodic function, plus `GUARD` wrap-around samples.
#[derive(Debug, Clone)]
pub struct WaveTable {
    samples: Vec<f32>,
}

impl WaveTable {
    fn from_cycle(cycle: &[f64]) -> Self {
        let samples = cycle
            .iter()
            .chain(cycle.iter().take(GUARD))
            .map(|&v| v as f32)
            .collect();
        WaveTable { samples }
    }

    #[inline]
    fn interpolate(&self, index: usize, frac: f64) -> f64 {
        let a = self.samples[index] as f64;
        let b = self.samples[index + 1] as f64;
        a + frac * (b - a)
    }
}

/// Families that own a tier set. Saw and reverse saw share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFamily {
    Saw,
    Square,
    Triangle,
    SawTriangle,
}

impl TableFamily {
    const ALL: [TableFamily; 4] = [
        TableFamily::Saw,
        TableFamily::Square,
        TableFamily::Triangle,
        TableFamily::SawTriangle,
    ];

    fn series(self) -> Series {
        match self {
            TableFamily::Saw => Series::Saw,
            TableFamily::Square => Series::Square,
            TableFamily::Triangle => Series::Triangle,
            TableFamily::SawTriangle => Series::SawTriangle,
        }
    }
}

#[derive(Debug)]
struct TierSet {
    series: Series,
    tiers: Vec<WaveTable>,
}

impl TierSet {
    /// Harmonic `i` at grid point `j` is `sin(2π·((i·j) mod size)/size)`,
    /// so one exact sine cycle serves every harmonic without calling `sin`.
    fn build(series: Series, layout: &TableLayout, sines: &[f64]) -> Self {
        let size = layout.table_size;
        let mask = size - 1;
        let mut cycle = vec![0.0f64; size];
        let mut tiers = Vec::with_capacity(layout.tiers);
        for k in 1..=layout.tiers as u32 {
            let start = (k - 1) * layout.increment + 1;
            let end = k * layout.increment;
            for i in start..=end {
                let coefficient = series.coefficient(i);
                if coefficient == 0.0 {
                    continue;
                }
                let i = i as usize & mask;
                for (j, value) in cycle.iter_mut().enumerate() {
                    *value += coefficient * sines[i.wrapping_mul(j) & mask];
                }
            }
            tiers.push(WaveTable::from_cycle(&cycle));
        }
        TierSet { series, tiers }
    }
}

/// One exact cycle of sin(2πj/size), `j` in `0..size`.
fn sine_cycle(size: usize) -> Vec<f64> {
    let exact = SineEvaluator::Exact;
    (0..size).map(|j| exact.sin2pi(j as f64 / size as f64)).collect()
}

/// Every tier set plus the runtime sine table. Immutable once built.
#[derive(Debug)]
pub struct TableCache {
    layout: TableLayout,
    sine: SineTable,
    saw: TierSet,
    square: TierSet,
    triangle: TierSet,
    saw_triangle: TierSet,
}

impl TableCache {
    /// The process-wide cache for the default layout.
    ///
    /// Built on first use and freed when the last `Arc` is dropped; the
    /// next call after that builds it again.
    pub fn shared() -> Result<Arc<TableCache>, BandlimitedError> {
        let mut slot = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cache) = slot.upgrade() {
            return Ok(cache);
        }
        let cache = Arc::new(TableCache::build(TableLayout::default())?);
        *slot = Arc::downgrade(&cache);
        Ok(cache)
    }

    /// Build a private cache for `layout`.
    pub fn build(layout: TableLayout) -> Result<TableCache, BandlimitedError> {
        layout.validate()?;
        debug!(
            "building wavetables: {} samples, {} tiers of {} harmonics",
            layout.table_size, layout.tiers, layout.increment
        );
        let sine = SineTable::new(layout.table_size)?;
        let sines = sine_cycle(layout.table_size);
        let [saw, square, triangle, saw_triangle] =
            TableFamily::ALL.map(|family| TierSet::build(family.series(), &layout, &sines));
        Ok(TableCache {
            layout,
            sine,
            saw,
            square,
            triangle,
            saw_triangle,
        })
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Highest harmonic budget `evaluate` honours.
    pub fn capacity(&self) -> u32 {
        self.layout.capacity()
    }

    /// The runtime sine evaluator backed by this cache's table.
    pub fn sine(&self) -> SineEvaluator<'_> {
        SineEvaluator::Table(&self.sine)
    }

    fn tier_set(&self, family: TableFamily) -> &TierSet {
        match family {
            TableFamily::Saw => &self.saw,
            TableFamily::Square => &self.square,
            TableFamily::Triangle => &self.triangle,
            TableFamily::SawTriangle => &self.saw_triangle,
        }
    }

    /// One sample of `waveform` containing harmonics `1..=max_harmonics`.
    ///
    /// Budgets above `capacity()` are clamped to it. A budget of 0 is silent.
    /// `duty` only affects `Waveform::Pulse` and is clamped to `[0, 1]`; a
    /// non-finite duty falls back to 0.5.
    pub fn evaluate(
        &self,
        waveform: Waveform,
        max_harmonics: u32,
        phase: f32,
        duty: f32,
        approximate: bool,
    ) -> f32 {
        let phase = phase as f64;
        let value = match waveform {
            Waveform::Saw => self.evaluate_family(TableFamily::Saw, max_harmonics, phase, approximate),
            Waveform::ReverseSaw => {
                -self.evaluate_family(TableFamily::Saw, max_harmonics, phase, approximate)
            }
            Waveform::Square => {
                self.evaluate_family(TableFamily::Square, max_harmonics, phase, approximate)
            }
            Waveform::Triangle => {
                self.evaluate_family(TableFamily::Triangle, max_harmonics, phase, approximate)
            }
            Waveform::SawTriangle => {
                self.evaluate_family(TableFamily::SawTriangle, max_harmonics, phase, approximate)
            }
            Waveform::Pulse => self.pulse(max_harmonics, phase, duty as f64, approximate),
        };
        value as f32
    }

    /// Two saws half a duty cycle apart, with the DC offset removed.
    fn pulse(&self, max_harmonics: u32, phase: f64, duty: f64, approximate: bool) -> f64 {
        if max_harmonics == 0 {
            return 0.0;
        }
        let duty = if duty.is_finite() { duty.clamp(0.0, 1.0) } else { 0.5 };
        let leading = self.evaluate_family(TableFamily::Saw, max_harmonics, phase, approximate);
        let trailing =
            self.evaluate_family(TableFamily::Saw, max_harmonics, phase + duty, approximate);
        leading - trailing - 2.0 * (0.5 - duty)
    }

    fn evaluate_family(
        &self,
        family: TableFamily,
        max_harmonics: u32,
        phase: f64,
        approximate: bool,
    ) -> f64 {
        let harmonics = max_harmonics.min(self.capacity());
        if harmonics == 0 {
            return 0.0;
        }

        let increment = self.layout.increment;
        let pos = if approximate {
            harmonics / increment
        } else {
            (harmonics as f64 / increment as f64).round() as u32
        };
        let pos = pos.clamp(1, self.layout.tiers as u32);
        let nearest = pos * increment;

        let set = self.tier_set(family);
        let (index, frac) = self.sine.split(phase);
        let mut value = set.tiers[pos as usize - 1].interpolate(index, frac);

        if !approximate {
            let sine = self.sine();
            if harmonics > nearest {
                value += set.series.partial_sum(&sine, nearest + 1, harmonics, phase);
            } else if harmonics < nearest {
                value -= set.series.partial_sum(&sine, harmonics + 1, nearest, phase);
            }
        }
        value
    }
}

impl Drop for TableCache {
    fn drop(&mut self) {
        debug!(
            "releasing wavetables ({} tiers per family)",
            self.layout.tiers
        );
    }
}
