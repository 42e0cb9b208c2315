//! Band-limited additive oscillators over the shared harmonic wavetables.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MAX_HARMONICS, DEFAULT_SAMPLE_RATE, OscillatorConfig};
use crate::error::BandlimitedError;

use super::phase::PhaseAccumulator;
use super::wavetable::TableCache;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    #[serde(rename = "saw")]
    Saw,
    #[serde(rename = "rsaw")]
    ReverseSaw,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "triangle")]
    Triangle,
    #[serde(rename = "sawtri")]
    SawTriangle,
    #[serde(rename = "pulse")]
    Pulse,
}

impl Waveform {
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Saw => "saw",
            Waveform::ReverseSaw => "rsaw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::SawTriangle => "sawtri",
            Waveform::Pulse => "pulse",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = BandlimitedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "rsaw" | "reverse-saw" => Ok(Waveform::ReverseSaw),
            "square" => Ok(Waveform::Square),
            "triangle" => Ok(Waveform::Triangle),
            "sawtri" | "saw-triangle" => Ok(Waveform::SawTriangle),
            "pulse" => Ok(Waveform::Pulse),
            other => Err(BandlimitedError::UnknownWaveform {
                name: other.to_string(),
            }),
        }
    }
}

/// A single oscillator instance.
///
/// Owns its phase and settings; the wavetables are shared with every other
/// instance and kept alive by the `Arc`.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    cache: Arc<TableCache>,
    phase: PhaseAccumulator,
    sample_rate: f32,
    /// 0 follows the Nyquist limit.
    cutoff: f32,
    max_harmonics: u32,
    approximate: bool,
}

impl Oscillator {
    /// Create an oscillator on the shared default tables.
    ///
    /// Recoverable problems in `config` (unknown waveform, out-of-range
    /// values) are logged and returned alongside a working oscillator.
    /// Only a failure to build the tables is an error.
    pub fn new(
        config: &OscillatorConfig,
    ) -> Result<(Oscillator, Vec<BandlimitedError>), BandlimitedError> {
        let cache = TableCache::shared()?;
        Ok(Oscillator::with_cache(cache, config))
    }

    /// Create an oscillator on an explicit set of tables.
    pub fn with_cache(
        cache: Arc<TableCache>,
        config: &OscillatorConfig,
    ) -> (Oscillator, Vec<BandlimitedError>) {
        let mut diagnostics = Vec::new();

        let waveform = match config.waveform.parse::<Waveform>() {
            Ok(waveform) => waveform,
            Err(e) => {
                warn!("{e}, using saw");
                diagnostics.push(e);
                Waveform::Saw
            }
        };

        let sample_rate = if config.sample_rate > 0.0 {
            config.sample_rate
        } else {
            let e = BandlimitedError::Config(format!(
                "sample rate {} must be positive",
                config.sample_rate
            ));
            warn!("{e}, using {DEFAULT_SAMPLE_RATE}");
            diagnostics.push(e);
            DEFAULT_SAMPLE_RATE
        };

        let mut osc = Oscillator {
            waveform,
            cache,
            phase: PhaseAccumulator::default(),
            sample_rate,
            cutoff: 0.0,
            max_harmonics: DEFAULT_MAX_HARMONICS,
            approximate: config.approximate,
        };

        osc.set_max_harmonics(config.max_harmonics.map_or(0, i64::from));
        if let Some(cutoff) = config.cutoff {
            if let Err(e) = osc.set_cutoff(cutoff) {
                diagnostics.push(e);
            }
        }

        (osc, diagnostics)
    }

    // ── Controls ────────────────────────────────────────────

    /// Select a waveform by name. Unknown names leave the waveform unchanged.
    pub fn set_waveform(&mut self, name: &str) -> Result<(), BandlimitedError> {
        match name.parse::<Waveform>() {
            Ok(waveform) => {
                self.waveform = waveform;
                Ok(())
            }
            Err(e) => {
                warn!("{e}, leaving {} as is", self.waveform);
                Err(e)
            }
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set the cutoff in Hz.
    ///
    /// Values above the Nyquist limit are rejected and the previous cutoff
    /// is kept. Values at or below zero follow the Nyquist limit.
    pub fn set_cutoff(&mut self, cutoff: f32) -> Result<(), BandlimitedError> {
        let nyquist = self.nyquist();
        if cutoff.is_nan() || cutoff > nyquist {
            let e = BandlimitedError::CutoffAboveNyquist { cutoff, nyquist };
            warn!("{e}");
            return Err(e);
        }
        self.cutoff = cutoff.max(0.0);
        Ok(())
    }

    /// The cutoff actually used when rendering at the current sample rate.
    pub fn effective_cutoff(&self) -> f32 {
        let ceiling = self.nyquist() - 1.0;
        if self.cutoff <= 0.0 {
            ceiling
        } else {
            self.cutoff.min(ceiling)
        }
    }

    pub fn max_harmonics(&self) -> u32 {
        self.max_harmonics
    }

    /// Set the harmonic ceiling and return the value applied.
    ///
    /// Values below 1 restore `DEFAULT_MAX_HARMONICS`. Anything above what
    /// the tables hold is clamped to their capacity.
    pub fn set_max_harmonics(&mut self, max_harmonics: i64) -> u32 {
        let requested = if max_harmonics < 1 {
            DEFAULT_MAX_HARMONICS
        } else {
            u32::try_from(max_harmonics).unwrap_or(u32::MAX)
        };
        let capacity = self.cache.capacity();
        if requested > capacity {
            warn!("{requested} harmonics exceeds table capacity, clamping to {capacity}");
        }
        self.max_harmonics = requested.min(capacity);
        self.max_harmonics
    }

    pub fn approximate(&self) -> bool {
        self.approximate
    }

    pub fn set_approximate(&mut self, approximate: bool) {
        debug!(
            "{} oscillator switching to {} mode",
            self.waveform,
            if approximate { "approximate" } else { "exact" }
        );
        self.approximate = approximate;
    }

    pub fn phase(&self) -> f64 {
        self.phase.phase()
    }

    /// Jump to `phase` (in cycles, wrapped into `[0, 1)`). A non-finite
    /// phase resets to 0.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase.set(phase);
    }

    /// Reset oscillator phase.
    pub fn reset(&mut self) {
        self.phase.set(0.0);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    // ── Rendering ───────────────────────────────────────────

    /// Harmonics allowed for one sample at `frequency`.
    ///
    /// Zero for non-positive or non-finite frequencies and for frequencies
    /// above the cutoff.
    pub fn harmonic_budget(&self, frequency: f32) -> u32 {
        budget(self.effective_cutoff(), frequency, self.max_harmonics)
    }

    /// Render `out.len()` samples, advancing the phase by exactly that many steps.
    ///
    /// `frequency` and `duty` carry one value per output sample. A
    /// non-positive or non-finite frequency renders silence and holds the phase.
    pub fn render(
        &mut self,
        frequency: &[f32],
        duty: &[f32],
        sample_rate: f32,
        out: &mut [f32],
    ) -> Result<(), BandlimitedError> {
        if frequency.len() != out.len() || duty.len() != out.len() {
            return Err(BandlimitedError::LengthMismatch {
                frequency: frequency.len(),
                duty: duty.len(),
                output: out.len(),
            });
        }
        if !(sample_rate > 0.0) {
            return Err(BandlimitedError::Config(format!(
                "sample rate {sample_rate} must be positive"
            )));
        }
        self.sample_rate = sample_rate;

        let interval = 1.0 / sample_rate;
        let cutoff = self.effective_cutoff();
        for ((sample, &freq), &duty) in out.iter_mut().zip(frequency).zip(duty) {
            if !audible(freq) {
                *sample = 0.0;
                continue;
            }
            let harmonics = budget(cutoff, freq, self.max_harmonics);
            let phase = self.phase.step(freq, interval);
            *sample = self
                .cache
                .evaluate(self.waveform, harmonics, phase, duty, self.approximate);
        }
        Ok(())
    }

    /// Like `render`, allocating the output buffer.
    pub fn render_block(
        &mut self,
        frequency: &[f32],
        duty: &[f32],
        sample_rate: f32,
    ) -> Result<Vec<f32>, BandlimitedError> {
        let mut out = vec![0.0; frequency.len()];
        self.render(frequency, duty, sample_rate, &mut out)?;
        Ok(out)
    }

    /// Generate one sample at the current sample rate.
    pub fn next_sample(&mut self, frequency: f32, duty: f32) -> f32 {
        if !audible(frequency) {
            return 0.0;
        }
        let harmonics = self.harmonic_budget(frequency);
        let phase = self.phase.step(frequency, 1.0 / self.sample_rate);
        self.cache
            .evaluate(self.waveform, harmonics, phase, duty, self.approximate)
    }
}

/// Frequencies that advance the phase; anything else renders silence.
#[inline]
fn audible(frequency: f32) -> bool {
    frequency > 0.0 && frequency.is_finite()
}

#[inline]
fn budget(cutoff: f32, frequency: f32, max_harmonics: u32) -> u32 {
    if !audible(frequency) {
        return 0;
    }
    // Saturating float-to-int cast
    let allowed = (cutoff as f64 / frequency as f64).floor() as u32;
    allowed.min(max_harmonics)
}
