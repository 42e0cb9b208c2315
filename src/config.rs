//! Oscillator configuration and wavetable layout.
//!
//! `OscillatorConfig` maps directly to the JSON object a host passes when
//! creating an oscillator. `TableLayout` fixes the shape of the shared
//! harmonic tables and is normally left at its defaults.

use serde::{Deserialize, Serialize};

use crate::error::BandlimitedError;

/// Default harmonic ceiling: about a 24 Hz fundamental at 44.1 kHz.
pub const DEFAULT_MAX_HARMONICS: u32 = 734;

pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Samples per table cycle.
///
/// Linear interpolation error grows with the square of harmonics per
/// sample; at 734 harmonics this size keeps every family within 1e-3 of
/// the direct sum.
pub const TABSIZE: usize = 32768;

/// Harmonics added by each successive tier.
pub const INCREMENT: u32 = 16;

/// Number of tiers per waveform family; covers `DEFAULT_MAX_HARMONICS`.
pub const HAMSIZE: usize = DEFAULT_MAX_HARMONICS.div_ceil(INCREMENT) as usize;

/// Samples appended past the end of every table, copied from its start.
pub const GUARD: usize = 2;

// ── Table Layout ────────────────────────────────────────────

/// Shape of a tier set: resolution, tier width in harmonics, and tier count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub table_size: usize,
    pub increment: u32,
    pub tiers: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        TableLayout {
            table_size: TABSIZE,
            increment: INCREMENT,
            tiers: HAMSIZE,
        }
    }
}

impl TableLayout {
    /// Highest harmonic the tiers can represent without a runtime sum past the top tier.
    ///
    /// Saturates for layouts that `validate` would reject.
    pub fn capacity(&self) -> u32 {
        self.checked_capacity().unwrap_or(u32::MAX)
    }

    fn checked_capacity(&self) -> Option<u32> {
        u32::try_from(self.tiers)
            .ok()
            .and_then(|tiers| self.increment.checked_mul(tiers))
    }

    pub fn validate(&self) -> Result<(), BandlimitedError> {
        if self.table_size < 8 || !self.table_size.is_power_of_two() {
            return Err(BandlimitedError::InvalidLayout {
                reason: format!(
                    "table size {} must be a power of two of at least 8",
                    self.table_size
                ),
            });
        }
        if self.increment == 0 {
            return Err(BandlimitedError::InvalidLayout {
                reason: "increment must be at least 1".to_string(),
            });
        }
        if self.tiers == 0 {
            return Err(BandlimitedError::InvalidLayout {
                reason: "at least one tier is required".to_string(),
            });
        }
        if self.checked_capacity().is_none() {
            return Err(BandlimitedError::InvalidLayout {
                reason: format!(
                    "{} tiers of {} harmonics overflows the harmonic count",
                    self.tiers, self.increment
                ),
            });
        }
        Ok(())
    }
}

// ── Oscillator Config ───────────────────────────────────────

/// Construction arguments for an oscillator.
///
/// The waveform stays a plain string so that an unknown name can degrade to
/// a saw wave instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OscillatorConfig {
    #[serde(default = "default_waveform")]
    pub waveform: String,
    /// Frequency used by the offline renderer.
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Harmonic ceiling; `None` uses `DEFAULT_MAX_HARMONICS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_harmonics: Option<u32>,
    /// Cutoff in Hz; `None` or `0` follows the Nyquist limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f32>,
    /// Skip the runtime correction sum and use the nearest lower tier.
    #[serde(default)]
    pub approximate: bool,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,
}

fn default_waveform() -> String {
    "saw".to_string()
}

fn default_frequency() -> f32 {
    440.0
}

fn default_sample_rate() -> f32 {
    DEFAULT_SAMPLE_RATE
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        OscillatorConfig {
            waveform: default_waveform(),
            frequency: default_frequency(),
            max_harmonics: None,
            cutoff: None,
            approximate: false,
            sample_rate: default_sample_rate(),
        }
    }
}

impl OscillatorConfig {
    pub fn new(waveform: &str) -> Self {
        OscillatorConfig {
            waveform: waveform.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BandlimitedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, BandlimitedError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_covers_default_max() {
        let layout = TableLayout::default();
        assert!(layout.capacity() >= DEFAULT_MAX_HARMONICS);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_table() {
        let layout = TableLayout {
            table_size: 1000,
            ..Default::default()
        };
        assert!(matches!(
            layout.validate(),
            Err(BandlimitedError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_capacity() {
        let layout = TableLayout {
            table_size: 8,
            increment: u32::MAX / 2,
            tiers: 3,
        };
        assert!(matches!(
            layout.validate(),
            Err(BandlimitedError::InvalidLayout { .. })
        ));
        assert_eq!(layout.capacity(), u32::MAX);

        let layout = TableLayout {
            tiers: usize::MAX,
            ..Default::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn json_fills_defaults() {
        let config = OscillatorConfig::from_json(r#"{ "waveform": "square" }"#).unwrap();
        assert_eq!(config.waveform, "square");
        assert_eq!(config.frequency, 440.0);
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.max_harmonics, None);
        assert!(!config.approximate);
    }

    #[test]
    fn json_uses_camel_case() {
        let config = OscillatorConfig::from_json(
            r#"{ "waveform": "pulse", "maxHarmonics": 64, "cutoff": 8000, "approximate": true }"#,
        )
        .unwrap();
        assert_eq!(config.max_harmonics, Some(64));
        assert_eq!(config.cutoff, Some(8000.0));
        assert!(config.approximate);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"maxHarmonics\":64"), "got {json}");
    }

    #[test]
    fn non_numeric_frequency_is_config_error() {
        let err = OscillatorConfig::from_json(r#"{ "frequency": "loud" }"#).unwrap_err();
        assert!(matches!(err, BandlimitedError::Config(_)), "got {err:?}");
    }
}
