use std::fmt;

#[derive(Debug)]
pub enum BandlimitedError {
    /// Waveform name that doesn't map to any `Waveform` variant.
    UnknownWaveform { name: String },
    /// Malformed configuration: bad JSON, a string where a number belongs, etc.
    Config(String),
    /// Cutoff control value above the Nyquist limit; the previous cutoff is kept.
    CutoffAboveNyquist { cutoff: f32, nyquist: f32 },
    /// A `TableLayout` that can't produce usable tables.
    InvalidLayout { reason: String },
    /// Render buffers of differing lengths.
    LengthMismatch {
        frequency: usize,
        duty: usize,
        output: usize,
    },
    /// The table index/fraction split didn't reproduce a known probe value.
    InterpolationCheck { expected: f64, found: f64 },
}

impl BandlimitedError {
    /// Diagnostics the instance recovers from on its own (fall back, keep the old value).
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            BandlimitedError::UnknownWaveform { .. }
                | BandlimitedError::Config(_)
                | BandlimitedError::CutoffAboveNyquist { .. }
        )
    }
}

impl fmt::Display for BandlimitedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandlimitedError::UnknownWaveform { name } => write!(f, "Unknown waveform '{name}'"),
            BandlimitedError::Config(msg) => write!(f, "Invalid configuration: {msg}"),
            BandlimitedError::CutoffAboveNyquist { cutoff, nyquist } => write!(
                f,
                "Cutoff {cutoff} Hz is above the Nyquist limit {nyquist} Hz, ignoring"
            ),
            BandlimitedError::InvalidLayout { reason } => write!(f, "Invalid table layout: {reason}"),
            BandlimitedError::LengthMismatch {
                frequency,
                duty,
                output,
            } => write!(
                f,
                "Buffer length mismatch: frequency={frequency}, duty={duty}, output={output}"
            ),
            BandlimitedError::InterpolationCheck { expected, found } => write!(
                f,
                "Table interpolation self-check failed: expected {expected}, found {found}"
            ),
        }
    }
}

impl std::error::Error for BandlimitedError {}

impl From<serde_json::Error> for BandlimitedError {
    fn from(e: serde_json::Error) -> Self {
        BandlimitedError::Config(e.to_string())
    }
}
