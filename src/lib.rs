pub mod config;
pub mod dsp;
pub mod error;

pub use crate::config::{OscillatorConfig, TableLayout};
pub use crate::dsp::oscillator::{Oscillator, Waveform};
pub use crate::dsp::wavetable::TableCache;
pub use crate::error::BandlimitedError;

use log::warn;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the bandlimited-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: route `log` output to the browser console and report panics there.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Trace
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
}

/// Read an `OscillatorConfig` from a JS object, falling back to defaults.
///
/// `undefined`/`null` means "all defaults". A malformed object is logged
/// and replaced by the defaults so audio keeps running.
fn config_from_js(config: JsValue) -> OscillatorConfig {
    if config.is_undefined() || config.is_null() {
        return OscillatorConfig::default();
    }
    match serde_wasm_bindgen::from_value(config) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", BandlimitedError::Config(e.to_string()));
            OscillatorConfig::default()
        }
    }
}

/// WASM-exposed: render `seconds` of a constant-frequency tone to mono f32 samples.
#[wasm_bindgen]
pub fn render_oscillator_samples(config: JsValue, seconds: f32) -> Result<Vec<f32>, JsValue> {
    let config = config_from_js(config);
    dsp::renderer::render_samples(&config, seconds).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render `seconds` of a constant-frequency tone to a WAV byte array.
#[wasm_bindgen]
pub fn render_oscillator_wav(config: JsValue, seconds: f32) -> Result<Vec<u8>, JsValue> {
    let config = config_from_js(config);
    dsp::renderer::render_wav(&config, seconds).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed oscillator for AudioWorklet playback.
///
/// Control calls never fail across the boundary: rejected values are
/// logged and the previous setting stays in effect.
#[wasm_bindgen]
pub struct WasmOscillator {
    inner: Oscillator,
}

#[wasm_bindgen]
impl WasmOscillator {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmOscillator, JsValue> {
        let config = config_from_js(config);
        let (inner, _diagnostics) =
            Oscillator::new(&config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(WasmOscillator { inner })
    }

    /// Render one block; `frequency` and `duty` must have the same length.
    pub fn render(
        &mut self,
        frequency: &[f32],
        duty: &[f32],
        sample_rate: f32,
    ) -> Result<Vec<f32>, JsValue> {
        self.inner
            .render_block(frequency, duty, sample_rate)
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn set_waveform(&mut self, name: &str) {
        let _ = self.inner.set_waveform(name);
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        let _ = self.inner.set_cutoff(cutoff);
    }

    pub fn set_max_harmonics(&mut self, max_harmonics: i32) -> u32 {
        self.inner.set_max_harmonics(max_harmonics as i64)
    }

    pub fn set_approximate(&mut self, approximate: bool) {
        self.inner.set_approximate(approximate);
    }

    pub fn set_phase(&mut self, phase: f64) {
        self.inner.set_phase(phase);
    }

    pub fn waveform(&self) -> String {
        self.inner.waveform.to_string()
    }
}
