//! DSP core: band-limited additive synthesis.
//!
//! Leaves first: `sine` evaluates sin(2πx), `harmonics` sums harmonic
//! ranges, `wavetable` caches those sums as tiers, `phase` integrates
//! frequency, and `oscillator` ties them together per sample. `renderer`
//! drives an oscillator offline for WAV export.

pub mod harmonics;
pub mod oscillator;
pub mod phase;
pub mod renderer;
pub mod sine;
pub mod wavetable;
