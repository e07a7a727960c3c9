//! WAV header parsing and PCM/float sample decoding.
//!
//! `recspec-wav` never decodes compressed audio itself; for non-WAV
//! containers the host supplies a decoded [`recspec_types::AudioBuffer`]
//! via [`recspec_types::AudioDecoder`] and this crate is not involved.

mod header;
mod samples;

#[doc(hidden)]
pub mod testutil;

pub use header::parse_wav_header;
pub use samples::extract_wav_samples;
