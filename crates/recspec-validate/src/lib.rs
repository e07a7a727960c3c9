//! Criteria validator, filename validator, preset registry, and language
//! catalogue for recspec.
//!
//! This crate has no audio decoding or DSP of its own; it consumes the
//! [`recspec_types::FileProperties`] and findings `recspec-dsp` produces and
//! reduces them to [`recspec_types::ValidationResult`]s per the rules a
//! [`Preset`] names.

mod catalogue;
mod criteria;
mod filename;
mod presets;

pub use catalogue::{Catalogue, Language};
pub use criteria::{evaluate, FilenameContext};
pub use filename::{validate_bilingual_pattern, validate_script_match, BilingualResult, ScriptMatchConfig};
pub use presets::{PresetRegistry, PRESET_IDS};

pub use recspec_types::{FilenameRule, Preset};
