//! Filename validation: two independent rule sets selected by a preset's
//! [`recspec_types::FilenameRule`].

mod bilingual;
mod script_match;

pub use bilingual::{validate_bilingual_pattern, BilingualResult};
pub use script_match::{validate_script_match, ScriptMatchConfig};
