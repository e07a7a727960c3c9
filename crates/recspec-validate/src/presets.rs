//! Fixed registry of named presets: a `Vec<Preset>` built once in Rust
//! and looked up by id, rather than loaded from a file. Every preset here
//! except `custom` is immutable.

use recspec_types::{FilenameRule, Preset};

/// The nine recognized preset ids.
pub const PRESET_IDS: &[&str] = &[
    "auditions-character-recordings",
    "auditions-emotional-voice",
    "character-recordings",
    "p2b2-pairs-mono",
    "p2b2-pairs-stereo",
    "p2b2-pairs-mixed",
    "three-hour",
    "bilingual-conversational",
    "custom",
];

/// Read-only, shareable collection of the recognized presets.
///
/// Every preset but `custom` is built here with fixed criteria; `custom`
/// is returned empty (no criteria at all), to be filled in by the host via
/// [`crate::PresetBuilder`].
pub struct PresetRegistry {
    presets: Vec<Preset>,
}

impl PresetRegistry {
    pub fn default_presets() -> Self {
        Self {
            presets: vec![
                auditions_character_recordings(),
                auditions_emotional_voice(),
                character_recordings(),
                p2b2_pairs_mono(),
                p2b2_pairs_stereo(),
                p2b2_pairs_mixed(),
                three_hour(),
                bilingual_conversational(),
                Preset::new("custom"),
            ],
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.id.as_str())
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::default_presets()
    }
}

fn auditions_character_recordings() -> Preset {
    Preset::new("auditions-character-recordings")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([1])
        .with_min_duration_s(1.0)
}

fn auditions_emotional_voice() -> Preset {
    Preset::new("auditions-emotional-voice")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([1])
        .with_min_duration_s(1.0)
}

fn character_recordings() -> Preset {
    Preset::new("character-recordings")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000, 96_000])
        .with_bit_depth([16, 24])
        .with_channels([1])
        .with_min_duration_s(0.5)
}

fn p2b2_pairs_mono() -> Preset {
    Preset::new("p2b2-pairs-mono")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([1])
        .with_min_duration_s(1.0)
}

fn p2b2_pairs_stereo() -> Preset {
    Preset::new("p2b2-pairs-stereo")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([2])
        .with_min_duration_s(1.0)
}

fn p2b2_pairs_mixed() -> Preset {
    Preset::new("p2b2-pairs-mixed")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([1, 2])
        .with_min_duration_s(1.0)
}

fn three_hour() -> Preset {
    Preset::new("three-hour")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([1, 2])
        .with_min_duration_s(3.0 * 3600.0)
        .with_filename_rule(FilenameRule::ScriptMatch)
}

fn bilingual_conversational() -> Preset {
    Preset::new("bilingual-conversational")
        .with_file_type(["WAV"])
        .with_sample_rate([44_100, 48_000])
        .with_bit_depth([16, 24])
        .with_channels([2])
        .with_min_duration_s(1.0)
        .with_stereo_type(["Conversational Stereo"])
        .with_overlap_thresholds(10.0, 25.0)
        .with_overlap_segment_thresholds(2.0, 5.0)
        .with_filename_rule(FilenameRule::BilingualPattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_id_is_registered() {
        let registry = PresetRegistry::default_presets();
        for id in PRESET_IDS {
            assert!(registry.lookup(id).is_some(), "missing preset {id}");
        }
    }

    #[test]
    fn custom_preset_starts_empty() {
        let registry = PresetRegistry::default_presets();
        let custom = registry.lookup("custom").unwrap();
        assert!(custom.file_type.is_none());
        assert!(custom.sample_rate.is_none());
    }
}
