/// Filename rule selector carried by a [`Preset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameRule {
    None,
    ScriptMatch,
    BilingualPattern,
}

/// A named, recognized recording specification.
///
/// All fields beyond `id` are optional criteria: an absent field means
/// validation skips the corresponding rule entirely, as opposed to an
/// empty allowed-list, which means every observed value fails.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    pub id: String,
    pub file_type: Option<Vec<String>>,
    pub sample_rate: Option<Vec<u32>>,
    pub bit_depth: Option<Vec<u16>>,
    pub channels: Option<Vec<u16>>,
    pub min_duration_s: Option<f32>,
    pub stereo_type: Option<Vec<String>>,
    pub max_overlap_warning_pct: Option<f32>,
    pub max_overlap_fail_pct: Option<f32>,
    pub max_overlap_segment_warning_s: Option<f32>,
    pub max_overlap_segment_fail_s: Option<f32>,
    pub filename_rule: Option<FilenameRule>,
    pub platform_restriction: Option<String>,
    /// When set, skips the sample_rate/bit_depth/channels audio rules
    /// entirely rather than evaluating them against absent criteria.
    pub skip_audio_validation: bool,
}

impl Preset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_file_type(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.file_type = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sample_rate(mut self, rates: impl IntoIterator<Item = u32>) -> Self {
        self.sample_rate = Some(rates.into_iter().collect());
        self
    }

    pub fn with_bit_depth(mut self, depths: impl IntoIterator<Item = u16>) -> Self {
        self.bit_depth = Some(depths.into_iter().collect());
        self
    }

    pub fn with_channels(mut self, channels: impl IntoIterator<Item = u16>) -> Self {
        self.channels = Some(channels.into_iter().collect());
        self
    }

    pub fn with_min_duration_s(mut self, min_duration_s: f32) -> Self {
        self.min_duration_s = Some(min_duration_s);
        self
    }

    pub fn with_stereo_type(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stereo_type = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_overlap_thresholds(
        mut self,
        warning_pct: f32,
        fail_pct: f32,
    ) -> Self {
        self.max_overlap_warning_pct = Some(warning_pct);
        self.max_overlap_fail_pct = Some(fail_pct);
        self
    }

    pub fn with_overlap_segment_thresholds(
        mut self,
        warning_s: f32,
        fail_s: f32,
    ) -> Self {
        self.max_overlap_segment_warning_s = Some(warning_s);
        self.max_overlap_segment_fail_s = Some(fail_s);
        self
    }

    pub fn with_filename_rule(mut self, rule: FilenameRule) -> Self {
        self.filename_rule = Some(rule);
        self
    }

    pub fn with_platform_restriction(mut self, platform: impl Into<String>) -> Self {
        self.platform_restriction = Some(platform.into());
        self
    }

    pub fn with_skip_audio_validation(mut self, skip: bool) -> Self {
        self.skip_audio_validation = skip;
        self
    }
}
