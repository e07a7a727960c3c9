use serde::{Deserialize, Serialize};

/// Normalization verdict nested in [`LevelFindings`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStatus {
    Normalized,
    NotNormalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationFindings {
    pub status: NormalizationStatus,
    pub peak_db: f32,
    pub target_db: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClippingFindings {
    pub event_count: u32,
    pub clipped_pct: f32,
    pub near_clipping_pct: f32,
}

/// Peak/noise-floor/normalization/clipping findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFindings {
    /// `-∞` is represented as `f32::NEG_INFINITY`.
    pub peak_db: f32,
    pub noise_floor_db: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_floor_per_channel: Option<Vec<f32>>,
    pub normalization: NormalizationFindings,
    pub clipping: ClippingFindings,
}

/// RT60 band label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverbLabel {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbFindings {
    /// `NaN` when `label == Undetermined`.
    pub rt60_s: f32,
    pub label: ReverbLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceFindings {
    pub leading_s: f32,
    pub trailing_s: f32,
    pub longest_gap_s: f32,
    pub threshold_db: f32,
}

/// Stereo topology classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoType {
    MonoAsStereo,
    MonoInLeftChannel,
    MonoInRightChannel,
    MixedStereo,
    ConversationalStereo,
    Silent,
    Undetermined,
}

impl StereoType {
    /// The preset-facing label used by the `stereo_type` validation rule,
    /// e.g. `"Mono as Stereo"`.
    pub fn label(&self) -> &'static str {
        match self {
            StereoType::MonoAsStereo => "Mono as Stereo",
            StereoType::MonoInLeftChannel => "Mono in Left Channel",
            StereoType::MonoInRightChannel => "Mono in Right Channel",
            StereoType::MixedStereo => "Mixed Stereo",
            StereoType::ConversationalStereo => "Conversational Stereo",
            StereoType::Silent => "Silent",
            StereoType::Undetermined => "Undetermined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoFindings {
    pub stereo_type: StereoType,
    pub confidence: f32,
}

/// Dual-model mic-bleed result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicBleedFindings {
    pub left_bleed_db: f32,
    pub right_bleed_db: f32,
    pub confirmed_bleed_pct: f32,
    pub severity_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapSegment {
    pub start_s: f32,
    pub duration_s: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapFindings {
    pub overlap_pct: f32,
    pub segments: Vec<OverlapSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyFindings {
    pub consistency_pct: f32,
}

/// Channel-to-side time alignment, resolved to the zero-lag
/// cross-correlation already available from the stereo pass (see
/// DESIGN.md's Open Question on this shape).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncFindings {
    pub aligned: bool,
    pub lag_ms: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationalFindings {
    pub overlap: OverlapFindings,
    pub consistency: ConsistencyFindings,
    pub sync: SyncFindings,
}
