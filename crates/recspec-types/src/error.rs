use thiserror::Error;

/// The pass that raised an error or was cancelled mid-flight.
///
/// Mirrors the sub-ranges the progress sink rescales into (see
/// [`crate::interfaces::ProgressSink`]): every named pass is individually
/// addressable so a cancellation or failure can be attributed precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisStage {
    PeakLevels,
    NoiseFloor,
    Normalization,
    Clipping,
    Reverb,
    Silence,
    Stereo,
    Bleed,
    Conversational,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisStage::PeakLevels => "peak-levels",
            AnalysisStage::NoiseFloor => "noise-floor",
            AnalysisStage::Normalization => "normalization",
            AnalysisStage::Clipping => "clipping",
            AnalysisStage::Reverb => "reverb",
            AnalysisStage::Silence => "silence",
            AnalysisStage::Stereo => "stereo",
            AnalysisStage::Bleed => "bleed",
            AnalysisStage::Conversational => "conversational",
        };
        f.write_str(s)
    }
}

/// Error kinds raised anywhere in the recspec pipeline.
///
/// Names track the "error kinds (not type names)" list in the governing
/// specification's error handling section; each variant keeps just enough
/// payload to compose the messages that section requires.
#[derive(Debug, Error)]
pub enum RecspecError {
    #[error("not a WAV file")]
    NotAWavFile,

    #[error("missing 'fmt ' chunk")]
    MissingFmtChunk,

    #[error("truncated input: expected at least {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    #[error("unsupported bit depth: {bits}")]
    UnsupportedBitDepth { bits: u16 },

    #[error("decode failed: {message}")]
    DecodeFailed { message: String },

    #[error("analysis cancelled during {stage}")]
    AnalysisCancelled { stage: AnalysisStage },

    #[error("invalid preset: {message}")]
    InvalidPreset { message: String },

    #[error("preset requires configuration: {message}")]
    PresetRequiresConfiguration { message: String },

    #[error("catalogue miss: {reason}")]
    CatalogueMiss { reason: String },

    #[error("internal invariant violated: {message}")]
    InternalInvariant { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecspecResult<T> = Result<T, RecspecError>;
