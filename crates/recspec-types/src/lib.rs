//! Shared data model and host-collaborator contracts for recspec.
//!
//! This crate has no analysis logic of its own. It defines the value types
//! every other `recspec-*` crate exchanges (`AudioBuffer`, `WavFormat`,
//! `Report` and its nested findings), the error kinds raised anywhere in the
//! pipeline, and the trait contracts a host implements to plug in file
//! access, compressed-format decoding, and progress/cancellation.

mod audio;
mod error;
mod findings;
mod interfaces;
mod preset;
mod properties;
mod report;
mod validation;

pub use audio::{AudioBuffer, AudioFormatTag, WavFormat};
pub use error::{AnalysisStage, RecspecError, RecspecResult};
pub use findings::{
    ClippingFindings, ConsistencyFindings, ConversationalFindings, LevelFindings,
    MicBleedFindings, NormalizationFindings, NormalizationStatus, OverlapFindings,
    OverlapSegment, ReverbFindings, ReverbLabel, SilenceFindings, StereoFindings, StereoType,
    SyncFindings,
};
pub use interfaces::{AnalysisMode, AudioDecoder, CancellationToken, InputSource, ProgressSink};
pub use preset::{FilenameRule, Preset};
pub use properties::{BitDepth, FileProperties};
pub use report::{OverallVerdict, Report};
pub use validation::{RuleStatus, ValidationResult};
