use serde::{Deserialize, Serialize};

/// Semantic, host-facing file properties.
///
/// Each numeric field is `Unknown` rather than absent when the parser could
/// not recover it (e.g. no `"data"` chunk found), so validation can still
/// run its `warning`-on-`Unknown` rules instead of skipping them outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProperties {
    pub file_type: String,
    pub sample_rate_hz: Option<u32>,
    pub bit_depth: BitDepth,
    pub channel_count: Option<u16>,
    pub duration_s: Option<f64>,
    pub file_size_bytes: u64,
}

/// A file's bit depth: a known integer width, unrecoverable, or inherently
/// variable because the format is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    Known(u16),
    Unknown,
    Compressed,
}
