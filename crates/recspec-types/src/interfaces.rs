use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::AudioBuffer;
use crate::error::RecspecResult;

/// A host-provided handle to file bytes.
///
/// `read_header` recovers just enough bytes to parse a WAV header
/// (typically the first 100 KiB); `read_all` is used when a pass needs the
/// full sample data. Implementations propagate their own I/O errors
/// verbatim through [`crate::RecspecError::Io`].
pub trait InputSource: Send + Sync {
    fn read_header(&self, max_bytes: usize) -> RecspecResult<Vec<u8>>;
    fn read_all(&self) -> RecspecResult<Vec<u8>>;
}

/// A host-provided decoder for non-WAV containers.
///
/// Treated as a black box: the core never inspects compressed bytes
/// itself, only the `AudioBuffer` the host hands back. The decoder must
/// return all channels at equal length and at the file's native sample
/// rate (the same invariant [`AudioBuffer::new`] enforces).
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> RecspecResult<AudioBuffer>;
}

/// Edge-triggered, level-held cancellation flag.
///
/// Cheaply cloneable; cloning shares the same underlying flag so every
/// worker observing a `cancel()` call sees it within one poll interval.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag. Once set it never clears — cancellation is one-shot
    /// per token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A capability a pass calls to report fractional progress.
///
/// The `index` parameter identifies which input in a batch the progress
/// belongs to — for a single-file run it is always `0`. Implementations
/// must be safe to call concurrently from any worker; those that need
/// single-threaded callbacks marshal internally.
pub trait ProgressSink: Send + Sync {
    fn report(&self, index: usize, message: &str, progress: f32);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, &str, f32) + Send + Sync,
{
    fn report(&self, index: usize, message: &str, progress: f32) {
        self(index, message, progress)
    }
}

/// A no-op sink for callers that don't want progress reporting.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&self, _index: usize, _message: &str, _progress: f32) {}
}

/// Whether the reverb, silence, stereo, and bleed passes run at all; the
/// level pass always runs regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    Standard,
    #[default]
    Experimental,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_shared_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
