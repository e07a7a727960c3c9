use crate::error::{RecspecError, RecspecResult};

/// The `wFormatTag` field of a WAV `"fmt "` chunk, resolved to a semantic
/// label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormatTag {
    Pcm,
    IeeeFloat,
    Compressed(u16),
}

impl AudioFormatTag {
    pub fn from_tag(tag: u16) -> Self {
        match tag {
            1 => AudioFormatTag::Pcm,
            3 => AudioFormatTag::IeeeFloat,
            other => AudioFormatTag::Compressed(other),
        }
    }

    /// The `file_type` label this tag contributes to `FileProperties`.
    pub fn label(&self) -> String {
        match self {
            AudioFormatTag::Pcm => "WAV (PCM)".to_string(),
            AudioFormatTag::IeeeFloat => "WAV (Float)".to_string(),
            AudioFormatTag::Compressed(tag) => format!("WAV (Compressed – Format {tag})"),
        }
    }
}

/// Format facts recovered from a WAV `"fmt "`/`"data"` chunk pair, without
/// decoding any samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavFormat {
    pub sample_rate_hz: u32,
    pub bits_per_sample: u16,
    pub channel_count: u16,
    pub audio_format_tag: AudioFormatTag,
    pub data_byte_offset: usize,
    pub data_byte_length: usize,
}

impl WavFormat {
    /// `duration_s = data_byte_length / (channel_count * bits_per_sample/8 * sample_rate_hz)`.
    ///
    /// Returns `None` when any divisor is zero (channel-less or rate-less
    /// malformed headers the parser otherwise tolerates).
    pub fn duration_s(&self) -> Option<f64> {
        let bytes_per_frame =
            self.channel_count as f64 * (self.bits_per_sample as f64 / 8.0);
        if bytes_per_frame <= 0.0 || self.sample_rate_hz == 0 {
            return None;
        }
        Some(self.data_byte_length as f64 / (bytes_per_frame * self.sample_rate_hz as f64))
    }
}

/// Decoded audio: `channel_count` equal-length sequences of `f32` samples,
/// normalized so valid PCM lies in `[-1.0, +1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate_hz: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Builds a buffer from per-channel sample vectors, enforcing the
    /// "all channels same length" and `1..=8` channel-count invariants.
    pub fn new(sample_rate_hz: u32, channels: Vec<Vec<f32>>) -> RecspecResult<Self> {
        if channels.is_empty() || channels.len() > 8 {
            return Err(RecspecError::InternalInvariant {
                message: format!(
                    "channel_count must be in 1..=8, got {}",
                    channels.len()
                ),
            });
        }
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(RecspecError::InternalInvariant {
                message: "all channels must have identical length".to_string(),
            });
        }
        Ok(Self {
            sample_rate_hz,
            channels,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn length_frames(&self) -> u64 {
        self.channels.first().map(|c| c.len() as u64).unwrap_or(0)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Mean-across-channels mono mix, used by passes (reverb, silence) that
    /// operate on a single combined signal rather than per-channel.
    pub fn mono_mix(&self) -> Vec<f32> {
        let len = self.length_frames() as usize;
        let n = self.channels.len() as f32;
        let mut out = vec![0.0f32; len];
        for channel in &self.channels {
            for (o, s) in out.iter_mut().zip(channel.iter()) {
                *o += s / n;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_channel_lengths() {
        let err = AudioBuffer::new(48_000, vec![vec![0.0; 10], vec![0.0; 5]]).unwrap_err();
        assert!(matches!(err, RecspecError::InternalInvariant { .. }));
    }

    #[test]
    fn mono_mix_averages_channels() {
        let buf = AudioBuffer::new(48_000, vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(buf.mono_mix(), vec![0.5, 0.5]);
    }

    #[test]
    fn format_tag_labels() {
        assert_eq!(AudioFormatTag::from_tag(1).label(), "WAV (PCM)");
        assert_eq!(AudioFormatTag::from_tag(3).label(), "WAV (Float)");
        assert_eq!(
            AudioFormatTag::from_tag(2).label(),
            "WAV (Compressed – Format 2)"
        );
    }
}
