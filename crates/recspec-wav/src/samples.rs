use recspec_types::{AudioBuffer, AudioFormatTag, RecspecError, RecspecResult};

use crate::header::parse_wav_header;

/// Converts one interleaved PCM/float frame set into `channel_count`
/// deinterleaved `f32` sequences in `[-1.0, +1.0]`.
///
/// Bit-depth conversions: 8-bit unsigned `(x-128)/128`, 16/24/32-bit
/// signed `x / 2^(bits-1)`, 24-bit read as a 3-byte little-endian signed
/// integer, IEEE-float read as raw `f32`.
fn deinterleave(
    data: &[u8],
    channel_count: u16,
    bits_per_sample: u16,
    is_float: bool,
) -> RecspecResult<Vec<Vec<f32>>> {
    let channel_count = channel_count as usize;
    let bytes_per_sample = (bits_per_sample / 8) as usize;
    let frame_size = bytes_per_sample * channel_count;
    if frame_size == 0 {
        return Err(RecspecError::UnsupportedBitDepth {
            bits: bits_per_sample,
        });
    }
    let frame_count = data.len() / frame_size;

    let mut channels: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();

    for frame in data.chunks_exact(frame_size) {
        for (ch, sample_bytes) in frame.chunks_exact(bytes_per_sample).enumerate() {
            let value = if is_float {
                if bits_per_sample != 32 {
                    return Err(RecspecError::UnsupportedBitDepth {
                        bits: bits_per_sample,
                    });
                }
                f32::from_le_bytes(sample_bytes.try_into().unwrap())
            } else {
                match bits_per_sample {
                    8 => (sample_bytes[0] as f32 - 128.0) / 128.0,
                    16 => {
                        let v = i16::from_le_bytes(sample_bytes.try_into().unwrap());
                        v as f32 / 32_768.0
                    }
                    24 => {
                        let raw = [sample_bytes[0], sample_bytes[1], sample_bytes[2], 0];
                        let mut v = i32::from_le_bytes(raw);
                        if v & 0x0080_0000 != 0 {
                            v |= -0x0100_0000i32; // sign-extend the top byte
                        }
                        v as f32 / 8_388_608.0
                    }
                    32 => {
                        let v = i32::from_le_bytes(sample_bytes.try_into().unwrap());
                        v as f32 / 2_147_483_648.0
                    }
                    other => {
                        return Err(RecspecError::UnsupportedBitDepth { bits: other });
                    }
                }
            };
            channels[ch].push(value);
        }
    }

    Ok(channels)
}

/// Parses the header and deinterleaves `data` bytes into an [`AudioBuffer`].
///
/// `bytes` must be the full file contents (`read_all`), not just the
/// header prefix, since the data chunk is read in full here.
pub fn extract_wav_samples(bytes: &[u8]) -> RecspecResult<AudioBuffer> {
    let format = parse_wav_header(bytes)?;
    let start = format.data_byte_offset;
    let end = (start + format.data_byte_length).min(bytes.len());
    let data = &bytes[start..end];

    let is_float = matches!(format.audio_format_tag, AudioFormatTag::IeeeFloat);
    let channels = deinterleave(data, format.channel_count, format.bits_per_sample, is_float)?;
    AudioBuffer::new(format.sample_rate_hz, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{write_float_wav, write_pcm_wav};
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_16bit_stereo() {
        let left = vec![0.5f32, -0.5, 0.25];
        let right = vec![-0.25f32, 0.75, -1.0];
        let bytes = write_pcm_wav(44_100, 16, &[left.clone(), right.clone()]);
        let buffer = extract_wav_samples(&bytes).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.sample_rate_hz(), 44_100);
        for (a, b) in buffer.channel(0).iter().zip(left.iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
        for (a, b) in buffer.channel(1).iter().zip(right.iter()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn eight_bit_unsigned_midpoint_is_silence() {
        let bytes = write_pcm_wav(8_000, 8, &[vec![0.0; 4]]);
        let buffer = extract_wav_samples(&bytes).unwrap();
        for s in buffer.channel(0) {
            assert!(s.abs() < 0.02);
        }
    }

    #[test]
    fn ieee_float_round_trips_exactly() {
        let samples = vec![0.123_456f32, -0.987_654, 1.0, -1.0];
        let bytes = write_float_wav(48_000, &[samples.clone()]);
        let buffer = extract_wav_samples(&bytes).unwrap();
        assert_eq!(buffer.channel(0), samples.as_slice());
    }

    #[test]
    fn rejects_unsupported_bit_depth() {
        let mut bytes = write_pcm_wav(8_000, 16, &[vec![0.0; 4]]);
        // Corrupt the bits_per_sample field inside the fmt chunk (offset
        // 34 in a canonical 44-byte PCM header).
        bytes[34] = 12;
        bytes[35] = 0;
        let err = extract_wav_samples(&bytes).unwrap_err();
        assert!(matches!(err, RecspecError::UnsupportedBitDepth { bits: 12 }));
    }
}
