use recspec_types::{AudioFormatTag, RecspecError, RecspecResult, WavFormat};

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const FMT: &[u8; 4] = b"fmt ";
const DATA: &[u8; 4] = b"data";

/// Walks RIFF chunks starting at offset 12, returning the payload range
/// `(offset, size)` of the first chunk whose 4-byte id matches `want`.
///
/// Chunk ids are compared as raw bytes, never decoded as UTF-8 — vendor
/// padding chunks (`JUNK`, `PAD `) and anything else non-ASCII must not
/// panic the walk. `size` is padded up to even per the RIFF rule; if that
/// padding would run past the end of `bytes`, the walk stops silently
/// rather than erroring, since a malformed trailing chunk shouldn't block
/// reading the chunks that came before it.
fn find_chunk(bytes: &[u8], want: &[u8; 4]) -> Option<(usize, usize)> {
    let mut offset = 12usize;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().unwrap()) as usize;
        let payload_start = offset + 8;
        let payload_end = payload_start.saturating_add(size).min(bytes.len());

        if id == want {
            return Some((payload_start, payload_end - payload_start));
        }

        let padded_size = size + (size % 2);
        let next = payload_start.saturating_add(padded_size);
        if next <= offset {
            // zero-size, non-advancing chunk: avoid an infinite loop.
            break;
        }
        offset = next;
    }
    None
}

/// Parses a RIFF/WAVE header out of `bytes`.
///
/// `bytes` need only contain the header-bearing prefix of the file (the
/// host's `read_header(max_bytes)`, typically ~100 KiB); the `"data"`
/// chunk's declared size is trusted even if the payload itself was not
/// fully read, since header parsing never inspects sample bytes.
pub fn parse_wav_header(bytes: &[u8]) -> RecspecResult<WavFormat> {
    if bytes.len() < 12 {
        return Err(RecspecError::TruncatedInput {
            expected: 12,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != RIFF || &bytes[8..12] != WAVE {
        return Err(RecspecError::NotAWavFile);
    }

    let (fmt_offset, fmt_size) =
        find_chunk(bytes, FMT).ok_or(RecspecError::MissingFmtChunk)?;
    if fmt_size < 16 {
        return Err(RecspecError::TruncatedInput {
            expected: 16,
            actual: fmt_size,
        });
    }

    let format_tag = u16::from_le_bytes(bytes[fmt_offset..fmt_offset + 2].try_into().unwrap());
    let channel_count =
        u16::from_le_bytes(bytes[fmt_offset + 2..fmt_offset + 4].try_into().unwrap());
    let sample_rate_hz =
        u32::from_le_bytes(bytes[fmt_offset + 4..fmt_offset + 8].try_into().unwrap());
    let bits_per_sample =
        u16::from_le_bytes(bytes[fmt_offset + 14..fmt_offset + 16].try_into().unwrap());

    let (data_byte_offset, data_byte_length) = find_chunk(bytes, DATA).unwrap_or((0, 0));

    Ok(WavFormat {
        sample_rate_hz,
        bits_per_sample,
        channel_count,
        audio_format_tag: AudioFormatTag::from_tag(format_tag),
        data_byte_offset,
        data_byte_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_pcm_wav;

    #[test]
    fn parses_happy_path_stereo_16bit() {
        let samples = vec![vec![0.0f32; 48_000]; 2];
        let bytes = write_pcm_wav(48_000, 16, &samples);
        let format = parse_wav_header(&bytes).unwrap();
        assert_eq!(format.sample_rate_hz, 48_000);
        assert_eq!(format.bits_per_sample, 16);
        assert_eq!(format.channel_count, 2);
        assert!(matches!(format.audio_format_tag, AudioFormatTag::Pcm));
        assert_eq!(format.data_byte_length, 48_000 * 2 * 2);
    }

    #[test]
    fn rejects_missing_riff_header() {
        let err = parse_wav_header(b"not a wav file at all").unwrap_err();
        assert!(matches!(err, RecspecError::NotAWavFile));
    }

    #[test]
    fn rejects_too_short_input() {
        let err = parse_wav_header(b"RI").unwrap_err();
        assert!(matches!(err, RecspecError::TruncatedInput { .. }));
    }

    #[test]
    fn missing_fmt_chunk_is_reported() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(RIFF);
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(WAVE);
        // no "fmt " chunk at all.
        let err = parse_wav_header(&bytes).unwrap_err();
        assert!(matches!(err, RecspecError::MissingFmtChunk));
    }

    #[test]
    fn missing_data_chunk_yields_zero_length_not_an_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(RIFF);
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(WAVE);
        bytes.extend_from_slice(FMT);
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&44_100u32.to_le_bytes());
        bytes.extend_from_slice(&(44_100 * 2).to_le_bytes()); // byte rate
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        let format = parse_wav_header(&bytes).unwrap();
        assert_eq!(format.data_byte_length, 0);
        assert_eq!(format.duration_s(), Some(0.0));
    }

    #[test]
    fn compressed_format_tag_is_labeled_advisory() {
        let samples = vec![vec![0.0f32; 100]];
        let mut bytes = write_pcm_wav(8_000, 16, &samples);
        // Overwrite the format tag (first two bytes of the fmt payload) to
        // a non-PCM, non-float tag.
        let (fmt_offset, _) = find_chunk(&bytes, FMT).unwrap();
        bytes[fmt_offset..fmt_offset + 2].copy_from_slice(&2u16.to_le_bytes());
        let format = parse_wav_header(&bytes).unwrap();
        assert_eq!(format.audio_format_tag.label(), "WAV (Compressed – Format 2)");
    }

    #[test]
    fn skips_unrecognized_chunks_before_data() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(RIFF);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(WAVE);
        bytes.extend_from_slice(FMT);
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&8_000u32.to_le_bytes());
        bytes.extend_from_slice(&16_000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        // odd-sized LIST chunk to exercise padding.
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 0]); // 3 bytes + 1 pad byte
        bytes.extend_from_slice(DATA);
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        let format = parse_wav_header(&bytes).unwrap();
        assert_eq!(format.data_byte_length, 4);
    }
}
