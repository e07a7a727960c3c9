//! Synthetic WAV fixtures for tests across the recspec workspace.
//!
//! Exposed `#[doc(hidden)]` (not `#[cfg(test)]`) so downstream crates'
//! `#[cfg(test)]` modules can build fixtures without each reimplementing a
//! RIFF writer.

/// Hand-rolled canonical PCM WAV writer covering bit depths 8/16/24/32.
///
/// Float fixtures go through `hound` instead (see [`write_float_wav`]).
/// PCM fixtures are written by hand here because hound's byte-level
/// behavior for 8-bit (canonically unsigned in WAV) and 24-bit (packed
/// 3-byte) samples is not pinned down precisely enough to trust blind —
/// this writer instead encodes the exact inverse of
/// `recspec_wav::samples`'s decode formulas, so round-trip tests are
/// self-consistent by construction.
pub fn write_pcm_wav(sample_rate: u32, bits_per_sample: u16, channels: &[Vec<f32>]) -> Vec<u8> {
    let channel_count = channels.len() as u16;
    let frame_count = channels.first().map(|c| c.len()).unwrap_or(0);
    let bytes_per_sample = (bits_per_sample / 8) as usize;
    let block_align = bytes_per_sample * channel_count as usize;
    let data_size = frame_count * block_align;

    let mut data = Vec::with_capacity(data_size);
    for frame in 0..frame_count {
        for channel in channels {
            let sample = channel[frame];
            match bits_per_sample {
                8 => {
                    let v = (sample * 128.0 + 128.0).round().clamp(0.0, 255.0) as u8;
                    data.push(v);
                }
                16 => {
                    let v = (sample * 32_768.0).round().clamp(-32_768.0, 32_767.0) as i16;
                    data.extend_from_slice(&v.to_le_bytes());
                }
                24 => {
                    let v = (sample * 8_388_608.0)
                        .round()
                        .clamp(-8_388_608.0, 8_388_607.0) as i32;
                    let bytes = v.to_le_bytes();
                    data.extend_from_slice(&bytes[0..3]);
                }
                32 => {
                    let v = (sample * 2_147_483_648.0)
                        .round()
                        .clamp(-2_147_483_648.0, 2_147_483_647.0) as i32;
                    data.extend_from_slice(&v.to_le_bytes());
                }
                other => panic!("unsupported test fixture bit depth: {other}"),
            }
        }
    }

    write_wav_container(sample_rate, bits_per_sample, channel_count, 1, &data)
}

/// IEEE-float WAV fixture, written with `hound`: `bits_per_sample: 32`,
/// interleaved `f32` samples written with `write_sample`.
pub fn write_float_wav(sample_rate: u32, channels: &[Vec<f32>]) -> Vec<u8> {
    use std::io::Cursor;

    let channel_count = channels.len() as u16;
    let frame_count = channels.first().map(|c| c.len()).unwrap_or(0);

    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let spec = hound::WavSpec {
            channels: channel_count,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
        for frame in 0..frame_count {
            for channel in channels {
                writer.write_sample(channel[frame]).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    buffer
}

fn write_wav_container(
    sample_rate: u32,
    bits_per_sample: u16,
    channel_count: u16,
    format_tag: u16,
    data: &[u8],
) -> Vec<u8> {
    let byte_rate = sample_rate * channel_count as u32 * (bits_per_sample as u32 / 8);
    let block_align = channel_count * (bits_per_sample / 8);
    let data_size = data.len() as u32;
    let riff_size = 4 + (8 + 16) + (8 + data_size);

    let mut out = Vec::with_capacity(44 + data.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&format_tag.to_le_bytes());
    out.extend_from_slice(&channel_count.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(data);
    out
}
