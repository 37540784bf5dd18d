//! Minimal RIFF/WAVE wrapping for the raw sound effects stored in
//! `SNDSMP.DAT`. The archives keep bare sample data; every known build
//! uses mono unsigned 8-bit PCM at 11025 Hz, so the container fields are
//! fixed and the payload is passed through untouched.

pub const SAMPLE_RATE: u32 = 11025;
pub const BITS_PER_SAMPLE: u16 = 8;
pub const CHANNEL_COUNT: u16 = 1;

const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Wraps raw mono 8-bit 11025 Hz samples in a WAV container.
pub fn wrap_pcm_mono8(samples: &[u8]) -> Vec<u8> {
    let byte_rate = SAMPLE_RATE * BITS_PER_SAMPLE as u32 * CHANNEL_COUNT as u32 / 8;
    let block_align = BITS_PER_SAMPLE * CHANNEL_COUNT / 8;
    let data_len = samples.len() as u32;
    // RIFF size counts everything after the size field itself.
    let riff_len = 4 + (8 + FMT_CHUNK_SIZE) + (8 + data_len);

    let mut out = Vec::with_capacity(44 + samples.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&CHANNEL_COUNT.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(samples);

    out
}
