use super::AudioError;
use std::path::Path;

/// Where the interesting chunks of a RIFF/WAVE file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavLayout {
    pub fmt: std::ops::Range<usize>,
    pub data: std::ops::Range<usize>,
    pub sample_rate: u32,
    pub block_align: u16,
}

impl WavLayout {
    pub fn frames(&self) -> u64 {
        (self.data.len() / self.block_align as usize) as u64
    }
}

fn corrupt(msg: &str) -> AudioError {
    AudioError::Corrupt(msg.to_string())
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

pub fn parse(bytes: &[u8]) -> Result<WavLayout, AudioError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(corrupt("missing RIFF/WAVE header"));
    }

    let mut fmt = None;
    let mut data = None;
    let mut pos = 12;

    while pos + 8 <= bytes.len() && (fmt.is_none() || data.is_none()) {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body = pos + 8;

        match id {
            b"fmt " => {
                if size < 16 || body + size > bytes.len() {
                    return Err(corrupt("truncated fmt chunk"));
                }
                fmt = Some(body..body + size);
            }
            // Streaming writers leave the size at 0 or u32::MAX; trust the file length.
            b"data" => data = Some(body..body.saturating_add(size).min(bytes.len())),
            _ => {}
        }

        pos = body.saturating_add(size).saturating_add(size & 1);
    }

    let fmt = fmt.ok_or_else(|| corrupt("no fmt chunk"))?;
    let data = data.ok_or_else(|| corrupt("no data chunk"))?;

    let sample_rate = read_u32(bytes, fmt.start + 4);
    let block_align = read_u16(bytes, fmt.start + 12);
    if sample_rate == 0 || block_align == 0 {
        return Err(corrupt("invalid fmt chunk"));
    }

    Ok(WavLayout {
        fmt,
        data,
        sample_rate,
        block_align,
    })
}

/// Rebuilds the file with only `fmt ` and the first `seconds` of `data`.
/// Frames are whole sample blocks, so the cut never splits a sample.
pub fn trim_bytes(bytes: &[u8], seconds: f64) -> Result<Vec<u8>, AudioError> {
    let layout = parse(bytes)?;

    let wanted = (seconds.max(0.0) * layout.sample_rate as f64).floor();
    let keep_frames = if wanted >= layout.frames() as f64 {
        layout.frames()
    } else {
        wanted as u64
    };
    let keep_bytes = keep_frames as usize * layout.block_align as usize;

    let fmt_body = &bytes[layout.fmt.clone()];
    let data_body = &bytes[layout.data.start..layout.data.start + keep_bytes];

    let fmt_pad = fmt_body.len() & 1;
    let data_pad = data_body.len() & 1;
    let riff_size = 4 + 8 + fmt_body.len() + fmt_pad + 8 + data_body.len() + data_pad;

    let mut out = Vec::with_capacity(riff_size + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(riff_size as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&(fmt_body.len() as u32).to_le_bytes());
    out.extend_from_slice(fmt_body);
    out.resize(out.len() + fmt_pad, 0);

    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_body.len() as u32).to_le_bytes());
    out.extend_from_slice(data_body);
    out.resize(out.len() + data_pad, 0);

    Ok(out)
}

pub fn trim_file(input: &Path, output: &Path, seconds: f64) -> Result<(), AudioError> {
    let bytes = std::fs::read(input)?;
    let trimmed = trim_bytes(&bytes, seconds)?;
    std::fs::write(output, trimmed)?;
    Ok(())
}
