use super::{AudioError, AudioFormat};
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Reads the playing time of an audio file in seconds.
///
/// Containers that declare their frame count (WAV, MP3 with a Xing/Info
/// header) are answered from the header. Otherwise every packet is demuxed
/// and its duration summed; nothing is decoded.
pub fn probe_duration(path: &Path) -> Result<f64, AudioError> {
    let format = AudioFormat::from_path(path)?;

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.extension());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Corrupt(e.to_string()))?;

    let mut reader = probed.format;
    let (track_id, sample_rate, n_frames) = {
        let track = reader
            .default_track()
            .ok_or_else(|| AudioError::Corrupt("no audio track found".to_string()))?;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::Corrupt("unknown sample rate".to_string()))?;
        (track.id, sample_rate, track.codec_params.n_frames)
    };

    if sample_rate == 0 {
        return Err(AudioError::Corrupt("sample rate is zero".to_string()));
    }

    let frames = match n_frames {
        Some(n) => n,
        None => {
            let mut total: u64 = 0;
            loop {
                match reader.next_packet() {
                    Ok(packet) if packet.track_id() == track_id => total += packet.dur,
                    Ok(_) => {}
                    Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        break;
                    }
                    Err(e) => return Err(AudioError::Corrupt(e.to_string())),
                }
            }
            total
        }
    };

    Ok(frames as f64 / sample_rate as f64)
}
