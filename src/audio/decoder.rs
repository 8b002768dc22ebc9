//! Decoding of downloaded preview clips
//!
//! Preview clips are short, so the whole clip is decoded up front and converted
//! to the output device's channel layout and sample rate. The output callback
//! then only copies samples.

use std::io::Cursor;
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Symphonia error: {0}")]
    Symphonia(#[from] SymphoniaError),
    #[error("No audio tracks found")]
    NoAudioTracks,
    #[error("Clip contains no audio frames")]
    Empty,
}

/// Interleaved f32 samples ready for the output device
#[derive(Debug, Clone)]
pub struct DecodedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedClip {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Sample offset (into `samples`) of a position, clamped to the clip
    pub fn offset_for_ms(&self, position_ms: u64) -> usize {
        let frame = position_ms.saturating_mul(self.sample_rate as u64) / 1000;
        let offset = frame as usize * self.channels as usize;
        offset.min(self.samples.len())
    }

    pub fn ms_for_offset(&self, offset: usize) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let frame = (offset / self.channels.max(1) as usize) as u64;
        frame * 1000 / self.sample_rate as u64
    }
}

/// File extension of a URI path, used as a format hint (`.../clip.m4a?x=1` → `m4a`)
pub fn extension_hint(uri: &str) -> Option<&str> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 5 {
        None
    } else {
        Some(ext)
    }
}

/// Decode an encoded clip and convert it to `target_channels` at `target_rate`.
pub fn decode_clip(
    data: Vec<u8>,
    extension: Option<&str>,
    target_rate: u32,
    target_channels: u16,
) -> Result<DecodedClip, DecodeError> {
    let media_source = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        media_source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTracks)?;
    let track_id = track.id;
    let mut source_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let mut source_channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(audio_buf) => {
                let spec = *audio_buf.spec();
                source_rate = spec.rate;
                source_channels = spec.channels.count() as u16;

                let mut buffer = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
                buffer.copy_interleaved_ref(audio_buf);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!(error = %e, "Skipping undecodable packet");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    let remixed = remix(&samples, source_channels, target_channels);
    let resampled = resample_linear(&remixed, target_channels, source_rate, target_rate);

    tracing::debug!(
        source_rate,
        source_channels,
        target_rate,
        target_channels,
        frames = resampled.len() / target_channels.max(1) as usize,
        "Clip decoded"
    );

    Ok(DecodedClip {
        samples: resampled,
        sample_rate: target_rate,
        channels: target_channels,
    })
}

/// Convert interleaved samples between channel counts.
///
/// Mono is duplicated into every output channel; going down to mono averages
/// the first two channels; otherwise channels are copied in order and missing
/// ones are silent.
pub fn remix(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    if from == to {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);
    for frame in samples.chunks_exact(from) {
        if from == 1 {
            out.extend(std::iter::repeat_n(frame[0], to));
        } else if to == 1 {
            out.push((frame[0] + frame[1]) * 0.5);
        } else {
            for ch in 0..to {
                out.push(frame.get(ch).copied().unwrap_or(0.0));
            }
        }
    }
    out
}

/// Linear interpolation resampling of interleaved samples
pub fn resample_linear(samples: &[f32], channels: u16, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let in_frames = samples.len() / channels;
    if in_frames == 0 {
        return Vec::new();
    }
    let out_frames = (in_frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let ratio = from_rate as f64 / to_rate as f64;

    let mut out = Vec::with_capacity(out_frames * channels);
    for frame_idx in 0..out_frames {
        let src = frame_idx as f64 * ratio;
        let base = src.floor() as usize;
        let next = (base + 1).min(in_frames - 1);
        let frac = (src - base as f64) as f32;
        for ch in 0..channels {
            let a = samples[base.min(in_frames - 1) * channels + ch];
            let b = samples[next * channels + ch];
            out.push(a + (b - a) * frac);
        }
    }
    out
}
