//! Decoded PCM audio: WAV decoding, channel mapping, resampling and the
//! fixed-size frame chunks playback is fed with.

use super::interface::SpeechError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::io::Cursor;
use std::time::Duration;

/// Frames handed to the output device per chunk.
pub const FRAME_CHUNK: usize = 1024;

/// Interleaved f32 samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, SpeechError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| SpeechError::Decode(format!("not a WAV payload: {}", e)))?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(SpeechError::Decode("WAV declares zero channels".to_string()));
        }

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>(),
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| SpeechError::Decode(format!("WAV sample error: {}", e)))?;

        Ok(Self {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// Average all channels into one.
    pub fn to_mono(&self) -> PcmAudio {
        if self.channels == 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let samples = self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        PcmAudio {
            samples,
            channels: 1,
            sample_rate: self.sample_rate,
        }
    }

    /// Remap to `channels` by mixing down to mono and duplicating.
    pub fn with_channels(&self, channels: u16) -> PcmAudio {
        if channels == self.channels || channels == 0 {
            return self.clone();
        }
        let mono = self.to_mono();
        let samples = mono
            .samples
            .iter()
            .flat_map(|s| std::iter::repeat(*s).take(channels as usize))
            .collect();
        PcmAudio {
            samples,
            channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Sinc resampling to `to_rate`. Identity when the rate already matches.
    pub fn resample(&self, to_rate: u32) -> Result<PcmAudio, SpeechError> {
        if to_rate == self.sample_rate || self.is_empty() {
            return Ok(PcmAudio {
                sample_rate: to_rate,
                ..self.clone()
            });
        }

        let channels = self.channels as usize;
        let frames = self.frame_count();
        let mut waves_in = vec![Vec::with_capacity(frames); channels];
        for frame in self.samples.chunks_exact(channels) {
            for (ch, sample) in frame.iter().enumerate() {
                waves_in[ch].push(*sample);
            }
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let ratio = to_rate as f64 / self.sample_rate as f64;
        let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, frames, channels)
            .map_err(|e| SpeechError::Output(format!("resampler setup failed: {}", e)))?;

        let expected = (frames as f64 * ratio).round() as usize;
        let delay = resampler.output_delay();
        let mut waves_out = resampler
            .process(&waves_in, None)
            .map_err(|e| SpeechError::Output(format!("resampling failed: {}", e)))?;

        // Flush the filter so the last input frames come out too.
        while waves_out[0].len() < delay + expected {
            let tail = resampler
                .process_partial::<Vec<f32>>(None, None)
                .map_err(|e| SpeechError::Output(format!("resampling failed: {}", e)))?;
            if tail.first().map_or(true, Vec::is_empty) {
                break;
            }
            for (wave, rest) in waves_out.iter_mut().zip(tail) {
                wave.extend(rest);
            }
        }

        let out_frames = waves_out[0].len().saturating_sub(delay).min(expected);
        let mut samples = Vec::with_capacity(out_frames * channels);
        for i in delay..delay + out_frames {
            for wave in &waves_out {
                samples.push(wave[i]);
            }
        }

        Ok(PcmAudio {
            samples,
            channels: self.channels,
            sample_rate: to_rate,
        })
    }

    /// Interleaved chunks of `chunk_frames` frames; the last may be shorter.
    pub fn frames(&self, chunk_frames: usize) -> std::slice::Chunks<'_, f32> {
        self.samples
            .chunks((chunk_frames.max(1)) * self.channels.max(1) as usize)
    }
}
