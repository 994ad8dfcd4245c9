//! Audio playback to the default output device via cpal.

use super::audio::{PcmAudio, FRAME_CHUNK};
use super::interface::{AudioSink, SpeechError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    SampleFormat, SampleRate, StreamConfig, SupportedStreamConfig, SupportedStreamConfigRange,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Chunks buffered ahead of the device callback.
const QUEUE_DEPTH: usize = 4;

/// Plays decoded audio on the system's default output device.
///
/// The output stream is opened per utterance and dropped when `play`
/// returns, whether playback completed or failed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalSink;

impl CpalSink {
    fn stream_config(
        device: &cpal::Device,
        audio: &PcmAudio,
    ) -> Result<StreamConfig, SpeechError> {
        let ranges: Vec<SupportedStreamConfigRange> = device
            .supported_output_configs()
            .map(|configs| configs.collect())
            .unwrap_or_default();
        let default = device.default_output_config().ok();
        choose_config(&ranges, default, audio).ok_or_else(|| {
            SpeechError::Output("output device has no f32 stream format".to_string())
        })
    }
}

/// Pick an f32 output config: one matching the audio exactly, else the
/// device default, else any f32 range at the closest supported rate.
fn choose_config(
    ranges: &[SupportedStreamConfigRange],
    default: Option<SupportedStreamConfig>,
    audio: &PcmAudio,
) -> Option<StreamConfig> {
    let f32_ranges = || ranges.iter().filter(|c| c.sample_format() == SampleFormat::F32);

    let exact = f32_ranges().find(|c| {
        c.channels() == audio.channels
            && c.min_sample_rate().0 <= audio.sample_rate
            && c.max_sample_rate().0 >= audio.sample_rate
    });
    if let Some(range) = exact {
        return Some(range.with_sample_rate(SampleRate(audio.sample_rate)).config());
    }
    if let Some(default) = default.filter(|c| c.sample_format() == SampleFormat::F32) {
        return Some(default.config());
    }
    f32_ranges().next().map(|range| {
        let rate = audio
            .sample_rate
            .clamp(range.min_sample_rate().0, range.max_sample_rate().0);
        range.with_sample_rate(SampleRate(rate)).config()
    })
}

impl AudioSink for CpalSink {
    fn play(&self, audio: PcmAudio) -> Result<(), SpeechError> {
        if audio.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SpeechError::Output("no default output device".to_string()))?;
        let config = Self::stream_config(&device, &audio)?;

        let audio = audio
            .with_channels(config.channels)
            .resample(config.sample_rate.0)?;
        let expected = audio.duration();

        let (tx, rx) = mpsc::sync_channel::<Vec<f32>>(QUEUE_DEPTH);
        let finished = Arc::new(AtomicBool::new(false));
        let mut feeder = ChunkFeeder::new(rx, Arc::clone(&finished));

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| feeder.fill(data),
                move |err| {
                    tracing::error!("[Speech] audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| SpeechError::Output(format!("failed to build output stream: {}", e)))?;
        stream
            .play()
            .map_err(|e| SpeechError::Output(format!("failed to start output stream: {}", e)))?;

        for chunk in audio.frames(FRAME_CHUNK) {
            if tx.send(chunk.to_vec()).is_err() {
                // Callback side is gone; the stream died.
                break;
            }
        }
        drop(tx);

        let deadline = Instant::now() + expected + Duration::from_secs(2);
        while !finished.load(Ordering::Acquire) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        if !finished.load(Ordering::Acquire) {
            tracing::warn!("[Speech] playback did not drain before deadline");
        }

        drop(stream);
        Ok(())
    }
}

/// Device-callback side: pulls chunks from the channel, pads with silence,
/// and flags completion once the sender is gone and the queue is empty.
struct ChunkFeeder {
    rx: Receiver<Vec<f32>>,
    current: Vec<f32>,
    position: usize,
    finished: Arc<AtomicBool>,
}

impl ChunkFeeder {
    fn new(rx: Receiver<Vec<f32>>, finished: Arc<AtomicBool>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            position: 0,
            finished,
        }
    }

    fn fill(&mut self, data: &mut [f32]) {
        for sample in data.iter_mut() {
            if self.position >= self.current.len() && !self.advance() {
                *sample = 0.0;
                continue;
            }
            *sample = self.current[self.position];
            self.position += 1;
        }
    }

    /// Load the next chunk. Returns false when nothing is ready.
    fn advance(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(chunk) => {
                self.current = chunk;
                self.position = 0;
                !self.current.is_empty()
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.finished.store(true, Ordering::Release);
                false
            }
        }
    }
}
