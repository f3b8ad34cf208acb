use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample, Stream};

/// Audio collaborator: a 440 Hz beeper behind an on/off gate. The output
/// stream runs for the lifetime of the emulator; while the gate is off
/// the callback emits silence. The gate is the only state shared with
/// the audio thread.
pub struct Sound {
    _stream: Stream,
    gate: Arc<AtomicBool>,
}

impl Sound {
    pub fn new() -> Self {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .expect("no audio output device available");
        let config = device
            .default_output_config()
            .expect("no default audio output config");

        let gate = Arc::new(AtomicBool::new(false));
        let stream = match config.sample_format() {
            cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config.into(), gate.clone()),
            cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config.into(), gate.clone()),
            sample_format => panic!("unsupported sample format '{sample_format}'"),
        };
        stream.play().expect("failed to start audio stream");

        Self {
            _stream: stream,
            gate,
        }
    }

    /// Gate from the timer tick: true while the sound timer is running.
    pub fn set_active(&self, on: bool) {
        self.gate.store(on, Ordering::Relaxed);
    }

    fn build<T>(device: &cpal::Device, config: &cpal::StreamConfig, gate: Arc<AtomicBool>) -> Stream
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            sample_clock = (sample_clock + 1.0) % sample_rate;
            (sample_clock * 440.0 * 2.0 * std::f32::consts::PI / sample_rate).sin()
        };

        let err_fn = |err| log::error!("audio stream error: {err}");

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let on = gate.load(Ordering::Relaxed);
                    for frame in data.chunks_mut(channels) {
                        let value = if on { next_value() } else { 0.0 };
                        let value: T = T::from_sample(value);
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                err_fn,
                None,
            )
            .expect("failed to build audio stream")
    }
}
