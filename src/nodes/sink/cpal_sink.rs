//! CPAL device output sink

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, ProcessContext};

/// A sink that plays through a CPAL output device.
///
/// The CPAL stream runs on its own thread and drains a ring buffer this node
/// fills during `process()`.
pub struct CpalSink {
    producer: Producer<f32>,
    channels: usize,
    sample_rate: u32,
    had_underrun: Arc<AtomicBool>,
}

impl CpalSink {
    /// Open the system's default output device. Returns `None` if there is no
    /// usable device.
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let config = device.default_output_config().ok()?;
        Some(Self::new(&device, &config))
    }

    /// Create a sink for the given device and config.
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Self {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;

        // ~100ms of audio to ride out scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let had_underrun = Arc::new(AtomicBool::new(false));
        let had_underrun_stream = had_underrun.clone();

        let device = device.clone();
        std::thread::spawn(move || {
            let stream = build_stream(
                &device,
                sample_format,
                &stream_config,
                consumer,
                had_underrun_stream,
            )
            .expect("failed to build output stream");

            stream.play().expect("failed to start output stream");

            // The stream lives as long as this thread
            loop {
                std::thread::park();
            }
        });

        Self {
            producer,
            channels,
            sample_rate,
            had_underrun,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Check and clear the underrun flag.
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
    had_underrun: Arc<AtomicBool>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    match sample_format {
        SampleFormat::F32 => device.build_output_stream(
            stream_config,
            move |data: &mut [f32], _| {
                let mut underrun = false;
                for sample in data.iter_mut() {
                    *sample = consumer.pop().unwrap_or_else(|_| {
                        underrun = true;
                        0.0
                    });
                }
                if underrun {
                    had_underrun.store(true, Ordering::Relaxed);
                }
            },
            |err| tracing::error!(?err, "cpal stream error"),
            None,
        ),
        SampleFormat::I16 => device.build_output_stream(
            stream_config,
            move |data: &mut [i16], _| {
                let mut underrun = false;
                for sample in data.iter_mut() {
                    let s = consumer.pop().unwrap_or_else(|_| {
                        underrun = true;
                        0.0
                    });
                    *sample = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                }
                if underrun {
                    had_underrun.store(true, Ordering::Relaxed);
                }
            },
            |err| tracing::error!(?err, "cpal stream error"),
            None,
        ),
        SampleFormat::U16 => device.build_output_stream(
            stream_config,
            move |data: &mut [u16], _| {
                let mut underrun = false;
                for sample in data.iter_mut() {
                    let s = consumer.pop().unwrap_or_else(|_| {
                        underrun = true;
                        0.0
                    });
                    *sample = ((s.clamp(-1.0, 1.0) + 1.0) * 0.5 * u16::MAX as f32) as u16;
                }
                if underrun {
                    had_underrun.store(true, Ordering::Relaxed);
                }
            },
            |err| tracing::error!(?err, "cpal stream error"),
            None,
        ),
        _ => panic!("unsupported sample format: {:?}", sample_format),
    }
}

impl AudioNode for CpalSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        if inputs.is_empty() {
            return;
        }

        let buffers = inputs[0].buffers();
        if buffers.is_empty() {
            return;
        }

        let block_len = buffers[0].len();
        let samples_needed = block_len * self.channels;

        if self.producer.slots() < samples_needed {
            return;
        }

        for i in 0..block_len {
            for ch in 0..self.channels {
                let src_ch = ch.min(buffers.len() - 1);
                let _ = self.producer.push(buffers[src_ch][i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        1
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        0
    }
}
