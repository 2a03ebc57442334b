//! Play a tone on the default output device.
//!
//! Usage: play <freq-hz> [duration-ms] [volume]
//!
//! With a duration, the tone self-mutes after that many milliseconds and
//! the program exits shortly after. Without one, it plays until killed.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapRb};
use sawgen::{ReadySink, Settings, Synthesizer, MAX_VOLUME};
use std::env;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

const USAGE: &str = "Usage: play <freq-hz> [duration-ms] [volume]

Play a sawtooth tone on the default audio output device.

Arguments:
  freq-hz       Tone frequency in Hz (0 = silence)
  duration-ms   Stop automatically after this long (optional)
  volume        Output volume, 0..1023 (optional, defaults from settings)

Examples:
  play 440
  play 440 500
  play 1000 2000 512
";

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    let freq: f32 = match args[1].parse() {
        Ok(f) => f,
        Err(_) => {
            eprintln!("Invalid frequency: {}", args[1]);
            process::exit(1);
        }
    };
    let duration_ms: u32 = match args.get(2) {
        Some(arg) => match arg.parse() {
            Ok(d) => d,
            Err(_) => {
                eprintln!("Invalid duration: {}", arg);
                process::exit(1);
            }
        },
        None => 0,
    };

    let settings = Settings::load();
    let volume: i32 = match args.get(3) {
        Some(arg) => match arg.parse() {
            Ok(v) => v,
            Err(_) => {
                eprintln!("Invalid volume: {}", arg);
                process::exit(1);
            }
        },
        None => settings.volume,
    };

    let host = cpal::default_host();
    let device = match host.default_output_device() {
        Some(d) => d,
        None => {
            eprintln!("[play] No default output device");
            process::exit(1);
        }
    };
    let config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[play] Failed to query output config: {}", e);
            process::exit(1);
        }
    };
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    let (sink, ready) = ReadySink::new();
    let synth = Synthesizer::new(sample_rate, sink);
    if let Err(e) = synth.set_volume(volume) {
        eprintln!("[play] {}", e);
        process::exit(1);
    }
    if let Err(e) = synth.set_buffer_size(settings.buffer_size) {
        eprintln!("[play] {}", e);
        process::exit(1);
    }
    if duration_ms > 0 {
        synth.set_frequency_for(freq, duration_ms);
    } else {
        synth.set_frequency(freq);
    }

    // ~100 ms of headroom between the generation thread and the callback.
    let ring = HeapRb::<f32>::new(sample_rate as usize / 10);
    let (mut producer, consumer) = ring.split();

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_output_stream::<f32>(&device, &config.into(), consumer, channels)
        }
        cpal::SampleFormat::I16 => {
            build_output_stream::<i16>(&device, &config.into(), consumer, channels)
        }
        cpal::SampleFormat::U16 => {
            build_output_stream::<u16>(&device, &config.into(), consumer, channels)
        }
        _ => Err("Unsupported output sample format".to_string()),
    };
    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[play] Failed to create output stream: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = stream.play() {
        eprintln!("[play] Failed to start output stream: {}", e);
        process::exit(1);
    }

    eprintln!(
        "[play] {} Hz tone at {} Hz sample rate, volume {}",
        freq, sample_rate, volume
    );

    let deadline = (duration_ms > 0)
        .then(|| Instant::now() + Duration::from_millis(u64::from(duration_ms) + 500));

    // Pump committed buffers into the ring buffer; the ReadySink handshake
    // keeps the generator one buffer ahead of this loop.
    while ready.recv().is_ok() {
        let buffer = synth.pull();
        for &sample in buffer.iter() {
            // Unipolar ramp scaled to half amplitude.
            let value = sample as f32 / MAX_VOLUME as f32 * 0.5;
            while producer.try_push(value).is_err() {
                thread::sleep(Duration::from_millis(1));
            }
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break;
            }
        }
    }

    // Let the callback drain what is already queued.
    thread::sleep(Duration::from_millis(200));
    drop(stream);

    // Disconnect the ready channel before the handle joins its thread, so
    // a blocked pull_request can return.
    drop(ready);
    drop(synth);
}

fn build_output_stream<T: cpal::SizedSample + FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mut samples: HeapCons<f32>,
    channels: usize,
) -> Result<Stream, String> {
    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = samples.try_pop().unwrap_or(0.0);
                    let value = T::from_sample(sample);
                    for channel in frame.iter_mut() {
                        *channel = value;
                    }
                }
            },
            |err| eprintln!("[play] Output stream error: {}", err),
            None,
        )
        .map_err(|e| e.to_string())?;

    Ok(stream)
}
