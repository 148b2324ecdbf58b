use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const TONE_HZ: f32 = 880.0;
/// Beep on for this many samples, then silent for the same count.
const BEEP_SAMPLES: usize = (SAMPLE_RATE / 4) as usize;

/// Alarm chime: an 880 Hz beep pulsing four times a second, until the sink is stopped.
pub struct AlarmTone {
    sample_rate: u32,
    num_sample: usize,
}

impl AlarmTone {
    pub fn new() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            num_sample: 0,
        }
    }
}

impl Iterator for AlarmTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.num_sample = self.num_sample.wrapping_add(1);

        let audible = (self.num_sample / BEEP_SAMPLES) % 2 == 0;
        if !audible {
            return Some(0.0);
        }

        let t = self.num_sample as f32 / self.sample_rate as f32;
        Some((2.0 * PI * TONE_HZ * t).sin() * 0.2)
    }
}

impl Source for AlarmTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
