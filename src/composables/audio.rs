//! 扫码提示音
//!
//! 声音在本地合成为 16 位单声道 WAV，再交给播放端 ([`AudioSink`]) 缓存。

use std::cell::Cell;
use std::f32::consts::PI;
use std::rc::Rc;
use tracing::{info, warn};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Success,
    Error,
    Beep,
}

impl Sound {
    pub const ALL: [Sound; 3] = [Sound::Success, Sound::Error, Sound::Beep];

    pub fn duration_secs(&self) -> f32 {
        match self {
            Sound::Success => 0.3,
            Sound::Error => 0.5,
            Sound::Beep => 0.1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Success => "success",
            Sound::Error => "error",
            Sound::Beep => "beep",
        }
    }
}

/// 生成声音采样，取值范围 [-1, 1]
pub fn synthesize(sound: Sound, sample_rate: u32) -> Vec<f32> {
    let duration = sound.duration_secs();
    let count = (sample_rate as f32 * duration) as usize;
    let rate = sample_rate as f32;

    (0..count)
        .map(|i| {
            let t = i as f32 / rate;
            match sound {
                // 上扬的双音
                Sound::Success => {
                    let f1 = 600.0 + 200.0 * t;
                    let f2 = 800.0 + 300.0 * t;
                    let wave = (2.0 * PI * f1 * t).sin() + (2.0 * PI * f2 * t).sin() * 0.5;
                    wave * (-t * 3.0).exp() * 0.3
                }
                // 约 200Hz 的低频调制音
                Sound::Error => {
                    let f = 200.0 + 50.0 * (t * 8.0).sin();
                    (2.0 * PI * f * t).sin() * (-t * 2.0).exp() * 0.4
                }
                Sound::Beep => {
                    let envelope = (PI * t / duration).sin();
                    (2.0 * PI * 1000.0 * t).sin() * envelope * 0.2
                }
            }
        })
        .collect()
}

/// 编码为 PCM WAV (16 位，单声道，44 字节头)
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// 播放端，浏览器里由 Blob URL + `<audio>` 实现
pub trait AudioSink {
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }
    fn load(&self, sound: Sound, wav: Vec<u8>) -> bool;
    fn play(&self, sound: Sound, volume: f32) -> bool;
}

pub struct ScannerAudio {
    sink: Rc<dyn AudioSink>,
    enabled: Cell<bool>,
    volume: Cell<f32>,
    initialized: Cell<bool>,
}

impl ScannerAudio {
    pub fn new(sink: Rc<dyn AudioSink>) -> Self {
        Self {
            sink,
            enabled: Cell::new(true),
            volume: Cell::new(DEFAULT_VOLUME),
            initialized: Cell::new(false),
        }
    }

    /// 合成并加载全部声音；重复调用直接返回当前状态
    pub fn initialize(&self) -> bool {
        if self.initialized.get() {
            return true;
        }
        let rate = self.sink.sample_rate();
        let mut loaded = 0;
        for sound in Sound::ALL {
            let wav = encode_wav(&synthesize(sound, rate), rate);
            if self.sink.load(sound, wav) {
                loaded += 1;
            } else {
                warn!(sound = sound.as_str(), "failed to load scanner sound");
            }
        }
        let ok = loaded > 0;
        if ok {
            info!(loaded, "scanner audio initialized");
        }
        self.initialized.set(ok);
        ok
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    fn play(&self, sound: Sound) -> bool {
        if !self.enabled.get() || !self.initialized.get() {
            return false;
        }
        self.sink.play(sound, self.volume.get())
    }

    pub fn play_success(&self) -> bool {
        self.play(Sound::Success)
    }

    pub fn play_error(&self) -> bool {
        self.play(Sound::Error)
    }

    pub fn play_beep(&self) -> bool {
        self.play(Sound::Beep)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        loaded: RefCell<Vec<(Sound, usize)>>,
        played: RefCell<Vec<(Sound, f32)>>,
    }

    impl AudioSink for RecordingSink {
        fn sample_rate(&self) -> u32 {
            8_000
        }
        fn load(&self, sound: Sound, wav: Vec<u8>) -> bool {
            self.loaded.borrow_mut().push((sound, wav.len()));
            true
        }
        fn play(&self, sound: Sound, volume: f32) -> bool {
            self.played.borrow_mut().push((sound, volume));
            true
        }
    }

    #[test]
    fn wav_header_layout() {
        let wav = encode_wav(&[0.0, 1.0, -1.0], 8_000);
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 42);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), i16::MAX);
    }

    #[test]
    fn synthesized_lengths_and_range() {
        assert_eq!(synthesize(Sound::Success, 8_000).len(), 2_400);
        assert_eq!(synthesize(Sound::Beep, 8_000).len(), 800);
        let error = synthesize(Sound::Error, 8_000);
        assert_eq!(error.len(), 4_000);
        assert!(error.iter().all(|s| s.abs() <= 0.4));
    }

    #[test]
    fn plays_only_after_initialize() {
        let sink = Rc::new(RecordingSink::default());
        let audio = ScannerAudio::new(sink.clone());
        assert!(!audio.play_beep());

        assert!(audio.initialize());
        assert_eq!(sink.loaded.borrow().len(), 3);
        assert_eq!(sink.loaded.borrow()[0], (Sound::Success, 44 + 4_800));

        audio.set_volume(1.5);
        assert!(audio.play_success());
        audio.set_enabled(false);
        assert!(!audio.play_error());
        assert_eq!(*sink.played.borrow(), vec![(Sound::Success, 1.0)]);
    }
}
