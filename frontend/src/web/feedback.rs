//! 扫码反馈的浏览器实现：振动与提示音

use giftdesk::composables::audio::{AudioSink, Sound};
use giftdesk::composables::haptics::{Vibrator, is_mobile_user_agent};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, HtmlAudioElement, Url};

/// `navigator.vibrate`
pub struct NavigatorVibrator;

impl Vibrator for NavigatorVibrator {
    fn is_supported(&self) -> bool {
        web_sys::window()
            .map(|w| {
                let nav = w.navigator();
                ["vibrate", "mozVibrate", "webkitVibrate"]
                    .iter()
                    .any(|name| js_sys::Reflect::has(&nav, &JsValue::from_str(name)).unwrap_or(false))
            })
            .unwrap_or(false)
    }

    fn is_mobile(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let media = |query: &str| {
            window
                .match_media(query)
                .ok()
                .flatten()
                .map(|m| m.matches())
                .unwrap_or(false)
        };
        let ua = window.navigator().user_agent().unwrap_or_default();
        is_mobile_user_agent(&ua)
            || media("(max-width: 768px)")
            || media("(pointer: coarse)")
            || js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
    }

    fn vibrate(&self, pattern: &[u32]) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let nav = window.navigator();
        match pattern {
            [single] => nav.vibrate_with_duration(*single),
            _ => {
                let steps: js_sys::Array = pattern.iter().map(|ms| JsValue::from(*ms)).collect();
                nav.vibrate_with_pattern(&steps)
            }
        }
    }
}

/// WAV 转为 Blob URL，由 `<audio>` 播放
#[derive(Default)]
pub struct BlobAudioSink {
    elements: RefCell<HashMap<Sound, HtmlAudioElement>>,
}

impl BlobAudioSink {
    fn element_for(wav: &[u8]) -> Result<HtmlAudioElement, JsValue> {
        let bytes = js_sys::Uint8Array::from(wav);
        let options = BlobPropertyBag::new();
        options.set_type("audio/wav");
        let blob = Blob::new_with_u8_array_sequence_and_options(&js_sys::Array::of1(&bytes), &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;
        let audio = HtmlAudioElement::new_with_src(&url)?;
        audio.set_preload("auto");
        Ok(audio)
    }
}

impl AudioSink for BlobAudioSink {
    fn load(&self, sound: Sound, wav: Vec<u8>) -> bool {
        match Self::element_for(&wav) {
            Ok(audio) => {
                self.elements.borrow_mut().insert(sound, audio);
                true
            }
            Err(e) => {
                tracing::warn!(sound = sound.as_str(), error = ?e, "audio element creation failed");
                false
            }
        }
    }

    fn play(&self, sound: Sound, volume: f32) -> bool {
        let elements = self.elements.borrow();
        let Some(audio) = elements.get(&sound) else {
            return false;
        };
        audio.set_volume(volume as f64);
        audio.set_current_time(0.0);
        // 自动播放限制导致的拒绝只记录，不影响调用方
        audio.play().is_ok()
    }
}
