//! 扫码触觉反馈

use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

pub const PATTERN_SUCCESS: &[u32] = &[50, 50, 100];
pub const PATTERN_ERROR: &[u32] = &[100, 100, 100, 100, 100];
pub const PATTERN_DETECTION: &[u32] = &[30];
pub const PATTERN_LONG_PRESS: &[u32] = &[200];
pub const PATTERN_TEST: &[u32] = &[100, 100, 100];

/// 设备振动能力，浏览器端由 `navigator.vibrate` 实现
pub trait Vibrator {
    fn is_supported(&self) -> bool;
    fn is_mobile(&self) -> bool;
    /// 传入 `[0]` 表示停止
    fn vibrate(&self, pattern: &[u32]) -> bool;
}

const MOBILE_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// User-Agent 是否来自移动设备 (不区分大小写)
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_AGENTS.iter().any(|agent| ua.contains(agent))
}

/// 按强度缩放每一段时长 (向下取整)
pub fn scale_pattern(pattern: &[u32], intensity: f64) -> Vec<u32> {
    pattern
        .iter()
        .map(|ms| (*ms as f64 * intensity).floor() as u32)
        .collect()
}

pub struct Haptics {
    device: Rc<dyn Vibrator>,
    enabled: Cell<bool>,
    intensity: Cell<f64>,
}

impl Haptics {
    pub fn new(device: Rc<dyn Vibrator>) -> Self {
        Self {
            device,
            enabled: Cell::new(true),
            intensity: Cell::new(1.0),
        }
    }

    pub fn is_available(&self) -> bool {
        self.device.is_supported() && self.device.is_mobile()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn intensity(&self) -> f64 {
        self.intensity.get()
    }

    pub fn set_intensity(&self, intensity: f64) {
        self.intensity.set(intensity.clamp(0.0, 1.0));
    }

    fn play(&self, pattern: &[u32]) -> bool {
        if !self.enabled.get() || !self.is_available() {
            return false;
        }
        let scaled = scale_pattern(pattern, self.intensity.get());
        let ok = self.device.vibrate(&scaled);
        if !ok {
            debug!(?scaled, "vibration rejected");
        }
        ok
    }

    pub fn success(&self) -> bool {
        self.play(PATTERN_SUCCESS)
    }

    pub fn error(&self) -> bool {
        self.play(PATTERN_ERROR)
    }

    pub fn detection(&self) -> bool {
        self.play(PATTERN_DETECTION)
    }

    pub fn long_press(&self) -> bool {
        self.play(PATTERN_LONG_PRESS)
    }

    pub fn test(&self) -> bool {
        self.play(PATTERN_TEST)
    }

    pub fn custom(&self, pattern: &[u32]) -> bool {
        self.play(pattern)
    }

    pub fn stop(&self) -> bool {
        if !self.device.is_supported() {
            return false;
        }
        self.device.vibrate(&[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeDevice {
        supported: bool,
        mobile: bool,
        calls: RefCell<Vec<Vec<u32>>>,
    }

    impl FakeDevice {
        fn new(supported: bool, mobile: bool) -> Rc<Self> {
            Rc::new(Self {
                supported,
                mobile,
                calls: RefCell::new(Vec::new()),
            })
        }
    }

    impl Vibrator for FakeDevice {
        fn is_supported(&self) -> bool {
            self.supported
        }
        fn is_mobile(&self) -> bool {
            self.mobile
        }
        fn vibrate(&self, pattern: &[u32]) -> bool {
            self.calls.borrow_mut().push(pattern.to_vec());
            true
        }
    }

    #[test]
    fn patterns_scale_with_intensity() {
        let device = FakeDevice::new(true, true);
        let haptics = Haptics::new(device.clone());

        assert!(haptics.success());
        haptics.set_intensity(0.5);
        assert!(haptics.detection());
        haptics.set_intensity(3.0);
        assert_eq!(haptics.intensity(), 1.0);
        assert!(haptics.error());

        let calls = device.calls.borrow();
        assert_eq!(calls[0], vec![50, 50, 100]);
        assert_eq!(calls[1], vec![15]);
        assert_eq!(calls[2], vec![100; 5]);
    }

    #[test]
    fn skipped_when_unavailable_or_disabled() {
        let desktop = FakeDevice::new(true, false);
        assert!(!Haptics::new(desktop.clone()).success());
        assert!(desktop.calls.borrow().is_empty());

        let phone = FakeDevice::new(true, true);
        let haptics = Haptics::new(phone.clone());
        haptics.set_enabled(false);
        assert!(!haptics.long_press());
        assert!(haptics.stop());
        assert_eq!(*phone.calls.borrow(), vec![vec![0]]);
    }

    #[test]
    fn mobile_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(is_mobile_user_agent("Opera Mini/8.0"));
        assert!(!is_mobile_user_agent("Mozilla/5.0 (X11; Linux x86_64)"));
    }

    #[test]
    fn scale_floors() {
        assert_eq!(scale_pattern(&[33, 1], 0.5), vec![16, 0]);
    }
}
