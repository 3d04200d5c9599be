//! 界面状态存储
//!
//! 视口尺寸、离线标志、通知队列、主题、语言、加载标志与扫码入口。

use crate::scheduler::{ScheduledTask, Scheduler};
use crate::storage::{KEY_LANGUAGE, KEY_THEME, KeyValueStore};
use giftdesk_shared::Timestamp;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

pub const MOBILE_MAX_WIDTH: u32 = 768;
pub const TABLET_MAX_WIDTH: u32 = 1024;
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);
pub const DEFAULT_LANGUAGE: &str = "en";
pub const THEME_LIGHT: &str = "light";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// 可选参数；未设置的字段按通知类型取默认值
#[derive(Debug, Clone, Default)]
pub struct NotificationOptions {
    pub title: Option<String>,
    pub duration: Option<Duration>,
    pub auto_remove: Option<bool>,
}

impl NotificationOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn auto_remove(mut self, auto_remove: bool) -> Self {
        self.auto_remove = Some(auto_remove);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// `<millis>-<random>`
    pub id: String,
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub message: String,
    pub duration: Duration,
    pub auto_remove: bool,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Mobile,
    Tablet,
    Desktop,
}

impl Viewport {
    pub fn from_width(width: u32) -> Self {
        if width <= MOBILE_MAX_WIDTH {
            Viewport::Mobile
        } else if width <= TABLET_MAX_WIDTH {
            Viewport::Tablet
        } else {
            Viewport::Desktop
        }
    }
}

#[derive(Debug, Clone)]
struct UiInner {
    screen_width: u32,
    is_offline: bool,
    loading: bool,
    language: String,
    notifications: Vec<Notification>,
}

pub struct UiState {
    this: Weak<UiState>,
    storage: Rc<dyn KeyValueStore>,
    scheduler: Rc<dyn Scheduler>,
    state: RefCell<UiInner>,
    /// 通知 id -> 自动移除任务
    timers: RefCell<HashMap<String, Box<dyn ScheduledTask>>>,
    scanner_handler: RefCell<Option<Rc<dyn Fn()>>>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
}

impl UiState {
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
        screen_width: u32,
        is_online: bool,
    ) -> Rc<Self> {
        let language = storage
            .get(KEY_LANGUAGE)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            storage,
            scheduler,
            state: RefCell::new(UiInner {
                screen_width,
                is_offline: !is_online,
                loading: false,
                language,
                notifications: Vec::new(),
            }),
            timers: RefCell::new(HashMap::new()),
            scanner_handler: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn notify(&self) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    // =========================================================
    // 视口与连接
    // =========================================================

    pub fn screen_width(&self) -> u32 {
        self.state.borrow().screen_width
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::from_width(self.screen_width())
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport() == Viewport::Mobile
    }

    pub fn is_tablet(&self) -> bool {
        self.viewport() == Viewport::Tablet
    }

    pub fn is_desktop(&self) -> bool {
        self.viewport() == Viewport::Desktop
    }

    pub fn update_screen_size(&self, width: u32) {
        self.state.borrow_mut().screen_width = width;
        self.notify();
    }

    pub fn is_offline(&self) -> bool {
        self.state.borrow().is_offline
    }

    pub fn set_offline_status(&self, offline: bool) {
        if self.is_offline() != offline {
            debug!(offline, "connectivity changed");
        }
        self.state.borrow_mut().is_offline = offline;
        self.notify();
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.borrow_mut().loading = loading;
        self.notify();
    }

    // =========================================================
    // 主题与语言
    // =========================================================

    /// 暗色模式已停用，主题固定为 light
    pub fn theme(&self) -> &'static str {
        THEME_LIGHT
    }

    pub fn is_dark_mode(&self) -> bool {
        false
    }

    pub fn set_theme(&self) {
        if let Err(e) = self.storage.set(KEY_THEME, THEME_LIGHT) {
            warn!(error = %e, "failed to persist theme");
        }
        self.notify();
    }

    pub fn toggle_theme(&self) {
        self.set_theme();
    }

    pub fn language(&self) -> String {
        self.state.borrow().language.clone()
    }

    pub fn set_language(&self, language: &str) {
        if let Err(e) = self.storage.set(KEY_LANGUAGE, language) {
            warn!(error = %e, "failed to persist language");
        }
        self.state.borrow_mut().language = language.to_string();
        self.notify();
    }

    /// 文档书写方向：阿拉伯语为 `rtl`
    pub fn text_direction(&self) -> &'static str {
        if self.state.borrow().language == "ar" {
            "rtl"
        } else {
            "ltr"
        }
    }

    // =========================================================
    // 通知
    // =========================================================

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.borrow().notifications.clone()
    }

    pub fn add_notification(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        options: NotificationOptions,
    ) -> String {
        let now = self.scheduler.now_millis();
        let random = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", now, &random[..9]);
        let auto_remove = options
            .auto_remove
            .unwrap_or(kind != NotificationKind::Error);
        let duration = options
            .duration
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_NOTIFICATION_DURATION);

        let notification = Notification {
            id: id.clone(),
            kind,
            title: options.title,
            message: message.into(),
            duration,
            auto_remove,
            timestamp: Timestamp::new(now),
        };
        self.state.borrow_mut().notifications.push(notification);

        if auto_remove {
            let this = self.this.clone();
            let target = id.clone();
            let task = self.scheduler.schedule(
                duration,
                Box::new(move || {
                    if let Some(ui) = this.upgrade() {
                        ui.remove_notification(&target);
                    }
                }),
            );
            self.timers.borrow_mut().insert(id.clone(), task);
        }

        self.notify();
        id
    }

    pub fn show_success(&self, message: impl Into<String>, options: NotificationOptions) -> String {
        self.add_notification(NotificationKind::Success, message, options)
    }

    /// 错误通知默认不自动消失
    pub fn show_error(&self, message: impl Into<String>, options: NotificationOptions) -> String {
        let options = NotificationOptions {
            auto_remove: Some(options.auto_remove.unwrap_or(false)),
            ..options
        };
        self.add_notification(NotificationKind::Error, message, options)
    }

    pub fn show_warning(&self, message: impl Into<String>, options: NotificationOptions) -> String {
        self.add_notification(NotificationKind::Warning, message, options)
    }

    pub fn show_info(&self, message: impl Into<String>, options: NotificationOptions) -> String {
        self.add_notification(NotificationKind::Info, message, options)
    }

    pub fn remove_notification(&self, id: &str) {
        // 先取出任务再 drop，避免持有借用时触发取消
        let task = self.timers.borrow_mut().remove(id);
        drop(task);
        self.state
            .borrow_mut()
            .notifications
            .retain(|n| n.id != id);
        self.notify();
    }

    pub fn clear_notifications(&self) {
        let timers = std::mem::take(&mut *self.timers.borrow_mut());
        drop(timers);
        self.state.borrow_mut().notifications.clear();
        self.notify();
    }

    // =========================================================
    // 扫码入口
    // =========================================================

    pub fn set_scanner_handler(&self, handler: Option<Rc<dyn Fn()>>) {
        *self.scanner_handler.borrow_mut() = handler;
    }

    /// 未注册处理器时什么也不做
    pub fn open_scanner(&self) {
        let handler = self.scanner_handler.borrow().clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::storage::MemoryStore;
    use std::cell::Cell;

    fn ui() -> (Rc<MemoryStore>, Rc<ManualScheduler>, Rc<UiState>) {
        let storage = Rc::new(MemoryStore::new());
        let clock = ManualScheduler::new();
        let ui = UiState::new(storage.clone(), clock.clone(), 1280, true);
        (storage, clock, ui)
    }

    #[test]
    fn test_viewport_thresholds() {
        assert_eq!(Viewport::from_width(768), Viewport::Mobile);
        assert_eq!(Viewport::from_width(769), Viewport::Tablet);
        assert_eq!(Viewport::from_width(1024), Viewport::Tablet);
        assert_eq!(Viewport::from_width(1025), Viewport::Desktop);

        let (_, _, ui) = ui();
        assert!(ui.is_desktop());
        ui.update_screen_size(400);
        assert!(ui.is_mobile());
    }

    #[test]
    fn test_notification_auto_removal() {
        let (_, clock, ui) = ui();
        let id = ui.show_success("Saved", NotificationOptions::default());
        assert!(id.starts_with("1700000000000-"));
        assert_eq!(ui.notifications().len(), 1);

        clock.advance(Duration::from_millis(4999));
        assert_eq!(ui.notifications().len(), 1);
        clock.advance(Duration::from_millis(1));
        assert!(ui.notifications().is_empty());
    }

    #[test]
    fn test_custom_duration() {
        let (_, clock, ui) = ui();
        ui.show_info(
            "Heads up",
            NotificationOptions::default()
                .title("Info")
                .duration(Duration::from_millis(1000)),
        );
        assert_eq!(ui.notifications()[0].title.as_deref(), Some("Info"));
        clock.advance(Duration::from_millis(1000));
        assert!(ui.notifications().is_empty());
    }

    #[test]
    fn test_errors_stay_until_dismissed() {
        let (_, clock, ui) = ui();
        let id = ui.show_error("Boom", NotificationOptions::default());
        let via_add = ui.add_notification(
            NotificationKind::Error,
            "Also boom",
            NotificationOptions::default(),
        );
        clock.advance(Duration::from_secs(60));
        assert_eq!(ui.notifications().len(), 2);
        assert_eq!(clock.pending(), 0);

        ui.remove_notification(&id);
        ui.remove_notification(&via_add);
        assert!(ui.notifications().is_empty());
    }

    #[test]
    fn test_error_can_opt_into_auto_remove() {
        let (_, clock, ui) = ui();
        ui.show_error("Boom", NotificationOptions::default().auto_remove(true));
        clock.advance(DEFAULT_NOTIFICATION_DURATION);
        assert!(ui.notifications().is_empty());
    }

    #[test]
    fn test_manual_remove_cancels_timer() {
        let (_, clock, ui) = ui();
        let id = ui.show_warning("Careful", NotificationOptions::default());
        ui.remove_notification(&id);
        assert_eq!(clock.pending(), 0);

        ui.show_info("one", NotificationOptions::default());
        ui.show_info("two", NotificationOptions::default());
        ui.clear_notifications();
        assert!(ui.notifications().is_empty());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_language_and_theme_persist() {
        let (storage, _, ui) = ui();
        assert_eq!(ui.language(), "en");
        assert_eq!(ui.text_direction(), "ltr");

        ui.set_language("ar");
        assert_eq!(ui.text_direction(), "rtl");
        assert_eq!(storage.get(KEY_LANGUAGE).as_deref(), Some("ar"));

        ui.toggle_theme();
        assert_eq!(ui.theme(), "light");
        assert_eq!(storage.get(KEY_THEME).as_deref(), Some("light"));

        let clock = ManualScheduler::new();
        let reloaded = UiState::new(storage.clone(), clock, 1280, false);
        assert_eq!(reloaded.language(), "ar");
        assert!(reloaded.is_offline());
    }

    #[test]
    fn test_scanner_handler() {
        let (_, _, ui) = ui();
        ui.open_scanner();

        let opened = Rc::new(Cell::new(0));
        let counter = opened.clone();
        ui.set_scanner_handler(Some(Rc::new(move || counter.set(counter.get() + 1))));
        ui.open_scanner();
        assert_eq!(opened.get(), 1);
    }

    #[test]
    fn test_listeners_fire_on_change() {
        let (_, _, ui) = ui();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        ui.subscribe(move || counter.set(counter.get() + 1));
        ui.set_loading(true);
        ui.set_offline_status(true);
        assert_eq!(hits.get(), 2);
        assert!(ui.is_loading());
    }
}
