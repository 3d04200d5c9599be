//! 界面状态桥接
//!
//! [`UiState`] 的快照信号，以及把窗口事件 (resize / online / offline) 写回状态。

use crate::web::document;
use giftdesk::Services;
use giftdesk::ui_state::{Notification, UiState, Viewport};
use leptos::prelude::*;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct UiSnapshot {
    pub viewport: Viewport,
    pub is_offline: bool,
    pub is_loading: bool,
    pub language: String,
    pub direction: &'static str,
    pub notifications: Vec<Notification>,
}

impl UiSnapshot {
    fn of(ui: &UiState) -> Self {
        Self {
            viewport: ui.viewport(),
            is_offline: ui.is_offline(),
            is_loading: ui.is_loading(),
            language: ui.language(),
            direction: ui.text_direction(),
            notifications: ui.notifications(),
        }
    }
}

/// 应用级上下文：服务集合 + 界面快照
#[derive(Clone, Copy)]
pub struct AppContext {
    pub ui: ReadSignal<UiSnapshot>,
    services: StoredValue<Rc<Services>, LocalStorage>,
    pub is_pwa: bool,
}

impl AppContext {
    pub fn new(services: Rc<Services>) -> Self {
        let (ui, set_ui) = signal(UiSnapshot::of(&services.ui));

        let weak = Rc::downgrade(&services.ui);
        services.ui.subscribe(move || {
            if let Some(ui) = weak.upgrade() {
                set_ui.set(UiSnapshot::of(&ui));
            }
        });

        listen_window(&services.ui);

        // 语言与书写方向同步到 <html>
        Effect::new(move |_| {
            let snapshot = ui.get();
            document::set_language(&snapshot.language, snapshot.direction);
        });

        Self {
            ui,
            services: StoredValue::new_local(services),
            is_pwa: document::is_pwa(),
        }
    }

    pub fn services(&self) -> Rc<Services> {
        self.services.get_value()
    }

    /// 弹出错误通知
    pub fn error(&self, message: &str) {
        self.services().report_error(message);
    }

    pub fn success(&self, message: &str) {
        self.services().ui.show_success(message, Default::default());
    }

    pub fn dismiss(&self, id: &str) {
        self.services().ui.remove_notification(id);
    }
}

fn add_listener(event: &str, callback: impl Fn() + 'static) {
    let closure = Closure::<dyn Fn()>::new(callback);
    if let Some(window) = web_sys::window() {
        let _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    }
    // 监听器与页面同生命周期
    closure.forget();
}

fn listen_window(ui: &Rc<UiState>) {
    let weak = Rc::downgrade(ui);
    add_listener("resize", move || {
        if let Some(ui) = weak.upgrade() {
            ui.update_screen_size(document::inner_width());
        }
    });

    let weak = Rc::downgrade(ui);
    add_listener("online", move || {
        if let Some(ui) = weak.upgrade() {
            ui.set_offline_status(false);
        }
    });

    let weak = Rc::downgrade(ui);
    add_listener("offline", move || {
        if let Some(ui) = weak.upgrade() {
            ui.set_offline_status(true);
        }
    });
}

pub fn use_app() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
