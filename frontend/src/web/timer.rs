//! 定时器封装模块
//!
//! 一次性任务走 `gloo-timers`，实现核心库的 [`Scheduler`]。

use giftdesk::scheduler::{ScheduledTask, Scheduler};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::time::Duration;

/// `setTimeout` 句柄，drop 时清除
struct TimeoutTask(RefCell<Option<Timeout>>);

impl ScheduledTask for TimeoutTask {
    fn cancel(&self) {
        if let Some(timeout) = self.0.borrow_mut().take() {
            timeout.cancel();
        }
    }
}

/// 浏览器调度器
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn ScheduledTask> {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, callback);
        Box::new(TimeoutTask(RefCell::new(Some(timeout))))
    }

    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
