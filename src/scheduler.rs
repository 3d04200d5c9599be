//! 延时任务调度
//!
//! 浏览器端由 `setTimeout` 驱动，测试中用 [`ManualScheduler`] 手动推进时间。

use std::time::Duration;

/// 已调度的任务句柄，drop 或 [`cancel`](ScheduledTask::cancel) 后回调不再执行
pub trait ScheduledTask {
    fn cancel(&self);
}

pub trait Scheduler {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Box<dyn ScheduledTask>;

    /// 当前时间 (Unix 毫秒)
    fn now_millis(&self) -> i64;
}

#[cfg(test)]
pub use manual::ManualScheduler;
