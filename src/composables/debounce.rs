//! 防抖与节流

use crate::scheduler::{ScheduledTask, Scheduler};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// 防抖：静默 `delay` 之后只执行最后一次调用
pub struct Debounce<T> {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    callback: Rc<dyn Fn(T)>,
    pending: RefCell<Option<Box<dyn ScheduledTask>>>,
}

impl<T: 'static> Debounce<T> {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay: Duration, callback: impl Fn(T) + 'static) -> Self {
        Self {
            scheduler,
            delay,
            callback: Rc::new(callback),
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self, arg: T) {
        let callback = self.callback.clone();
        let task = self
            .scheduler
            .schedule(self.delay, Box::new(move || callback(arg)));
        // 替换旧任务即取消它
        let previous = self.pending.replace(Some(task));
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    pub fn cancel(&self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
        }
    }
}

/// 节流：`delay` 窗口内只放行第一次调用
pub struct Throttle<T> {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    callback: Box<dyn Fn(T)>,
    last_call: Cell<Option<i64>>,
}

impl<T> Throttle<T> {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay: Duration, callback: impl Fn(T) + 'static) -> Self {
        Self {
            scheduler,
            delay,
            callback: Box::new(callback),
            last_call: Cell::new(None),
        }
    }

    /// 返回本次调用是否被执行
    pub fn call(&self, arg: T) -> bool {
        let now = self.scheduler.now_millis();
        if let Some(last) = self.last_call.get() {
            if now - last < self.delay.as_millis() as i64 {
                return false;
            }
        }
        self.last_call.set(Some(now));
        (self.callback)(arg);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    #[test]
    fn debounce_keeps_last_call() {
        let clock = ManualScheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let search = Debounce::new(clock.clone(), DEFAULT_DEBOUNCE, move |q: String| {
            sink.borrow_mut().push(q)
        });

        search.call("f".into());
        clock.advance(Duration::from_millis(100));
        search.call("fa".into());
        clock.advance(Duration::from_millis(299));
        assert!(seen.borrow().is_empty());
        clock.advance(Duration::from_millis(1));
        assert_eq!(*seen.borrow(), vec!["fa".to_string()]);

        search.call("fal".into());
        search.cancel();
        clock.advance(Duration::from_secs(1));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn throttle_passes_leading_call() {
        let clock = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let scroll = Throttle::new(clock.clone(), DEFAULT_THROTTLE, move |_: ()| {
            counter.set(counter.get() + 1)
        });

        assert!(scroll.call(()));
        assert!(!scroll.call(()));
        clock.advance(Duration::from_millis(99));
        assert!(!scroll.call(()));
        clock.advance(Duration::from_millis(1));
        assert!(scroll.call(()));
        assert_eq!(hits.get(), 2);
    }
}
