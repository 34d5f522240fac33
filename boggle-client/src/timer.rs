//! 回合计时
//!
//! 每 [`TIMER_TICK`] 刷新一次显示，时间到后执行回调。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use protocol::TIMER_TICK;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::display::GameDisplay;

/// 一轮的时钟
#[derive(Debug, Clone, Copy)]
pub struct RoundClock {
    started: Instant,
    duration: Duration,
}

impl RoundClock {
    pub fn start(duration: Duration) -> Self {
        Self {
            started: Instant::now(),
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed().min(self.duration)
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.started.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.duration
    }
}

/// 后台计时任务，丢弃时取消
pub struct ClockTask {
    handle: JoinHandle<()>,
}

impl ClockTask {
    /// 启动计时，时间到后执行 `on_expire`
    pub fn spawn<F, Fut>(duration: Duration, display: Arc<dyn GameDisplay>, on_expire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let clock = RoundClock::start(duration);
            let mut ticker = tokio::time::interval(TIMER_TICK);
            loop {
                ticker.tick().await;
                display.show_timer(clock.elapsed(), clock.duration());
                if clock.is_expired() {
                    break;
                }
            }
            on_expire().await;
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for ClockTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
