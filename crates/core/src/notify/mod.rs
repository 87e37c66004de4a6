use crate::ingest::resolver::ResolutionOutcome;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEMO_DATA_NOTICE: &str = "使用演示数据，请运行爬虫脚本获取真实数据";
pub const ALL_SOURCES_FAILED: &str = "加载数据失败：所有数据源都无法访问";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    #[serde(with = "duration_ms")]
    pub dismiss_after: Duration,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    active: Vec<Notification>,
    history: Vec<Notification>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    state: Arc<Mutex<State>>,
    dismiss_after: Duration,
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            dismiss_after,
        }
    }

    pub fn show(&self, level: Level, message: impl Into<String>) -> u64 {
        let notification = {
            let mut state = self.lock();
            state.next_id += 1;
            let n = Notification {
                id: state.next_id,
                level,
                message: message.into(),
                dismiss_after: self.dismiss_after,
            };
            state.active.push(n.clone());
            state.history.push(n.clone());
            n
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let notifier = self.clone();
                let id = notification.id;
                let delay = notification.dismiss_after;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    notifier.dismiss(id);
                });
            }
            Err(_) => tracing::debug!(id = notification.id, "no runtime; notification stays until dismissed"),
        }

        notification.id
    }

    pub fn dismiss(&self, id: u64) {
        self.lock().active.retain(|n| n.id != id);
    }

    pub fn active(&self) -> Vec<Notification> {
        self.lock().active.clone()
    }

    pub fn history(&self) -> Vec<Notification> {
        self.lock().history.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn report_outcome(outcome: &ResolutionOutcome, notifier: &Notifier) -> Option<u64> {
    if outcome.is_exhausted() {
        Some(notifier.show(Level::Error, ALL_SOURCES_FAILED))
    } else if outcome.degraded {
        Some(notifier.show(Level::Info, DEMO_DATA_NOTICE))
    } else {
        None
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
