use crate::domain::ports::SaveHandler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    pub debounce: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveEvent {
    Saved,
    Failed(String),
}

struct State<T> {
    latest: Option<T>,
    last_saved: Option<T>,
    pending: Option<JoinHandle<()>>,
}

struct Inner<T> {
    handler: Arc<dyn SaveHandler<T>>,
    state: Mutex<State<T>>,
    saving: AtomicBool,
    events: broadcast::Sender<AutoSaveEvent>,
}

impl<T> Inner<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn save(&self, data: T) {
        if self.saving.swap(true, Ordering::SeqCst) {
            tracing::debug!("Auto-save already in progress, skipping");
            return;
        }
        let _saving = SavingGuard(&self.saving);

        match self.handler.save(&data).await {
            Ok(()) => {
                self.lock().last_saved = Some(data);
                let _ = self.events.send(AutoSaveEvent::Saved);
                tracing::debug!("💾 Auto-saved");
            }
            Err(e) => {
                tracing::error!("❌ Auto-save failed: {}", e);
                let _ = self.events.send(AutoSaveEvent::Failed(e.to_string()));
            }
        }
    }
}

/// Clears the in-progress flag even when the handler panics.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Debounced saver for a value that changes over time. Must be used from
/// within a Tokio runtime.
pub struct AutoSaver<T> {
    inner: Arc<Inner<T>>,
    config: AutoSaveConfig,
}

impl<T> AutoSaver<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(handler: Arc<dyn SaveHandler<T>>, config: AutoSaveConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Inner {
                handler,
                state: Mutex::new(State {
                    latest: None,
                    last_saved: None,
                    pending: None,
                }),
                saving: AtomicBool::new(false),
                events,
            }),
            config,
        }
    }

    /// Records a new value and restarts the debounce timer. Values equal to
    /// the last saved one schedule nothing.
    pub fn update(&self, data: T) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.inner.lock();
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let unchanged = state.last_saved.as_ref() == Some(&data);
        state.latest = Some(data.clone());
        if unchanged {
            return;
        }

        let inner = self.inner.clone();
        let debounce = self.config.debounce;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // 存檔本身不可被之後的 update 取消
            tokio::spawn(async move { inner.save(data).await });
        }));
    }

    /// Cancels the pending timer and saves the latest value right away.
    pub async fn force_save(&self) {
        let data = {
            let mut state = self.inner.lock();
            if let Some(pending) = state.pending.take() {
                pending.abort();
            }
            state.latest.clone()
        };

        if let Some(data) = data {
            self.inner.save(data).await;
        }
    }

    pub fn is_saving(&self) -> bool {
        self.inner.saving.load(Ordering::SeqCst)
    }

    pub fn last_saved(&self) -> Option<T> {
        self.inner.lock().last_saved.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AutoSaveEvent> {
        self.inner.events.subscribe()
    }
}

impl<T> Drop for AutoSaver<T> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{BizError, Result};
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingHandler {
        saves: Mutex<Vec<i32>>,
        delay: Option<Duration>,
        fail: bool,
    }

    impl RecordingHandler {
        fn saves(&self) -> Vec<i32> {
            self.saves.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SaveHandler<i32> for RecordingHandler {
        async fn save(&self, data: &i32) -> Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(BizError::SaveError {
                    message: "backend unavailable".to_string(),
                });
            }
            self.saves.lock().unwrap().push(*data);
            Ok(())
        }
    }

    struct PanicOnceHandler {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl SaveHandler<i32> for PanicOnceHandler {
        async fn save(&self, _data: &i32) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("handler crashed");
            }
            Ok(())
        }
    }

    fn saver(handler: Arc<RecordingHandler>) -> AutoSaver<i32> {
        AutoSaver::new(handler, AutoSaveConfig::default())
    }

    async fn wait_past_debounce() {
        tokio::time::sleep(DEFAULT_DEBOUNCE + Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_updates_saves_once() {
        let handler = Arc::new(RecordingHandler::default());
        let saver = saver(handler.clone());

        saver.update(1);
        tokio::time::sleep(Duration::from_millis(500)).await;
        saver.update(2);
        saver.update(3);
        assert!(handler.saves().is_empty());

        wait_past_debounce().await;
        assert_eq!(handler.saves(), vec![3]);
        assert_eq!(saver.last_saved(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_data_is_not_saved_again() {
        let handler = Arc::new(RecordingHandler::default());
        let saver = saver(handler.clone());

        saver.update(7);
        wait_past_debounce().await;
        saver.update(7);
        wait_past_debounce().await;

        assert_eq!(handler.saves(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_save_skips_debounce() {
        let handler = Arc::new(RecordingHandler::default());
        let saver = saver(handler.clone());

        saver.update(5);
        saver.force_save().await;
        assert_eq!(handler.saves(), vec![5]);

        wait_past_debounce().await;
        assert_eq!(handler.saves(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_saver_does_nothing() {
        let handler = Arc::new(RecordingHandler::default());
        let saver = AutoSaver::new(
            handler.clone(),
            AutoSaveConfig {
                enabled: false,
                debounce: DEFAULT_DEBOUNCE,
            },
        );

        saver.update(1);
        wait_past_debounce().await;
        saver.force_save().await;
        assert!(handler.saves().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_reported() {
        let handler = Arc::new(RecordingHandler {
            fail: true,
            ..Default::default()
        });
        let saver = saver(handler.clone());
        let mut events = saver.subscribe();

        saver.update(9);
        saver.force_save().await;

        assert_eq!(saver.last_saved(), None);
        assert!(matches!(events.try_recv(), Ok(AutoSaveEvent::Failed(_))));
        assert!(!saver.is_saving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_save_is_skipped() {
        let handler = Arc::new(RecordingHandler {
            delay: Some(Duration::from_secs(1)),
            ..Default::default()
        });
        let saver = saver(handler.clone());

        saver.update(4);
        tokio::join!(saver.force_save(), saver.force_save());

        assert_eq!(handler.saves(), vec![4]);
        assert!(!saver.is_saving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_handler_does_not_block_later_saves() {
        let handler = Arc::new(PanicOnceHandler {
            calls: std::sync::atomic::AtomicUsize::new(0),
        });
        let saver = Arc::new(AutoSaver::new(handler, AutoSaveConfig::default()));

        saver.update(11);
        let crashed = {
            let saver = saver.clone();
            tokio::spawn(async move { saver.force_save().await }).await
        };
        assert!(crashed.is_err());
        assert!(!saver.is_saving());

        saver.force_save().await;
        assert_eq!(saver.last_saved(), Some(11));
    }
}
