use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use spotprice_core::{Marketprice, PriceSource, SpotError};

/// Instruction for how a fetch should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(SpotError),
    /// Hang indefinitely (simulate a stalled provider).
    Hang,
}

#[derive(Default)]
struct InternalState {
    // one-shot behaviors consumed in order before `fallback`
    script: VecDeque<MockBehavior<Vec<Marketprice>>>,
    fallback: Option<MockBehavior<Vec<Marketprice>>>,
    fetches: usize,
}

/// Controller handle used by tests to drive a [`MockSource`] from the outside.
#[derive(Clone)]
pub struct MockController {
    state: Arc<Mutex<InternalState>>,
}

impl MockController {
    /// Set the behavior used whenever no scripted behavior is queued.
    pub async fn set_behavior(&self, behavior: MockBehavior<Vec<Marketprice>>) {
        self.state.lock().await.fallback = Some(behavior);
    }

    /// Queue a behavior for exactly one upcoming fetch.
    pub async fn push_behavior(&self, behavior: MockBehavior<Vec<Marketprice>>) {
        self.state.lock().await.script.push_back(behavior);
    }

    /// Number of fetches started so far, including hanging ones.
    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetches
    }

    /// Clear all configured behaviors and reset the fetch counter.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.script.clear();
        guard.fallback = None;
        guard.fetches = 0;
    }
}

/// A price source that defers all behavior to an external controller.
pub struct MockSource {
    name: String,
    market_area: String,
    duration: u32,
    state: Arc<Mutex<InternalState>>,
}

impl MockSource {
    /// Create a new mock source and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &str,
        market_area: &str,
    ) -> (Arc<dyn PriceSource>, MockController) {
        Self::with_duration(name, market_area, 60)
    }

    /// Like [`MockSource::new_with_controller`] with an explicit interval length in minutes.
    #[must_use]
    pub fn with_duration(
        name: &str,
        market_area: &str,
        duration: u32,
    ) -> (Arc<dyn PriceSource>, MockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = MockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name: name.to_string(),
            market_area: market_area.to_string(),
            duration,
            state,
        });
        (me as Arc<dyn PriceSource>, controller)
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn market_area(&self) -> &str {
        &self.market_area
    }

    fn duration(&self) -> u32 {
        self.duration
    }

    async fn fetch_marketdata(&self) -> Result<Vec<Marketprice>, SpotError> {
        // Snapshot the behavior without holding the lock across the await below
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.fetches += 1;
            guard.script.pop_front().or_else(|| guard.fallback.clone())
        };

        match behavior {
            Some(MockBehavior::Return(series)) => Ok(series),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(SpotError::fetch(&self.name, "no mock behavior configured")),
        }
    }
}
