//! Running resolvers on behalf of views
//!
//! Views call `Loader::load` with a slot and a future. The loader marks the
//! slot as loading, runs the future on the tokio runtime, and publishes the
//! result only if no newer load has been started for the same slot.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use ruea_core::events::events::{DataLoaded, FallbackUsed, LoadFailed};
use ruea_core::{EventBus, FacetSet, LoadSlot, RecordPage};

use crate::api::Summary;
use crate::resolve::{FacetResolution, ResolutionSource, StatsBatch, SummaryResolution};
use crate::RequestError;

/// Outcome of a load, ready to be stored in a slot
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    /// Size reported in `DataLoaded` events
    pub rows: usize,
    pub source: ResolutionSource,
    pub reason: Option<String>,
    pub error: Option<String>,
}

impl From<FacetResolution> for Loaded<FacetSet> {
    fn from(resolution: FacetResolution) -> Self {
        Loaded {
            rows: resolution.facets.value_count(),
            data: resolution.facets,
            source: resolution.source,
            reason: resolution.reason,
            error: resolution.error,
        }
    }
}

impl From<StatsBatch> for Loaded<StatsBatch> {
    fn from(batch: StatsBatch) -> Self {
        Loaded {
            rows: batch.item_count(),
            source: batch.source,
            reason: batch.reason.clone(),
            error: batch.error.clone(),
            data: batch,
        }
    }
}

impl From<SummaryResolution> for Loaded<Summary> {
    fn from(resolution: SummaryResolution) -> Self {
        Loaded {
            rows: resolution.summary.total as usize,
            data: resolution.summary,
            source: resolution.source,
            reason: resolution.reason,
            error: resolution.error,
        }
    }
}

impl From<Result<RecordPage, RequestError>> for Loaded<RecordPage> {
    fn from(result: Result<RecordPage, RequestError>) -> Self {
        match result {
            Ok(page) => Loaded {
                rows: page.items.len(),
                data: page,
                source: ResolutionSource::Server,
                reason: None,
                error: None,
            },
            Err(e) => Loaded {
                rows: 0,
                data: RecordPage::default(),
                source: ResolutionSource::Degraded,
                reason: None,
                error: Some(e.to_string()),
            },
        }
    }
}

type Repaint = Arc<dyn Fn() + Send + Sync>;

/// Spawns loads and publishes their outcome
#[derive(Clone)]
pub struct Loader {
    runtime: Handle,
    events: Arc<EventBus>,
    repaint: Option<Repaint>,
}

impl Loader {
    pub fn new(runtime: Handle, events: Arc<EventBus>) -> Self {
        Self {
            runtime,
            events,
            repaint: None,
        }
    }

    /// Callback run after every finished load, accepted or not
    pub fn with_repaint(mut self, repaint: impl Fn() + Send + Sync + 'static) -> Self {
        self.repaint = Some(Arc::new(repaint));
        self
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Start a load into `slot`, superseding any load still in flight.
    ///
    /// The returned handle resolves to whether the result was stored.
    pub fn load<T, F>(&self, view: &str, slot: &Arc<LoadSlot<T>>, work: F) -> JoinHandle<bool>
    where
        T: Send + Sync + 'static,
        F: Future + Send + 'static,
        F::Output: Into<Loaded<T>>,
    {
        let token = slot.begin();
        let slot = slot.clone();
        let events = self.events.clone();
        let repaint = self.repaint.clone();
        let view = view.to_string();

        tracing::debug!(view = %view, request = token.id(), "Load started");

        self.runtime.spawn(async move {
            let accepted = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(output) => {
                    let Loaded {
                        data,
                        rows,
                        source,
                        reason,
                        error,
                    } = output.into();

                    let accepted = slot.finish(&token, data, error.clone());
                    if accepted {
                        if let (true, Some(reason)) = (source.is_fallback(), reason) {
                            events.publish(FallbackUsed {
                                view: view.clone(),
                                reason,
                            });
                        }

                        match error {
                            Some(error) => events.publish(LoadFailed { view, error }),
                            None => events.publish(DataLoaded { view, rows }),
                        }
                    }
                    accepted
                }
                Err(panic) => {
                    let error = format!("Load panicked: {}", panic_message(panic.as_ref()));
                    tracing::error!(view = %view, "{}", error);
                    let accepted = slot.fail(&token, error.clone());
                    if accepted {
                        events.publish(LoadFailed { view, error });
                    }
                    accepted
                }
            };

            if let Some(repaint) = repaint {
                repaint();
            }
            accepted
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown cause"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruea_core::{handler_from_fn, Event};
    use parking_lot::Mutex;

    fn recording_bus() -> (Arc<EventBus>, Arc<Mutex<Vec<String>>>) {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<DataLoaded>(handler_from_fn(move |event: &dyn Event| sink.lock().push(event.describe())));
        let sink = seen.clone();
        bus.subscribe::<LoadFailed>(handler_from_fn(move |event: &dyn Event| sink.lock().push(event.describe())));
        let sink = seen.clone();
        bus.subscribe::<FallbackUsed>(handler_from_fn(move |event: &dyn Event| sink.lock().push(event.describe())));

        (bus, seen)
    }

    #[tokio::test]
    async fn test_successful_load_publishes_data_loaded() {
        let (bus, seen) = recording_bus();
        let loader = Loader::new(Handle::current(), bus);
        let slot: Arc<LoadSlot<RecordPage>> = Arc::new(LoadSlot::default());

        let page = RecordPage::new(10, vec![ruea_core::Record::new(); 2]);
        let accepted = loader
            .load("General", &slot, async move { Ok::<_, RequestError>(page) })
            .await
            .unwrap();

        assert!(accepted);
        assert_eq!(slot.data().total_count, 10);
        assert!(!slot.is_loading());
        assert_eq!(*seen.lock(), vec!["General: 2 row(s) loaded".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_empty_data_and_error() {
        let (bus, seen) = recording_bus();
        let loader = Loader::new(Handle::current(), bus);
        let slot: Arc<LoadSlot<RecordPage>> = Arc::new(LoadSlot::default());

        loader
            .load("General", &slot, async {
                Err::<RecordPage, _>(RequestError::Status { status: 500, detail: None })
            })
            .await
            .unwrap();

        let state = slot.snapshot();
        assert!(state.data.is_empty());
        assert_eq!(state.error.as_deref(), Some("HTTP 500"));
        assert_eq!(*seen.lock(), vec!["General: HTTP 500".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_is_announced() {
        let (bus, seen) = recording_bus();
        let loader = Loader::new(Handle::current(), bus);
        let slot: Arc<LoadSlot<FacetSet>> = Arc::new(LoadSlot::default());

        let resolution = FacetResolution {
            facets: FacetSet::empty().with(ruea_core::FilterField::Sexo, vec!["f".into()]),
            source: ResolutionSource::Fallback,
            reason: Some("HTTP 404".into()),
            error: None,
        };
        loader.load("Filtros", &slot, async move { resolution }).await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                "Filtros: computed client-side (HTTP 404)".to_string(),
                "Filtros: 1 row(s) loaded".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_load_ends_with_an_error() {
        let (bus, seen) = recording_bus();
        let loader = Loader::new(Handle::current(), bus);
        let slot: Arc<LoadSlot<RecordPage>> = Arc::new(LoadSlot::default());

        let accepted = loader
            .load("General", &slot, async {
                let pages: Vec<RecordPage> = Vec::new();
                Ok::<_, RequestError>(pages.into_iter().next().expect("no pages"))
            })
            .await
            .unwrap();

        assert!(accepted);
        let state = slot.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Load panicked: no pages"));
        assert_eq!(*seen.lock(), vec!["General: Load panicked: no pages".to_string()]);
    }
}
