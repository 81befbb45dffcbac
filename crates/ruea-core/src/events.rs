use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// System-wide event bus
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;

    /// One-line description for status displays
    fn describe(&self) -> String;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common dashboard events
pub mod events {
    use super::Event;
    use crate::filters::FilterSet;

    /// The active filters changed
    #[derive(Debug, Clone)]
    pub struct FiltersChanged {
        pub view: String,
        pub filters: FilterSet,
    }

    /// A view finished loading
    #[derive(Debug, Clone)]
    pub struct DataLoaded {
        pub view: String,
        pub rows: usize,
    }

    /// A resolver switched to its client-side fallback
    #[derive(Debug, Clone)]
    pub struct FallbackUsed {
        pub view: String,
        pub reason: String,
    }

    /// A view could not load its data
    #[derive(Debug, Clone)]
    pub struct LoadFailed {
        pub view: String,
        pub error: String,
    }

    impl Event for FiltersChanged {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn describe(&self) -> String {
            format!("{}: {} active filter(s)", self.view, self.filters.len())
        }
    }

    impl Event for DataLoaded {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn describe(&self) -> String {
            format!("{}: {} row(s) loaded", self.view, self.rows)
        }
    }

    impl Event for FallbackUsed {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn describe(&self) -> String {
            format!("{}: computed client-side ({})", self.view, self.reason)
        }
    }

    impl Event for LoadFailed {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn describe(&self) -> String {
            format!("{}: {}", self.view, self.error)
        }
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::{DataLoaded, LoadFailed};

    #[test]
    fn test_handlers_receive_only_their_type() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<LoadFailed>(handler_from_fn(move |event| {
            sink.lock().push(event.describe());
        }));

        bus.publish(DataLoaded { view: "General".into(), rows: 3 });
        bus.publish(LoadFailed { view: "General".into(), error: "HTTP 500".into() });

        assert_eq!(*seen.lock(), vec!["General: HTTP 500".to_string()]);
    }

    #[test]
    fn test_downcast_from_handler() {
        let bus = EventBus::new();
        let rows = Arc::new(Mutex::new(0usize));

        let sink = rows.clone();
        bus.subscribe::<DataLoaded>(handler_from_fn(move |event| {
            if let Some(loaded) = event.as_any().downcast_ref::<DataLoaded>() {
                *sink.lock() += loaded.rows;
            }
        }));

        bus.publish(DataLoaded { view: "General".into(), rows: 3 });
        bus.publish(DataLoaded { view: "General".into(), rows: 4 });
        assert_eq!(*rows.lock(), 7);
    }
}
