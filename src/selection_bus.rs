use crate::record::Position;

/// A cross-view selection change. One view publishes, any number of
/// registered views react — no shared global state in between.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Position(Position),
    Club(String),
    Metric(String),
    Cleared,
}

type Subscriber = Box<dyn FnMut(&SelectionEvent)>;

/// In-process event bus for selection changes. Delivery is at-most-once
/// per subscriber per emission; invocation order across subscribers is
/// unspecified. The pipeline is single-threaded, so dispatch is a plain
/// synchronous call chain.
#[derive(Default)]
pub struct SelectionBus {
    subscribers: Vec<Subscriber>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) {
        self.subscribers.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: &SelectionEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
