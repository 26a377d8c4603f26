//! Event Bus (§4.9): typed in-process pub/sub over `RiskEvent`.
//!
//! Built on `tokio::sync::broadcast`, the same primitive the daemon's own
//! internal bus (`BusMsg`) uses — each subscriber gets its own receiver and
//! runs in its own task, so one subscriber's panic never stops another's
//! delivery. Default capacity matches the backpressure threshold in §5: if
//! the slowest subscriber falls more than 1024 events behind, it sees
//! `RecvError::Lagged` and must resync rather than block publishers.

use tokio::sync::broadcast;

use riskd_schemas::events::RiskEvent;

pub const EVENT_BUS_CAPACITY: usize = 1024;

pub struct EventBus {
    sender: broadcast::Sender<RiskEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _rx) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RiskEvent> {
        self.sender.subscribe()
    }

    /// Best-effort: if there are no subscribers, the send is a no-op rather
    /// than an error (§4.9 "best-effort in-process; no persistence").
    pub fn publish(&self, event: RiskEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
