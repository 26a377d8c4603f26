//! riskd-core
//!
//! The synchronous risk-enforcement core: injectable clock, timer wheel,
//! lockout manager, P&L tracking, the event pipeline (dedup, enrichment,
//! correlation), the event bus, and the thirteen risk rules dispatched
//! through the rule engine.
//!
//! Everything in this crate is synchronous. Persistence (`riskd-db`) is only
//! awaited at the runtime boundary — startup recovery and post-dispatch
//! writes — never from inside a rule's `evaluate`.

pub mod clock;
pub mod daytime;
pub mod dedup;
pub mod event_bus;
pub mod event_router;
pub mod lockout_manager;
pub mod order_correlator;
pub mod pnl_tracker;
pub mod protective_order_cache;
pub mod rule_engine;
pub mod rules;
pub mod timer_wheel;
pub mod unrealized_pnl;

pub use clock::{Clock, UtcClock};
pub use dedup::DedupCache;
pub use event_bus::EventBus;
pub use event_router::EventRouter;
pub use lockout_manager::LockoutManager;
pub use order_correlator::OrderCorrelator;
pub use pnl_tracker::PnlTracker;
pub use protective_order_cache::{ProtectiveOrderCache, ProtectiveOrders};
pub use rule_engine::{ActionKind, OrderDirective, Rule, RuleContext, RuleEngine, TradeWindowCount, Violation};
pub use timer_wheel::{TimerPurpose, TimerWheel};
pub use unrealized_pnl::{TrackedPosition, UnrealizedPnlCalculator};
