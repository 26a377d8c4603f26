//! Rule Engine (§4.10): a registry of rules evaluated in registration order
//! against a minimal, injected view of shared state. A rule that panics is
//! isolated — logged and skipped — rather than taking the whole dispatch
//! down (§7, error kind 5: "programmer error in a rule").

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};

use riskd_config::Configuration;
use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::{OrderSide, Position};
use riskd_schemas::money::Micros;

use crate::clock::Clock;
use crate::lockout_manager::LockoutManager;
use crate::pnl_tracker::PnlTracker;
use crate::timer_wheel::TimerWheel;
use crate::unrealized_pnl::UnrealizedPnlCalculator;

/// §4.11 "Enforcement metadata carried by every violation".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    ClosePosition,
    CloseAll,
    CancelOrder,
    Cooldown,
    Flatten,
    PlaceStopLoss,
    PlaceTakeProfit,
    PlaceBracketOrder,
    AdjustTrailingStop,
    AlertOnly,
}

/// Concrete order instructions for automation rules (§4.11 rule 012), carried
/// alongside a `Violation` so the Enforcement Executor has everything it
/// needs without re-deriving entry/tick math.
#[derive(Debug, Clone)]
pub enum OrderDirective {
    PlaceStopLoss { contract_id: String, price: Micros, side: OrderSide, size: i64 },
    PlaceTakeProfit { contract_id: String, price: Micros, side: OrderSide, size: i64 },
    PlaceBracketOrder { contract_id: String, stop_price: Micros, target_price: Micros, side: OrderSide, size: i64 },
    AdjustTrailingStop { order_id: String, new_price: Micros },
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub rule: &'static str,
    pub account_id: String,
    pub symbol: Option<String>,
    pub contract_id: Option<String>,
    pub action: ActionKind,
    pub lockout_required: bool,
    pub cooldown_duration: Option<Duration>,
    pub next_unlock: Option<DateTime<Utc>>,
    pub message: String,
    pub order_directive: Option<OrderDirective>,
}

impl Violation {
    pub fn alert(rule: &'static str, account_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            account_id: account_id.into(),
            symbol: None,
            contract_id: None,
            action: ActionKind::AlertOnly,
            lockout_required: false,
            cooldown_duration: None,
            next_unlock: None,
            message: message.into(),
            order_directive: None,
        }
    }
}

/// Rolling trade counts for the account a `TradeExecuted` event belongs to
/// (§4.11 rule 006), pre-fetched from the Persistence Store at the runtime
/// boundary before dispatch — `Store`'s queries are async and `Rule::evaluate`
/// is not. `None` for every event rule 006 doesn't act on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeWindowCount {
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_session: u32,
}

/// The minimal view rules are granted (§4.10 point 4): current positions,
/// last-known prices (via `pnl_calc`), and the three injected state managers
/// they may consult or mutate. Rules never see each other.
pub struct RuleContext<'a> {
    pub clock: &'a dyn Clock,
    pub config: &'a Configuration,
    pub positions: &'a HashMap<String, Position>,
    pub pnl_calc: &'a UnrealizedPnlCalculator,
    pub lockouts: &'a mut LockoutManager,
    pub timers: &'a mut TimerWheel,
    pub pnl: &'a mut PnlTracker,
    pub trade_window_count: Option<TradeWindowCount>,
}

impl<'a> RuleContext<'a> {
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

pub trait Rule {
    fn id(&self) -> &'static str;
    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation>;
}

#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Dispatches `event` to every registered rule in registration order,
    /// collecting every violation (§4.10 point 3: all are surfaced, not just
    /// the first). A rule that panics contributes nothing and is logged.
    pub fn dispatch(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let mut all = Vec::new();
        for rule in self.rules.iter_mut() {
            let id = rule.id();
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(event, ctx)));
            match result {
                Ok(violations) => all.extend(violations),
                Err(_) => {
                    tracing::error!(rule = id, "rule evaluation panicked; isolating and continuing dispatch");
                }
            }
        }
        all
    }

    pub fn registered_rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}
