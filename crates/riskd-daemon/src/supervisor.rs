//! Runtime Supervisor (§4.13): owns the startup order — Persistence Store →
//! Timer Wheel → Lockout Manager (with DB recovery) → P&L Tracker → Event
//! Bus → Event Router (SDK subscriptions last) → Rule Engine (load rules) →
//! Heartbeat — and the runtime boundary where `riskd-db` is actually
//! awaited. Shutdown reverses. Emits one-line post-condition diagnostics for
//! SDK-connected, event-subscriptions-registered, rules-loaded, and
//! database-connected.
//!
//! Rule evaluation itself stays synchronous (§5): this module is the only
//! place that awaits anything, bridging the synchronous `riskd-core` pipeline
//! to the store and the enforcement executor.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;

use riskd_config::Configuration;
use riskd_core::{
    daytime::{current_trading_day, current_trading_day_start}, rules::default_rule_set, Clock,
    EventBus, EventRouter, LockoutManager, PnlTracker, ProtectiveOrders, RuleContext, RuleEngine,
    TimerWheel, TrackedPosition, TradeWindowCount, UnrealizedPnlCalculator, UtcClock, Violation,
};
use riskd_db::Store;
use riskd_execution::EnforcementExecutor;
use riskd_schemas::events::BrokerEvent;
use riskd_schemas::model::{Trade, UnlockCondition};
use riskd_schemas::money::Micros;

use crate::dry_run::scripted_sequence;

/// A broker adapter the supervisor can drive. In this build only the
/// simulated paper broker is wired in (§1 "the broker SDK itself ... is
/// assumed", out of scope to implement); a live vendor adapter would plug in
/// at this same `BrokerAdapter` seam without changing anything above it.
pub type Broker = riskd_broker_sim::PaperBroker;

pub struct Supervisor {
    store: Store,
    timers: TimerWheel,
    lockouts: LockoutManager,
    pnl: PnlTracker,
    pnl_calc: UnrealizedPnlCalculator,
    bus: EventBus,
    router: EventRouter,
    engine: RuleEngine,
    executor: EnforcementExecutor<Broker>,
    config: Configuration,
    clock: UtcClock,
    reset_time: NaiveTime,
    reset_tz: Tz,
    positions: HashMap<String, riskd_schemas::model::Position>,
}

#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub risk_event_dispatched: bool,
    pub outcomes: Vec<riskd_execution::EnforcementOutcome>,
}

impl Supervisor {
    /// Startup order per §4.13. `broker` is the adapter the Enforcement
    /// Executor will dispatch through — the paper broker for dry-run mode
    /// and for every build of this system today.
    pub async fn boot(config: Configuration, db_path: &std::path::Path, broker: Broker) -> anyhow::Result<Self> {
        let store = Store::connect(db_path).await?;
        store.migrate().await?;
        tracing::info!("post-condition: database-connected");

        let mut timers = TimerWheel::new();

        let mut lockouts = LockoutManager::new();
        let rows = store.load_active_lockouts().await?;
        let clock = UtcClock;
        let expired_on_load = lockouts.load_from_rows(&mut timers, &clock, rows);
        for account_id in &expired_on_load {
            store.clear_lockout(account_id).await?;
        }

        let reset_time = NaiveTime::parse_from_str(&config.timers.daily_reset.time, "%H:%M")
            .map_err(|e| anyhow::anyhow!("CONFIG_INVALID_RESET_TIME: {e}"))?;
        let reset_tz = Tz::from_str(&config.timers.daily_reset.timezone)
            .map_err(|_| anyhow::anyhow!("CONFIG_INVALID_TIMEZONE: {}", config.timers.daily_reset.timezone))?;
        let pnl = PnlTracker::new(reset_time, reset_tz);

        let pnl_calc = UnrealizedPnlCalculator::new(config.general.symbols.clone());

        let bus = EventBus::new();
        let router = EventRouter::new();
        tracing::info!("post-condition: event-subscriptions-registered");

        let mut engine = RuleEngine::new();
        for rule in default_rule_set() {
            engine.register(rule);
        }
        tracing::info!(rules = ?engine.registered_rule_ids(), "post-condition: rules-loaded");

        let executor = EnforcementExecutor::new(broker);

        tracing::info!("post-condition: sdk-connected (simulated)");

        Ok(Supervisor {
            store,
            timers,
            lockouts,
            pnl,
            pnl_calc,
            bus,
            router,
            engine,
            executor,
            config,
            clock: UtcClock,
            reset_time,
            reset_tz,
            positions: HashMap::new(),
        })
    }

    pub fn halt(&mut self) {
        self.executor.halt();
    }

    pub fn arm(&mut self) {
        self.executor.arm();
    }

    pub fn is_armed(&self) -> bool {
        self.executor.is_armed()
    }

    pub fn active_lockout_count(&self) -> usize {
        self.config
            .accounts
            .monitored_account
            .iter()
            .filter(|a| self.lockouts.is_locked_out(&a.account_id, &self.clock))
            .count()
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<riskd_schemas::events::RiskEvent> {
        self.bus.subscribe()
    }

    /// Drives the scripted dry-run tour through the whole pipeline against
    /// the simulated broker (§4.13 "dry-run mode").
    pub async fn run_dry_run(&mut self, account_id: &str, contract_id: &str) -> anyhow::Result<Vec<DispatchReport>> {
        let events = scripted_sequence(account_id, contract_id, self.clock.now());
        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            reports.push(self.process_broker_event(event).await?);
        }
        Ok(reports)
    }

    /// Routes one raw broker event through dedup/enrichment, publishes the
    /// resulting `RiskEvent` on the bus, dispatches it to the rule engine,
    /// and sends any violations through the Enforcement Executor.
    pub async fn process_broker_event(&mut self, raw: BrokerEvent) -> anyhow::Result<DispatchReport> {
        let now = self.clock.now();
        let symbols = self.config.general.symbols.clone();
        let symbol_root_of = |contract_id: &str| -> String {
            symbols
                .keys()
                .find(|root| contract_id.contains(root.as_str()))
                .cloned()
                .unwrap_or_else(|| "UNKNOWN".to_string())
        };

        let risk_event = self.router.route(
            raw,
            now,
            symbol_root_of,
            ProtectiveOrders::default,
            &self.pnl_calc,
        );

        let Some(risk_event) = risk_event else {
            return Ok(DispatchReport { risk_event_dispatched: false, outcomes: vec![] });
        };

        self.apply_position_side_effects(&risk_event).await?;
        self.bus.publish(risk_event.clone());

        // Rules that read realized P&L (003/007/013) match both `PositionClosed`
        // and `TradeExecuted` so they can be driven by whichever event a given
        // deployment emits it on. Here both are always emitted for the same
        // close, so the copy dispatched to the rule engine has its pnl field
        // cleared — the synthesized `TradeExecuted` below is the sole carrier
        // of realized P&L into the engine, keeping `PnlTracker` additions
        // single-counted. Rules 008/012 only key off the contract id, so they
        // still fire correctly from this cleared copy.
        let dispatched_close = match &risk_event {
            riskd_schemas::events::RiskEvent::PositionClosed { realized_pnl: Some(_), .. } => {
                let mut cleared = risk_event.clone();
                if let riskd_schemas::events::RiskEvent::PositionClosed { realized_pnl, .. } = &mut cleared {
                    *realized_pnl = None;
                }
                cleared
            }
            _ => risk_event.clone(),
        };
        let mut violations = self.dispatch_to_rules(&dispatched_close).await?;

        if let riskd_schemas::events::RiskEvent::PositionClosed { realized_pnl: Some(pnl), account_id, .. } = &risk_event {
            if let Some(trade_event) = self.synthesize_trade(&risk_event, *pnl, account_id.clone(), now).await? {
                violations.extend(self.dispatch_to_rules(&trade_event).await?);
                self.bus.publish(trade_event);
            }
        }

        self.persist_lockouts(&violations).await?;
        let outcomes = self.executor.dispatch_all(&violations);
        Ok(DispatchReport { risk_event_dispatched: true, outcomes })
    }

    /// Rule 006 counts trades from the Persistence Store rather than
    /// rule-local memory (§4.11 rule 006 detail), so on a `TradeExecuted`
    /// event the store is queried here — the one place this crate awaits
    /// anything — before the synchronous rule dispatch runs.
    async fn dispatch_to_rules(&mut self, event: &riskd_schemas::events::RiskEvent) -> anyhow::Result<Vec<Violation>> {
        let trade_window_count = match event {
            riskd_schemas::events::RiskEvent::TradeExecuted { trade, .. } => {
                Some(self.trade_window_count(&trade.account_id, self.clock.now()).await?)
            }
            _ => None,
        };

        let mut ctx = RuleContext {
            clock: &self.clock,
            config: &self.config,
            positions: &self.positions,
            pnl_calc: &self.pnl_calc,
            lockouts: &mut self.lockouts,
            timers: &mut self.timers,
            pnl: &mut self.pnl,
            trade_window_count,
        };
        Ok(self.engine.dispatch(event, &mut ctx))
    }

    async fn trade_window_count(&self, account_id: &str, now: chrono::DateTime<Utc>) -> anyhow::Result<TradeWindowCount> {
        let per_minute = self.store.get_trades_in_window(account_id, 60).await?.len() as u32;
        let per_hour = self.store.get_trades_in_window(account_id, 3600).await?.len() as u32;
        let session_start = current_trading_day_start(self.reset_tz, self.reset_time, now);
        let per_session = self.store.get_session_trade_count(account_id, session_start).await? as u32;
        Ok(TradeWindowCount { per_minute, per_hour, per_session })
    }

    async fn apply_position_side_effects(&mut self, event: &riskd_schemas::events::RiskEvent) -> anyhow::Result<()> {
        use riskd_schemas::events::RiskEvent;
        match event {
            RiskEvent::PositionOpened { position, .. } | RiskEvent::PositionUpdated { position, .. } => {
                self.positions.insert(position.contract_id.clone(), position.clone());
                self.pnl_calc.update_position(
                    &position.contract_id,
                    TrackedPosition {
                        entry_price: position.avg_entry_price,
                        size: position.size,
                        side: if position.size >= 0 { riskd_schemas::model::OrderSide::Buy } else { riskd_schemas::model::OrderSide::Sell },
                        symbol: position.symbol_root.clone(),
                        opened_at: position.opened_at,
                    },
                );
                self.store.upsert_position_snapshot(position).await?;
            }
            RiskEvent::PositionClosed { contract_id, .. } => {
                self.positions.remove(contract_id);
                self.pnl_calc.remove_position(contract_id);
                self.store.remove_position_snapshot(contract_id).await?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn synthesize_trade(
        &mut self,
        closed: &riskd_schemas::events::RiskEvent,
        realized_pnl: Micros,
        account_id: String,
        now: chrono::DateTime<Utc>,
    ) -> anyhow::Result<Option<riskd_schemas::events::RiskEvent>> {
        let riskd_schemas::events::RiskEvent::PositionClosed { contract_id, symbol_root, side, exit_price, .. } = closed else {
            return Ok(None);
        };
        let Some(price) = exit_price else { return Ok(None) };

        let trade = Trade {
            trade_id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.clone(),
            contract_id: contract_id.clone(),
            symbol: symbol_root.clone(),
            side: *side,
            quantity: 1,
            price: *price,
            realized_pnl: Some(realized_pnl),
            timestamp: now,
        };
        self.store.add_trade(&trade).await?;

        let day = current_trading_day(self.reset_tz, self.reset_time, now);
        self.store.add_realized_pnl(&account_id, day, realized_pnl).await?;
        // Booked here, once, so rules 003/007/013 — all of which match this
        // same `TradeExecuted` event — can safely read `PnlTracker` instead
        // of each adding to it themselves.
        self.pnl.add_trade_pnl(&account_id, realized_pnl, now);

        Ok(Some(riskd_schemas::events::RiskEvent::TradeExecuted { trade, timestamp: now }))
    }

    /// A violation that requires a lockout is persisted durably so it
    /// survives a restart (§4.3). The concrete `UnlockCondition` is inferred
    /// from the fields a `Violation` carries — rules don't expose their own
    /// `UnlockCondition` directly, only a duration or an absolute unlock time.
    async fn persist_lockouts(&mut self, violations: &[Violation]) -> anyhow::Result<()> {
        for v in violations {
            if !v.lockout_required {
                continue;
            }
            let unlock_condition = match (v.cooldown_duration, v.next_unlock) {
                (Some(_), _) => UnlockCondition::AfterDuration,
                (None, Some(_)) => UnlockCondition::UntilDailyReset,
                (None, None) => UnlockCondition::Permanent,
            };
            let lockout = self.lockouts.set_lockout(
                &mut self.timers,
                &v.account_id,
                v.rule,
                &v.message,
                v.next_unlock,
                unlock_condition,
                self.clock.now(),
            );
            self.store
                .set_lockout(
                    &lockout.account_id,
                    &lockout.reason,
                    &lockout.rule_id,
                    lockout.expires_at,
                    lockout.unlock_condition.clone(),
                )
                .await?;
        }
        Ok(())
    }
}
