//! Rule 010 — Auth Loss Guard. Alert-only: surfaces broker connectivity and
//! authentication loss so an operator can intervene, but never mutates
//! positions, lockouts, or timers — the Rule Engine has no account context to
//! lock when the SDK itself isn't authenticated.

use riskd_schemas::events::RiskEvent;

use crate::rule_engine::{Rule, RuleContext, Violation};

const SYSTEM_ACCOUNT: &str = "__system__";

pub struct AuthLossGuardRule;

impl AuthLossGuardRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AuthLossGuardRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AuthLossGuardRule {
    fn id(&self) -> &'static str {
        "010_auth_loss_guard"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.auth_loss_guard;
        if !cfg.enabled {
            return vec![];
        }

        match event {
            RiskEvent::SdkDisconnected { reason, .. } => {
                vec![Violation::alert(self.id(), SYSTEM_ACCOUNT, format!("SDK disconnected: {reason}"))]
            }
            RiskEvent::AuthFailed { message, .. } => {
                vec![Violation::alert(self.id(), SYSTEM_ACCOUNT, format!("authentication failed: {message}"))]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_engine::riskd_config_test_fixture::sample_configuration;
    use chrono::Utc;
    use riskd_schemas::model::Position;
    use std::collections::HashMap;

    fn ctx_parts() -> (
        crate::clock::UtcClock,
        HashMap<String, Position>,
        crate::unrealized_pnl::UnrealizedPnlCalculator,
        crate::lockout_manager::LockoutManager,
        crate::timer_wheel::TimerWheel,
        crate::pnl_tracker::PnlTracker,
    ) {
        (
            crate::clock::UtcClock,
            HashMap::new(),
            crate::unrealized_pnl::UnrealizedPnlCalculator::new(HashMap::new()),
            crate::lockout_manager::LockoutManager::new(),
            crate::timer_wheel::TimerWheel::new(),
            crate::pnl_tracker::PnlTracker::new(
                chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                chrono_tz::America::New_York,
            ),
        )
    }

    #[test]
    fn sdk_disconnection_raises_an_alert() {
        let mut rule = AuthLossGuardRule::new();
        let config = sample_configuration();
        let (clock, positions, pnl_calc, mut lockouts, mut timers, mut pnl) = ctx_parts();
        let mut ctx = RuleContext {
            clock: &clock,
            config: &config,
            positions: &positions,
            pnl_calc: &pnl_calc,
            lockouts: &mut lockouts,
            timers: &mut timers,
            pnl: &mut pnl,
            trade_window_count: None,
        };
        let event = RiskEvent::SdkDisconnected { reason: "heartbeat timeout".into(), timestamp: Utc::now() };
        let violations = rule.evaluate(&event, &mut ctx);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, crate::rule_engine::ActionKind::AlertOnly);
    }

    #[test]
    fn ordinary_trading_events_are_ignored() {
        let mut rule = AuthLossGuardRule::new();
        let config = sample_configuration();
        let (clock, positions, pnl_calc, mut lockouts, mut timers, mut pnl) = ctx_parts();
        let mut ctx = RuleContext {
            clock: &clock,
            config: &config,
            positions: &positions,
            pnl_calc: &pnl_calc,
            lockouts: &mut lockouts,
            timers: &mut timers,
            pnl: &mut pnl,
            trade_window_count: None,
        };
        let event = RiskEvent::SdkConnected { timestamp: Utc::now() };
        assert!(rule.evaluate(&event, &mut ctx).is_empty());
    }
}
