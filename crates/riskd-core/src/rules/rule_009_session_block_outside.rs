//! Rule 009 — Session Block Outside. Hard lockout: any trading activity
//! observed outside the configured session hours locks the account until the
//! next session start, DST-aware (§4.11 rule 009 detail, `daytime::next_session_start`).

use std::str::FromStr;

use chrono::NaiveTime;
use chrono_tz::Tz;

use riskd_schemas::events::RiskEvent;
use riskd_schemas::model::UnlockCondition;

use crate::daytime::{is_within_session, next_session_start};
use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct SessionBlockOutsideRule;

impl SessionBlockOutsideRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SessionBlockOutsideRule {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

fn parse_tz(s: &str) -> Tz {
    Tz::from_str(s).unwrap_or(chrono_tz::UTC)
}

impl Rule for SessionBlockOutsideRule {
    fn id(&self) -> &'static str {
        "009_session_block_outside"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.session_block_outside;
        if !cfg.enabled {
            return vec![];
        }

        let account_id = match event.account_id() {
            Some(id) => id.to_string(),
            None => return vec![],
        };
        // Connection-state and alert-only events carry no trading activity.
        if matches!(
            event,
            RiskEvent::SdkConnected { .. } | RiskEvent::SdkDisconnected { .. } | RiskEvent::AuthFailed { .. }
        ) {
            return vec![];
        }

        let hours = &ctx.config.timers.session_hours;
        let tz = parse_tz(&hours.timezone);
        let start = parse_time(&hours.start);
        let end = parse_time(&hours.end);
        let now = ctx.now();
        let holidays = &ctx.config.timers.holidays.list;

        if is_within_session(tz, start, end, cfg.block_weekends, cfg.respect_holidays, holidays, now) {
            return vec![];
        }

        if let Some(existing) = ctx.lockouts.get_lockout_info(&account_id) {
            if existing.active && existing.rule_id == self.id() {
                return vec![];
            }
        }

        let effective_holidays: &[chrono::NaiveDate] = if cfg.respect_holidays { holidays } else { &[] };
        let unlock_at = next_session_start(tz, start, cfg.block_weekends, effective_holidays, now);

        ctx.lockouts.set_lockout(
            ctx.timers,
            &account_id,
            self.id(),
            "trading activity outside configured session hours",
            Some(unlock_at),
            UnlockCondition::UntilSessionStart,
            now,
        );

        vec![Violation {
            rule: self.id(),
            account_id,
            symbol: None,
            contract_id: None,
            action: ActionKind::CloseAll,
            lockout_required: true,
            cooldown_duration: None,
            next_unlock: Some(unlock_at),
            message: "trading activity outside configured session hours".to_string(),
            order_directive: None,
        }]
    }
}
