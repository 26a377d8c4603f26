//! Rule 001 — Max Contracts (account). Trade-by-trade: close one position.
//!
//! When `per_instrument` is set, this rule defers entirely to rule 002 — the
//! account-wide sum is not enforced so the two rules never double-count the
//! same breach.

use riskd_schemas::events::RiskEvent;

use crate::rule_engine::{ActionKind, Rule, RuleContext, Violation};

pub struct MaxContractsRule;

impl MaxContractsRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MaxContractsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MaxContractsRule {
    fn id(&self) -> &'static str {
        "001_max_contracts"
    }

    fn evaluate(&mut self, event: &RiskEvent, ctx: &mut RuleContext) -> Vec<Violation> {
        let cfg = &ctx.config.rules.max_contracts;
        if !cfg.enabled || cfg.per_instrument {
            return vec![];
        }

        let (account_id, contract_id) = match event {
            RiskEvent::PositionOpened { position, .. } | RiskEvent::PositionUpdated { position, .. } => {
                (position.account_id.clone(), position.contract_id.clone())
            }
            _ => return vec![],
        };

        let total: i64 = ctx
            .positions
            .values()
            .filter(|p| p.account_id == account_id)
            .map(|p| p.size.abs())
            .sum();

        if total > cfg.limit {
            return vec![Violation {
                rule: self.id(),
                account_id,
                symbol: None,
                contract_id: Some(contract_id),
                action: ActionKind::ClosePosition,
                lockout_required: false,
                cooldown_duration: None,
                next_unlock: None,
                message: format!("account contract total {total} exceeds limit {}", cfg.limit),
                order_directive: None,
            }];
        }
        vec![]
    }
}
