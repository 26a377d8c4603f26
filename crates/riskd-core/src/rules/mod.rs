//! The 13 risk rules (§4.11), one module per rule, registered onto a
//! `RuleEngine` in spec order. Each rule owns only the small bit of state it
//! needs beyond what `RuleContext` already injects (e.g. a rolling trade
//! timestamp window for rule 006).

mod rule_001_max_contracts;
mod rule_002_max_contracts_per_instrument;
mod rule_003_daily_realized_loss;
mod rule_004_daily_unrealized_loss;
mod rule_005_max_unrealized_profit;
mod rule_006_trade_frequency_limit;
mod rule_007_cooldown_after_loss;
mod rule_008_no_stop_loss_grace;
mod rule_009_session_block_outside;
mod rule_010_auth_loss_guard;
mod rule_011_symbol_blocks;
mod rule_012_trade_management;
mod rule_013_daily_realized_profit;

pub(crate) mod glob;

pub use rule_001_max_contracts::MaxContractsRule;
pub use rule_002_max_contracts_per_instrument::MaxContractsPerInstrumentRule;
pub use rule_003_daily_realized_loss::DailyRealizedLossRule;
pub use rule_004_daily_unrealized_loss::DailyUnrealizedLossRule;
pub use rule_005_max_unrealized_profit::MaxUnrealizedProfitRule;
pub use rule_006_trade_frequency_limit::TradeFrequencyLimitRule;
pub use rule_007_cooldown_after_loss::CooldownAfterLossRule;
pub use rule_008_no_stop_loss_grace::NoStopLossGraceRule;
pub use rule_009_session_block_outside::SessionBlockOutsideRule;
pub use rule_010_auth_loss_guard::AuthLossGuardRule;
pub use rule_011_symbol_blocks::SymbolBlocksRule;
pub use rule_012_trade_management::TradeManagementRule;
pub use rule_013_daily_realized_profit::DailyRealizedProfitRule;

use crate::rule_engine::Rule;

/// Builds all 13 rules in the registration order the Rule Engine dispatches
/// them in (§4.10 "rules are evaluated in registration order").
pub fn default_rule_set() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(MaxContractsRule::new()),
        Box::new(MaxContractsPerInstrumentRule::new()),
        Box::new(DailyRealizedLossRule::new()),
        Box::new(DailyUnrealizedLossRule::new()),
        Box::new(MaxUnrealizedProfitRule::new()),
        Box::new(TradeFrequencyLimitRule::new()),
        Box::new(CooldownAfterLossRule::new()),
        Box::new(NoStopLossGraceRule::new()),
        Box::new(SessionBlockOutsideRule::new()),
        Box::new(AuthLossGuardRule::new()),
        Box::new(SymbolBlocksRule::new()),
        Box::new(TradeManagementRule::new()),
        Box::new(DailyRealizedProfitRule::new()),
    ]
}
