//! Base config YAML documents shared by scenario tests. Every rule starts
//! disabled; a scenario enables exactly the one(s) it exercises via a string
//! patch (`BASE_RISK_CONFIG.replace("daily_realized_loss: { enabled: false",
//! "daily_realized_loss: { enabled: true")`), keeping each test's intent
//! visible at the call site instead of buried in a full YAML document.

pub const BASE_RISK_CONFIG: &str = r#"
general:
  instruments: ["MNQ"]
  timezone: "America/New_York"
  logging:
    level: "info"
  symbols:
    MNQ:
      tick_size: 0.25
      tick_value: 0.50
rules:
  max_contracts: { enabled: false, limit: 10, per_instrument: false }
  max_contracts_per_instrument: { enabled: false, limits: {}, unknown_symbol_policy: block }
  daily_realized_loss: { enabled: false, limit: -500 }
  daily_unrealized_loss: { enabled: false, loss_limit: -300 }
  max_unrealized_profit: { enabled: false, target: 1000 }
  trade_frequency_limit: { enabled: false, per_minute: 3, per_hour: 20, per_session: 50, cooldown_seconds: 300 }
  cooldown_after_loss: { enabled: false, tiers: [] }
  no_stop_loss_grace: { enabled: false, grace_seconds: 30 }
  session_block_outside: { enabled: false, block_weekends: false, respect_holidays: false }
  auth_loss_guard: { enabled: false }
  symbol_blocks: { enabled: false, patterns: [] }
  trade_management: { enabled: false }
  daily_realized_profit: { enabled: false, target: 2000 }
"#;

pub const BASE_TIMERS_CONFIG: &str = r#"
daily_reset: { enabled: true, time: "17:00", timezone: "America/New_York" }
session_hours: { enabled: false, start: "09:30", end: "16:00", timezone: "America/New_York" }
holidays: { enabled: false, list: [] }
lockout_durations: { hard_lockout: {} }
"#;

pub const BASE_ACCOUNTS_CONFIG: &str = r#"
topstepx: { api_url: "https://example.invalid" }
monitored_account: { account_id: "ACC-001" }
"#;
