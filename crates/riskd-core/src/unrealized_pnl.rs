//! Unrealized P&L Calculator (§4.5): tracks open positions and last prices,
//! and computes mark-to-market and realized-on-close P&L from tick metadata.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use riskd_schemas::model::{OrderSide, SymbolSpec};
use riskd_schemas::money::Micros;

#[derive(Debug, Clone)]
pub struct TrackedPosition {
    pub entry_price: Micros,
    pub size: i64,
    pub side: OrderSide,
    pub symbol: String,
    pub opened_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct UnrealizedPnlCalculator {
    positions: HashMap<String, TrackedPosition>,
    last_prices: HashMap<String, Micros>,
    symbols: HashMap<String, SymbolSpec>,
}

impl UnrealizedPnlCalculator {
    pub fn new(symbols: HashMap<String, SymbolSpec>) -> Self {
        Self { positions: HashMap::new(), last_prices: HashMap::new(), symbols }
    }

    pub fn update_position(&mut self, contract_id: &str, pos: TrackedPosition) {
        self.positions.insert(contract_id.to_string(), pos);
    }

    pub fn remove_position(&mut self, contract_id: &str) -> Option<TrackedPosition> {
        self.positions.remove(contract_id)
    }

    pub fn position(&self, contract_id: &str) -> Option<&TrackedPosition> {
        self.positions.get(contract_id)
    }

    pub fn update_quote(&mut self, symbol: &str, price: Micros) {
        self.last_prices.insert(symbol.to_string(), price);
    }

    pub fn last_price(&self, symbol: &str) -> Option<Micros> {
        self.last_prices.get(symbol).copied()
    }

    /// §4.5 formula: `(exit - entry)/tick_size * size * tick_value` for
    /// longs, negated for shorts — equivalently scaled by `sign(size)`.
    /// Returns `None` for a symbol with no configured tick metadata: the
    /// caller skips the rule for this symbol rather than blocking on it.
    fn pnl(&self, pos: &TrackedPosition, mark: Micros) -> Option<Micros> {
        let spec = self.symbols.get(&pos.symbol)?;
        if spec.tick_size.raw() == 0 {
            return None;
        }
        let diff_ticks = (mark.raw() - pos.entry_price.raw()) / spec.tick_size.raw();
        let signed_ticks = diff_ticks * pos.size.signum();
        let per_tick = spec.tick_value.checked_mul_qty(pos.size.abs())?;
        per_tick.checked_mul_qty(signed_ticks)
    }

    pub fn get_unrealized(&self, contract_id: &str) -> Option<Micros> {
        let pos = self.positions.get(contract_id)?;
        let mark = *self.last_prices.get(&pos.symbol)?;
        self.pnl(pos, mark)
    }

    /// For a position about to close at `exit_price`, using the tracked
    /// entry — the caller removes the position separately once the close is
    /// confirmed.
    pub fn calculate_realized_pnl(&self, contract_id: &str, exit_price: Micros) -> Option<Micros> {
        let pos = self.positions.get(contract_id)?;
        self.pnl(pos, exit_price)
    }
}
