//! Persistence Store (§4.1): the embedded SQLite database holding `trades`,
//! `lockouts`, `daily_pnl`, and `positions_snapshot`, used to recover state
//! after restart. Every other component reads/writes through this crate —
//! nothing else touches the database file directly.
//!
//! Writes go through a single in-process mutex (§6 "The Persistence Store
//! has a single writer mutex") in addition to whatever locking SQLite itself
//! does; this keeps read-modify-write sequences like `add_realized_pnl` and
//! `set_lockout`'s deactivate-then-insert atomic from the app's point of view
//! without requiring a DB-level transaction for every call.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::sync::Mutex;

use riskd_schemas::model::{Lockout, OrderSide, Position, Trade, UnlockCondition};
use riskd_schemas::money::Micros;

pub const ENV_DB_URL: &str = "RISKD_DATABASE_URL";

pub struct Store {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl Store {
    /// Open (creating if absent) the SQLite file at `path`.
    pub async fn connect(path: &Path) -> Result<Store> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open sqlite db at {}", path.display()))?;

        Ok(Store {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    /// Connect using the `RISKD_DATABASE_URL` env var (a filesystem path).
    pub async fn connect_from_env() -> Result<Store> {
        let path = std::env::var(ENV_DB_URL)
            .with_context(|| format!("missing env var {ENV_DB_URL}"))?;
        Store::connect(Path::new(&path)).await
    }

    /// Run embedded migrations. Idempotent — safe to call on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("db migrate failed")?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // trades
    // -----------------------------------------------------------------

    /// Idempotent by `trade_id` (§4.1). A duplicate insert for a trade the
    /// Event Router has already recorded (e.g. after a reconnect replay) is
    /// silently a no-op rather than an error.
    pub async fn add_trade(&self, trade: &Trade) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query(
            r#"
            insert into trades (
                trade_id, account_id, contract_id, symbol, side, quantity,
                price_micros, realized_pnl_micros, timestamp, created_at
            ) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            on conflict (trade_id) do nothing
            "#,
        )
        .bind(&trade.trade_id)
        .bind(&trade.account_id)
        .bind(&trade.contract_id)
        .bind(&trade.symbol)
        .bind(side_to_str(trade.side))
        .bind(trade.quantity)
        .bind(trade.price.raw())
        .bind(trade.realized_pnl.map(Micros::raw))
        .bind(trade.timestamp)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("add_trade failed")?;
        Ok(())
    }

    /// Trades for `account` with `timestamp >= now - seconds` (§4.1), newest last.
    pub async fn get_trades_in_window(&self, account: &str, seconds: i64) -> Result<Vec<Trade>> {
        let since = Utc::now() - chrono::Duration::seconds(seconds);
        let rows = sqlx::query(
            r#"
            select trade_id, account_id, contract_id, symbol, side, quantity,
                   price_micros, realized_pnl_micros, timestamp
            from trades
            where account_id = ? and timestamp >= ?
            order by timestamp asc
            "#,
        )
        .bind(account)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("get_trades_in_window failed")?;

        rows.iter().map(row_to_trade).collect()
    }

    /// Count of trades for `account` with `timestamp >= since` (§4.1
    /// "current trading day" — the caller supplies the trading-day start,
    /// since only the Timer Wheel knows the configured reset time/timezone).
    pub async fn get_session_trade_count(&self, account: &str, since: DateTime<Utc>) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            select count(*) from trades where account_id = ? and timestamp >= ?
            "#,
        )
        .bind(account)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .context("get_session_trade_count failed")?;
        Ok(count)
    }

    // -----------------------------------------------------------------
    // lockouts
    // -----------------------------------------------------------------

    /// Deactivate any prior active row for `account`, then insert a new
    /// active row (§4.1) — at most one active lockout per account.
    pub async fn set_lockout(
        &self,
        account: &str,
        reason: &str,
        rule_id: &str,
        expires_at: Option<DateTime<Utc>>,
        unlock_condition: UnlockCondition,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await.context("set_lockout begin tx failed")?;

        sqlx::query("update lockouts set active = 0 where account_id = ? and active = 1")
            .bind(account)
            .execute(&mut *tx)
            .await
            .context("set_lockout deactivate prior failed")?;

        sqlx::query(
            r#"
            insert into lockouts (
                account_id, rule_id, reason, locked_at, expires_at,
                unlock_condition, active, created_at
            ) values (?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(account)
        .bind(rule_id)
        .bind(reason)
        .bind(Utc::now())
        .bind(expires_at)
        .bind(unlock_condition_to_str(unlock_condition))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .context("set_lockout insert failed")?;

        tx.commit().await.context("set_lockout commit failed")?;
        Ok(())
    }

    /// Marks the active row for `account` inactive (§4.1). No-op if none active.
    pub async fn clear_lockout(&self, account: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query("update lockouts set active = 0 where account_id = ? and active = 1")
            .bind(account)
            .execute(&self.pool)
            .await
            .context("clear_lockout failed")?;
        Ok(())
    }

    /// All rows with `active = true`, across all accounts — loaded once at
    /// startup to repopulate the Lockout Manager's in-memory map (§4.3).
    pub async fn load_active_lockouts(&self) -> Result<Vec<Lockout>> {
        let rows = sqlx::query(
            r#"
            select account_id, rule_id, reason, locked_at, expires_at, unlock_condition, active
            from lockouts
            where active = 1
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("load_active_lockouts failed")?;

        rows.iter().map(row_to_lockout).collect()
    }

    // -----------------------------------------------------------------
    // daily_pnl
    // -----------------------------------------------------------------

    /// Adds `delta` to the cumulative realized total for `account`/`day` and
    /// returns the new total (§4.1). Upserts the row if it doesn't exist yet.
    pub async fn add_realized_pnl(
        &self,
        account: &str,
        day: NaiveDate,
        delta: Micros,
    ) -> Result<Micros> {
        let _guard = self.write_lock.lock().await;
        sqlx::query(
            r#"
            insert into daily_pnl (account_id, trading_day, realized_total_micros, updated_at)
            values (?, ?, ?, ?)
            on conflict (account_id, trading_day) do update
                set realized_total_micros = realized_total_micros + excluded.realized_total_micros,
                    updated_at = excluded.updated_at
            "#,
        )
        .bind(account)
        .bind(day)
        .bind(delta.raw())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("add_realized_pnl upsert failed")?;

        self.get_daily_pnl(account, day).await
    }

    /// Cumulative realized total for `account`/`day`, or zero if no rows yet (§4.1).
    pub async fn get_daily_pnl(&self, account: &str, day: NaiveDate) -> Result<Micros> {
        let row: Option<(i64,)> = sqlx::query_as(
            "select realized_total_micros from daily_pnl where account_id = ? and trading_day = ?",
        )
        .bind(account)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .context("get_daily_pnl failed")?;

        Ok(row.map(|(v,)| Micros::new(v)).unwrap_or(Micros::ZERO))
    }

    // -----------------------------------------------------------------
    // positions_snapshot
    // -----------------------------------------------------------------

    /// Durable mirror of the live in-memory position map, used only to
    /// reconcile after an ungraceful restart (§4.1) — never authoritative
    /// over the live SDK position feed.
    pub async fn upsert_position_snapshot(&self, position: &Position) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query(
            r#"
            insert into positions_snapshot (
                contract_id, account_id, symbol_root, size,
                avg_entry_price_micros, opened_at, updated_at
            ) values (?, ?, ?, ?, ?, ?, ?)
            on conflict (contract_id) do update
                set size = excluded.size,
                    avg_entry_price_micros = excluded.avg_entry_price_micros,
                    updated_at = excluded.updated_at
            "#,
        )
        .bind(&position.contract_id)
        .bind(&position.account_id)
        .bind(&position.symbol_root)
        .bind(position.size)
        .bind(position.avg_entry_price.raw())
        .bind(position.opened_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("upsert_position_snapshot failed")?;
        Ok(())
    }

    pub async fn remove_position_snapshot(&self, contract_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query("delete from positions_snapshot where contract_id = ?")
            .bind(contract_id)
            .execute(&self.pool)
            .await
            .context("remove_position_snapshot failed")?;
        Ok(())
    }

    pub async fn load_position_snapshots(&self, account: &str) -> Result<Vec<Position>> {
        let rows = sqlx::query(
            r#"
            select contract_id, account_id, symbol_root, size, avg_entry_price_micros, opened_at
            from positions_snapshot
            where account_id = ?
            "#,
        )
        .bind(account)
        .fetch_all(&self.pool)
        .await
        .context("load_position_snapshots failed")?;

        rows.iter().map(row_to_position).collect()
    }
}

fn side_to_str(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "Buy",
        OrderSide::Sell => "Sell",
    }
}

fn side_from_str(s: &str) -> Result<OrderSide> {
    match s {
        "Buy" => Ok(OrderSide::Buy),
        "Sell" => Ok(OrderSide::Sell),
        other => Err(anyhow::anyhow!("invalid order side in db row: {other}")),
    }
}

fn unlock_condition_to_str(c: UnlockCondition) -> &'static str {
    match c {
        UnlockCondition::UntilDailyReset => "until_daily_reset",
        UnlockCondition::UntilSessionStart => "until_session_start",
        UnlockCondition::Permanent => "permanent",
        UnlockCondition::AfterDuration => "after_duration",
    }
}

fn unlock_condition_from_str(s: &str) -> Result<UnlockCondition> {
    match s {
        "until_daily_reset" => Ok(UnlockCondition::UntilDailyReset),
        "until_session_start" => Ok(UnlockCondition::UntilSessionStart),
        "permanent" => Ok(UnlockCondition::Permanent),
        "after_duration" => Ok(UnlockCondition::AfterDuration),
        other => Err(anyhow::anyhow!("invalid unlock_condition in db row: {other}")),
    }
}

fn row_to_trade(row: &sqlx::sqlite::SqliteRow) -> Result<Trade> {
    let side: String = row.try_get("side")?;
    let price_micros: i64 = row.try_get("price_micros")?;
    let realized_pnl_micros: Option<i64> = row.try_get("realized_pnl_micros")?;
    Ok(Trade {
        trade_id: row.try_get("trade_id")?,
        account_id: row.try_get("account_id")?,
        contract_id: row.try_get("contract_id")?,
        symbol: row.try_get("symbol")?,
        side: side_from_str(&side)?,
        quantity: row.try_get("quantity")?,
        price: Micros::new(price_micros),
        realized_pnl: realized_pnl_micros.map(Micros::new),
        timestamp: row.try_get("timestamp")?,
    })
}

fn row_to_lockout(row: &sqlx::sqlite::SqliteRow) -> Result<Lockout> {
    let unlock_condition: String = row.try_get("unlock_condition")?;
    let active: i64 = row.try_get("active")?;
    Ok(Lockout {
        account_id: row.try_get("account_id")?,
        rule_id: row.try_get("rule_id")?,
        reason: row.try_get("reason")?,
        locked_at: row.try_get("locked_at")?,
        expires_at: row.try_get("expires_at")?,
        unlock_condition: unlock_condition_from_str(&unlock_condition)?,
        active: active != 0,
    })
}

fn row_to_position(row: &sqlx::sqlite::SqliteRow) -> Result<Position> {
    let avg_entry_price_micros: i64 = row.try_get("avg_entry_price_micros")?;
    Ok(Position {
        contract_id: row.try_get("contract_id")?,
        account_id: row.try_get("account_id")?,
        symbol_root: row.try_get("symbol_root")?,
        size: row.try_get("size")?,
        avg_entry_price: Micros::new(avg_entry_price_micros),
        opened_at: row.try_get("opened_at")?,
    })
}
