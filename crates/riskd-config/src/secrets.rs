//! Credential resolution (§6 "Credentials", §6A "Credential loader").
//!
//! The broker account is authenticated with a username and an API key, each
//! resolved from either of two env var names (`TOPSTEPX_*` or `PROJECT_X_*`,
//! original_source `cli/credential_manager.py`). Credentials are never
//! accepted via CLI and never appear unredacted in a log line or `Debug`
//! output.

use anyhow::{bail, Result};

/// Resolved broker credentials. `Debug` and `Display` both redact to
/// `first4…last4` (or `***` for anything too short to redact meaningfully).
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

impl Credentials {
    /// Resolve from the environment. Checks `TOPSTEPX_*` first, then
    /// `PROJECT_X_*`, per var. Fails closed, naming only the var pair that
    /// is missing — never a value.
    pub fn resolve() -> Result<Credentials> {
        let username = resolve_either("TOPSTEPX_USERNAME", "PROJECT_X_USERNAME")
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "CREDENTIALS_MISSING: neither TOPSTEPX_USERNAME nor PROJECT_X_USERNAME is set"
                )
            })?;
        let api_key = resolve_either("TOPSTEPX_API_KEY", "PROJECT_X_API_KEY").ok_or_else(|| {
            anyhow::anyhow!("CREDENTIALS_MISSING: neither TOPSTEPX_API_KEY nor PROJECT_X_API_KEY is set")
        })?;
        if username.trim().is_empty() || api_key.trim().is_empty() {
            bail!("CREDENTIALS_MISSING: resolved credential value is empty");
        }
        Ok(Credentials { username, api_key })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &redact(&self.username))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

fn resolve_either(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .or_else(|| std::env::var(fallback).ok())
        .filter(|v| !v.trim().is_empty())
}

/// `first4…last4` for anything long enough to redact meaningfully, `***`
/// otherwise (short secrets would otherwise be fully exposed by the affixes).
fn redact(value: &str) -> String {
    if value.len() <= 8 {
        "***".to_string()
    } else {
        format!("{}…{}", &value[..4], &value[value.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env var mutation races across parallel tests in the same process;
    // serialize this module's tests that touch the environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn resolves_from_topstepx_names() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TOPSTEPX_USERNAME", "jake");
        std::env::set_var("TOPSTEPX_API_KEY", "abcdefgh12345678");
        let creds = Credentials::resolve().unwrap();
        assert_eq!(creds.username, "jake");
        assert_eq!(creds.api_key, "abcdefgh12345678");
        std::env::remove_var("TOPSTEPX_USERNAME");
        std::env::remove_var("TOPSTEPX_API_KEY");
    }

    #[test]
    fn falls_back_to_project_x_names() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("TOPSTEPX_USERNAME");
        std::env::remove_var("TOPSTEPX_API_KEY");
        std::env::set_var("PROJECT_X_USERNAME", "jake2");
        std::env::set_var("PROJECT_X_API_KEY", "zyxwvuts98765432");
        let creds = Credentials::resolve().unwrap();
        assert_eq!(creds.username, "jake2");
        std::env::remove_var("PROJECT_X_USERNAME");
        std::env::remove_var("PROJECT_X_API_KEY");
    }

    #[test]
    fn missing_credentials_is_an_error_naming_both_vars() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("TOPSTEPX_USERNAME");
        std::env::remove_var("PROJECT_X_USERNAME");
        std::env::remove_var("TOPSTEPX_API_KEY");
        std::env::remove_var("PROJECT_X_API_KEY");
        let err = Credentials::resolve().unwrap_err().to_string();
        assert!(err.contains("CREDENTIALS_MISSING"));
        assert!(err.contains("TOPSTEPX_USERNAME"));
    }

    #[test]
    fn debug_output_is_redacted_first4_last4() {
        let creds = Credentials {
            username: "jake_trader".to_string(),
            api_key: "sk_live_1234567890abcdef".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("jake…ader"));
        assert!(debug.contains("sk_l…cdef"));
        assert!(!debug.contains("1234567890abcdef"));
    }

    #[test]
    fn short_values_redact_to_asterisks() {
        assert_eq!(redact("short"), "***");
    }
}
