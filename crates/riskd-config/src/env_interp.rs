//! `${VAR_NAME}` interpolation against the process environment (§6).
//!
//! Applied to the merged config JSON before typed deserialization, so every
//! string leaf in any of the four YAML files may reference an env var —
//! `accounts.yaml`'s `topstepx.username: "${PROJECT_X_USERNAME}"` is the
//! motivating case (original_source `config/env.py`).

use anyhow::{bail, Result};
use serde_json::Value;

/// Walk a JSON value and interpolate `${VAR}` placeholders in every string
/// leaf. A placeholder naming an unset env var is an error — a config file
/// that silently resolves to the literal string `"${FOO}"` would be worse
/// than refusing to start.
pub fn interpolate(value: &mut Value) -> Result<()> {
    match value {
        Value::String(s) => {
            if let Some(interpolated) = interpolate_str(s)? {
                *s = interpolated;
            }
        }
        Value::Array(items) => {
            for item in items {
                interpolate(item)?;
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                interpolate(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Returns `Some(expanded)` if `s` contains any `${VAR}` placeholder,
/// `None` if `s` has none and should be left untouched.
fn interpolate_str(s: &str) -> Result<Option<String>> {
    if !s.contains("${") {
        return Ok(None);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            bail!("CONFIG_ENV_INTERP: unterminated placeholder in '{s}'");
        };
        out.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        let value = std::env::var(var_name)
            .map_err(|_| anyhow::anyhow!("CONFIG_ENV_INTERP: env var '{var_name}' referenced in config is not set"))?;
        out.push_str(&value);
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_strings_without_placeholders_untouched() {
        assert_eq!(interpolate_str("plain value").unwrap(), None);
    }

    #[test]
    fn substitutes_single_placeholder() {
        std::env::set_var("RISKD_TEST_ENV_INTERP_A", "hello");
        let got = interpolate_str("${RISKD_TEST_ENV_INTERP_A}").unwrap();
        assert_eq!(got, Some("hello".to_string()));
        std::env::remove_var("RISKD_TEST_ENV_INTERP_A");
    }

    #[test]
    fn substitutes_placeholder_embedded_in_literal_text() {
        std::env::set_var("RISKD_TEST_ENV_INTERP_B", "v34");
        let got = interpolate_str("https://api.topstepx.com/${RISKD_TEST_ENV_INTERP_B}/api").unwrap();
        assert_eq!(got, Some("https://api.topstepx.com/v34/api".to_string()));
        std::env::remove_var("RISKD_TEST_ENV_INTERP_B");
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let result = interpolate_str("${RISKD_TEST_ENV_INTERP_DEFINITELY_UNSET}");
        assert!(result.is_err());
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let result = interpolate_str("${UNCLOSED");
        assert!(result.is_err());
    }
}
