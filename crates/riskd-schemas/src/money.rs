//! Fixed-point money type.
//!
//! All monetary amounts in this system (entry prices, realized P&L, daily
//! cumulative totals, tick values, rule thresholds expressed in dollars) use
//! a 1e-6 (micros) fixed-point representation stored as `i64`. Raw `i64`
//! would let money arithmetic mix accidentally with unrelated integers
//! (contract sizes, tick counts, account ids); `Micros` closes that hole by
//! giving money its own type with no implicit `From<i64>`.
//!
//! 1 USD = 1_000_000 Micros. Non-monetary quantities (contract counts, tick
//! counts, day ids) stay plain `i64`/`u32` and are never implicitly
//! convertible to `Micros`.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A fixed-point monetary amount at 1e-6 scale.
///
/// Serializes as a decimal dollar string (`"-500.000000"`) rather than the
/// raw micros integer: config YAML and audit-log JSON should read as money,
/// not as an internal scaling factor, and a decimal string round-trips
/// through `from_decimal_str`/`Display` exactly, unlike an `f64` dollar
/// encoding. Config deserialization also accepts a bare YAML number
/// (`limit: -500`) for ergonomics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(i64);

impl serde::Serialize for Micros {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Micros {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MicrosVisitor;

        impl<'de> serde::de::Visitor<'de> for MicrosVisitor {
            type Value = Micros;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a decimal dollar string or number, e.g. \"-500.00\" or -500")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Micros, E> {
                Micros::from_decimal_str(v)
                    .ok_or_else(|| E::custom(format!("invalid decimal money value: '{v}'")))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Micros, E> {
                v.checked_mul(1_000_000)
                    .map(Micros)
                    .ok_or_else(|| E::custom(format!("money value out of range: {v}")))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Micros, E> {
                self.visit_i64(v as i64)
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Micros, E> {
                Ok(Micros((v * 1_000_000.0).round() as i64))
            }
        }

        deserializer.deserialize_any(MicrosVisitor)
    }
}

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(i64::MAX);
    pub const MIN: Micros = Micros(i64::MIN);

    /// Construct from a raw micros integer. Use only when the value is known
    /// to already be at 1e-6 scale.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Construct from a whole-dollar-and-cents decimal string (`"21000.00"`,
    /// `"-2.75"`). Returns `None` on malformed input — callers at a trust
    /// boundary (config, broker payload) must handle that explicitly rather
    /// than silently defaulting to zero.
    pub fn from_decimal_str(s: &str) -> Option<Micros> {
        let s = s.trim();
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let mut parts = s.splitn(2, '.');
        let int_part = parts.next()?;
        let frac_part = parts.next().unwrap_or("0");
        if frac_part.len() > 6 || !int_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let int_val: i64 = int_part.parse().ok()?;
        let mut frac_str = frac_part.to_string();
        while frac_str.len() < 6 {
            frac_str.push('0');
        }
        let frac_val: i64 = frac_str.parse().ok()?;
        Some(Micros(sign * (int_val * 1_000_000 + frac_val)))
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }

    #[inline]
    pub fn checked_sub(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_sub(rhs.0).map(Micros)
    }

    #[inline]
    pub fn checked_add(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_add(rhs.0).map(Micros)
    }

    #[inline]
    pub fn abs(self) -> Micros {
        Micros(self.0.saturating_abs())
    }

    #[inline]
    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    #[inline]
    pub fn is_non_negative(self) -> bool {
        self.0 >= 0
    }

    /// Multiply a per-unit price by an integer quantity (contract count or
    /// tick count). Returns `None` on overflow; callers must handle it —
    /// there is no implicit clamp for a trade-value calculation.
    #[inline]
    pub fn checked_mul_qty(self, qty: i64) -> Option<Micros> {
        self.0.checked_mul(qty).map(Micros)
    }
}

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl Neg for Micros {
    type Output = Micros;
    #[inline]
    fn neg(self) -> Micros {
        Micros(-self.0)
    }
}

impl AddAssign for Micros {
    #[inline]
    fn add_assign(&mut self, rhs: Micros) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Micros {
    #[inline]
    fn sub_assign(&mut self, rhs: Micros) {
        self.0 -= rhs.0;
    }
}

/// `Micros × plain integer` — used for tick-count × tick-size price math
/// (rule 012, §4.11/§8 B5). The integer side is a signed tick count, not a
/// monetary amount, so this is a distinct impl from `checked_mul_qty`.
impl Mul<i64> for Micros {
    type Output = Micros;
    #[inline]
    fn mul(self, rhs: i64) -> Micros {
        Micros(self.0 * rhs)
    }
}

impl std::fmt::Display for Micros {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.0 / 1_000_000;
        let frac = (self.0 % 1_000_000).abs();
        if self.0 < 0 && dollars == 0 {
            write!(f, "-{dollars}.{frac:06}")
        } else {
            write!(f, "{dollars}.{frac:06}")
        }
    }
}
