//! The `timeouts { create = "20m" }` resource block.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schema::{Attribute, Block, NestedBlock};

/// Create timeout applied when the resource does not configure one.
pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Operation timeouts declared on a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// How long create may keep retrying, as a Go-style duration string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
}

impl Timeouts {
    /// Schema for the `timeouts` block.
    pub fn block() -> NestedBlock {
        NestedBlock::single(
            Block::new()
                .with_attribute(
                    "create",
                    Attribute::optional_string()
                        .with_description("How long to keep retrying create, e.g. \"20m\"."),
                )
                .with_description("Operation timeouts."),
        )
    }

    /// The effective create timeout. A zero budget is rejected: it would
    /// cut off the first attempt before the request completes.
    pub fn create_timeout(timeouts: Option<&Self>) -> Result<Duration, InvalidDuration> {
        let Some(raw) = timeouts.and_then(|t| t.create.as_deref()) else {
            return Ok(DEFAULT_CREATE_TIMEOUT);
        };
        let timeout = parse_duration(raw)?;
        if timeout.is_zero() {
            return Err(InvalidDuration {
                input: raw.to_string(),
                reason: "must be greater than zero",
            });
        }
        Ok(timeout)
    }
}

/// A duration string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct InvalidDuration {
    /// The rejected input.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

/// Parse a Go-style duration such as `"90s"`, `"20m"`, `"1h30m"` or `"500ms"`.
///
/// Units: `h`, `m`, `s`, `ms`. Fractions are accepted (`"1.5h"`). A bare `"0"`
/// is zero.
pub fn parse_duration(input: &str) -> Result<Duration, InvalidDuration> {
    let invalid = |reason| InvalidDuration {
        input: input.to_string(),
        reason,
    };

    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid("empty"));
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| invalid("missing unit"))?;
        if number_len == 0 {
            return Err(invalid("expected a number"));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| invalid("malformed number"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "ms" => 0.001,
            _ => return Err(invalid("unknown unit")),
        };
        rest = &rest[unit_len..];
        total += value * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).map_err(|_| invalid("out of range"))
}
