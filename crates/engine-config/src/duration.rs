//! Duration strings in settings files and environment variables.
//!
//! Two styles are accepted: simple (`500ms`, `30s`, `2h`, or a bare number in
//! the default unit) and ISO-8601 (`PT30S`, `P1DT2H`). The style is detected
//! from the shape of the value.

use crate::error::ConfigError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationStyle {
    /// `[+]digits[unit]`, e.g. `10s`.
    Simple,

    /// `[+]PnDTnHnMn.nS`.
    Iso8601,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    const ALL: [DurationUnit; 5] = [
        DurationUnit::Millis,
        DurationUnit::Seconds,
        DurationUnit::Minutes,
        DurationUnit::Hours,
        DurationUnit::Days,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            DurationUnit::Millis => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "m",
            DurationUnit::Hours => "h",
            DurationUnit::Days => "d",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.suffix().eq_ignore_ascii_case(suffix))
    }

    fn millis(&self) -> u64 {
        match self {
            DurationUnit::Millis => 1,
            DurationUnit::Seconds => 1_000,
            DurationUnit::Minutes => 60_000,
            DurationUnit::Hours => 3_600_000,
            DurationUnit::Days => 86_400_000,
        }
    }

    fn of(&self, amount: u64) -> Option<Duration> {
        amount.checked_mul(self.millis()).map(Duration::from_millis)
    }
}

impl DurationStyle {
    /// Detects the style of `value`.
    pub fn detect(value: &str) -> Result<Self, ConfigError> {
        [DurationStyle::Simple, DurationStyle::Iso8601]
            .into_iter()
            .find(|style| style.matches(value))
            .ok_or_else(|| invalid(value, "unknown duration style"))
    }

    /// Detects the style of `value` and parses it. Values without a unit use
    /// `unit`, or milliseconds when `unit` is `None`.
    pub fn detect_and_parse(
        value: &str,
        unit: Option<DurationUnit>,
    ) -> Result<Duration, ConfigError> {
        Self::detect(value)?.parse(value, unit)
    }

    pub fn matches(&self, value: &str) -> bool {
        let unsigned = strip_sign(value).1;
        match self {
            DurationStyle::Simple => {
                let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                let suffix = &unsigned[digits..];
                digits > 0 && suffix.len() <= 2 && suffix.chars().all(|c| c.is_ascii_alphabetic())
            }
            DurationStyle::Iso8601 => unsigned.starts_with('P'),
        }
    }

    pub fn parse(&self, value: &str, unit: Option<DurationUnit>) -> Result<Duration, ConfigError> {
        if !self.matches(value) {
            return Err(invalid(value, "does not match the duration pattern"));
        }

        let (negative, unsigned) = strip_sign(value);
        if negative {
            return Err(invalid(value, "negative durations are not supported"));
        }

        match self {
            DurationStyle::Simple => parse_simple(value, unsigned, unit),
            DurationStyle::Iso8601 => parse_iso8601(value, &unsigned[1..]),
        }
    }
}

fn strip_sign(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else {
        (false, value.strip_prefix('+').unwrap_or(value))
    }
}

fn invalid(value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_simple(
    value: &str,
    unsigned: &str,
    unit: Option<DurationUnit>,
) -> Result<Duration, ConfigError> {
    let split = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let (amount, suffix) = unsigned.split_at(split);

    let unit = if suffix.is_empty() {
        unit.unwrap_or(DurationUnit::Millis)
    } else {
        DurationUnit::from_suffix(suffix)
            .ok_or_else(|| invalid(value, &format!("unknown unit '{suffix}'")))?
    };

    let amount: u64 = amount
        .parse()
        .map_err(|_| invalid(value, "amount out of range"))?;
    unit.of(amount)
        .ok_or_else(|| invalid(value, "amount out of range"))
}

/// Parses the part after `P`: `[nD][T[nH][nM][n[.n]S]]`.
fn parse_iso8601(value: &str, body: &str) -> Result<Duration, ConfigError> {
    let (date, time) = match body.find(['T', 't']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let mut total = Duration::ZERO;
    let mut seen = false;

    if !date.is_empty() {
        let days = date
            .strip_suffix(['D', 'd'])
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| invalid(value, "expected days as 'nD' before 'T'"))?;
        total = add(value, total, DurationUnit::Days.of(days))?;
        seen = true;
    }

    if let Some(time) = time {
        if time.is_empty() {
            return Err(invalid(value, "missing time components after 'T'"));
        }

        let mut number = String::new();
        let mut last_rank = 0;

        for c in time.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }

            let (rank, unit) = match c.to_ascii_uppercase() {
                'H' => (1, DurationUnit::Hours),
                'M' => (2, DurationUnit::Minutes),
                'S' => (3, DurationUnit::Seconds),
                _ => return Err(invalid(value, &format!("unexpected '{c}'"))),
            };
            if rank <= last_rank || number.is_empty() {
                return Err(invalid(value, "time components must be H, M, S in order"));
            }

            let part = if unit == DurationUnit::Seconds {
                parse_seconds(&number)
            } else {
                number.parse::<u64>().ok().and_then(|n| unit.of(n))
            };
            total = add(value, total, part)?;

            number.clear();
            last_rank = rank;
            seen = true;
        }

        if !number.is_empty() {
            return Err(invalid(value, "trailing number without unit"));
        }
    }

    if !seen {
        return Err(invalid(value, "no duration components"));
    }
    Ok(total)
}

fn parse_seconds(number: &str) -> Option<Duration> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() || fraction.len() > 9 || fraction.contains('.') {
        return None;
    }

    let secs = whole.parse::<u64>().ok()?;
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse::<u32>().ok()?
    };
    Some(Duration::new(secs, nanos))
}

fn add(value: &str, total: Duration, part: Option<Duration>) -> Result<Duration, ConfigError> {
    part.and_then(|p| total.checked_add(p))
        .ok_or_else(|| invalid(value, "duration out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(DurationStyle::detect("10s").unwrap(), DurationStyle::Simple);
        assert_eq!(DurationStyle::detect("+250").unwrap(), DurationStyle::Simple);
        assert_eq!(DurationStyle::detect("PT1M").unwrap(), DurationStyle::Iso8601);
        assert!(DurationStyle::detect("ten seconds").is_err());
        assert!(DurationStyle::detect("").is_err());
    }

    #[test]
    fn test_simple_units() {
        let parse = |v| DurationStyle::detect_and_parse(v, None).unwrap();
        assert_eq!(parse("250"), Duration::from_millis(250));
        assert_eq!(parse("250ms"), Duration::from_millis(250));
        assert_eq!(parse("10s"), Duration::from_secs(10));
        assert_eq!(parse("10S"), Duration::from_secs(10));
        assert_eq!(parse("3m"), Duration::from_secs(180));
        assert_eq!(parse("2h"), Duration::from_secs(7_200));
        assert_eq!(parse("1d"), Duration::from_secs(86_400));
    }

    #[test]
    fn test_simple_default_unit() {
        let d = DurationStyle::detect_and_parse("5", Some(DurationUnit::Seconds)).unwrap();
        assert_eq!(d, Duration::from_secs(5));
    }

    #[test]
    fn test_simple_rejects_unknown_unit_and_negative() {
        assert!(DurationStyle::detect_and_parse("5w", None).is_err());
        assert!(DurationStyle::detect_and_parse("-5s", None).is_err());
    }

    #[test]
    fn test_iso8601() {
        let parse = |v| DurationStyle::detect_and_parse(v, None).unwrap();
        assert_eq!(parse("PT30S"), Duration::from_secs(30));
        assert_eq!(parse("PT1.5S"), Duration::from_millis(1_500));
        assert_eq!(parse("PT2H15M"), Duration::from_secs(2 * 3_600 + 15 * 60));
        assert_eq!(parse("P1DT1S"), Duration::from_secs(86_401));
        assert_eq!(parse("P2D"), Duration::from_secs(2 * 86_400));
    }

    #[test]
    fn test_iso8601_rejects_malformed() {
        for value in ["P", "PT", "PT5", "PT1S2M", "P1H", "PT1.5M", "PTxS"] {
            assert!(
                DurationStyle::detect_and_parse(value, None).is_err(),
                "{value} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_with_wrong_style() {
        assert!(DurationStyle::Iso8601.parse("10s", None).is_err());
        assert!(DurationStyle::Simple.parse("PT10S", None).is_err());
    }
}
