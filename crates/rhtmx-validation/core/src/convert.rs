// File: src/convert.rs
// Purpose: Data type conversion shared by compare, range and data type validators

use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-+]?[0-9]+\s*$").unwrap());

/// Operand data type of compare, range and data type validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    #[serde(alias = "Double")]
    Float,
    Date,
    #[default]
    String,
}

/// Settings a conversion needs besides the raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFormat {
    pub decimal_char: char,
    /// Date pattern such as `dd/MM/yyyy`
    pub date_format: String,
}

impl Default for ConversionFormat {
    fn default() -> Self {
        Self {
            decimal_char: '.',
            date_format: "yyyy-MM-dd".to_string(),
        }
    }
}

impl DataType {
    /// Convert `raw` to this type. `None` means the value cannot be evaluated.
    pub fn convert(self, raw: &str, format: &ConversionFormat) -> Option<Value> {
        match self {
            DataType::Integer => parse_integer(raw).map(Value::Integer),
            DataType::Float => parse_float(raw, format.decimal_char).map(Value::Float),
            DataType::Date => parse_date(raw, &format.date_format).map(Value::Date),
            DataType::String => Some(Value::String(raw.to_string())),
        }
    }
}

/// Parse an integer, allowing surrounding whitespace and a sign
pub fn parse_integer(raw: &str) -> Option<i64> {
    if !INTEGER_REGEX.is_match(raw) {
        return None;
    }
    raw.trim().parse().ok()
}

/// Parse a decimal number written with `decimal_char` as separator.
///
/// Accepts `12`, `-12`, `12,5` (with `,`), `.5`; rejects `12.` and `1e3`.
pub fn parse_float(raw: &str, decimal_char: char) -> Option<f64> {
    let s = raw.trim();
    let (negative, rest) = match s.chars().next() {
        Some('-') => (true, &s[1..]),
        Some('+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (int_part, frac_part) = match rest.split_once(decimal_char) {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    if int_part.is_empty() && frac_part.is_none() {
        return None;
    }

    let text = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        if int_part.is_empty() { "0" } else { int_part },
        frac_part.unwrap_or("0")
    );
    text.parse().ok()
}

/// Parse a date (and optional time) using a `yyyy-MM-dd` style pattern
pub fn parse_date(raw: &str, pattern: &str) -> Option<NaiveDateTime> {
    let (format, has_time) = chrono_format(pattern);
    let value = raw.trim();
    if has_time {
        NaiveDateTime::parse_from_str(value, &format).ok()
    } else {
        NaiveDate::parse_from_str(value, &format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

/// Translate a date pattern (`yyyy`, `MM`, `dd`, `HH`, `mm`, `ss`, ...) into a
/// chrono format string. The flag tells whether the pattern carries a time.
pub fn chrono_format(pattern: &str) -> (String, bool) {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut has_time = false;
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        match c {
            'y' => out.push_str(if run >= 4 { "%Y" } else { "%y" }),
            'M' => out.push_str(match run {
                1 | 2 => "%m",
                3 => "%b",
                _ => "%B",
            }),
            'd' => out.push_str("%d"),
            'H' => {
                has_time = true;
                out.push_str("%H");
            }
            'h' => {
                has_time = true;
                out.push_str("%I");
            }
            'm' => {
                has_time = true;
                out.push_str("%M");
            }
            's' => {
                has_time = true;
                out.push_str("%S");
            }
            'a' => {
                has_time = true;
                out.push_str("%p");
            }
            '%' => {
                for _ in 0..run {
                    out.push_str("%%");
                }
            }
            other => {
                for _ in 0..run {
                    out.push(other);
                }
            }
        }

        i += run;
    }

    (out, has_time)
}
