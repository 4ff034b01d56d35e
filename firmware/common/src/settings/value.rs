//! Leaf values of the settings tree and their JSON text form.

use core::fmt;

use heapless::{String, Vec};

use super::SettingsError;

/// Longest skin or option name.
pub const KEY_LEN: usize = 16;
/// Longest text value (colors, fonts, banner text).
pub const TEXT_LEN: usize = 32;
/// Most elements in a list value.
pub const LIST_LEN: usize = 4;

/// Skin or option name.
pub type Key = String<KEY_LEN>;
/// Text value.
pub type Text = String<TEXT_LEN>;

/// A skin option value.
///
/// Lists can only come from the settings store; the command channel may
/// replace `Int` and `Text` values but never a `List`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Text(Text),
    List(Vec<i32, LIST_LEN>),
}

impl Value {
    /// Interpret a command argument: all digits is an integer, anything else text.
    pub fn from_command(raw: &str) -> Result<Self, SettingsError> {
        match parse_digits(raw) {
            Some(n) => i32::try_from(n).map(Self::Int).map_err(|_| SettingsError::BadValue),
            None => Ok(Self::Text(text(raw)?)),
        }
    }

    /// Parse the JSON form used in dumps and the settings store.
    ///
    /// Accepts integers, strings (with `\"` and `\\` escapes) and flat integer lists.
    pub fn parse_json(raw: &str) -> Result<Self, SettingsError> {
        let raw = raw.trim();
        if let Some(body) = raw.strip_prefix('"') {
            let body = body.strip_suffix('"').ok_or(SettingsError::BadValue)?;
            return unescape(body).map(Self::Text);
        }

        if let Some(body) = raw.strip_prefix('[') {
            let body = body.strip_suffix(']').ok_or(SettingsError::BadValue)?;
            let mut items = Vec::new();
            if !body.trim().is_empty() {
                for item in body.split(',') {
                    let n = parse_int(item.trim()).ok_or(SettingsError::BadValue)?;
                    items.push(n).map_err(|_| SettingsError::Capacity)?;
                }
            }
            return Ok(Self::List(items));
        }

        parse_int(raw).map(Self::Int).ok_or(SettingsError::BadValue)
    }

    #[inline]
    pub const fn is_list(&self) -> bool { matches!(self, Self::List(_)) }

    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[i32]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

/// Writes the JSON form.
impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(t) => {
                f.write_str("\"")?;
                for c in t.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Self::List(items) => {
                f.write_str("[")?;
                for (i, n) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{n}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Parse a non-empty all-ASCII-digit string, saturating at `u32::MAX`.
pub fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(raw.bytes().fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))))
}

/// Parse an optionally signed decimal integer.
pub fn parse_int(raw: &str) -> Option<i32> { raw.parse().ok() }

/// Copy into a fixed-capacity text value.
pub fn text(raw: &str) -> Result<Text, SettingsError> {
    let mut out = Text::new();
    out.push_str(raw).map_err(|_| SettingsError::Capacity)?;
    Ok(out)
}

/// Copy into a fixed-capacity key.
pub fn key(raw: &str) -> Result<Key, SettingsError> {
    let mut out = Key::new();
    out.push_str(raw).map_err(|_| SettingsError::Capacity)?;
    Ok(out)
}

fn unescape(body: &str) -> Result<Text, SettingsError> {
    let mut out = Text::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\' | '/')) => escaped,
                _ => return Err(SettingsError::BadValue),
            },
            '"' => return Err(SettingsError::BadValue),
            c => c,
        };
        out.push(c).map_err(|_| SettingsError::Capacity)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("0"), Some(0));
        assert_eq!(parse_digits("0042"), Some(42));
        assert_eq!(parse_digits("99999999999999"), Some(u32::MAX));
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("-1"), None);
        assert_eq!(parse_digits("12a"), None);
    }

    #[test]
    fn test_from_command_types() {
        assert_eq!(Value::from_command("120"), Ok(Value::Int(120)));
        assert_eq!(Value::from_command("3000000000"), Err(SettingsError::BadValue));
        assert_eq!(Value::from_command("#112233"), Ok(Value::Text(text("#112233").unwrap())));
        assert_eq!(
            Value::from_command("a string that is far too long to fit in a value"),
            Err(SettingsError::Capacity)
        );
    }

    #[test]
    fn test_json_forms() {
        assert_eq!(Value::parse_json("-7"), Ok(Value::Int(-7)));
        assert_eq!(Value::parse_json("\"ring\""), Ok(Value::Text(text("ring").unwrap())));
        let list = Value::parse_json("[50, 120]").unwrap();
        assert_eq!(list.as_list(), Some(&[50, 120][..]));
        assert_eq!(Value::parse_json("[]").unwrap().as_list(), Some(&[][..]));
        assert_eq!(Value::parse_json("\"open"), Err(SettingsError::BadValue));
        assert_eq!(Value::parse_json("[1, x]"), Err(SettingsError::BadValue));
        assert_eq!(Value::parse_json("[1, 2, 3, 4, 5]"), Err(SettingsError::Capacity));
        assert_eq!(Value::parse_json("true"), Err(SettingsError::BadValue));
    }

    #[test]
    fn test_display_is_json() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::parse_json("[1, -2]").unwrap().to_string(), "[1, -2]");
        let quoted = Value::Text(text("say \"hi\"").unwrap());
        assert_eq!(quoted.to_string(), "\"say \\\"hi\\\"\"");
        assert_eq!(Value::parse_json(&quoted.to_string()), Ok(quoted));
    }
}
