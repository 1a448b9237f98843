//! Compiled date/time patterns.
//!
//! Patterns use the `SimpleDateFormat` letter syntax that SQLite drivers have
//! historically accepted in their `*_string_format` options (`yyyy-MM-dd`,
//! `HH:mm:ss.SSS`, ...). A pattern is compiled once, when it is set, into a
//! list of `chrono` format items; formatting and parsing reuse that list.
//!
//! | Letters | Meaning |
//! |---------|---------|
//! | `yyyy`, `yy`, `y` | Year (4 digits, 2 digits, unpadded) |
//! | `M`, `MM`, `MMM`, `MMMM` | Month (number, padded, short name, full name) |
//! | `d`, `dd` | Day of month |
//! | `H`, `HH` | Hour 0-23 |
//! | `h`, `hh` | Hour 1-12 |
//! | `m`, `mm` | Minute |
//! | `s`, `ss` | Second |
//! | `S...` | Milliseconds, always three digits |
//! | `E...` | Weekday name (short up to 3 letters, full from 4) |
//! | `D...` | Day of year |
//! | `a` | AM/PM marker |
//! | `u` | ISO weekday number, Monday = 1 |
//! | `Z`, `X`, `XX` | UTC offset `+hhmm` |
//! | `XXX` | UTC offset `+hh:mm` |
//! | `z` | Zone abbreviation |
//! | `'text'` | Literal text; `''` is a single quote |
//!
//! Every other ASCII letter is rejected, as is an unterminated quote.
//!
//! # Time zone
//!
//! Values are always rendered in UTC, never in the host's local zone. Offset
//! letters therefore print `+0000` or `+00:00`; `X` does not collapse to `Z`
//! for a zero offset. When parsing, a non-zero offset in the text is applied
//! and the result shifted to UTC.
//!
//! # Parsing
//!
//! Parsing is strict: every literal, including spaces, must appear exactly as
//! in the pattern, fields may not be preceded by extra whitespace, and no text
//! may follow the last item. A weekday (`E`, `u`) is only checked against the
//! date when the pattern carries a full date; otherwise it is read and
//! discarded.

use chrono::format::{Fixed, Item, Numeric, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use sqlconfig_core::{ConfigError, Error, Result, TypeError};
use std::fmt;
use std::sync::OnceLock;

/// Default pattern for `date_string_format`.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";
/// Default pattern for `time_string_format`.
pub const DEFAULT_TIME_FORMAT: &str = "HH:mm:ss.SSS";
/// Default pattern for `timestamp_string_format`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "yyyy-MM-dd HH:mm:ss.SSS";

/// Splits a pattern into quoted literals, letter runs and plain literals.
fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        Regex::new(r"'(?:[^']|'')*'|'|[A-Za-z]+|[^A-Za-z']+")
            .expect("pattern token regex should compile")
    })
}

/// Which calendar fields a pattern supplies when parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Fields {
    year: bool,
    month: bool,
    day: bool,
    day_of_year: bool,
    hour24: bool,
    hour12: bool,
    ampm: bool,
    minute: bool,
    offset: bool,
}

impl Fields {
    /// Does the pattern determine a calendar date on its own?
    fn has_full_date(self) -> bool {
        self.year && (self.day_of_year || (self.month && self.day))
    }

    /// Pre-fill whatever the pattern cannot supply: 1970-01-01, midnight.
    fn seed(self, parsed: &mut Parsed) -> chrono::format::ParseResult<()> {
        if !self.year {
            parsed.set_year(1970)?;
        }
        if !self.day_of_year {
            if !self.month {
                parsed.set_month(1)?;
            }
            if !self.day {
                parsed.set_day(1)?;
            }
        }
        if !self.hour24 && !self.hour12 {
            if self.ampm {
                parsed.set_hour12(12)?;
            } else {
                parsed.set_hour(0)?;
            }
        } else if self.hour12 && !self.ampm {
            parsed.set_ampm(false)?;
        }
        if !self.minute {
            parsed.set_minute(0)?;
        }
        Ok(())
    }
}

/// Map one run of identical pattern letters to a strftime directive.
fn directive(letter: char, count: usize, fields: &mut Fields) -> Option<&'static str> {
    let spec = match letter {
        'y' => {
            fields.year = true;
            match count {
                1 => "%-Y",
                2 => "%y",
                _ => "%Y",
            }
        }
        'M' => {
            fields.month = true;
            match count {
                1 => "%-m",
                2 => "%m",
                3 => "%b",
                _ => "%B",
            }
        }
        'd' => {
            fields.day = true;
            if count == 1 { "%-d" } else { "%d" }
        }
        'D' => {
            fields.day_of_year = true;
            if count == 1 { "%-j" } else { "%j" }
        }
        'H' => {
            fields.hour24 = true;
            if count == 1 { "%-H" } else { "%H" }
        }
        'h' => {
            fields.hour12 = true;
            if count == 1 { "%-I" } else { "%I" }
        }
        'm' => {
            fields.minute = true;
            if count == 1 { "%-M" } else { "%M" }
        }
        's' => {
            if count == 1 { "%-S" } else { "%S" }
        }
        'S' => "%3f",
        'E' => {
            if count <= 3 { "%a" } else { "%A" }
        }
        'a' => {
            fields.ampm = true;
            "%p"
        }
        'u' => "%u",
        'Z' => {
            fields.offset = true;
            "%z"
        }
        'X' => {
            fields.offset = true;
            if count >= 3 { "%:z" } else { "%z" }
        }
        'z' => "%Z",
        _ => return None,
    };
    Some(spec)
}

fn is_literal(item: &Item<'_>) -> bool {
    matches!(
        item,
        Item::Literal(_) | Item::OwnedLiteral(_) | Item::Space(_) | Item::OwnedSpace(_)
    )
}

fn is_weekday(item: &Item<'_>) -> bool {
    matches!(
        item,
        Item::Fixed(Fixed::ShortWeekdayName | Fixed::LongWeekdayName)
            | Item::Numeric(Numeric::WeekdayFromMon, _)
    )
}

/// chrono parses `Space` as "any amount of whitespace"; pattern spaces are exact.
fn exact_space(item: Item<'static>) -> Item<'static> {
    match item {
        Item::Space(s) => Item::Literal(s),
        Item::OwnedSpace(s) => Item::OwnedLiteral(s),
        other => other,
    }
}

/// Append literal text, escaping strftime's `%`.
fn push_literal(spec: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            spec.push_str("%%");
        } else {
            spec.push(c);
        }
    }
}

/// A date/time pattern together with its compiled form.
///
/// The pattern string is only reachable through the compiled value, so the
/// two can never disagree. Cloning produces an independent copy.
#[derive(Clone)]
pub struct DateFormat {
    pattern: String,
    items: Vec<Item<'static>>,
    fields: Fields,
}

impl DateFormat {
    /// Compile a pattern.
    ///
    /// Fails with a format-compile error if the pattern uses an unsupported
    /// letter or leaves a quote open.
    pub fn compile(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let mut spec = String::with_capacity(pattern.len() * 2);
        let mut fields = Fields::default();

        for token in token_regex().find_iter(&pattern) {
            let token = token.as_str();
            if token.starts_with('\'') {
                if token.len() == 1 {
                    return Err(
                        ConfigError::format_compile(pattern.as_str(), "unterminated quoted literal")
                            .into(),
                    );
                }
                let inner = &token[1..token.len() - 1];
                if inner.is_empty() {
                    spec.push('\'');
                } else {
                    push_literal(&mut spec, &inner.replace("''", "'"));
                }
            } else if token.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let mut chars = token.chars().peekable();
                while let Some(letter) = chars.next() {
                    let mut count = 1;
                    while chars.next_if_eq(&letter).is_some() {
                        count += 1;
                    }
                    let Some(strftime) = directive(letter, count, &mut fields) else {
                        let reason = format!("unsupported pattern letter '{letter}'");
                        return Err(ConfigError::format_compile(pattern.as_str(), reason).into());
                    };
                    spec.push_str(strftime);
                }
            } else {
                push_literal(&mut spec, token);
            }
        }

        let items = StrftimeItems::new(&spec)
            .parse_to_owned()
            .map_err(|e| {
                Error::from(ConfigError::format_compile(pattern.as_str(), &e).with_source(e))
            })?
            .into_iter()
            .map(exact_space)
            .collect();

        tracing::trace!(pattern = %pattern, strftime = %spec, "Compiled date format");

        Ok(Self {
            pattern,
            items,
            fields,
        })
    }

    /// Compile one of the `DEFAULT_*_FORMAT` constants.
    pub(crate) fn builtin(pattern: &'static str) -> Self {
        // Only called with the constants above; test_builtin_patterns_compile
        // keeps them valid.
        Self::compile(pattern).expect("built-in date format should compile")
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render a UTC date-time.
    pub fn format(&self, datetime: &NaiveDateTime) -> String {
        Utc.from_utc_datetime(datetime)
            .format_with_items(self.items.iter())
            .to_string()
    }

    /// Render milliseconds since the Unix epoch (UTC).
    pub fn format_millis(&self, millis: i64) -> Result<String> {
        let datetime = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            Error::Type(TypeError {
                expected: "epoch milliseconds within the supported date range",
                actual: millis.to_string(),
                rust_type: Some("i64"),
            })
        })?;
        Ok(self.format(&datetime.naive_utc()))
    }

    /// Parse text produced by this pattern back into a UTC date-time.
    ///
    /// Fields the pattern does not carry default to 1970-01-01 and midnight.
    /// If the pattern carries a UTC offset the result is shifted to UTC.
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime> {
        let mut parsed = Parsed::new();
        self.fields
            .seed(&mut parsed)
            .map_err(|e| self.parse_error(text, e))?;

        let check_weekday = self.fields.has_full_date();
        let mut discarded = Parsed::new();
        let mut rest = text;
        for item in &self.items {
            if !is_literal(item) && rest.starts_with(char::is_whitespace) {
                return Err(self.parse_error(text, "unexpected whitespace"));
            }
            let target = if is_weekday(item) && !check_weekday {
                &mut discarded
            } else {
                &mut parsed
            };
            rest = chrono::format::parse_and_remainder(target, rest, std::iter::once(item))
                .map_err(|e| self.parse_error(text, e))?;
        }
        if !rest.is_empty() {
            return Err(self.parse_error(text, format!("trailing input '{rest}'")));
        }

        if self.fields.offset {
            return parsed
                .to_datetime()
                .map(|dt| dt.naive_utc())
                .map_err(|e| self.parse_error(text, e));
        }

        let date = parsed
            .to_naive_date()
            .map_err(|e| self.parse_error(text, e))?;
        let time = parsed
            .to_naive_time()
            .map_err(|e| self.parse_error(text, e))?;
        Ok(date.and_time(time))
    }

    /// Parse text into milliseconds since the Unix epoch.
    pub fn parse_millis(&self, text: &str) -> Result<i64> {
        Ok(self.parse(text)?.and_utc().timestamp_millis())
    }

    fn parse_error(&self, text: &str, reason: impl fmt::Display) -> Error {
        Error::Type(TypeError {
            expected: "date/time text matching the configured pattern",
            actual: format!("'{}' for pattern '{}' ({})", text, self.pattern, reason),
            rust_type: Some("NaiveDateTime"),
        })
    }
}

impl PartialEq for DateFormat {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for DateFormat {}

impl fmt::Debug for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DateFormat").field(&self.pattern).finish()
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl TryFrom<String> for DateFormat {
    type Error = Error;

    fn try_from(pattern: String) -> Result<Self> {
        Self::compile(pattern)
    }
}

impl TryFrom<&str> for DateFormat {
    type Error = Error;

    fn try_from(pattern: &str) -> Result<Self> {
        Self::compile(pattern)
    }
}

impl From<DateFormat> for String {
    fn from(format: DateFormat) -> Self {
        format.pattern
    }
}

impl serde::Serialize for DateFormat {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

impl<'de> serde::Deserialize<'de> for DateFormat {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::compile(pattern).map_err(serde::de::Error::custom)
    }
}
