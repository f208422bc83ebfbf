//! Tolerant field decoders for documents written by older storefront builds.
//!
//! The store holds records produced by several generations of the checkout
//! form: prices arrive as numbers or strings, dates as RFC 3339 timestamps,
//! plain `YYYY-MM-DD` strings or epoch milliseconds. A field that cannot be
//! understood decodes as absent instead of failing the whole record.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::IgnoredAny, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    fn into_amount(self) -> Option<f64> {
        match self {
            Loose::Number(value) => Some(value),
            Loose::Text(raw) => raw.trim().parse::<f64>().ok(),
            Loose::Other(_) => None,
        }
        .filter(|value| value.is_finite())
    }
}

/// Decodes a monetary amount from a number or numeric string.
pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.into_amount())
}

/// Decodes a non-negative whole quantity; fractional input is truncated.
pub fn quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?
        .into_amount()
        .filter(|value| *value >= 0.0)
        .map(|value| value.min(u32::MAX as f64) as u32))
}

/// Decodes a label that may have been stored as a string or a number.
pub fn label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Loose::Number(value) if value.is_finite() => Some(value.to_string()),
        _ => None,
    })
}

/// Decodes free text; anything unreadable becomes an empty string.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(label(deserializer)?.unwrap_or_default())
}

/// Decodes a nested document, or absent when it has the wrong shape.
pub fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseRecord<T> {
        Record(T),
        Other(IgnoredAny),
    }

    Ok(match LooseRecord::<T>::deserialize(deserializer)? {
        LooseRecord::Record(record) => Some(record),
        LooseRecord::Other(_) => None,
    })
}

/// Decodes a list, keeping the entries that decode and dropping the rest.
pub fn list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseEntry<T> {
        Entry(T),
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseList<T> {
        List(Vec<LooseEntry<T>>),
        Other(IgnoredAny),
    }

    Ok(match LooseList::<T>::deserialize(deserializer)? {
        LooseList::List(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    LooseEntry::Entry(value) => Some(value),
                    LooseEntry::Other(_) => None,
                })
                .collect(),
        ),
        LooseList::Other(_) => None,
    })
}

/// Decodes a timestamp from RFC 3339, `YYYY-MM-DD`, or epoch milliseconds.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(raw) => parse_timestamp(&raw),
        Loose::Number(millis) if millis.is_finite() => {
            DateTime::<Utc>::from_timestamp_millis(millis as i64)
        }
        _ => None,
    })
}

/// Decodes a category → amount map, dropping entries that are blank or not numeric.
pub fn amount_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseMap {
        Map(BTreeMap<String, Loose>),
        Other(IgnoredAny),
    }

    Ok(match LooseMap::deserialize(deserializer)? {
        LooseMap::Map(entries) => entries
            .into_iter()
            .filter_map(|(key, value)| value.into_amount().map(|amount| (key, amount)))
            .collect(),
        LooseMap::Other(_) => BTreeMap::new(),
    })
}

/// Parses the timestamp formats the storefront has written over time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
