//! Aggregate projections over a (usually filtered) record set.
//!
//! Every function here is total: malformed numbers degrade to zero or to a
//! trailing sort position, and nothing is cached between calls.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::record::{Field, RecordSet};

/// Default ranking size for chart views.
pub const CHART_TOP_N: usize = 10;
/// Default ranking size for table views.
pub const TABLE_TOP_N: usize = 5;

/// Headline counters for a record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_records: usize,
    pub unique_customers: usize,
    pub unique_devices: usize,
    pub total_units: i64,
}

/// A `(key, count)` pair of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseUsage {
    pub license_id: String,
    pub count: usize,
    pub example_device: String,
}

/// One line of the "recent transactions" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub customer: String,
    pub device: String,
    pub lot: String,
}

/// Leading-integer parse: skips leading whitespace, accepts one sign, stops
/// at the first non-digit. `None` when no digit is found. Digit runs beyond
/// the `i64` range saturate.
pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { magnitude.saturating_neg() } else { magnitude })
}

/// Best-effort integer value; anything unparsable counts as zero.
pub fn parse_int_or_zero(s: &str) -> i64 {
    leading_int(s).unwrap_or(0)
}

pub fn kpis(set: &RecordSet) -> Kpis {
    let customers: HashSet<&str> = set.iter().map(|r| r.field(Field::Customer)).collect();
    let devices: HashSet<&str> = set.iter().map(|r| r.field(Field::DeviceName)).collect();
    let total_units = set
        .iter()
        .map(|r| parse_int_or_zero(r.field(Field::Quantity)))
        .fold(0i64, i64::saturating_add);

    Kpis {
        total_records: set.len(),
        unique_customers: customers.len(),
        unique_devices: devices.len(),
        total_units,
    }
}

/// Occurrence count per value of `field`, in first-encountered order.
/// Records without the column count under "".
pub fn frequencies(set: &RecordSet, field: &str) -> Vec<Ranked> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<Ranked> = Vec::new();
    for record in set {
        let key = record.get(field).unwrap_or("");
        match index.get(key) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(key, out.len());
                out.push(Ranked {
                    key: key.to_string(),
                    count: 1,
                });
            }
        }
    }
    out
}

/// The `n` most frequent values of `field`, count descending.
/// Equal counts keep first-encountered order.
pub fn top_n(set: &RecordSet, field: &str, n: usize) -> Vec<Ranked> {
    let mut ranked = frequencies(set, field);
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Count per device category, every category present, untruncated.
pub fn category_distribution(set: &RecordSet) -> Vec<Ranked> {
    frequencies(set, Field::DeviceCategory.column())
}

/// Count per date label, ordered by the label's numeric value.
///
/// Dates are day serials, so "45930" sorts before "45964" numerically.
/// Labels without a leading integer go last in first-encountered order.
pub fn timeline(set: &RecordSet, field: &str) -> Vec<Ranked> {
    let mut series = frequencies(set, field);
    series.sort_by_key(|r| match leading_int(&r.key) {
        Some(n) => (false, n),
        None => (true, 0),
    });
    series
}

/// Top `n` license IDs by usage with one device name seen under each.
pub fn license_usage(set: &RecordSet, n: usize) -> Vec<LicenseUsage> {
    let column = Field::LicenseId.column();
    top_n(set, column, n)
        .into_iter()
        .map(|ranked| {
            let example_device = set
                .iter()
                .find(|r| r.get(column).unwrap_or("") == ranked.key)
                .map(|r| r.field(Field::DeviceName).to_string())
                .unwrap_or_default();
            LicenseUsage {
                license_id: ranked.key,
                count: ranked.count,
                example_device,
            }
        })
        .collect()
}

/// The first `n` records as transaction table rows.
pub fn recent(set: &RecordSet, n: usize) -> Vec<TransactionRow> {
    set.head(n)
        .iter()
        .map(|r| TransactionRow {
            date: r.field(Field::DeliveryDate).to_string(),
            customer: r.field(Field::Customer).to_string(),
            device: r.field(Field::DeviceName).to_string(),
            lot: r.field(Field::LotNumber).to_string(),
        })
        .collect()
}

/// The first `n` distinct categories in encounter order, with their counts.
pub fn category_stats(set: &RecordSet, n: usize) -> Vec<Ranked> {
    let mut stats = category_distribution(set);
    stats.truncate(n);
    stats
}
