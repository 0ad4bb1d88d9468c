use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::RecordSet;

/// Currently selected `(field, value)` equality filter.
///
/// A value only exists under a field: choosing a new field always clears the
/// value, because the value's domain depends on the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFilter")]
pub struct FilterState {
    field: Option<String>,
    value: Option<String>,
}

#[derive(Deserialize)]
struct RawFilter {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

impl From<RawFilter> for FilterState {
    fn from(raw: RawFilter) -> Self {
        Self::from_parts(
            raw.field.as_deref().unwrap_or(""),
            raw.value.as_deref().unwrap_or(""),
        )
    }
}

impl FilterState {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a state from raw strings; "" means unset on either side.
    pub fn from_parts(field: &str, value: &str) -> Self {
        let mut state = Self::none();
        state.select_field(field);
        state.select_value(value);
        state
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True when both a field and a value are selected.
    pub fn is_active(&self) -> bool {
        self.field.is_some() && self.value.is_some()
    }

    /// Select a field ("" clears it). The value is always reset.
    pub fn select_field(&mut self, field: &str) {
        self.field = non_empty(field);
        self.value = None;
    }

    /// Select a value ("" clears it). Ignored while no field is selected.
    pub fn select_value(&mut self, value: &str) {
        if self.field.is_some() {
            self.value = non_empty(value);
        }
    }

    pub fn clear(&mut self) {
        self.field = None;
        self.value = None;
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Distinct non-empty values of `field`, ascending. Empty `field` yields none.
pub fn options_for(set: &RecordSet, field: &str) -> Vec<String> {
    if field.is_empty() {
        return Vec::new();
    }
    set.iter()
        .filter_map(|r| r.get(field))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Records whose `field` equals `value` exactly, in input order.
///
/// When either side is empty no filter applies and the full set is borrowed
/// back unchanged.
pub fn apply<'a>(set: &'a RecordSet, field: &str, value: &str) -> Cow<'a, RecordSet> {
    if field.is_empty() || value.is_empty() {
        return Cow::Borrowed(set);
    }
    let filtered: RecordSet = set
        .iter()
        .filter(|r| r.get(field) == Some(value))
        .cloned()
        .collect();
    tracing::debug!(field, value, matched = filtered.len(), total = set.len(), "applied filter");
    Cow::Owned(filtered)
}

pub fn apply_state<'a>(set: &'a RecordSet, state: &FilterState) -> Cow<'a, RecordSet> {
    apply(set, state.field().unwrap_or(""), state.value().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::record::Record;

    fn customers(names: &[&str]) -> RecordSet {
        names
            .iter()
            .map(|c| Record::from_pairs([("customer", *c)]))
            .collect()
    }

    #[test]
    fn options_sorted_and_deduplicated() {
        let set = customers(&["Y", "X", "", "X"]);
        assert_eq!(options_for(&set, "customer"), vec!["X", "Y"]);
    }

    #[test]
    fn options_for_unset_field() {
        let set = customers(&["X"]);
        assert!(options_for(&set, "").is_empty());
    }

    #[test]
    fn options_for_missing_column() {
        let set = customers(&["X"]);
        assert!(options_for(&set, "DeviceName").is_empty());
    }

    #[test]
    fn apply_exact_match_only() {
        let set = customers(&["X", "x", "XY", "X"]);
        let out = apply(&set, "customer", "X");
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.get("customer") == Some("X")));
    }

    #[test]
    fn apply_passthrough_borrows() {
        let set = customers(&["X", "Y"]);
        assert!(matches!(apply(&set, "", ""), Cow::Borrowed(_)));
        assert!(matches!(apply(&set, "customer", ""), Cow::Borrowed(_)));
        assert!(matches!(apply(&set, "", "X"), Cow::Borrowed(_)));
    }

    #[test]
    fn apply_is_idempotent() {
        let set = customers(&["X", "Y", "X"]);
        let once = apply(&set, "customer", "X").into_owned();
        let twice = apply(&once, "customer", "X").into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn select_field_resets_value() {
        let mut state = FilterState::from_parts("customer", "X");
        assert!(state.is_active());
        state.select_field("DeviceName");
        assert_eq!(state.field(), Some("DeviceName"));
        assert_eq!(state.value(), None);
    }

    #[test]
    fn value_requires_field() {
        let mut state = FilterState::none();
        state.select_value("X");
        assert_eq!(state.value(), None);
        assert!(!state.is_active());
    }

    #[test]
    fn clearing_field_clears_value() {
        let mut state = FilterState::from_parts("customer", "X");
        state.select_field("");
        assert_eq!(state, FilterState::none());
    }

    #[test]
    fn apply_state_matches_apply() {
        let set = customers(&["X", "Y", "X"]);
        let state = FilterState::from_parts("customer", "Y");
        assert_eq!(apply_state(&set, &state).len(), 1);
        assert_eq!(apply_state(&set, &FilterState::none()).len(), 3);
    }

    #[test]
    fn deserialize_enforces_field_before_value() {
        let orphan: FilterState = serde_json::from_str(r#"{"field":null,"value":"X"}"#).unwrap();
        assert_eq!(orphan, FilterState::none());

        let blank: FilterState = serde_json::from_str(r#"{"field":"","value":"X"}"#).unwrap();
        assert_eq!(blank, FilterState::none());

        let state = FilterState::from_parts("customer", "X");
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<FilterState>(&json).unwrap(), state);
    }
}
