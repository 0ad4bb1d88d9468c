use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Known packing-list columns, named as they appear in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Supplier,
    DeliveryDate,
    Customer,
    LicenseId,
    DeviceCategory,
    Udi,
    DeviceName,
    LotNumber,
    SerialNumber,
    ModelNumber,
    Quantity,
    Unit,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Supplier,
        Field::DeliveryDate,
        Field::Customer,
        Field::LicenseId,
        Field::DeviceCategory,
        Field::Udi,
        Field::DeviceName,
        Field::LotNumber,
        Field::SerialNumber,
        Field::ModelNumber,
        Field::Quantity,
        Field::Unit,
    ];

    /// Header name of this column.
    pub fn column(self) -> &'static str {
        match self {
            Field::Supplier => "Suppliername",
            Field::DeliveryDate => "deliverdate",
            Field::Customer => "customer",
            Field::LicenseId => "licenseID",
            Field::DeviceCategory => "DeviceCategory",
            Field::Udi => "UDI",
            Field::DeviceName => "DeviceName",
            Field::LotNumber => "LotNumber",
            Field::SerialNumber => "SN",
            Field::ModelNumber => "ModelNum",
            Field::Quantity => "Numbers",
            Field::Unit => "Unit",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }
}

/// Columns a dashboard offers in its filter picker. The filter engine itself
/// accepts any column name.
pub const FILTERABLE_FIELDS: [Field; 5] = [
    Field::Customer,
    Field::DeviceCategory,
    Field::Supplier,
    Field::DeviceName,
    Field::ModelNumber,
];

/// One shipment row: values keyed by the header it was parsed under.
///
/// The column list is shared between all records of one ingestion, so
/// cloning a record only copies its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Build a record from a column list and positional values.
    /// Missing trailing values become empty strings; surplus values are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.resize(columns.len(), String::new());
        Self { columns, values }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Convert a JSON object into a record. Strings are kept verbatim,
    /// `null` becomes "", other scalars use their JSON text. A non-object
    /// value becomes a single `value` column.
    pub fn from_json(row: &Value) -> Self {
        match row {
            Value::Object(map) => {
                Self::from_pairs(map.iter().map(|(k, v)| (k.clone(), json_text(v))))
            }
            other => Self::from_pairs([("value", json_text(other))]),
        }
    }

    /// Generic lookup used by the field-agnostic engines. A repeated header
    /// resolves to its last occurrence.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .rposition(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    /// Typed accessor for the known columns; "" when the column is absent.
    pub fn field(&self, field: Field) -> &str {
        self.get(field.column()).unwrap_or("")
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `(column, value)` pairs in header order. A repeated header appears
    /// once, at its first position, carrying the value `get` returns.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|&(i, c)| !self.columns[..i].contains(c))
            .map(|(_, c)| (c.as_str(), self.get(c).unwrap_or("")))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(c, v)| (c.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

fn json_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// An ordered sequence of records. Input order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn from_json_rows(rows: &[Value]) -> Self {
        rows.iter().map(Record::from_json).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The first `n` records, in input order.
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// Column names of the first record (header order), or empty.
    pub fn columns(&self) -> &[String] {
        self.records.first().map(Record::columns).unwrap_or(&[])
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.records.iter().map(Record::to_json).collect())
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn get_by_name() {
        let r = Record::new(columns(&["a", "b"]), vec!["1".into(), "2".into()]);
        assert_eq!(r.get("a"), Some("1"));
        assert_eq!(r.get("b"), Some("2"));
        assert_eq!(r.get("c"), None);
    }

    #[test]
    fn typed_accessor_defaults_to_empty() {
        let r = Record::from_pairs([("customer", "C1")]);
        assert_eq!(r.field(Field::Customer), "C1");
        assert_eq!(r.field(Field::DeviceName), "");
    }

    #[test]
    fn new_pads_and_truncates_values() {
        let short = Record::new(columns(&["a", "b", "c"]), vec!["1".into()]);
        assert_eq!(short.get("c"), Some(""));
        let long = Record::new(columns(&["a"]), vec!["1".into(), "2".into()]);
        assert_eq!(long.iter().count(), 1);
    }

    #[test]
    fn field_column_roundtrip() {
        for f in Field::ALL {
            assert_eq!(Field::from_column(f.column()), Some(f));
        }
        assert_eq!(Field::from_column("nope"), None);
    }

    #[test]
    fn from_json_coerces_scalars() {
        let r = Record::from_json(&json!({"Numbers": 3, "SN": null, "customer": "C1"}));
        assert_eq!(r.get("Numbers"), Some("3"));
        assert_eq!(r.get("SN"), Some(""));
        assert_eq!(r.field(Field::Customer), "C1");
    }

    #[test]
    fn serializes_in_header_order() {
        let r = Record::new(columns(&["z", "a"]), vec!["1".into(), "2".into()]);
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"z":"1","a":"2"}"#);
    }

    #[test]
    fn repeated_header_is_last_wins() {
        let values = vec!["1".into(), "2".into(), "3".into()];
        let r = Record::new(columns(&["a", "b", "a"]), values);
        assert_eq!(r.get("a"), Some("3"));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(r.to_json(), json!({"a": "3", "b": "2"}));
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"a":"3","b":"2"}"#);
        assert_eq!(Record::from_json(&r.to_json()).get("a"), r.get("a"));
    }

    #[test]
    fn head_caps_at_len() {
        let set: RecordSet = (0..3)
            .map(|i| Record::from_pairs([("i", i.to_string())]))
            .collect();
        assert_eq!(set.head(2).len(), 2);
        assert_eq!(set.head(10).len(), 3);
    }
}
