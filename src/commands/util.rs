use nu_plugin::EvaluatedCall;
use nu_protocol::{LabeledError, PipelineData, Record, Signature, Span, SyntaxShape, Value};
use serde_json::Value as Json;

use crate::ops;

/// Read the pipeline into JSON rows.
///
/// Handles:
///   - String or byte stream → parsed as packing-list CSV text
///   - Table (list of records) → one row per record
///   - Single record → [record]
///   - Empty/Nothing → []
pub fn input_rows(input: PipelineData, span: Span) -> Result<Vec<Json>, LabeledError> {
    match input {
        PipelineData::Value(Value::String { val, .. }, _) => parse_text(&val, span),
        PipelineData::ByteStream(stream, _) => parse_text(&stream.into_string()?, span),
        PipelineData::Value(Value::Nothing { .. }, _) => Ok(vec![]),
        other => Ok(other.into_iter().map(|v| to_json(&v)).collect()),
    }
}

fn parse_text(text: &str, span: Span) -> Result<Vec<Json>, LabeledError> {
    match ops::op_parse(text) {
        Ok(Json::Array(rows)) => Ok(rows),
        Ok(_) => Ok(vec![]),
        Err(e) => Err(LabeledError::new("Cannot parse packing list").with_label(e, span)),
    }
}

/// Add the shared `--field` / `--value` filter flags.
pub fn with_filter_flags(signature: Signature) -> Signature {
    signature
        .named(
            "field",
            SyntaxShape::String,
            "Column to filter on before computing (e.g. customer, DeviceName)",
            Some('f'),
        )
        .named(
            "value",
            SyntaxShape::String,
            "Value the filter column must equal",
            Some('v'),
        )
}

pub fn filter_flags(call: &EvaluatedCall) -> Result<(String, String), LabeledError> {
    let field = call.get_flag::<String>("field")?.unwrap_or_default();
    let value = call.get_flag::<String>("value")?.unwrap_or_default();
    Ok((field, value))
}

/// Input rows narrowed by the `--field` / `--value` flags.
pub fn filtered_rows(call: &EvaluatedCall, input: PipelineData) -> Result<Vec<Json>, LabeledError> {
    let rows = input_rows(input, call.head)?;
    let (field, value) = filter_flags(call)?;
    match ops::op_filter(&rows, &field, &value) {
        Json::Array(filtered) => Ok(filtered),
        _ => Ok(vec![]),
    }
}

/// Convert a Nushell value to JSON. Values with no JSON counterpart use their
/// string form.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Nothing { .. } => Json::Null,
        Value::Bool { val, .. } => Json::Bool(*val),
        Value::Int { val, .. } => Json::from(*val),
        Value::Float { val, .. } => serde_json::Number::from_f64(*val)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String { val, .. } => Json::String(val.clone()),
        Value::List { vals, .. } => Json::Array(vals.iter().map(to_json).collect()),
        Value::Record { val, .. } => Json::Object(
            val.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
        other => other
            .coerce_string()
            .map(Json::String)
            .unwrap_or(Json::Null),
    }
}

/// Convert JSON to a Nushell value, keeping object key order.
pub fn from_json(json: &Json, span: Span) -> Value {
    match json {
        Json::Null => Value::nothing(span),
        Json::Bool(b) => Value::bool(*b, span),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::int(i, span),
            None => Value::float(n.as_f64().unwrap_or(0.0), span),
        },
        Json::String(s) => Value::string(s.clone(), span),
        Json::Array(items) => Value::list(items.iter().map(|v| from_json(v, span)).collect(), span),
        Json::Object(map) => {
            let mut record = Record::new();
            for (k, v) in map {
                record.push(k.clone(), from_json(v, span));
            }
            Value::record(record, span)
        }
    }
}

/// A single JSON result as pipeline output.
pub fn json_output(json: &Json, span: Span) -> PipelineData {
    PipelineData::Value(from_json(json, span), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trips_through_nu_values() {
        let j = json!({"b": 1, "a": [true, null, "x"], "f": 1.5});
        let v = from_json(&j, Span::test_data());
        assert_eq!(to_json(&v), j);
    }

    #[test]
    fn from_json_keeps_key_order() {
        let j = json!({"zeta": 1, "alpha": 2});
        let v = from_json(&j, Span::test_data());
        let cols: Vec<String> = v.as_record().unwrap().columns().cloned().collect();
        assert_eq!(cols, vec!["zeta", "alpha"]);
    }

    #[test]
    fn string_input_is_parsed_as_csv() {
        let input = PipelineData::Value(
            Value::string("customer,qty\nX,1\nY", Span::test_data()),
            None,
        );
        let rows = input_rows(input, Span::test_data()).unwrap();
        assert_eq!(rows, vec![json!({"customer": "X", "qty": "1"})]);
    }

    #[test]
    fn blank_string_input_errors() {
        let input = PipelineData::Value(Value::string("  ", Span::test_data()), None);
        assert!(input_rows(input, Span::test_data()).is_err());
    }
}
