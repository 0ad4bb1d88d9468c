//! Shared operation wrappers for all interfaces (CLI, MCP, plugin).
//!
//! Each `op_*` function is a pure, synchronous wrapper around one or more
//! `algo`/`agent` modules. Input is CSV text or JSON rows, output is
//! `serde_json::Value`, so nothing here depends on rmcp, clap, or nu-plugin.

use serde_json::{json, Value};

use crate::agent::catalog::AgentCatalog;
use crate::agent::prompt;
use crate::algo::aggregate::{self, Ranked, CHART_TOP_N, TABLE_TOP_N};
use crate::algo::graph::{self, Graph};
use crate::algo::record::{Field, RecordSet, FILTERABLE_FIELDS};
use crate::algo::{filter, parser};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Chart series: `[{name, value}]`.
pub fn series(ranked: &[Ranked]) -> Value {
    Value::Array(
        ranked
            .iter()
            .map(|r| json!({ "name": r.key, "value": r.count }))
            .collect(),
    )
}

/// Force-graph shape: `{nodes: [{id, group, role}], links: [{source, target, value}]}`.
pub fn graph_json(graph: &Graph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes
        .iter()
        .map(|n| json!({ "id": n.id, "group": n.role.group(), "role": n.role }))
        .collect();
    let links: Vec<Value> = graph
        .edges
        .iter()
        .map(|e| json!({ "source": e.source, "target": e.target, "value": e.weight }))
        .collect();
    json!({ "nodes": nodes, "links": links })
}

fn to_value<T: serde::Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Parse packing-list text into JSON rows.
pub fn op_parse(text: &str) -> Result<Value, String> {
    let set = parser::parse(text).map_err(|e| e.to_string())?;
    Ok(set.to_json())
}

pub fn op_fields() -> Value {
    json!({
        "columns": Field::ALL.iter().map(|f| f.column()).collect::<Vec<_>>(),
        "filterable": FILTERABLE_FIELDS.iter().map(|f| f.column()).collect::<Vec<_>>(),
    })
}

pub fn op_options(rows: &[Value], field: &str) -> Value {
    let set = RecordSet::from_json_rows(rows);
    json!(filter::options_for(&set, field))
}

/// Rows whose `field` equals `value` exactly. Empty field or value is a no-op.
pub fn op_filter(rows: &[Value], field: &str, value: &str) -> Value {
    let set = RecordSet::from_json_rows(rows);
    filter::apply(&set, field, value).to_json()
}

pub fn op_kpis(rows: &[Value]) -> Value {
    to_value(&aggregate::kpis(&RecordSet::from_json_rows(rows)))
}

/// Most frequent values of `field` as a chart series.
pub fn op_rank(rows: &[Value], field: &str, top: Option<usize>) -> Value {
    let set = RecordSet::from_json_rows(rows);
    series(&aggregate::top_n(&set, field, top.unwrap_or(CHART_TOP_N)))
}

pub fn op_categories(rows: &[Value]) -> Value {
    series(&aggregate::category_distribution(&RecordSet::from_json_rows(
        rows,
    )))
}

/// Per-date counts ordered numerically. Defaults to the delivery date column.
pub fn op_timeline(rows: &[Value], field: Option<&str>) -> Value {
    let set = RecordSet::from_json_rows(rows);
    let field = field.unwrap_or(Field::DeliveryDate.column());
    series(&aggregate::timeline(&set, field))
}

pub fn op_graph(rows: &[Value]) -> Value {
    graph_json(&graph::build_graph(&RecordSet::from_json_rows(rows)))
}

pub fn op_licenses(rows: &[Value], top: Option<usize>) -> Value {
    let set = RecordSet::from_json_rows(rows);
    to_value(&aggregate::license_usage(&set, top.unwrap_or(TABLE_TOP_N)))
}

pub fn op_recent(rows: &[Value], count: Option<usize>) -> Value {
    let set = RecordSet::from_json_rows(rows);
    to_value(&aggregate::recent(&set, count.unwrap_or(TABLE_TOP_N)))
}

/// Every view of the dashboard at once, computed over the filtered subset.
/// Filter options always come from the full set.
pub fn op_dashboard(rows: &[Value], field: &str, value: &str) -> Value {
    let full = RecordSet::from_json_rows(rows);
    let view = filter::apply(&full, field, value);
    let set: &RecordSet = &view;

    json!({
        "filter": {
            "field": field,
            "value": value,
            "options": filter::options_for(&full, field),
            "showing": set.len(),
            "total": full.len(),
        },
        "kpis": aggregate::kpis(set),
        "recent": aggregate::recent(set, TABLE_TOP_N),
        "category_stats": series(&aggregate::category_stats(set, TABLE_TOP_N)),
        "licenses": aggregate::license_usage(set, TABLE_TOP_N),
        "top_customers": series(&aggregate::top_n(set, Field::Customer.column(), CHART_TOP_N)),
        "category_distribution": series(&aggregate::category_distribution(set)),
        "timeline": series(&aggregate::timeline(set, Field::DeliveryDate.column())),
        "top_models": series(&aggregate::top_n(set, Field::ModelNumber.column(), CHART_TOP_N)),
        "graph": graph_json(&graph::build_graph(set)),
    })
}

pub fn op_agents(catalog: &AgentCatalog) -> Value {
    let agents: Vec<Value> = catalog
        .agents
        .iter()
        .enumerate()
        .map(|(i, a)| {
            json!({
                "index": i,
                "name": a.name,
                "role": a.role,
                "description": a.description,
            })
        })
        .collect();
    Value::Array(agents)
}

/// Render the generation request an agent would send for `rows`.
pub fn op_prompt(
    rows: &[Value],
    catalog: &AgentCatalog,
    agent: &str,
    custom: Option<&str>,
    model: Option<&str>,
    max_records: Option<usize>,
) -> Result<Value, String> {
    let agent = catalog.find(agent).map_err(|e| e.to_string())?;
    let set = RecordSet::from_json_rows(rows);
    let request = prompt::build_request(
        agent,
        custom,
        &set,
        model.unwrap_or(prompt::DEFAULT_MODEL),
        max_records.unwrap_or(prompt::DEFAULT_MAX_RECORDS),
    )
    .map_err(|e| e.to_string())?;
    Ok(json!({
        "agent": agent.role,
        "model": request.model,
        "system_instruction": request.system_instruction,
        "prompt": request.prompt,
    }))
}
