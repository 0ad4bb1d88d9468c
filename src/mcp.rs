//! MCP (Model Context Protocol) server for packing-list analysis.
//!
//! Exposes the shared `ops` as MCP tools so that AI assistants (Claude
//! Desktop, Cursor, etc.) can parse, filter, and aggregate packing lists over
//! stdio JSON-RPC.
//!
//! Start with: `packlist --mcp`

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::agent::catalog::{self, AgentCatalog};
use crate::agent::prompt::{DEFAULT_MAX_RECORDS, DEFAULT_MODEL};
use crate::algo::aggregate::{CHART_TOP_N, TABLE_TOP_N};
use crate::ops;

// ── Parameter structs ───────────────────────────────────────────────────────
// Each struct maps 1:1 with a CLI subcommand. `JsonSchema` is required by
// rmcp so that the tool's input schema is auto-generated for the AI client.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ParseParams {
    /// Packing-list CSV text. The first line is the header.
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OptionsParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Column whose distinct values to list.
    pub field: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilterParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Column to match. Empty means no filter.
    #[serde(default)]
    pub field: String,
    /// Value the column must equal. Empty means no filter.
    #[serde(default)]
    pub value: String,
}

/// Rows plus an optional exact-match filter applied before the view.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ViewParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Filter column (optional).
    #[serde(default)]
    pub field: String,
    /// Filter value (optional).
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RankParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Column to rank by frequency (e.g. "customer", "ModelNum").
    pub by: String,
    /// Number of entries (default: 10).
    #[serde(default = "default_chart_top")]
    pub top: usize,
    /// Filter column (optional).
    #[serde(default)]
    pub field: String,
    /// Filter value (optional).
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TimelineParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Date column (default: "deliverdate").
    #[serde(default = "default_date_field")]
    pub by: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TableParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Number of table rows (default: 5).
    #[serde(default = "default_table_top")]
    pub top: usize,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PromptParams {
    /// JSON rows, as returned by `parse`.
    pub records: Vec<Value>,
    /// Agent index, name, or role (see `agents`).
    pub agent: String,
    /// Prompt to use instead of the agent template. `{{input}}` marks the data.
    pub custom_prompt: Option<String>,
    /// Model name (default: "gemini-3-flash-preview").
    #[serde(default = "default_model")]
    pub model: String,
    /// Records included in the prompt context (default: 50).
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmptyParams {}

fn default_chart_top() -> usize {
    CHART_TOP_N
}
fn default_table_top() -> usize {
    TABLE_TOP_N
}
fn default_date_field() -> String {
    "deliverdate".into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

// ── Shared helpers ──────────────────────────────────────────────────────────

fn json_text(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn view(records: &[Value], field: &str, value: &str) -> Vec<Value> {
    match ops::op_filter(records, field, value) {
        Value::Array(rows) => rows,
        _ => Vec::new(),
    }
}

/// Run a pure op on the blocking pool and wrap its JSON as tool output.
async fn run_op<F>(op: F) -> Result<CallToolResult, McpError>
where
    F: FnOnce() -> Result<Value, String> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
        .map_err(|e| McpError::invalid_params(e, None))?;
    Ok(CallToolResult::success(vec![Content::text(json_text(
        &result,
    ))]))
}

// ── MCP Server ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PacklistMcp {
    catalog: Arc<AgentCatalog>,
    #[allow(dead_code)] // accessed at runtime by the #[tool_router] macro
    tool_router: ToolRouter<Self>,
}

impl Default for PacklistMcp {
    fn default() -> Self {
        Self::new(catalog::default_catalog())
    }
}

#[tool_router]
impl PacklistMcp {
    pub fn new(catalog: AgentCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "parse",
        description = "Parse packing-list CSV text into JSON rows. The first line is the header; rows with fewer fields than the header are skipped; surrounding quotes and curly quotes are stripped from values. Pass the returned rows as `records` to the other tools."
    )]
    async fn parse(&self, params: Parameters<ParseParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || ops::op_parse(&p.text)).await
    }

    #[tool(
        name = "fields",
        description = "List the known packing-list columns and the subset offered for filtering."
    )]
    async fn fields(&self, _params: Parameters<EmptyParams>) -> Result<CallToolResult, McpError> {
        run_op(|| Ok(ops::op_fields())).await
    }

    #[tool(
        name = "options",
        description = "Distinct non-empty values of one column, sorted ascending. Use to pick a filter value."
    )]
    async fn options(&self, params: Parameters<OptionsParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || Ok(ops::op_options(&p.records, &p.field))).await
    }

    #[tool(
        name = "filter",
        description = "Keep rows whose `field` equals `value` exactly. An empty field or value returns every row."
    )]
    async fn filter(&self, params: Parameters<FilterParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || Ok(ops::op_filter(&p.records, &p.field, &p.value))).await
    }

    #[tool(
        name = "kpis",
        description = "Headline counters: total records, distinct customers, distinct devices, and total units (sum of integer quantities; non-numeric counts as 0)."
    )]
    async fn kpis(&self, params: Parameters<ViewParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || Ok(ops::op_kpis(&view(&p.records, &p.field, &p.value)))).await
    }

    #[tool(
        name = "rank",
        description = "Most frequent values of a column as `[{name, value}]`, count descending, ties in first-seen order."
    )]
    async fn rank(&self, params: Parameters<RankParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || {
            let rows = view(&p.records, &p.field, &p.value);
            Ok(ops::op_rank(&rows, &p.by, Some(p.top)))
        })
        .await
    }

    #[tool(
        name = "categories",
        description = "Record count per device category as `[{name, value}]`."
    )]
    async fn categories(&self, params: Parameters<ViewParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || Ok(ops::op_categories(&view(&p.records, &p.field, &p.value)))).await
    }

    #[tool(
        name = "timeline",
        description = "Record count per delivery date as `[{name, value}]`, ordered by the date's numeric value."
    )]
    async fn timeline(
        &self,
        params: Parameters<TimelineParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || {
            let rows = view(&p.records, &p.field, &p.value);
            Ok(ops::op_timeline(&rows, Some(&p.by)))
        })
        .await
    }

    #[tool(
        name = "graph",
        description = "Supplier → device → customer network. Returns `{nodes: [{id, group, role}], links: [{source, target, value}]}` with two links per record; empty fields become \"Unknown <Role>\" nodes."
    )]
    async fn graph(&self, params: Parameters<ViewParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || Ok(ops::op_graph(&view(&p.records, &p.field, &p.value)))).await
    }

    #[tool(
        name = "licenses",
        description = "Most used license IDs with their usage count and one device name seen under each."
    )]
    async fn licenses(&self, params: Parameters<TableParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || {
            let rows = view(&p.records, &p.field, &p.value);
            Ok(ops::op_licenses(&rows, Some(p.top)))
        })
        .await
    }

    #[tool(
        name = "recent",
        description = "The first rows as transaction entries: date, customer, device, lot."
    )]
    async fn recent(&self, params: Parameters<TableParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || {
            let rows = view(&p.records, &p.field, &p.value);
            Ok(ops::op_recent(&rows, Some(p.top)))
        })
        .await
    }

    #[tool(
        name = "dashboard",
        description = "Every view at once over the filtered rows: filter block, KPIs, recent transactions, category stats, license table, top customers, category distribution, timeline, top models, and the supply graph."
    )]
    async fn dashboard(&self, params: Parameters<ViewParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        run_op(move || Ok(ops::op_dashboard(&p.records, &p.field, &p.value))).await
    }

    #[tool(
        name = "agents",
        description = "List the analyst agents with their index, name, role, and description."
    )]
    async fn agents(&self, _params: Parameters<EmptyParams>) -> Result<CallToolResult, McpError> {
        let catalog = Arc::clone(&self.catalog);
        run_op(move || Ok(ops::op_agents(&catalog))).await
    }

    #[tool(
        name = "render_prompt",
        description = "Render the prompt and system instruction an analyst agent would send for the given rows. The first `{{input}}` in the template is replaced by the first `max_records` rows as JSON. Fails when no rows are given."
    )]
    async fn render_prompt(
        &self,
        params: Parameters<PromptParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let catalog = Arc::clone(&self.catalog);
        run_op(move || {
            let rows = view(&p.records, &p.field, &p.value);
            ops::op_prompt(
                &rows,
                &catalog,
                &p.agent,
                p.custom_prompt.as_deref(),
                Some(&p.model),
                Some(p.max_records),
            )
        })
        .await
    }
}

// ── ServerHandler glue ──────────────────────────────────────────────────────

impl ServerHandler for PacklistMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Packing-list analysis engine. Call `parse` with CSV text first, then pass \
                 the returned rows as `records` to options, filter, kpis, rank, categories, \
                 timeline, graph, licenses, recent, dashboard, or render_prompt. Most view \
                 tools accept an optional `field`/`value` filter."
                    .into(),
            ),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "packlist".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Packing List Analyzer".into()),
                description: Some(
                    "Packing-list parsing, filtering, and supply-chain aggregation".into(),
                ),
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: Default::default(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_context = ToolCallContext::new(self, request, context);
        async move { self.tool_router.call(tool_context).await }
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Start the MCP server on stdio. Called from `cli.rs` when `--mcp` is passed.
pub async fn serve_stdio(catalog: AgentCatalog) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(agents = catalog.len(), "starting MCP server on stdio");
    let server = PacklistMcp::new(catalog);
    let transport = rmcp::transport::io::stdio();
    let service = server.serve(transport).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP serve error");
    })?;
    service.waiting().await?;
    Ok(())
}
