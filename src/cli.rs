use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nu_plugin_packlist::agent::catalog::{self, AgentCatalog};
use nu_plugin_packlist::agent::prompt::{DEFAULT_MAX_RECORDS, DEFAULT_MODEL};
use nu_plugin_packlist::ops;
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "packlist",
    version,
    about = "Packing-list parsing, filtering, supply-chain aggregation, and analyst prompts"
)]
struct Cli {
    /// Start as an MCP (Model Context Protocol) server on stdio.
    /// AI assistants (Claude Desktop, Cursor, etc.) connect via JSON-RPC.
    /// Only `--catalog` may accompany it.
    #[cfg(feature = "mcp")]
    #[arg(long, conflicts_with_all = ["input", "json", "field", "value"])]
    mcp: bool,

    /// Read the packing list from a file instead of stdin
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Input is JSON rows (e.g. output of `packlist parse`) rather than CSV text
    #[arg(long, global = true)]
    json: bool,

    /// Agent catalog JSON file. Defaults to the embedded catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(flatten)]
    filter: FilterArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Exact-match filter applied before any view is computed.
#[derive(Args)]
struct FilterArgs {
    /// Column to filter on (e.g. customer, DeviceName)
    #[arg(long, global = true)]
    field: Option<String>,
    /// Value the column must equal
    #[arg(long, global = true)]
    value: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse packing-list CSV into JSON rows
    Parse,
    /// List the known packing-list columns and the filterable subset
    Fields,
    /// Distinct non-empty values of --field across all rows
    Options,
    /// Rows matching --field/--value
    Filter,
    /// Record count, distinct customers and devices, and total units
    Kpis,
    /// Most frequent values of a column
    Rank {
        /// Column to rank
        #[arg(short, long)]
        by: String,
        /// Number of entries to keep
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Count per device category
    Categories,
    /// Count per delivery date, in date order
    Timeline {
        /// Date column (default: deliverdate)
        #[arg(short, long)]
        by: Option<String>,
    },
    /// Supplier → device → customer graph
    Graph,
    /// Most used license IDs with an example device
    Licenses {
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// First rows as transaction entries
    Recent {
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Every dashboard view at once
    Dashboard,
    /// List analyst agents
    #[command(name = "agents")]
    ListAgents,
    /// Render the request an agent would send, without sending it
    Prompt(AgentArgs),
    /// Send an agent request to the generation service
    #[cfg(feature = "dispatch")]
    Run {
        #[command(flatten)]
        agent: AgentArgs,
        /// Service base URL
        #[arg(long, default_value = nu_plugin_packlist::agent::dispatch::DEFAULT_ENDPOINT)]
        endpoint: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = nu_plugin_packlist::agent::dispatch::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
}

#[derive(Args)]
struct AgentArgs {
    /// Agent index, name, or role
    agent: String,
    /// Prompt used instead of the agent template ({{input}} marks the data)
    #[arg(long)]
    custom: Option<String>,
    /// Model name: gemini-3-flash-preview, gemini-3-pro-preview
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,
    /// Records included in the prompt context
    #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
    max_records: usize,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    // ── MCP server mode ─────────────────────────────────────────────────
    #[cfg(feature = "mcp")]
    if cli.mcp {
        let catalog = load_agents(cli.catalog.as_ref());
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
        rt.block_on(async {
            if let Err(e) = nu_plugin_packlist::mcp::serve_stdio(catalog).await {
                eprintln!("MCP server error: {e}");
                std::process::exit(1);
            }
        });
        return;
    }

    // ── Normal subcommand dispatch ──────────────────────────────────────
    let command = cli.command.unwrap_or_else(|| {
        eprintln!("No subcommand provided. Run `packlist --help` for usage.");
        std::process::exit(1);
    });

    if let Commands::Fields = command {
        print_json(&ops::op_fields());
        return;
    }
    if let Commands::ListAgents = command {
        print_json(&ops::op_agents(&load_agents(cli.catalog.as_ref())));
        return;
    }

    let rows = load_rows(cli.input.as_ref(), cli.json);
    let field = cli.filter.field.as_deref().unwrap_or("");
    let value = cli.filter.value.as_deref().unwrap_or("");

    match command {
        Commands::Parse => print_json(&Value::Array(rows)),
        Commands::Options => {
            if field.is_empty() {
                fail("options requires --field");
            }
            print_json(&ops::op_options(&rows, field));
        }
        Commands::Dashboard => print_json(&ops::op_dashboard(&rows, field, value)),
        other => {
            let view = filtered(rows, field, value);
            run_view(other, &view, cli.catalog.as_ref());
        }
    }
}

fn run_view(command: Commands, rows: &[Value], agents: Option<&PathBuf>) {
    match command {
        Commands::Filter => print_json(&Value::Array(rows.to_vec())),
        Commands::Kpis => print_json(&ops::op_kpis(rows)),
        Commands::Rank { by, top } => print_json(&ops::op_rank(rows, &by, top)),
        Commands::Categories => print_json(&ops::op_categories(rows)),
        Commands::Timeline { by } => print_json(&ops::op_timeline(rows, by.as_deref())),
        Commands::Graph => print_json(&ops::op_graph(rows)),
        Commands::Licenses { top } => print_json(&ops::op_licenses(rows, top)),
        Commands::Recent { count } => print_json(&ops::op_recent(rows, count)),
        Commands::Prompt(args) => {
            let catalog = load_agents(agents);
            let result = ops::op_prompt(
                rows,
                &catalog,
                &args.agent,
                args.custom.as_deref(),
                Some(&args.model),
                Some(args.max_records),
            )
            .unwrap_or_else(|e| fail(e));
            print_json(&result);
        }
        #[cfg(feature = "dispatch")]
        Commands::Run {
            agent,
            endpoint,
            timeout,
        } => cmd_run(rows, &load_agents(agents), agent, endpoint, timeout),
        Commands::Parse
        | Commands::Fields
        | Commands::Options
        | Commands::Dashboard
        | Commands::ListAgents => unreachable!("handled before filtering"),
    }
}

#[cfg(feature = "dispatch")]
fn cmd_run(rows: &[Value], catalog: &AgentCatalog, args: AgentArgs, endpoint: String, timeout: u64) {
    use nu_plugin_packlist::agent::dispatch::{DispatchConfig, Dispatcher, GeminiClient};
    use nu_plugin_packlist::agent::gate::DispatchOutcome;
    use nu_plugin_packlist::agent::prompt;
    use nu_plugin_packlist::algo::record::RecordSet;

    let config = DispatchConfig {
        endpoint,
        api_key: std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok(),
        model: args.model,
        max_records: args.max_records,
        timeout_secs: timeout,
    };

    let agent = catalog.find(&args.agent).unwrap_or_else(|e| fail(e));
    let set = RecordSet::from_json_rows(rows);
    let request = prompt::build_request(
        agent,
        args.custom.as_deref(),
        &set,
        &config.model,
        config.max_records,
    )
    .unwrap_or_else(|e| fail(e));
    let client = GeminiClient::new(&config).unwrap_or_else(|e| fail(e));
    let dispatcher = Dispatcher::new(client);

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
    let outcome = rt.block_on(dispatcher.dispatch(request));
    let (status, text) = match &outcome {
        DispatchOutcome::Completed(t) => ("completed", t.as_str()),
        DispatchOutcome::Failed(t) => ("failed", t.as_str()),
        DispatchOutcome::Superseded => ("superseded", ""),
    };
    print_json(&serde_json::json!({
        "agent": agent.role,
        "model": config.model,
        "status": status,
        "text": text,
    }));
    if matches!(outcome, DispatchOutcome::Failed(_)) {
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable (JSON output, or the
/// MCP transport). `RUST_LOG` overrides the default level.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nu_plugin_packlist=info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(e),
    }
}

fn read_input(path: Option<&PathBuf>) -> String {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .unwrap_or_else(|e| fail(format!("failed to read {}: {e}", p.display()))),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .unwrap_or_else(|e| fail(format!("failed to read stdin: {e}")));
            buf
        }
    }
}

fn load_rows(path: Option<&PathBuf>, json: bool) -> Vec<Value> {
    let text = read_input(path);
    let parsed = if json {
        serde_json::from_str(&text).unwrap_or_else(|e| fail(format!("invalid JSON input: {e}")))
    } else {
        ops::op_parse(&text).unwrap_or_else(|e| fail(e))
    };
    match parsed {
        Value::Array(arr) => arr,
        single => vec![single],
    }
}

fn filtered(rows: Vec<Value>, field: &str, value: &str) -> Vec<Value> {
    if field.is_empty() || value.is_empty() {
        return rows;
    }
    match ops::op_filter(&rows, field, value) {
        Value::Array(arr) => arr,
        _ => Vec::new(),
    }
}

fn load_agents(path: Option<&PathBuf>) -> AgentCatalog {
    catalog::resolve_catalog(path.map(PathBuf::as_path)).unwrap_or_else(|e| fail(e))
}
