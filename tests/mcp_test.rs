//! MCP JSON-RPC integration tests.
//!
//! These tests spawn `packlist --mcp` as a child process and communicate
//! via stdin/stdout using newline-delimited JSON-RPC (rmcp's stdio transport).

#![cfg(all(feature = "cli", feature = "mcp"))]

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

fn packlist_binary() -> String {
    env!("CARGO_BIN_EXE_packlist").to_string()
}

fn send_jsonrpc(stdin: &mut impl Write, msg: &Value) {
    let body = serde_json::to_string(msg).unwrap();
    writeln!(stdin, "{body}").unwrap();
    stdin.flush().unwrap();
}

fn read_jsonrpc_line(reader: &mut BufReader<impl std::io::Read>) -> Option<Value> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return read_jsonrpc_line(reader); // skip blank lines
            }
            serde_json::from_str(trimmed).ok()
        }
        Err(_) => None,
    }
}

/// Spawn the MCP server, send requests, collect responses.
fn mcp_session(requests: Vec<Value>) -> Vec<Value> {
    let bin = packlist_binary();
    let mut child = Command::new(&bin)
        .arg("--mcp")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to spawn {bin}: {e}"));

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let mut reader = BufReader::new(stdout);

    let mut responses = Vec::new();
    for req in &requests {
        send_jsonrpc(&mut stdin, req);
        // Only read a response for requests with an "id" (not notifications)
        if req.get("id").is_some() {
            if let Some(resp) = read_jsonrpc_line(&mut reader) {
                responses.push(resp);
            }
        }
    }

    drop(stdin);
    let _ = child.wait();
    responses
}

fn initialize() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "0.1.0"}
        }
    })
}

fn initialized() -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    })
}

/// Call one tool and return its parsed JSON text output.
fn call_tool(name: &str, arguments: Value) -> Value {
    let responses = mcp_session(vec![
        initialize(),
        initialized(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    ]);
    responses
        .into_iter()
        .find(|r| r["id"] == 2)
        .expect("no response to tools/call")
}

fn tool_json(resp: &Value) -> Value {
    let content = &resp["result"]["content"][0];
    assert_eq!(content["type"], "text");
    serde_json::from_str(content["text"].as_str().unwrap()).unwrap()
}

const CSV: &str = "Suppliername,deliverdate,customer,DeviceName,Numbers\nS1,45930,X,D1,2\nS2,45901,Y,D1,abc\nbad";

fn rows() -> Value {
    json!([
        {"Suppliername": "S1", "deliverdate": "45930", "customer": "X", "DeviceName": "D1", "Numbers": "2"},
        {"Suppliername": "S2", "deliverdate": "45901", "customer": "Y", "DeviceName": "D1", "Numbers": "abc"},
    ])
}

#[test]
fn mcp_initialize_returns_server_info() {
    let responses = mcp_session(vec![initialize()]);

    assert!(!responses.is_empty(), "No response received");
    let resp = &responses[0];
    assert_eq!(resp["jsonrpc"], "2.0");
    assert_eq!(resp["id"], 1);
    let result = &resp["result"];
    assert!(result.get("serverInfo").is_some());
    assert_eq!(result["serverInfo"]["name"], "packlist");
}

#[test]
fn mcp_tools_list_has_all_tools() {
    let responses = mcp_session(vec![
        initialize(),
        initialized(),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/list",
            "params": {}
        }),
    ]);

    assert!(responses.len() >= 2, "Expected at least 2 responses, got {}", responses.len());
    let tools_resp = responses.iter().find(|r| r["id"] == 2).unwrap();
    let tools = tools_resp["result"]["tools"].as_array().unwrap();

    let tool_names: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    let expected = [
        "parse", "fields", "options", "filter", "kpis", "rank", "categories",
        "timeline", "graph", "licenses", "recent", "dashboard", "agents", "render_prompt",
    ];

    for name in &expected {
        assert!(
            tool_names.contains(name),
            "Missing tool: {name}. Found: {tool_names:?}"
        );
    }
    assert_eq!(tool_names.len(), 14, "Expected 14 tools, got {}", tool_names.len());
}

#[test]
fn mcp_tools_call_parse() {
    let parsed = tool_json(&call_tool("parse", json!({"text": CSV})));
    assert_eq!(parsed, rows());
}

#[test]
fn mcp_tools_call_parse_empty_is_error() {
    let resp = call_tool("parse", json!({"text": "   "}));
    assert!(resp.get("error").is_some(), "expected error, got {resp}");
}

#[test]
fn mcp_tools_call_kpis_with_filter() {
    let kpis = tool_json(&call_tool(
        "kpis",
        json!({"records": rows(), "field": "customer", "value": "X"}),
    ));
    assert_eq!(kpis["total_records"], 1);
    assert_eq!(kpis["total_units"], 2);
}

#[test]
fn mcp_tools_call_timeline() {
    let series = tool_json(&call_tool("timeline", json!({"records": rows()})));
    assert_eq!(
        series,
        json!([{"name": "45901", "value": 1}, {"name": "45930", "value": 1}])
    );
}

#[test]
fn mcp_tools_call_graph() {
    let graph = tool_json(&call_tool("graph", json!({"records": rows()})));
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(graph["links"].as_array().unwrap().len(), 4);
}

#[test]
fn mcp_tools_call_render_prompt() {
    let p = tool_json(&call_tool(
        "render_prompt",
        json!({"records": rows(), "agent": "0", "custom_prompt": "Data: {{input}}"}),
    ));
    let prompt = p["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("Data: ["));
    assert!(prompt.contains("45901"));
}

#[test]
fn mcp_tools_call_render_prompt_without_rows_fails() {
    let resp = call_tool("render_prompt", json!({"records": [], "agent": "0"}));
    assert!(resp.get("error").is_some(), "expected error, got {resp}");
}
