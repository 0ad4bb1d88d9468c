use serde::Serialize;

use super::catalog::Agent;
use super::AgentError;
use crate::algo::record::RecordSet;

/// Placeholder replaced by the serialized record context. Only the first
/// occurrence is substituted.
pub const INPUT_PLACEHOLDER: &str = "{{input}}";

/// Records included in the prompt context.
pub const DEFAULT_MAX_RECORDS: usize = 50;

pub const GEMINI_FLASH: &str = "gemini-3-flash-preview";
pub const GEMINI_PRO: &str = "gemini-3-pro-preview";
pub const DEFAULT_MODEL: &str = GEMINI_FLASH;
pub const MODELS: [&str; 2] = [GEMINI_FLASH, GEMINI_PRO];

/// Everything a generation service needs for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
}

pub fn system_instruction(agent: &Agent) -> String {
    format!(
        "You are {}, a specialized medical device supply chain analyst.",
        agent.name
    )
}

/// Pretty JSON of the first `max_records` records, columns in header order.
pub fn data_context(records: &RecordSet, max_records: usize) -> Result<String, AgentError> {
    serde_json::to_string_pretty(records.head(max_records)).map_err(AgentError::Serialize)
}

/// The custom prompt when it has non-whitespace content, otherwise the
/// agent's template.
pub fn effective_template<'a>(agent: &'a Agent, custom: Option<&'a str>) -> &'a str {
    match custom {
        Some(c) if !c.trim().is_empty() => c,
        _ => &agent.prompt_template,
    }
}

pub fn render_prompt(template: &str, context: &str) -> String {
    template.replacen(INPUT_PLACEHOLDER, context, 1)
}

/// Assemble the full request for `agent` over `records`. Empty record sets are
/// rejected before anything is rendered.
pub fn build_request(
    agent: &Agent,
    custom: Option<&str>,
    records: &RecordSet,
    model: &str,
    max_records: usize,
) -> Result<GenerationRequest, AgentError> {
    if records.is_empty() {
        return Err(AgentError::NoData);
    }
    let context = data_context(records, max_records)?;
    let prompt = render_prompt(effective_template(agent, custom), &context);
    tracing::debug!(
        agent = %agent.role,
        model,
        context_records = records.len().min(max_records),
        prompt_chars = prompt.chars().count(),
        "built generation request"
    );
    Ok(GenerationRequest {
        model: model.to_string(),
        prompt,
        system_instruction: system_instruction(agent),
    })
}
