use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AgentError;

/// Embedded default catalog, compiled from `agents/default.json`.
/// Callers override it by passing a catalog file path explicitly.
const EMBEDDED_DEFAULT: &str = include_str!("../../agents/default.json");

/// A named analyst persona with a prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: String,
    pub prompt_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCatalog {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub agents: Vec<Agent>,
}

impl AgentCatalog {
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    /// Look an agent up by index, exact name, or role (case-insensitive).
    pub fn find(&self, key: &str) -> Result<&Agent, AgentError> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            if let Some(agent) = self.get(index) {
                return Ok(agent);
            }
        }
        self.agents
            .iter()
            .find(|a| a.name == key || a.role.eq_ignore_ascii_case(key))
            .ok_or_else(|| AgentError::UnknownAgent(key.to_string()))
    }

    /// Role names in catalog order.
    pub fn roles(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.role.as_str()).collect()
    }
}

/// The embedded default catalog.
pub fn default_catalog() -> AgentCatalog {
    parse_catalog(EMBEDDED_DEFAULT).expect("embedded default agent catalog is invalid JSON")
}

pub fn parse_catalog(json: &str) -> Result<AgentCatalog, AgentError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_catalog(path: &Path) -> Result<AgentCatalog, AgentError> {
    let json = std::fs::read_to_string(path).map_err(|source| AgentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&json)
}

/// Load from `path` when given, otherwise the embedded default.
pub fn resolve_catalog(path: Option<&Path>) -> Result<AgentCatalog, AgentError> {
    match path {
        Some(p) => load_catalog(p),
        None => Ok(default_catalog()),
    }
}

pub fn embedded_default_json() -> &'static str {
    EMBEDDED_DEFAULT
}
