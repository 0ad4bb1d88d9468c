//! Analyst personas and the prompt/dispatch path to a text-generation service.
//!
//! Only `dispatch` talks to the network (feature `dispatch`); catalog loading,
//! prompt rendering, and the stale-response gate are plain synchronous code.

pub mod catalog;
#[cfg(feature = "dispatch")]
pub mod dispatch;
pub mod gate;
pub mod prompt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to read agent catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse agent catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown agent '{0}'")]
    UnknownAgent(String),
    #[error("no records to analyze; load data first")]
    NoData,
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
}
