use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued request. Only the most recently issued token is
/// current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Last-writer-wins gate for concurrent requests: a response is accepted only
/// if no newer request was issued after it.
#[derive(Debug, Default)]
pub struct ResponseGate {
    latest: AtomicU64,
}

impl ResponseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// Result of one dispatch as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed(String),
    Failed(String),
    /// A newer request was issued before this one finished; its response was
    /// dropped.
    Superseded,
}

impl DispatchOutcome {
    /// Text to display, if this outcome should be displayed at all.
    pub fn text(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Completed(t) | DispatchOutcome::Failed(t) => Some(t),
            DispatchOutcome::Superseded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_token_is_current() {
        let gate = ResponseGate::new();
        let a = gate.issue();
        assert!(gate.is_current(a));
        let b = gate.issue();
        assert!(!gate.is_current(a));
        assert!(gate.is_current(b));
    }

    #[test]
    fn superseded_has_no_text() {
        assert_eq!(DispatchOutcome::Superseded.text(), None);
        assert_eq!(DispatchOutcome::Failed("x".into()).text(), Some("x"));
    }
}
