use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the D* replanning library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when propagation or path extraction is requested before
    /// `initialize` established the episode anchors.
    #[error("planner has not been initialized with a source and target")]
    NotInitialized,

    /// The goal node was removed from the graph while a search was active.
    #[error("goal node {node} was removed from the graph")]
    GoalRemoved { node: String },

    /// The current position node was removed from the graph while a search
    /// was active.
    #[error("current position {node} was removed from the graph")]
    PositionRemoved { node: String },

    /// Every node and edge was dropped from the graph mid-search.
    #[error("graph was cleared while a search was active")]
    GraphCleared,

    /// Raised when an anchor refers to a node the graph does not contain.
    #[error("node {node} is not part of the graph")]
    UnknownNode { node: String },

    /// Raised when the backpointer chain does not currently reach the goal.
    #[error("no path from {from} to {goal}")]
    NoPath { from: String, goal: String },

    /// Raised when `compute` stopped after the configured number of
    /// propagation steps without settling.
    #[error("propagation stopped after {limit} steps without settling")]
    StepLimitExceeded { limit: usize },

    /// Raised when a scenario refers to a node name that was never declared.
    #[error("unknown node name: {name}{}", format_suggestions(.suggestions))]
    UnknownNodeName {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a scenario document is structurally invalid.
    #[error("invalid scenario: {message}")]
    InvalidScenario { message: String },

    /// Raised when a scenario file could not be read.
    #[error("failed to read scenario from {path}: {source}")]
    ScenarioRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error leaves the planner unusable until it is
    /// re-initialized.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::GoalRemoved { .. } | Error::PositionRemoved { .. } | Error::GraphCleared
        )
    }

    /// Clone a fatal error so it can be reported again on later calls.
    pub(crate) fn replay(&self) -> Option<Error> {
        match self {
            Error::GoalRemoved { node } => Some(Error::GoalRemoved { node: node.clone() }),
            Error::PositionRemoved { node } => Some(Error::PositionRemoved { node: node.clone() }),
            Error::GraphCleared => Some(Error::GraphCleared),
            _ => None,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_are_classified() {
        assert!(Error::GraphCleared.is_fatal());
        assert!(Error::GoalRemoved { node: "7".into() }.is_fatal());
        assert!(!Error::NotInitialized.is_fatal());
        assert!(!Error::NoPath {
            from: "1".into(),
            goal: "2".into()
        }
        .is_fatal());
    }

    #[test]
    fn suggestions_render_in_message() {
        let error = Error::UnknownNodeName {
            name: "Alpah".into(),
            suggestions: vec!["Alpha".into()],
        };
        assert_eq!(
            error.to_string(),
            "unknown node name: Alpah. Did you mean 'Alpha'?"
        );
    }
}
