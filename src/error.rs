// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur while reading or writing JSON documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons why a route could not be found.
///
/// Callers are expected to treat all variants as a uniform "route not found";
/// the variants exist for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The reference does not match any known building, room or node.
    #[error("unresolved reference: {0:?}")]
    Unresolved(String),

    /// Both endpoints exist, but lie in disconnected parts of the graph.
    #[error("no route between {from} and {to}")]
    NoRoute { from: String, to: String },

    /// The search has expanded more nodes than allowed.
    #[error("route search between {from} and {to} exceeded its step limit")]
    StepLimitExceeded { from: String, to: String },

    /// No floor graph with the given name is loaded.
    #[error("unknown floor: {0:?}")]
    UnknownFloor(String),
}

impl RouteError {
    /// Converts a failed search between two resolved node ids.
    pub(crate) fn from_search(err: crate::AStarError, from: &str, to: &str) -> Self {
        match err {
            crate::AStarError::InvalidReference(id) => Self::Unresolved(id),
            crate::AStarError::StepLimitExceeded => Self::StepLimitExceeded {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }
}
