use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the DryRoutes library.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two dataset payloads a load error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Nodes,
    Edges,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DatasetKind::Nodes => "nodes",
            DatasetKind::Edges => "edges",
        };
        f.write_str(value)
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Payload could not be decompressed or is not a JSON array of records.
    #[error("failed to decode {dataset} dataset: {message}")]
    Decode {
        dataset: DatasetKind,
        message: String,
    },

    /// A record is missing a required key or carries an unusable value.
    #[error("invalid {dataset} record #{index}: {message}")]
    Schema {
        dataset: DatasetKind,
        index: usize,
        message: String,
    },

    /// An edge names an endpoint that is not present in the node set.
    #[error("edge #{index} ({origin} -> {destination}) references unknown node {missing}")]
    DanglingEdge {
        index: usize,
        origin: NodeId,
        destination: NodeId,
        missing: NodeId,
    },

    /// A routing request named a node that is not part of the loaded graph.
    #[error("unknown {role} node: {id}{}", format_suggestions(.suggestions))]
    UnknownNode {
        role: EndpointRole,
        id: String,
        suggestions: Vec<String>,
    },

    /// A routing request asked for an unsupported weight criterion.
    #[error("unsupported route criterion '{value}'; expected one of: costo_total, tiempo")]
    Configuration { value: String },

    /// A local dataset file does not exist.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// The remote server answered a dataset request with a non-success status.
    #[error("fetching {url} failed with HTTP status {status}")]
    FetchStatus { url: String, status: u16 },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// `true` for failures that abort a whole dataset load (decode, schema,
    /// dangling references and fetch failures).
    pub fn is_load_error(&self) -> bool {
        !self.is_request_error()
    }

    /// `true` for failures scoped to a single routing request. The loaded
    /// graph stays usable after these.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownNode { .. } | Error::Configuration { .. }
        )
    }
}

/// Which end of a routing request an identifier was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Target,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EndpointRole::Source => "source",
            EndpointRole::Target => "target",
        };
        f.write_str(value)
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
    fn unknown_node_lists_suggestions() {
        let error = Error::UnknownNode {
            role: EndpointRole::Target,
            id: "nod-1O".to_string(),
            suggestions: vec!["nod-10".to_string(), "nod-11".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "unknown target node: nod-1O. Did you mean one of: 'nod-10', 'nod-11'?"
        );
    }

    #[test]
    fn request_errors_are_not_load_errors() {
        let config = Error::Configuration {
            value: "altura".to_string(),
        };
        assert!(config.is_request_error());
        assert!(!config.is_load_error());

        let dangling = Error::DanglingEdge {
            index: 3,
            origin: NodeId::Int(1),
            destination: NodeId::Int(9),
            missing: NodeId::Int(9),
        };
        assert!(dangling.is_load_error());
        assert_eq!(
            dangling.to_string(),
            "edge #3 (1 -> 9) references unknown node 9"
        );
    }
}
