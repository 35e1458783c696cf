//! Construction-time error taxonomy for grid graphs.
//!
//! Every variant here can only be produced while records are parsed or while a
//! [`GraphBuilder`](crate::GraphBuilder) is assembling a graph. Once a
//! [`Graph`](crate::Graph) exists it is internally consistent and no operation
//! on it fails for structural reasons.
//!
//! # Example
//!
//! ```
//! use geogrid_core::{GraphBuilder, GridError, Node, Site, Station};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_node(Node::Station(Station::new(Site::new("S1", "Berlin", "DE", 52.5, 13.4))))?;
//! let err = builder
//!     .add_node(Node::Station(Station::new(Site::new("S1", "Bonn", "DE", 50.7, 7.1))))
//!     .unwrap_err();
//! assert!(matches!(err, GridError::DuplicateIdentifier(ref id) if id == "S1"));
//! # Ok::<(), GridError>(())
//! ```

use thiserror::Error;

/// Errors raised while turning raw records into a consistent grid graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A field of a raw record could not be read as its declared type.
    #[error("malformed {record} record: field {field} = {value:?} ({reason})")]
    MalformedRecord {
        /// Record kind being parsed ("station", "power plant", "region")
        record: &'static str,
        /// Zero-based field index within the row
        field: usize,
        /// Raw field value (empty when the field is missing)
        value: String,
        reason: String,
    },

    /// Two nodes share an identifier, regardless of their variant.
    #[error("duplicate node identifier '{0}'")]
    DuplicateIdentifier(String),

    /// A link references a node identifier that is not in the graph.
    #[error("unknown link endpoint '{0}'")]
    UnknownEndpoint(String),
}

impl GridError {
    pub(crate) fn malformed(
        record: &'static str,
        field: usize,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GridError::MalformedRecord {
            record,
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;
