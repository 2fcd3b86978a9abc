//! The data model the engine consumes: snapshot, line table, tokens, AST.
//!
//! Everything downstream of the parser (rules, the engine, the pipeline)
//! treats these types as read-only.

pub mod node;
pub mod position;
pub mod snapshot;
pub mod token;

pub use node::{ExtKind, Node, NodeAttrs, NodeId, NodeKind, ROOT};
pub use position::{LineSpan, LineTable, SourcePosition};
pub use snapshot::{Flavor, Snapshot};
pub use token::{Token, TokenId, TokenKind, UNSET_TOKEN};
