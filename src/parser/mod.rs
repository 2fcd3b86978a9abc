//! The external parser contract (§6.1) plus the default `pulldown-cmark`
//! backed implementation.

pub mod commonmark;
pub mod tokenize;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::model::snapshot::Snapshot;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// A conforming parser must be deterministic for `(flavor, path, content)`,
/// safe for concurrent invocation, and side-effect free.
pub trait Parser: Send + Sync {
    fn parse(
        &self,
        cancellation: &Arc<AtomicBool>,
        path: &Path,
        content: &[u8],
    ) -> Result<Snapshot, ParseError>;
}

pub use commonmark::CommonMarkParser;
