//! The immutable per-file snapshot: bytes, line table, token stream, AST.

use std::fmt;
use std::path::PathBuf;

use crate::model::node::{Node, NodeId, ROOT};
use crate::model::position::{LineTable, SourcePosition};
use crate::model::token::{Token, TokenId, UNSET_TOKEN, validate_tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    #[default]
    CommonMark,
    Gfm,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flavor::CommonMark => "commonmark",
            Flavor::Gfm => "gfm",
        })
    }
}

impl std::str::FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "commonmark" => Ok(Flavor::CommonMark),
            "gfm" => Ok(Flavor::Gfm),
            other => Err(format!("unknown flavor: {other}")),
        }
    }
}

/// An immutable, fully owned record of one parsed file. Exclusively owns
/// its bytes, line table, tokens and AST arena; every node's position
/// resolves back through this snapshot.
pub struct Snapshot {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub lines: LineTable,
    pub tokens: Vec<Token>,
    pub arena: Vec<Node>,
    pub flavor: Flavor,
}

impl Snapshot {
    pub fn new(path: PathBuf, bytes: Vec<u8>, tokens: Vec<Token>, arena: Vec<Node>, flavor: Flavor) -> Self {
        let lines = LineTable::build(&bytes);
        Snapshot {
            path,
            bytes,
            lines,
            tokens,
            arena,
            flavor,
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn content(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or("")
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    /// Resolves a node's `SourcePosition` from its first/last token indices.
    /// Returns `None` if either index is unset (an invalid position, per
    /// the data model).
    pub fn position_of(&self, id: NodeId) -> Option<SourcePosition> {
        self.position_of_tokens(self.arena[id].first_token, self.arena[id].last_token)
    }

    pub fn position_of_tokens(&self, first_token: TokenId, last_token: TokenId) -> Option<SourcePosition> {
        if first_token == UNSET_TOKEN || last_token == UNSET_TOKEN {
            return None;
        }
        let start_tok = self.tokens.get(first_token)?;
        let end_tok = self.tokens.get(last_token)?;
        let (start_line, start_column) = self.lines.position_for_offset(start_tok.start);
        let end_offset = end_tok.end.saturating_sub(1).max(end_tok.start);
        let (end_line, end_column) = self.lines.position_for_offset(end_offset);
        Some(SourcePosition {
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }

    pub fn position_of_range(&self, start: usize, end: usize) -> SourcePosition {
        let (start_line, start_column) = self.lines.position_for_offset(start);
        let end_offset = end.saturating_sub(1).max(start);
        let (end_line, end_column) = self.lines.position_for_offset(end_offset);
        SourcePosition {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Asserts the universal token-stream predicate required of any
    /// conforming parser (§6.1). Exposed publicly so parser implementations
    /// (and their tests) can self-check.
    pub fn validate_tokens(&self) -> Result<(), String> {
        validate_tokens(&self.tokens, self.bytes.len())
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("path", &self.path)
            .field("len", &self.bytes.len())
            .field("lines", &self.lines.line_count())
            .field("tokens", &self.tokens.len())
            .field("nodes", &self.arena.len())
            .field("flavor", &self.flavor)
            .finish()
    }
}
