//! The rule contract: `Diagnostic`, `Severity`, and the `Rule` trait every
//! catalog entry implements.

use std::fmt;

use crate::context::RuleContext;
use crate::edit::Edit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!("invalid severity: {other}")),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Diagnostic {
    pub rule_id: &'static str,
    pub rule_name: String,
    pub message: String,
    pub severity: Severity,
    pub file_path: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub suggestion: Option<String>,
    pub edits: Vec<Edit>,
}

impl Diagnostic {
    pub fn has_fix(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// An internal, recoverable rule failure (malformed option, etc). Never
/// raised for user violations — those become `Diagnostic`s instead.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RuleError(pub String);

/// A loose grouping used by the CLI's `rules --category` filter and by the
/// alias/tag tables; not part of the rule's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Whitespace,
    Heading,
    List,
    CodeBlock,
    Link,
    Emphasis,
    Structure,
    Table,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleCategory::Whitespace => "whitespace",
            RuleCategory::Heading => "heading",
            RuleCategory::List => "list",
            RuleCategory::CodeBlock => "code-block",
            RuleCategory::Link => "link",
            RuleCategory::Emphasis => "emphasis",
            RuleCategory::Structure => "structure",
            RuleCategory::Table => "table",
        })
    }
}

/// One named check, identified by `MDNNN`. Rules are value-like: no
/// per-file state survives between `apply` invocations.
pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn tags(&self) -> &'static [&'static str];
    fn category(&self) -> RuleCategory;
    fn default_enabled(&self) -> bool {
        true
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn can_fix(&self) -> bool;

    /// Runs the check. Must never mutate `ctx`'s snapshot or cache slices.
    /// Returns `Err` only for internal failures, never for user violations.
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError>;
}
