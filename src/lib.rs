//! A Markdown linter and auto-fixer: parse once into an arena-based AST
//! plus an independent lexical token stream, run a catalog of `MDNNN`
//! rules over it, and apply their edits through a safety pipeline that
//! re-lints to a fixed point, guards against races, and writes atomically.
//!
//! Module map: [`parser`] builds a [`model::Snapshot`] from source bytes;
//! [`rule`] and [`rules`] define the catalog every check implements against
//! a [`context::RuleContext`]; [`engine`] resolves and runs that catalog;
//! [`pipeline`] is the top-level read-fix-validate-write orchestrator;
//! [`config`] discovers, merges, and normalizes configuration; [`migrator`]
//! converts a foreign markdownlint config; [`output`] renders results.

pub mod config;
pub mod context;
pub mod diff;
pub mod edit;
pub mod engine;
pub mod error;
pub mod migrator;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod rule;
pub mod rules;

pub use config::Config;
pub use edit::Edit;
pub use engine::{FileResult, ResolvedRule};
pub use error::{Result, RumdlError};
pub use model::{Flavor, Snapshot};
pub use pipeline::{PipelineOptions, PipelineResult};
pub use registry::RuleRegistry;
pub use rule::{Diagnostic, Rule, RuleCategory, Severity};

/// Builds a registry with every built-in rule registered under its
/// canonical id and legacy aliases — the one entry point callers need
/// before resolving a [`Config`] and invoking [`pipeline::run`].
pub fn default_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    rules::register_builtin_rules(&mut registry);
    registry
}
