//! Emphasis/strong delimiter style consistency (`*`/`_`), resolved from
//! token ranges rather than AST spans so the reported position always
//! lands on the actual delimiter run, even when the AST span has been
//! widened by an enclosing inline container.

use crate::context::RuleContext;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

fn delimiter_char(ctx: &RuleContext, id: crate::model::node::NodeId) -> Option<char> {
    let (start, _) = node_byte_range(ctx, id)?;
    ctx.content().as_bytes().get(start).map(|&b| b as char)
}

fn check(
    rule_id: &'static str,
    configured: &str,
    nodes: &[crate::model::node::NodeId],
    ctx: &RuleContext,
) -> Vec<Diagnostic> {
    let mut baseline = match configured {
        "asterisk" => Some('*'),
        "underscore" => Some('_'),
        _ => None,
    };
    let mut out = Vec::new();
    for &id in nodes {
        let Some(delim) = delimiter_char(ctx, id) else { continue };
        if delim != '*' && delim != '_' {
            continue;
        }
        match baseline {
            None => baseline = Some(delim),
            Some(want) if want != delim => {
                if let Some((start, end)) = node_byte_range(ctx, id) {
                    let pos = ctx.snapshot.position_of_range(start, end);
                    out.push(diag_line(rule_id, "delimiter style differs from the document's established style", pos.start_line, pos.start_column, pos.end_column));
                }
            }
            _ => {}
        }
    }
    out
}

pub struct Md049EmphasisStyle;
impl Rule for Md049EmphasisStyle {
    fn id(&self) -> &'static str {
        "MD049"
    }
    fn name(&self) -> &'static str {
        "emphasis-style"
    }
    fn description(&self) -> &'static str {
        "emphasis must use a single consistent delimiter character"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["emphasis"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Emphasis
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let cache = ctx.node_kind_cache();
        Ok(check(self.id(), &configured, &cache.emphasis, ctx))
    }
}

pub struct Md050StrongStyle;
impl Rule for Md050StrongStyle {
    fn id(&self) -> &'static str {
        "MD050"
    }
    fn name(&self) -> &'static str {
        "strong-style"
    }
    fn description(&self) -> &'static str {
        "strong emphasis must use a single consistent delimiter character"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["emphasis"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Emphasis
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let cache = ctx.node_kind_cache();
        Ok(check(self.id(), &configured, &cache.strong, ctx))
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md049EmphasisStyle));
    registry.register(Arc::new(Md050StrongStyle));
}
