//! Code block checks: fenced vs indented style, fence-character
//! consistency, missing language info strings, shell commands without
//! visible output, and blank-line separation.

use crate::context::RuleContext;
use crate::edit::Edit;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

fn fence_char_of(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    let c = trimmed.chars().next()?;
    if (c == '`' || c == '~') && trimmed.chars().take_while(|&x| x == c).count() >= 3 {
        Some(c)
    } else {
        None
    }
}

pub struct Md014CommandsShowOutput;
impl Rule for Md014CommandsShowOutput {
    fn id(&self) -> &'static str {
        "MD014"
    }
    fn name(&self) -> &'static str {
        "commands-show-output"
    }
    fn description(&self) -> &'static str {
        "shell code blocks that only show commands should also show their output"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["code"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.code_blocks {
            let node = ctx.snapshot.node(id);
            if node.attrs.code_fenced != Some(true) {
                continue;
            }
            let is_shell = node
                .attrs
                .code_info
                .as_deref()
                .map(|lang| matches!(lang, "sh" | "bash" | "shell" | "console" | "zsh"))
                .unwrap_or(false);
            if !is_shell {
                continue;
            }
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let body_start = (pos.start_line) as usize;
            let body_end = (pos.end_line - 1) as usize;
            if body_start >= body_end {
                continue;
            }
            let lines: Vec<&str> = (body_start..body_end).map(|i| line_text(ctx, i)).collect();
            let all_commands = !lines.is_empty() && lines.iter().all(|l| l.trim_start().starts_with('$'));
            if all_commands {
                out.push(diag_line(self.id(), "shell block shows commands but no output", pos.start_line, 1, 1));
            }
        }
        Ok(out)
    }
}

pub struct Md031BlanksAroundFences;
impl Rule for Md031BlanksAroundFences {
    fn id(&self) -> &'static str {
        "MD031"
    }
    fn name(&self) -> &'static str {
        "blanks-around-fences"
    }
    fn description(&self) -> &'static str {
        "fenced code blocks must be surrounded by blank lines"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["code", "blank_lines"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let total = line_count(ctx);
        let mut out = Vec::new();
        for &id in &cache.code_blocks {
            if ctx.snapshot.node(id).attrs.code_fenced != Some(true) {
                continue;
            }
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let start_idx = (pos.start_line - 1) as usize;
            let end_idx = (pos.end_line - 1) as usize;
            if start_idx > 0 && !is_blank(line_text(ctx, start_idx - 1)) {
                let (offset, _) = line_range(ctx, start_idx);
                let diag = diag_line(self.id(), "expected a blank line before this fenced code block", pos.start_line, 1, 1);
                out.push(with_edit(diag, Edit::insert(offset, "\n")));
            }
            if end_idx + 1 < total && !is_blank(line_text(ctx, end_idx + 1)) {
                let (_, offset) = line_range(ctx, end_idx);
                let diag = diag_line(self.id(), "expected a blank line after this fenced code block", pos.end_line, 1, 1);
                out.push(with_edit(diag, Edit::insert(offset, "\n")));
            }
        }
        Ok(out)
    }
}

pub struct Md040FencedCodeLanguage;
impl Rule for Md040FencedCodeLanguage {
    fn id(&self) -> &'static str {
        "MD040"
    }
    fn name(&self) -> &'static str {
        "fenced-code-language"
    }
    fn description(&self) -> &'static str {
        "fenced code blocks should declare a language"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["code", "language"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.code_blocks {
            let node = ctx.snapshot.node(id);
            if node.attrs.code_fenced != Some(true) {
                continue;
            }
            if node.attrs.code_info.is_none() {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), "fenced code block has no language specified", pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md046CodeBlockStyle;
impl Rule for Md046CodeBlockStyle {
    fn id(&self) -> &'static str {
        "MD046"
    }
    fn name(&self) -> &'static str {
        "code-block-style"
    }
    fn description(&self) -> &'static str {
        "code blocks must use a single consistent style (fenced or indented)"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["code"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let mut baseline = match configured.as_str() {
            "fenced" => Some(true),
            "indented" => Some(false),
            _ => None,
        };
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.code_blocks {
            let fenced = ctx.snapshot.node(id).attrs.code_fenced.unwrap_or(true);
            match baseline {
                None => baseline = Some(fenced),
                Some(want) if want != fenced => {
                    if let Some(pos) = ctx.snapshot.position_of(id) {
                        out.push(diag_line(self.id(), "code block style differs from the document's established style", pos.start_line, pos.start_column, pos.end_column));
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

pub struct Md048CodeFenceStyle;
impl Rule for Md048CodeFenceStyle {
    fn id(&self) -> &'static str {
        "MD048"
    }
    fn name(&self) -> &'static str {
        "code-fence-style"
    }
    fn description(&self) -> &'static str {
        "code fences must use a single consistent character (``` or ~~~)"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["code"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let mut baseline = match configured.as_str() {
            "backtick" => Some('`'),
            "tilde" => Some('~'),
            _ => None,
        };
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.code_blocks {
            if ctx.snapshot.node(id).attrs.code_fenced != Some(true) {
                continue;
            }
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let text = line_text(ctx, (pos.start_line - 1) as usize);
            let Some(fence_char) = fence_char_of(text) else { continue };
            match baseline {
                None => baseline = Some(fence_char),
                Some(want) if want != fence_char => {
                    out.push(diag_line(self.id(), "code fence character differs from the document's established style", pos.start_line, 1, 1));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md014CommandsShowOutput));
    registry.register(Arc::new(Md031BlanksAroundFences));
    registry.register(Arc::new(Md040FencedCodeLanguage));
    registry.register(Arc::new(Md046CodeBlockStyle));
    registry.register(Arc::new(Md048CodeFenceStyle));
}
