//! Heading structure and style: increment, consistent style, ATX spacing,
//! surrounding blanks, indentation, duplicates, single top-level heading,
//! trailing punctuation, emphasis-as-heading, first-line heading, and the
//! optional required-headings outline check.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::RuleContext;
use crate::edit::Edit;
use crate::model::node::NodeKind;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

static ATX_NO_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s{0,3})(#{1,6})([^#\s].*)$").unwrap());
static ATX_MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s{0,3})(#{1,6})(\s{2,})(\S.*)$").unwrap());
static ATX_CLOSED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s{0,3})(#{1,6})(\s*)(.*?)(\s*)(#+)\s*$").unwrap());

fn heading_level(ctx: &RuleContext, id: crate::model::node::NodeId) -> u8 {
    ctx.snapshot.node(id).attrs.heading_level.unwrap_or(1)
}

fn heading_text(ctx: &RuleContext, id: crate::model::node::NodeId) -> String {
    let mut out = String::new();
    for child in crate::model::node::children(&ctx.snapshot.arena, id) {
        collect_text(ctx, child, &mut out);
    }
    out
}

fn collect_text(ctx: &RuleContext, id: crate::model::node::NodeId, out: &mut String) {
    let node = ctx.snapshot.node(id);
    if let Some(text) = &node.attrs.text {
        out.push_str(text);
    }
    for child in crate::model::node::children(&ctx.snapshot.arena, id) {
        collect_text(ctx, child, out);
    }
}

pub struct Md001HeadingIncrement;
impl Rule for Md001HeadingIncrement {
    fn id(&self) -> &'static str {
        "MD001"
    }
    fn name(&self) -> &'static str {
        "heading-increment"
    }
    fn description(&self) -> &'static str {
        "heading levels must only increase by one at a time"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        let mut prev_level: Option<u8> = None;
        for &id in &cache.headings {
            let level = heading_level(ctx, id);
            if let Some(prev) = prev_level {
                if level > prev + 1 {
                    if let Some(pos) = ctx.snapshot.position_of(id) {
                        out.push(diag_line(
                            self.id(),
                            format!("expected heading level {}, found {level}", prev + 1),
                            pos.start_line,
                            pos.start_column,
                            pos.end_column,
                        ));
                    }
                }
            }
            prev_level = Some(level);
        }
        Ok(out)
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum HeadingStyle {
    Atx,
    AtxClosed,
    Setext,
}

fn classify(ctx: &RuleContext, line: &str) -> HeadingStyle {
    if ATX_CLOSED.is_match(line) && line.trim_end().ends_with('#') {
        let caps = ATX_CLOSED.captures(line).unwrap();
        if !caps.get(4).unwrap().as_str().is_empty() || caps.get(6).unwrap().as_str().len() == caps.get(2).unwrap().as_str().len() {
            return HeadingStyle::AtxClosed;
        }
    }
    if line.trim_start().starts_with('#') {
        return HeadingStyle::Atx;
    }
    let _ = ctx;
    HeadingStyle::Setext
}

pub struct Md003HeadingStyle;
impl Rule for Md003HeadingStyle {
    fn id(&self) -> &'static str {
        "MD003"
    }
    fn name(&self) -> &'static str {
        "heading-style"
    }
    fn description(&self) -> &'static str {
        "headings must use a single consistent style throughout the document"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let configured = ctx.string("style", "consistent");
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        let mut baseline: Option<HeadingStyle> = match configured.as_str() {
            "atx" => Some(HeadingStyle::Atx),
            "atx_closed" => Some(HeadingStyle::AtxClosed),
            "setext" => Some(HeadingStyle::Setext),
            _ => None,
        };
        for &id in &cache.headings {
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let line = line_text(ctx, (pos.start_line - 1) as usize);
            let style = classify(ctx, line);
            match baseline {
                None => baseline = Some(style),
                Some(want) if want != style => {
                    out.push(diag_line(self.id(), "heading style differs from the document's established style", pos.start_line, pos.start_column, pos.end_column));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

pub struct Md018NoMissingSpaceAtx;
impl Rule for Md018NoMissingSpaceAtx {
    fn id(&self) -> &'static str {
        "MD018"
    }
    fn name(&self) -> &'static str {
        "no-missing-space-atx"
    }
    fn description(&self) -> &'static str {
        "ATX heading markers must be followed by a space"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "atx"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            let (start, _) = line_range(ctx, idx);
            if let Some(caps) = ATX_NO_SPACE.captures(text) {
                let hashes = caps.get(2).unwrap();
                let line_no = (idx + 1) as u32;
                let diag = diag_line(self.id(), "no space after ATX heading marker", line_no, (hashes.end() + 1) as u32, (hashes.end() + 1) as u32);
                out.push(with_edit(diag, Edit::insert(start + hashes.end(), " ")));
            }
        }
        Ok(out)
    }
}

pub struct Md019NoMultipleSpaceAtx;
impl Rule for Md019NoMultipleSpaceAtx {
    fn id(&self) -> &'static str {
        "MD019"
    }
    fn name(&self) -> &'static str {
        "no-multiple-space-atx"
    }
    fn description(&self) -> &'static str {
        "ATX heading markers must be followed by exactly one space"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "atx"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            let (start, _) = line_range(ctx, idx);
            if let Some(caps) = ATX_MULTI_SPACE.captures(text) {
                let hashes = caps.get(2).unwrap();
                let spaces = caps.get(3).unwrap();
                let line_no = (idx + 1) as u32;
                let diag = diag_line(self.id(), "multiple spaces after ATX heading marker", line_no, (hashes.end() + 1) as u32, (spaces.end() + 1) as u32);
                out.push(with_edit(diag, Edit::replace(start + spaces.start(), start + spaces.end(), " ")));
            }
        }
        Ok(out)
    }
}

pub struct Md020NoMissingSpaceClosedAtx;
impl Rule for Md020NoMissingSpaceClosedAtx {
    fn id(&self) -> &'static str {
        "MD020"
    }
    fn name(&self) -> &'static str {
        "no-missing-space-closed-atx"
    }
    fn description(&self) -> &'static str {
        "closed ATX headings must have a space before the closing hashes"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "atx_closed"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            let (start, _) = line_range(ctx, idx);
            let Some(caps) = ATX_CLOSED.captures(text) else { continue };
            let body = caps.get(4).unwrap().as_str();
            let trailing_ws = caps.get(5).unwrap();
            if body.is_empty() {
                continue;
            }
            if trailing_ws.as_str().is_empty() {
                let line_no = (idx + 1) as u32;
                let diag = diag_line(self.id(), "no space before closing heading hashes", line_no, (trailing_ws.start() + 1) as u32, (trailing_ws.start() + 1) as u32);
                out.push(with_edit(diag, Edit::insert(start + trailing_ws.start(), " ")));
            }
        }
        Ok(out)
    }
}

pub struct Md021NoMultipleSpaceClosedAtx;
impl Rule for Md021NoMultipleSpaceClosedAtx {
    fn id(&self) -> &'static str {
        "MD021"
    }
    fn name(&self) -> &'static str {
        "no-multiple-space-closed-atx"
    }
    fn description(&self) -> &'static str {
        "closed ATX headings must have exactly one space around the hashes"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "atx_closed"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            let (start, _) = line_range(ctx, idx);
            let Some(caps) = ATX_CLOSED.captures(text) else { continue };
            let opening = caps.get(3).unwrap();
            let closing = caps.get(5).unwrap();
            let line_no = (idx + 1) as u32;
            if opening.as_str().len() > 1 {
                let diag = diag_line(self.id(), "multiple spaces after opening heading hashes", line_no, (opening.start() + 1) as u32, (opening.end() + 1) as u32);
                out.push(with_edit(diag, Edit::replace(start + opening.start(), start + opening.end(), " ")));
            }
            if closing.as_str().len() > 1 {
                let diag = diag_line(self.id(), "multiple spaces before closing heading hashes", line_no, (closing.start() + 1) as u32, (closing.end() + 1) as u32);
                out.push(with_edit(diag, Edit::replace(start + closing.start(), start + closing.end(), " ")));
            }
        }
        Ok(out)
    }
}

pub struct Md022BlanksAroundHeadings;
impl Rule for Md022BlanksAroundHeadings {
    fn id(&self) -> &'static str {
        "MD022"
    }
    fn name(&self) -> &'static str {
        "blanks-around-headings"
    }
    fn description(&self) -> &'static str {
        "headings must be surrounded by blank lines"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "blank_lines"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let total = line_count(ctx);
        let mut out = Vec::new();
        for &id in &cache.headings {
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let start_idx = (pos.start_line - 1) as usize;
            let end_idx = (pos.end_line - 1) as usize;
            if start_idx > 0 && !is_blank(line_text(ctx, start_idx - 1)) {
                let (offset, _) = line_range(ctx, start_idx);
                let diag = diag_line(self.id(), "expected a blank line before this heading", pos.start_line, 1, 1);
                out.push(with_edit(diag, Edit::insert(offset, "\n")));
            }
            if end_idx + 1 < total && !is_blank(line_text(ctx, end_idx + 1)) {
                let (_, offset) = line_range(ctx, end_idx);
                let diag = diag_line(self.id(), "expected a blank line after this heading", pos.end_line, 1, 1);
                out.push(with_edit(diag, Edit::insert(offset, "\n")));
            }
        }
        Ok(out)
    }
}

pub struct Md023HeadingStartLeft;
impl Rule for Md023HeadingStartLeft {
    fn id(&self) -> &'static str {
        "MD023"
    }
    fn name(&self) -> &'static str {
        "heading-start-left"
    }
    fn description(&self) -> &'static str {
        "headings must start at the beginning of the line"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "indentation"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.headings {
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let idx = (pos.start_line - 1) as usize;
            let text = line_text(ctx, idx);
            let (start, _) = line_range(ctx, idx);
            let indent = indent_width(text);
            if indent > 0 {
                let diag = diag_line(self.id(), "heading must not be indented", pos.start_line, 1, (indent + 1) as u32);
                out.push(with_edit(diag, Edit::delete(start, start + indent)));
            }
        }
        Ok(out)
    }
}

pub struct Md024NoDuplicateHeading;
impl Rule for Md024NoDuplicateHeading {
    fn id(&self) -> &'static str {
        "MD024"
    }
    fn name(&self) -> &'static str {
        "no-duplicate-heading"
    }
    fn description(&self) -> &'static str {
        "heading content must not be repeated in the document"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let siblings_only = ctx.bool_opt("siblings_only", false);
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        let mut seen_global: std::collections::HashSet<(u8, String)> = std::collections::HashSet::new();
        let mut seen_by_level: std::collections::HashMap<u8, std::collections::HashSet<String>> = std::collections::HashMap::new();
        for &id in &cache.headings {
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let level = heading_level(ctx, id);
            let text = heading_text(ctx, id).trim().to_lowercase();
            let duplicate = if siblings_only {
                !seen_by_level.entry(level).or_default().insert(text.clone())
            } else {
                !seen_global.insert((level, text.clone()))
            };
            if duplicate {
                out.push(diag_line(self.id(), "duplicate heading content", pos.start_line, pos.start_column, pos.end_column));
            }
        }
        Ok(out)
    }
}

pub struct Md025SingleTitle;
impl Rule for Md025SingleTitle {
    fn id(&self) -> &'static str {
        "MD025"
    }
    fn name(&self) -> &'static str {
        "single-title"
    }
    fn description(&self) -> &'static str {
        "a document must have only one top-level heading"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let level = ctx.int("level", 1).clamp(1, 6) as u8;
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        let mut seen = false;
        for &id in &cache.headings {
            if heading_level(ctx, id) != level {
                continue;
            }
            if seen {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), format!("multiple top-level (h{level}) headings in document"), pos.start_line, pos.start_column, pos.end_column));
                }
            }
            seen = true;
        }
        Ok(out)
    }
}

pub struct Md026NoTrailingPunctuation;
impl Rule for Md026NoTrailingPunctuation {
    fn id(&self) -> &'static str {
        "MD026"
    }
    fn name(&self) -> &'static str {
        "no-trailing-punctuation"
    }
    fn description(&self) -> &'static str {
        "heading text must not end with punctuation"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let punctuation = ctx.string("punctuation", ".,;:!。,;:!");
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.headings {
            let Some(pos) = ctx.snapshot.position_of(id) else { continue };
            let text = heading_text(ctx, id);
            let trimmed = text.trim_end();
            if let Some(last) = trimmed.chars().last() {
                if punctuation.contains(last) {
                    out.push(diag_line(self.id(), format!("heading must not end with '{last}'"), pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md036NoEmphasisAsHeading;
impl Rule for Md036NoEmphasisAsHeading {
    fn id(&self) -> &'static str {
        "MD036"
    }
    fn name(&self) -> &'static str {
        "no-emphasis-as-heading"
    }
    fn description(&self) -> &'static str {
        "a paragraph consisting solely of emphasized text should be a heading instead"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings", "emphasis"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.paragraphs {
            let mut children = crate::model::node::children(&ctx.snapshot.arena, id);
            let Some(first) = children.next() else { continue };
            if children.next().is_some() {
                continue;
            }
            let kind = ctx.snapshot.node(first).kind;
            if matches!(kind, NodeKind::Emphasis | NodeKind::Strong) {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), "emphasized text used in place of a heading", pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md041FirstLineHeading;
impl Rule for Md041FirstLineHeading {
    fn id(&self) -> &'static str {
        "MD041"
    }
    fn name(&self) -> &'static str {
        "first-line-heading"
    }
    fn description(&self) -> &'static str {
        "the first line of the file should be a top-level heading"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let level = ctx.int("level", 1).clamp(1, 6) as u8;
        let cache = ctx.node_kind_cache();
        let mut first_content_line = None;
        for idx in 0..line_count(ctx) {
            if !is_blank(line_text(ctx, idx)) {
                first_content_line = Some((idx + 1) as u32);
                break;
            }
        }
        let Some(first_line) = first_content_line else { return Ok(Vec::new()) };
        let matches = cache
            .headings
            .first()
            .and_then(|&id| ctx.snapshot.position_of(id).map(|pos| (pos, heading_level(ctx, id))))
            .map(|(pos, lvl)| pos.start_line == first_line && lvl == level)
            .unwrap_or(false);
        if matches {
            return Ok(Vec::new());
        }
        Ok(vec![diag_line(self.id(), format!("first line should be a level-{level} heading"), first_line, 1, 1)])
    }
}

pub struct Md043RequiredHeadings;
impl Rule for Md043RequiredHeadings {
    fn id(&self) -> &'static str {
        "MD043"
    }
    fn name(&self) -> &'static str {
        "required-headings"
    }
    fn description(&self) -> &'static str {
        "the document's headings must match a configured outline"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["headings"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let expected = ctx.string_list("headings", &[]);
        if expected.is_empty() {
            return Ok(Vec::new());
        }
        let cache = ctx.node_kind_cache();
        let actual: Vec<String> = cache.headings.iter().map(|&id| heading_text(ctx, id).trim().to_string()).collect();
        if actual == expected {
            return Ok(Vec::new());
        }
        Ok(vec![diag_line(
            self.id(),
            format!("document headings {actual:?} do not match the required outline {expected:?}"),
            1,
            1,
            1,
        )])
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md001HeadingIncrement));
    registry.register(Arc::new(Md003HeadingStyle));
    registry.register(Arc::new(Md018NoMissingSpaceAtx));
    registry.register(Arc::new(Md019NoMultipleSpaceAtx));
    registry.register(Arc::new(Md020NoMissingSpaceClosedAtx));
    registry.register(Arc::new(Md021NoMultipleSpaceClosedAtx));
    registry.register(Arc::new(Md022BlanksAroundHeadings));
    registry.register(Arc::new(Md023HeadingStartLeft));
    registry.register(Arc::new(Md024NoDuplicateHeading));
    registry.register(Arc::new(Md025SingleTitle));
    registry.register(Arc::new(Md026NoTrailingPunctuation));
    registry.register(Arc::new(Md036NoEmphasisAsHeading));
    registry.register(Arc::new(Md041FirstLineHeading));
    registry.register(Arc::new(Md043RequiredHeadings));
}
