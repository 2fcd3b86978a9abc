//! Link and image checks: reversed syntax, inline HTML, bare URLs, empty
//! targets, missing alt text, dangling fragments, reference-definition
//! hygiene, style consistency, and relative-link existence.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::context::RuleContext;
use crate::model::node::{children, NodeId};
use crate::model::token::TokenKind;
use crate::rule::{Diagnostic, Rule, RuleCategory, RuleError};
use crate::rules::support::*;

static REVERSED_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^()\s]{1,200})\)\[([^\[\]]{1,200})\]").unwrap());
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s<>\)\]]+").unwrap());
static REF_DEFINITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ {0,3}\[([^\]]+)\]:\s*\S").unwrap());
static REF_USAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\s*\[([^\]]*)\]").unwrap());

fn node_text(ctx: &RuleContext, id: NodeId) -> String {
    let mut out = String::new();
    collect_text_rec(ctx, id, &mut out);
    out
}

fn collect_text_rec(ctx: &RuleContext, id: NodeId, out: &mut String) {
    let node = ctx.snapshot.node(id);
    if let Some(text) = &node.attrs.text {
        out.push_str(text);
    }
    for child in children(&ctx.snapshot.arena, id) {
        collect_text_rec(ctx, child, out);
    }
}

pub struct Md011NoReversedLinks;
impl Rule for Md011NoReversedLinks {
    fn id(&self) -> &'static str {
        "MD011"
    }
    fn name(&self) -> &'static str {
        "no-reversed-links"
    }
    fn description(&self) -> &'static str {
        "link syntax must not be reversed as (text)[url]"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let (start, _) = line_range(ctx, idx);
            let text = line_text(ctx, idx);
            for caps in REVERSED_LINK.captures_iter(text) {
                let whole = caps.get(0).unwrap();
                let url = caps.get(1).unwrap().as_str();
                let label = caps.get(2).unwrap().as_str();
                let line_no = (idx + 1) as u32;
                let diag = diag_line(self.id(), "reversed link syntax, expected [text](url)", line_no, (whole.start() + 1) as u32, (whole.end() + 1) as u32);
                out.push(with_edit(diag, crate::edit::Edit::replace(start + whole.start(), start + whole.end(), format!("[{label}]({url})"))));
            }
        }
        Ok(out)
    }
}

pub struct Md033NoInlineHtml;
impl Rule for Md033NoInlineHtml {
    fn id(&self) -> &'static str {
        "MD033"
    }
    fn name(&self) -> &'static str {
        "no-inline-html"
    }
    fn description(&self) -> &'static str {
        "raw HTML must not appear in the document"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["html"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Structure
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let allowed = ctx.string_list("allowed_elements", &[]);
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in cache.html_blocks.iter().chain(cache.html_inline.iter()) {
            let Some((start, end)) = node_byte_range(ctx, id) else { continue };
            let raw = &ctx.content()[start..end];
            let tag = raw
                .trim_start_matches('<')
                .trim_start_matches('/')
                .split(|c: char| !c.is_ascii_alphanumeric())
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            if allowed.iter().any(|a| a.eq_ignore_ascii_case(&tag)) {
                continue;
            }
            let pos = ctx.snapshot.position_of_range(start, end);
            out.push(diag_line(self.id(), format!("raw HTML element <{tag}> is not allowed"), pos.start_line, pos.start_column, pos.end_column));
        }
        Ok(out)
    }
}

pub struct Md034NoBareUrls;
impl Rule for Md034NoBareUrls {
    fn id(&self) -> &'static str {
        "MD034"
    }
    fn name(&self) -> &'static str {
        "no-bare-urls"
    }
    fn description(&self) -> &'static str {
        "bare URLs must be wrapped in angle brackets or a link"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        true
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let content = ctx.content();
        let mut out = Vec::new();
        for token in &ctx.snapshot.tokens {
            if token.kind != TokenKind::Text {
                continue;
            }
            let slice = &content[token.range()];
            for m in BARE_URL.find_iter(slice) {
                let abs_start = token.start + m.start();
                let abs_end = token.start + m.end();
                let before_ok = content[..abs_start].chars().last().map(|c| c != '<').unwrap_or(true);
                let after_ok = content[abs_end..].chars().next().map(|c| c != '>').unwrap_or(true);
                if !before_ok || !after_ok {
                    continue;
                }
                let pos = ctx.snapshot.position_of_range(abs_start, abs_end);
                let url = m.as_str().to_string();
                let diag = diag_line(self.id(), "bare URL used without angle brackets or link syntax", pos.start_line, pos.start_column, pos.end_column);
                out.push(with_edit(diag, crate::edit::Edit::replace(abs_start, abs_end, format!("<{url}>"))));
            }
        }
        Ok(out)
    }
}

pub struct Md042NoEmptyLinks;
impl Rule for Md042NoEmptyLinks {
    fn id(&self) -> &'static str {
        "MD042"
    }
    fn name(&self) -> &'static str {
        "no-empty-links"
    }
    fn description(&self) -> &'static str {
        "links must have a non-empty destination"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.links {
            let dest = ctx.snapshot.node(id).attrs.link_destination.as_deref().unwrap_or("");
            if dest.is_empty() || dest == "#" {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), "link has an empty destination", pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md045NoAltText;
impl Rule for Md045NoAltText {
    fn id(&self) -> &'static str {
        "MD045"
    }
    fn name(&self) -> &'static str {
        "no-alt-text"
    }
    fn description(&self) -> &'static str {
        "images must have non-empty alternate text"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["images", "accessibility"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        for &id in &cache.images {
            let alt = node_text(ctx, id);
            if alt.trim().is_empty() {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), "image has no alternate text", pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md051LinkFragments;
impl Rule for Md051LinkFragments {
    fn id(&self) -> &'static str {
        "MD051"
    }
    fn name(&self) -> &'static str {
        "link-fragments"
    }
    fn description(&self) -> &'static str {
        "in-document link fragments must reference an existing heading"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut slugs: HashSet<String> = HashSet::new();
        for &id in &cache.headings {
            slugs.insert(github_slug(&node_text(ctx, id)));
        }
        let mut out = Vec::new();
        for &id in &cache.links {
            let Some(dest) = ctx.snapshot.node(id).attrs.link_destination.as_deref() else { continue };
            let Some(fragment) = dest.strip_prefix('#') else { continue };
            if fragment.is_empty() {
                continue;
            }
            if !slugs.contains(fragment) {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), format!("link fragment #{fragment} does not match any heading"), pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub struct Md052ReferenceLinksImages;
impl Rule for Md052ReferenceLinksImages {
    fn id(&self) -> &'static str {
        "MD052"
    }
    fn name(&self) -> &'static str {
        "reference-links-images"
    }
    fn description(&self) -> &'static str {
        "reference links and images must use a defined reference"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let content = ctx.content();
        let defined: HashSet<String> = REF_DEFINITION
            .captures_iter(content)
            .map(|c| c.get(1).unwrap().as_str().to_ascii_lowercase())
            .collect();
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            for caps in REF_USAGE.captures_iter(text) {
                let label_text = caps.get(1).unwrap().as_str();
                let explicit = caps.get(2).unwrap().as_str();
                let key = if explicit.is_empty() { label_text } else { explicit }.to_ascii_lowercase();
                if key.is_empty() || defined.contains(&key) {
                    continue;
                }
                let line_no = (idx + 1) as u32;
                out.push(diag_line(self.id(), format!("reference [{key}] is not defined"), line_no, 1, 1));
            }
        }
        Ok(out)
    }
}

pub struct Md053LinkImageReferenceDefinitions;
impl Rule for Md053LinkImageReferenceDefinitions {
    fn id(&self) -> &'static str {
        "MD053"
    }
    fn name(&self) -> &'static str {
        "link-image-reference-definitions"
    }
    fn description(&self) -> &'static str {
        "reference definitions must be used at least once"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let content = ctx.content();
        let mut used: HashSet<String> = HashSet::new();
        for caps in REF_USAGE.captures_iter(content) {
            let label_text = caps.get(1).unwrap().as_str();
            let explicit = caps.get(2).unwrap().as_str();
            let key = if explicit.is_empty() { label_text } else { explicit }.to_ascii_lowercase();
            used.insert(key);
        }
        let mut out = Vec::new();
        for idx in 0..line_count(ctx) {
            let text = line_text(ctx, idx);
            let Some(caps) = REF_DEFINITION.captures(text) else { continue };
            let label = caps.get(1).unwrap().as_str().to_ascii_lowercase();
            if !used.contains(&label) {
                let line_no = (idx + 1) as u32;
                out.push(diag_line(self.id(), format!("reference definition [{label}] is never used"), line_no, 1, 1));
            }
        }
        Ok(out)
    }
}

pub struct Md054LinkImageStyle;
impl Rule for Md054LinkImageStyle {
    fn id(&self) -> &'static str {
        "MD054"
    }
    fn name(&self) -> &'static str {
        "link-image-style"
    }
    fn description(&self) -> &'static str {
        "links and images must use a single consistent reference style"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links", "images"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        let mut baseline: Option<&'static str> = None;
        for &id in cache.links.iter().chain(cache.images.iter()) {
            let Some((start, end)) = node_byte_range(ctx, id) else { continue };
            let raw = &ctx.content()[start..end];
            let style = if raw.starts_with('<') {
                "autolink"
            } else if raw.contains("](") {
                "inline"
            } else if raw.ends_with("][]") {
                "collapsed"
            } else if raw.contains("][") {
                "full"
            } else {
                "shortcut"
            };
            match baseline {
                None => baseline = Some(style),
                Some(want) if want != style => {
                    let pos = ctx.snapshot.position_of_range(start, end);
                    out.push(diag_line(self.id(), "link/image style differs from the document's established style", pos.start_line, pos.start_column, pos.end_column));
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

pub struct Md057ExistingRelativeLinks;
impl Rule for Md057ExistingRelativeLinks {
    fn id(&self) -> &'static str {
        "MD057"
    }
    fn name(&self) -> &'static str {
        "existing-relative-links"
    }
    fn description(&self) -> &'static str {
        "relative link destinations must point to a file that exists"
    }
    fn tags(&self) -> &'static [&'static str] {
        &["links"]
    }
    fn category(&self) -> RuleCategory {
        RuleCategory::Link
    }
    fn can_fix(&self) -> bool {
        false
    }
    fn apply(&self, ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
        let cache = ctx.node_kind_cache();
        let mut out = Vec::new();
        let mut cache_checks: HashMap<String, bool> = HashMap::new();
        let base = ctx.snapshot.path.parent().map(std::path::Path::to_path_buf).unwrap_or_default();
        for &id in &cache.links {
            let Some(dest) = ctx.snapshot.node(id).attrs.link_destination.clone() else { continue };
            if dest.is_empty()
                || dest.starts_with('#')
                || dest.contains("://")
                || dest.starts_with("mailto:")
            {
                continue;
            }
            let path_part = dest.split('#').next().unwrap_or(&dest);
            if path_part.is_empty() {
                continue;
            }
            let exists = *cache_checks
                .entry(path_part.to_string())
                .or_insert_with(|| base.join(path_part).exists());
            if !exists {
                if let Some(pos) = ctx.snapshot.position_of(id) {
                    out.push(diag_line(self.id(), format!("relative link target {path_part} does not exist"), pos.start_line, pos.start_column, pos.end_column));
                }
            }
        }
        Ok(out)
    }
}

pub fn register(registry: &mut crate::registry::RuleRegistry) {
    use std::sync::Arc;
    registry.register(Arc::new(Md011NoReversedLinks));
    registry.register(Arc::new(Md033NoInlineHtml));
    registry.register(Arc::new(Md034NoBareUrls));
    registry.register(Arc::new(Md042NoEmptyLinks));
    registry.register(Arc::new(Md045NoAltText));
    registry.register(Arc::new(Md051LinkFragments));
    registry.register(Arc::new(Md052ReferenceLinksImages));
    registry.register(Arc::new(Md053LinkImageReferenceDefinitions));
    registry.register(Arc::new(Md054LinkImageStyle));
    registry.register(Arc::new(Md057ExistingRelativeLinks));
}
