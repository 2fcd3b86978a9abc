//! Per-`(snapshot, rule)` view handed to each rule's `apply`: the AST, a
//! lazily built node-kind cache, typed option accessors, an edit builder,
//! and a cancellation probe.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::value::Value;
use crate::edit::Edit;
use crate::model::node::{ExtKind, NodeId, NodeKind, walk};
use crate::model::snapshot::Snapshot;

/// The fifteen node-kind slices the spec requires: headings, lists, list
/// items, code blocks, paragraphs, blockquotes, tables, thematic breaks,
/// html blocks, code spans, links, images, inline html, emphasis, strong.
#[derive(Debug, Clone, Default)]
pub struct NodeKindCache {
    pub headings: Vec<NodeId>,
    pub lists: Vec<NodeId>,
    pub list_items: Vec<NodeId>,
    pub code_blocks: Vec<NodeId>,
    pub paragraphs: Vec<NodeId>,
    pub blockquotes: Vec<NodeId>,
    pub tables: Vec<NodeId>,
    pub thematic_breaks: Vec<NodeId>,
    pub html_blocks: Vec<NodeId>,
    pub code_spans: Vec<NodeId>,
    pub links: Vec<NodeId>,
    pub images: Vec<NodeId>,
    pub html_inline: Vec<NodeId>,
    pub emphasis: Vec<NodeId>,
    pub strong: Vec<NodeId>,
}

fn build_node_kind_cache(snapshot: &Snapshot) -> NodeKindCache {
    let mut cache = NodeKindCache::default();
    walk(&snapshot.arena, snapshot.root(), |id| {
        match snapshot.arena[id].kind {
            NodeKind::Heading => cache.headings.push(id),
            NodeKind::List => cache.lists.push(id),
            NodeKind::ListItem => cache.list_items.push(id),
            NodeKind::CodeBlock => cache.code_blocks.push(id),
            NodeKind::Paragraph => cache.paragraphs.push(id),
            NodeKind::Blockquote => cache.blockquotes.push(id),
            NodeKind::ThematicBreak => cache.thematic_breaks.push(id),
            NodeKind::HtmlBlock => cache.html_blocks.push(id),
            NodeKind::CodeSpan => cache.code_spans.push(id),
            NodeKind::Link => cache.links.push(id),
            NodeKind::Image => cache.images.push(id),
            NodeKind::HtmlInline => cache.html_inline.push(id),
            NodeKind::Emphasis => cache.emphasis.push(id),
            NodeKind::Strong => cache.strong.push(id),
            NodeKind::Extension(ExtKind::Table) => cache.tables.push(id),
            _ => {}
        }
    });
    cache
}

/// Resolved, rule-specific configuration passed into a context: the
/// dynamically typed options map for this rule only.
#[derive(Debug, Clone, Default)]
pub struct RuleOptions(pub BTreeMap<String, Value>);

impl RuleOptions {
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.0.get(key).and_then(Value::as_int).unwrap_or(default)
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn boolean(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn string_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        self.0
            .get(key)
            .and_then(Value::as_string_list)
            .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
    }
}

pub struct RuleContext<'a> {
    pub snapshot: &'a Snapshot,
    options: RuleOptions,
    cache: RefCell<Option<Arc<NodeKindCache>>>,
    edits: RefCell<Vec<Edit>>,
    cancellation: Arc<AtomicBool>,
    emitted_diagnostic_count: Cell<usize>,
}

impl<'a> RuleContext<'a> {
    pub fn new(snapshot: &'a Snapshot, options: RuleOptions, cancellation: Arc<AtomicBool>) -> Self {
        RuleContext {
            snapshot,
            options,
            cache: RefCell::new(None),
            edits: RefCell::new(Vec::new()),
            cancellation,
            emitted_diagnostic_count: Cell::new(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.snapshot.root()
    }

    pub fn content(&self) -> &str {
        self.snapshot.content_str()
    }

    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.options.int(key, default)
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.options.string(key, default)
    }

    pub fn bool_opt(&self, key: &str, default: bool) -> bool {
        self.options.boolean(key, default)
    }

    pub fn string_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        self.options.string_list(key, default)
    }

    /// Lazily builds the node-kind cache on first access; later calls reuse
    /// the same `Arc`. The returned slices are shared read-only views —
    /// rules must not mutate them.
    pub fn node_kind_cache(&self) -> Arc<NodeKindCache> {
        let mut slot = self.cache.borrow_mut();
        if slot.is_none() {
            *slot = Some(Arc::new(build_node_kind_cache(self.snapshot)));
        }
        slot.as_ref().unwrap().clone()
    }

    pub fn push_edit(&self, edit: Edit) {
        self.edits.borrow_mut().push(edit);
    }

    pub fn take_edits(&self) -> Vec<Edit> {
        std::mem::take(&mut self.edits.borrow_mut())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.load(Ordering::Relaxed)
    }

    pub fn note_diagnostic(&self) {
        self.emitted_diagnostic_count.set(self.emitted_diagnostic_count.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::{Node, NodeKind};
    use crate::model::snapshot::Flavor;
    use std::path::PathBuf;

    fn snapshot_with_two_headings() -> Snapshot {
        let mut arena = vec![Node::new(NodeKind::Document)];
        arena.push(Node::new(NodeKind::Heading));
        arena.push(Node::new(NodeKind::Heading));
        arena[0].first_child = Some(1);
        arena[1].next_sibling = Some(2);
        arena[1].parent = Some(0);
        arena[2].parent = Some(0);
        Snapshot::new(PathBuf::from("t.md"), b"# a\n# b\n".to_vec(), Vec::new(), arena, Flavor::CommonMark)
    }

    #[test]
    fn node_kind_cache_partitions_by_kind() {
        let snap = snapshot_with_two_headings();
        let ctx = RuleContext::new(&snap, RuleOptions::default(), Arc::new(AtomicBool::new(false)));
        let cache = ctx.node_kind_cache();
        assert_eq!(cache.headings.len(), 2);
        assert!(cache.paragraphs.is_empty());
    }

    #[test]
    fn option_accessors_tolerate_promotions_and_defaults() {
        let snap = snapshot_with_two_headings();
        let mut opts = BTreeMap::new();
        opts.insert("line_length".to_string(), Value::Float(80.0));
        let ctx = RuleContext::new(&snap, RuleOptions(opts), Arc::new(AtomicBool::new(false)));
        assert_eq!(ctx.int("line_length", 120), 80);
        assert_eq!(ctx.int("missing", 42), 42);
        assert_eq!(ctx.bool_opt("strict", true), true);
    }
}
