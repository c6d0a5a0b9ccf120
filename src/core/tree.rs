//! Namespace tree
//!
//! Arena storage: a flat vector of nodes addressed by [`NodeId`], plus a
//! name index. Nodes refer to their parent and children by id, so no
//! reference cycles exist. Ids stay valid until the next [`Tree::reset`],
//! which bumps the epoch so stale handles know to resolve again.

use super::error::Result;
use super::fields::{self, Fields};
use super::log_level::LogLevel;
use super::metrics::RegistryMetrics;
use super::sink::Sink;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// Separator used when joining path segments into a node name.
pub const SEPARATOR: &str = ":";

/// Split a namespace string on `:` or `.`, dropping empty segments.
pub fn split_namespace(namespace: &str) -> Vec<String> {
    namespace
        .split([':', '.'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

struct Subscription {
    sink: Box<dyn Sink>,
    /// Only records of exactly the view's level, not the levels above it.
    exact: bool,
}

#[derive(Default)]
struct Scope {
    fields: Fields,
    sinks: Vec<Subscription>,
}

struct Node {
    name: String,
    parent: Option<NodeId>,
    children: HashMap<String, NodeId>,
    /// Severity-agnostic subscriptions and fields.
    scope: Scope,
    /// One view per level, indexed by `LogLevel::index`.
    levels: [Scope; LogLevel::COUNT],
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: HashMap::new(),
            scope: Scope::default(),
            levels: Default::default(),
        }
    }

    fn scope_mut(&mut self, level: Option<LogLevel>) -> &mut Scope {
        match level {
            Some(level) => &mut self.levels[level.index()],
            None => &mut self.scope,
        }
    }

    fn scope(&self, level: Option<LogLevel>) -> &Scope {
        match level {
            Some(level) => &self.levels[level.index()],
            None => &self.scope,
        }
    }

    /// Node fields overlaid with the `level` view's fields.
    fn effective_fields(&self, level: LogLevel) -> Fields {
        let mut merged = self.scope.fields.clone();
        fields::overlay(&mut merged, &self.levels[level.index()].fields);
        merged
    }
}

pub(crate) struct Tree {
    root_name: String,
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    epoch: u64,
}

impl Tree {
    pub(crate) fn new(root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        let mut index = HashMap::new();
        index.insert(root_name.clone(), ROOT);
        Self {
            nodes: vec![Node::new(root_name.clone(), None)],
            root_name,
            index,
            epoch: 0,
        }
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn root_name(&self) -> &str {
        &self.root_name
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn name_for(&self, path: &[String]) -> String {
        if path.is_empty() {
            self.root_name.clone()
        } else {
            path.join(SEPARATOR)
        }
    }

    /// Find or create the node for `path`, creating missing ancestors.
    pub(crate) fn resolve(&mut self, path: &[String]) -> NodeId {
        if let Some(&id) = self.index.get(&self.name_for(path)) {
            return id;
        }

        let mut current = ROOT;
        for depth in 0..path.len() {
            current = match self.nodes[current].children.get(&path[depth]) {
                Some(&child) => child,
                None => self.insert(current, &path[..=depth]),
            };
        }
        current
    }

    fn insert(&mut self, parent: NodeId, path: &[String]) -> NodeId {
        let id = self.nodes.len();
        let name = self.name_for(path);
        let segment = path[path.len() - 1].clone();

        self.nodes.push(Node::new(name.clone(), Some(parent)));
        self.nodes[parent].children.insert(segment, id);
        self.index.insert(name, id);
        id
    }

    /// The id a handle created at `epoch` should use now.
    pub(crate) fn locate(&mut self, path: &[String], node: NodeId, epoch: u64) -> NodeId {
        if epoch == self.epoch {
            node
        } else {
            self.resolve(path)
        }
    }

    pub(crate) fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    #[cfg(test)]
    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub(crate) fn children(&self, id: NodeId) -> Vec<String> {
        let mut names: Vec<String> = self.nodes[id].children.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn add_fields(&mut self, id: NodeId, level: Option<LogLevel>, new: Fields) {
        fields::extend(&mut self.nodes[id].scope_mut(level).fields, new);
    }

    pub(crate) fn fields(&self, id: NodeId, level: Option<LogLevel>) -> Fields {
        self.nodes[id].scope(level).fields.clone()
    }

    pub(crate) fn attach(
        &mut self,
        id: NodeId,
        level: Option<LogLevel>,
        sink: Box<dyn Sink>,
        exact: bool,
    ) {
        self.nodes[id]
            .scope_mut(level)
            .sinks
            .push(Subscription { sink, exact });
    }

    /// Subscriptions on the node itself, across all scopes.
    pub(crate) fn sink_count(&self, id: NodeId) -> usize {
        let node = &self.nodes[id];
        node.scope.sinks.len() + node.levels.iter().map(|s| s.sinks.len()).sum::<usize>()
    }

    /// Fields for a record of `level` emitted at `id`.
    ///
    /// Values: root < ... < node < node's level view < call site. Keys of
    /// the emitting node come first, inherited keys follow nearest-first.
    pub(crate) fn merged_fields(
        &self,
        id: NodeId,
        level: LogLevel,
        call_site: Option<Fields>,
    ) -> Option<Fields> {
        let node = &self.nodes[id];
        let mut merged = node.effective_fields(level);
        if let Some(call_site) = call_site {
            fields::overlay(&mut merged, &call_site);
        }

        let mut cursor = node.parent;
        while let Some(ancestor_id) = cursor {
            let ancestor = &self.nodes[ancestor_id];
            fields::fill(&mut merged, &ancestor.effective_fields(level));
            cursor = ancestor.parent;
        }

        if merged.is_empty() {
            None
        } else {
            Some(merged)
        }
    }

    /// Write `line` to every subscription that should see a `level` record
    /// emitted at `id`: the node and each ancestor, severity-agnostic sinks
    /// first, then level views from the lowest matching level upwards.
    pub(crate) fn dispatch(
        &mut self,
        id: NodeId,
        level: LogLevel,
        line: &[u8],
        metrics: &RegistryMetrics,
    ) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &mut self.nodes[current];

            for subscription in node.scope.sinks.iter_mut() {
                deliver(subscription.sink.as_mut(), line, metrics);
            }

            for view_level in LogLevel::ALL.iter().copied().filter(|l| *l <= level) {
                for subscription in node.levels[view_level.index()].sinks.iter_mut() {
                    if subscription.exact && view_level != level {
                        continue;
                    }
                    deliver(subscription.sink.as_mut(), line, metrics);
                }
            }

            cursor = node.parent;
        }
    }

    /// Flush every sink; all are attempted, the first error is returned.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let mut first_error = None;
        for node in self.nodes.iter_mut() {
            let scopes = std::iter::once(&mut node.scope).chain(node.levels.iter_mut());
            for scope in scopes {
                for subscription in scope.sinks.iter_mut() {
                    if let Err(e) = subscription.sink.flush() {
                        eprintln!(
                            "[TREELOG ERROR] Sink '{}' flush failed: {}",
                            subscription.sink.name(),
                            e
                        );
                        first_error.get_or_insert(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Back to a lone root with no fields and no sinks.
    ///
    /// Returns the retired tree; its sinks flush themselves when it is dropped.
    pub(crate) fn reset(&mut self) -> Tree {
        let mut fresh = Tree::new(self.root_name.clone());
        fresh.epoch = self.epoch + 1;
        std::mem::replace(self, fresh)
    }
}

/// One sink write, isolated from failures of every other sink.
fn deliver(sink: &mut dyn Sink, line: &[u8], metrics: &RegistryMetrics) {
    let result = catch_unwind(AssertUnwindSafe(|| sink.write(line)));

    match result {
        Ok(Ok(())) => {
            metrics.record_delivered();
        }
        Ok(Err(e)) => {
            eprintln!("[TREELOG ERROR] Sink '{}' failed: {}", sink.name(), e);
            metrics.record_sink_failure();
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            eprintln!(
                "[TREELOG CRITICAL] Sink '{}' panicked: {}. \
                 Other sinks continue to function.",
                sink.name(),
                panic_msg
            );
            metrics.record_sink_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use serde_json::json;

    fn path(ns: &str) -> Vec<String> {
        split_namespace(ns)
    }

    fn obj(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_split_namespace() {
        assert_eq!(split_namespace("lb:lc"), vec!["lb", "lc"]);
        assert_eq!(split_namespace("lb.lc"), vec!["lb", "lc"]);
        assert_eq!(split_namespace("::a::b:"), vec!["a", "b"]);
        assert!(split_namespace("").is_empty());
    }

    #[test]
    fn test_resolve_creates_missing_ancestors() {
        let mut tree = Tree::new("root");
        let lc = tree.resolve(&path("lb:lc"));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.name(lc), "lb:lc");

        let lb = tree.parent(lc).unwrap();
        assert_eq!(tree.name(lb), "lb");
        assert_eq!(tree.parent(lb), Some(ROOT));
        assert_eq!(tree.children(ROOT), vec!["lb"]);
        assert_eq!(tree.resolve(&path("lb")), lb);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut tree = Tree::new("root");
        let a = tree.resolve(&path("a:b:c"));
        let b = tree.resolve(&path("a:b:c"));
        assert_eq!(a, b);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.resolve(&[]), ROOT);
        assert_eq!(tree.name(ROOT), "root");
    }

    #[test]
    fn test_merge_precedence() {
        let mut tree = Tree::new("root");
        let node = tree.resolve(&path("svc"));
        tree.add_fields(ROOT, None, obj(json!({"x": 1})));
        tree.add_fields(node, None, obj(json!({"x": 2, "y": 3})));

        let merged = tree.merged_fields(node, LogLevel::Info, Some(obj(json!({"y": 4}))));
        assert_eq!(merged, Some(obj(json!({"x": 2, "y": 4}))));
    }

    #[test]
    fn test_view_fields_only_apply_to_their_level() {
        let mut tree = Tree::new("root");
        let node = tree.resolve(&path("svc"));
        tree.add_fields(node, Some(LogLevel::Warn), obj(json!({"k": "warn"})));
        tree.add_fields(node, None, obj(json!({"k": "node"})));

        assert_eq!(
            tree.merged_fields(node, LogLevel::Warn, None),
            Some(obj(json!({"k": "warn"})))
        );
        assert_eq!(
            tree.merged_fields(node, LogLevel::Debug, None),
            Some(obj(json!({"k": "node"})))
        );
        assert_eq!(
            tree.merged_fields(node, LogLevel::Warn, Some(obj(json!({"k": "call"})))),
            Some(obj(json!({"k": "call"})))
        );
    }

    #[test]
    fn test_empty_merge_is_none() {
        let mut tree = Tree::new("root");
        let node = tree.resolve(&path("quiet"));
        assert_eq!(tree.merged_fields(node, LogLevel::Info, None), None);
        assert_eq!(tree.merged_fields(node, LogLevel::Info, Some(Fields::new())), None);
    }

    #[test]
    fn test_dispatch_threshold_and_exact() {
        let mut tree = Tree::new("root");
        let metrics = RegistryMetrics::new();
        let node = tree.resolve(&path("a"));
        let threshold = MemorySink::new();
        let exact = MemorySink::new();
        tree.attach(node, Some(LogLevel::Warn), Box::new(threshold.clone()), false);
        tree.attach(node, Some(LogLevel::Warn), Box::new(exact.clone()), true);

        for level in LogLevel::ALL {
            tree.dispatch(node, level, format!("{}\n", level).as_bytes(), &metrics);
        }

        assert_eq!(threshold.lines(), vec!["warn", "error", "fatal"]);
        assert_eq!(exact.lines(), vec!["warn"]);
        assert_eq!(metrics.deliveries(), 4);
    }

    #[test]
    fn test_reset_bumps_epoch_and_clears() {
        let mut tree = Tree::new("root");
        let node = tree.resolve(&path("a:b"));
        tree.attach(node, None, Box::new(MemorySink::new()), false);
        tree.add_fields(ROOT, None, obj(json!({"x": 1})));

        let retired = tree.reset();
        assert_eq!(retired.len(), 3);
        assert_eq!(tree.epoch(), 1);
        assert_eq!(tree.len(), 1);
        assert!(tree.fields(ROOT, None).is_empty());

        let fresh = tree.locate(&path("a:b"), node, 0);
        assert_eq!(tree.name(fresh), "a:b");
        assert_eq!(tree.sink_count(fresh), 0);
    }
}
