//! Logger handles and severity views

use super::{
    arg::IntoArgs,
    fields::Fields,
    formatter,
    log_level::LogLevel,
    registry::Registry,
    sink::Sink,
    tree::{split_namespace, NodeId, Tree},
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Handle to one namespace node.
///
/// Handles are cheap to clone. Every handle for the same path refers to the
/// same node, so fields and sinks attached through one are seen by all.
///
/// # Example
///
/// ```
/// use treelog::prelude::*;
/// use serde_json::json;
///
/// let registry = Registry::new();
/// let sink = MemorySink::new();
///
/// let lb = registry.logger("lb");
/// lb.attach_sink(sink.clone());
///
/// let lc = lb.child("lc");
/// lc.info(("%s joined", "anh"));
///
/// let records = sink.records();
/// assert_eq!(records[0]["name"], json!("lb:lc"));
/// assert_eq!(records[0]["message"], json!("anh joined"));
/// ```
#[derive(Clone)]
pub struct Logger {
    registry: Registry,
    path: Arc<[String]>,
    name: Arc<str>,
    node: NodeId,
    epoch: u64,
}

impl Logger {
    pub(crate) fn new(
        registry: Registry,
        path: Vec<String>,
        name: String,
        node: NodeId,
        epoch: u64,
    ) -> Self {
        Self {
            registry,
            path: path.into(),
            name: name.into(),
            node,
            epoch,
        }
    }

    /// Joined namespace, as emitted in the `name` key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path segments; empty for the root.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn locate(&self, tree: &mut Tree) -> NodeId {
        tree.locate(&self.path, self.node, self.epoch)
    }

    /// Derive a sub-namespace: `log("lb").child("lc")` is `log("lb:lc")`.
    pub fn child(&self, segment: &str) -> Logger {
        let mut path = self.path.to_vec();
        path.extend(split_namespace(segment));
        self.registry.resolve_path(path)
    }

    pub fn parent(&self) -> Option<Logger> {
        let (_, parent) = self.path.split_last()?;
        Some(self.registry.resolve_path(parent.to_vec()))
    }

    /// Names of the direct children created so far, sorted.
    pub fn children(&self) -> Vec<String> {
        self.registry.with_node(self, |tree, node| tree.children(node))
    }

    /// True when both handles address the same node of the same tree.
    pub fn same_node(&self, other: &Logger) -> bool {
        if !self.registry.ptr_eq(&other.registry) {
            return false;
        }
        self.registry
            .with_node(self, |tree, node| node == other.locate(tree))
    }

    /// Subscribe `sink` to every record emitted here or below, at any level.
    pub fn attach_sink<S: Sink + 'static>(&self, sink: S) -> &Self {
        self.registry
            .with_node(self, |tree, node| tree.attach(node, None, Box::new(sink), false));
        self
    }

    /// Merge `fields` into this node's severity-agnostic store.
    pub fn add_fields(&self, fields: Fields) -> &Self {
        self.registry
            .with_node(self, |tree, node| tree.add_fields(node, None, fields));
        self
    }

    pub fn add_field(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        let mut fields = Fields::new();
        fields.insert(key.into(), value.into());
        self.add_fields(fields)
    }

    /// Snapshot of this node's own severity-agnostic fields.
    pub fn fields(&self) -> Fields {
        self.registry
            .with_node(self, |tree, node| tree.fields(node, None))
    }

    /// Number of subscriptions on this node, views included.
    pub fn sink_count(&self) -> usize {
        self.registry
            .with_node(self, |tree, node| tree.sink_count(node))
    }

    /// The view of this node for `level`.
    pub fn severity(&self, level: LogLevel) -> LevelView {
        LevelView {
            logger: self.clone(),
            level,
        }
    }

    pub fn log(&self, level: LogLevel, args: impl IntoArgs) {
        let formatted = formatter::format(args.into_args());
        self.registry.emit(self, level, formatted);
    }

    #[inline]
    pub fn debug(&self, args: impl IntoArgs) {
        self.log(LogLevel::Debug, args);
    }

    #[inline]
    pub fn info(&self, args: impl IntoArgs) {
        self.log(LogLevel::Info, args);
    }

    #[inline]
    pub fn warn(&self, args: impl IntoArgs) {
        self.log(LogLevel::Warn, args);
    }

    #[inline]
    pub fn error(&self, args: impl IntoArgs) {
        self.log(LogLevel::Error, args);
    }

    #[inline]
    pub fn fatal(&self, args: impl IntoArgs) {
        self.log(LogLevel::Fatal, args);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}

/// One severity facet of a node.
///
/// Sinks attached here receive records at this level or above (or, with
/// [`attach_exact_sink`](Self::attach_exact_sink), exactly this level) from
/// the node and its descendants. Fields added here apply only to records of
/// this exact level.
#[derive(Clone)]
pub struct LevelView {
    logger: Logger,
    level: LogLevel,
}

impl LevelView {
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn attach_sink<S: Sink + 'static>(&self, sink: S) -> &Self {
        self.attach(Box::new(sink), false)
    }

    pub fn attach_exact_sink<S: Sink + 'static>(&self, sink: S) -> &Self {
        self.attach(Box::new(sink), true)
    }

    fn attach(&self, sink: Box<dyn Sink>, exact: bool) -> &Self {
        let level = self.level;
        self.logger.registry.with_node(&self.logger, |tree, node| {
            tree.attach(node, Some(level), sink, exact)
        });
        self
    }

    pub fn add_fields(&self, fields: Fields) -> &Self {
        let level = self.level;
        self.logger.registry.with_node(&self.logger, |tree, node| {
            tree.add_fields(node, Some(level), fields)
        });
        self
    }

    pub fn add_field(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        let mut fields = Fields::new();
        fields.insert(key.into(), value.into());
        self.add_fields(fields)
    }

    pub fn fields(&self) -> Fields {
        let level = self.level;
        self.logger
            .registry
            .with_node(&self.logger, |tree, node| tree.fields(node, Some(level)))
    }

    /// Log at this view's level.
    pub fn log(&self, args: impl IntoArgs) {
        self.logger.log(self.level, args);
    }
}

impl fmt::Debug for LevelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelView")
            .field("name", &self.logger.name)
            .field("level", &self.level)
            .finish()
    }
}
