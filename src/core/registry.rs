//! Registry: owner of one namespace tree
//!
//! A registry is a cheap, cloneable handle to a tree guarded by a single
//! tree-wide lock. Resolution, field and sink mutation, emit dispatch and
//! reset all serialize on that lock. [`Registry::global`] is the process-wide
//! instance every independently obtained handle shares.
//!
//! The lock is reentrant so that a sink calling back into its own registry
//! from `write` or `flush` cannot deadlock the thread. Log calls made that way
//! are dropped and counted; any other re-entrant operation panics, and the
//! panic is contained like any other sink panic.

use super::{
    environment::{Environment, SystemEnvironment},
    error::{LoggerError, Result},
    formatter::Formatted,
    log_level::LogLevel,
    logger::Logger,
    metrics::RegistryMetrics,
    record::{ForwardedRecord, Record},
    tree::{split_namespace, NodeId, Tree},
};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Name of the root node unless configured otherwise.
pub const DEFAULT_ROOT_NAME: &str = "root";

static GLOBAL: OnceLock<Registry> = OnceLock::new();

const REENTERED: &str = "treelog registry used from inside one of its own sinks";

struct RegistryInner {
    tree: ReentrantMutex<RefCell<Tree>>,
    environment: Box<dyn Environment>,
    metrics: RegistryMetrics,
}

#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// A fresh, independent tree with the system environment.
    #[must_use]
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Create a builder for Registry
    ///
    /// # Example
    /// ```
    /// use treelog::{FixedEnvironment, Registry};
    ///
    /// let registry = Registry::builder()
    ///     .environment(FixedEnvironment::new("test-host", 1))
    ///     .root_name("app")
    ///     .build();
    ///
    /// assert_eq!(registry.root().name(), "app");
    /// ```
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn root(&self) -> Logger {
        self.resolve_path(Vec::new())
    }

    /// Resolve a namespace string such as `"lb:lc"` or `"lb.lc"`.
    ///
    /// A leading segment equal to the root name is ignored, so `"root:a"`
    /// and `"a"` name the same node.
    pub fn logger(&self, namespace: &str) -> Logger {
        self.resolve_path(split_namespace(namespace))
    }

    /// Resolve a path given as segments. Segments containing separators are
    /// split further, and a leading root-name segment is ignored as in
    /// [`logger`](Self::logger).
    pub fn resolve<I, S>(&self, segments: I) -> Logger
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = segments
            .into_iter()
            .flat_map(|s| split_namespace(s.as_ref()))
            .collect();
        self.resolve_path(path)
    }

    pub(crate) fn resolve_path(&self, mut path: Vec<String>) -> Logger {
        let (node, name, epoch) = self.with_tree(|tree| {
            strip_root(tree, &mut path);
            let node = tree.resolve(&path);
            (node, tree.name(node).to_string(), tree.epoch())
        });
        Logger::new(self.clone(), path, name, node, epoch)
    }

    /// Clear every node, field and sink, leaving a lone root.
    ///
    /// Existing handles stay usable; they re-resolve into the fresh tree.
    /// The old sinks are dropped after the tree is swapped, so a sink that
    /// logs from `Drop` lands in the fresh tree.
    pub fn reset(&self) {
        let _guard = self.inner.tree.lock();
        let retired = self.with_tree(Tree::reset);
        self.inner.metrics.reset();
        drop(retired);
    }

    /// Flush every attached sink.
    pub fn flush(&self) -> Result<()> {
        self.with_tree(Tree::flush)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.with_tree(|tree| tree.len())
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.inner.metrics
    }

    pub fn environment(&self) -> &dyn Environment {
        self.inner.environment.as_ref()
    }

    pub fn root_name(&self) -> String {
        self.with_tree(|tree| tree.root_name().to_string())
    }

    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Route a record built elsewhere to the node its `name` designates.
    ///
    /// Inherited fields are not merged in; time, host and pid are
    /// re-decorated.
    pub fn ingest(&self, record: ForwardedRecord) {
        let mut path = split_namespace(&record.name);
        let name = record.name.clone();
        let delivered = self.try_with_tree(|tree| {
            strip_root(tree, &mut path);
            let node = tree.resolve(&path);
            let record = self.decorate(
                tree,
                node,
                record.level,
                Formatted {
                    message: record.message,
                    fields: record.fields.filter(|f| !f.is_empty()),
                    err: record.err,
                },
            );
            self.inner.metrics.record_ingested();
            self.dispatch(tree, node, &record);
        });
        if delivered.is_none() {
            self.drop_reentrant(&name);
        }
    }

    /// Parse one JSON line and [`ingest`](Self::ingest) it.
    pub fn ingest_line(&self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Err(LoggerError::invalid_record("empty line"));
        }
        let record: ForwardedRecord = serde_json::from_str(line)?;
        self.ingest(record);
        Ok(())
    }

    /// Build, serialize and dispatch a record for a log call on `logger`.
    pub(crate) fn emit(&self, logger: &Logger, level: LogLevel, formatted: Formatted) {
        let delivered = self.try_with_tree(|tree| {
            let node = logger.locate(tree);
            let fields = tree.merged_fields(node, level, formatted.fields);
            let record = self.decorate(
                tree,
                node,
                level,
                Formatted {
                    message: formatted.message,
                    fields,
                    err: formatted.err,
                },
            );
            self.dispatch(tree, node, &record);
        });
        if delivered.is_none() {
            self.drop_reentrant(logger.name());
        }
    }

    /// Run `f` against the current node of `logger` under the tree lock.
    pub(crate) fn with_node<R>(&self, logger: &Logger, f: impl FnOnce(&mut Tree, NodeId) -> R) -> R {
        self.with_tree(|tree| {
            let node = logger.locate(tree);
            f(tree, node)
        })
    }

    /// Lock the tree and run `f`, or return `None` when this thread is
    /// already inside the tree (a sink calling back into its registry).
    fn try_with_tree<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> Option<R> {
        let guard = self.inner.tree.lock();
        let mut tree = guard.try_borrow_mut().ok()?;
        Some(f(&mut *tree))
    }

    /// Like [`try_with_tree`](Self::try_with_tree), panicking on re-entry.
    fn with_tree<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> R {
        match self.try_with_tree(f) {
            Some(result) => result,
            None => panic!("{}", REENTERED),
        }
    }

    fn drop_reentrant(&self, name: &str) {
        eprintln!("[TREELOG ERROR] Record for '{}' dropped: {}", name, REENTERED);
        self.inner.metrics.record_dropped();
    }

    fn decorate(&self, tree: &Tree, node: NodeId, level: LogLevel, parts: Formatted) -> Record {
        let env = self.environment();
        Record {
            time: env.now(),
            level,
            name: tree.name(node).to_string(),
            message: parts.message,
            fields: parts.fields,
            err: parts.err,
            host: env.host().to_string(),
            pid: env.pid(),
        }
    }

    fn dispatch(&self, tree: &mut Tree, node: NodeId, record: &Record) {
        let metrics = &self.inner.metrics;
        metrics.record_emitted();
        match record.to_line() {
            Ok(line) => tree.dispatch(node, record.level, &line, metrics),
            Err(e) => eprintln!(
                "[TREELOG ERROR] Record for '{}' could not be serialized: {}",
                record.name, e
            ),
        }
    }
}

/// The root name is reserved as a leading segment: `"root:a"` is `"a"`.
fn strip_root(tree: &Tree, path: &mut Vec<String>) {
    if path.first().map(String::as_str) == Some(tree.root_name()) {
        path.remove(0);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("root_name", &self.root_name())
            .field("nodes", &self.node_count())
            .finish()
    }
}

/// Builder for constructing a Registry with a fluent API
pub struct RegistryBuilder {
    environment: Box<dyn Environment>,
    root_name: String,
}

impl RegistryBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            environment: Box::new(SystemEnvironment::new()),
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }

    /// Source of time, host and pid decorations
    #[must_use = "builder methods return a new value"]
    pub fn environment<E: Environment + 'static>(mut self, environment: E) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Name emitted by records logged on the root node
    #[must_use = "builder methods return a new value"]
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            inner: Arc::new(RegistryInner {
                tree: ReentrantMutex::new(RefCell::new(Tree::new(self.root_name))),
                environment: self.environment,
                metrics: RegistryMetrics::new(),
            }),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::FixedEnvironment;
    use crate::core::Sink;
    use crate::sinks::MemorySink;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::builder()
            .environment(FixedEnvironment::new("matt", 1))
            .build()
    }

    #[test]
    fn test_logger_strips_root_segment() {
        let registry = registry();
        assert!(registry.logger("root:a").same_node(&registry.logger("a")));
        assert!(registry.logger("root").same_node(&registry.root()));
        assert!(registry.logger("").same_node(&registry.root()));
        assert_eq!(registry.logger("a.b").name(), "a:b");
    }

    #[test]
    fn test_resolve_splits_segments() {
        let registry = registry();
        let a = registry.resolve(["lb", "lc"]);
        let b = registry.resolve(["lb:lc"]);
        assert!(a.same_node(&b));
        assert_eq!(registry.node_count(), 3);

        let c = registry.resolve(["root", "lb", "lc"]);
        assert!(c.same_node(&a));
        assert_eq!(c.path(), a.path());
        assert_eq!(registry.node_count(), 3);
    }

    #[test]
    fn test_ingest_routes_to_named_node() {
        let registry = registry();
        let sink = MemorySink::new();
        registry.root().attach_sink(sink.clone());
        let _a = registry.logger("a");

        registry.ingest(ForwardedRecord::new(LogLevel::Info, "root:a").with_message("a"));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], json!("a"));
        assert_eq!(records[0]["message"], json!("a"));
        assert_eq!(records[0]["host"], json!("matt"));
        assert_eq!(registry.metrics().records_ingested(), 1);
    }

    #[test]
    fn test_ingest_does_not_inherit_fields() {
        let registry = registry();
        let sink = MemorySink::new();
        let root = registry.root();
        root.attach_sink(sink.clone());
        root.add_field("team", "soloists");

        registry
            .ingest_line(r#"{"level":"warn","name":"svc","message":"forwarded"}"#)
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].get("fields").is_none());
    }

    #[test]
    fn test_ingest_line_rejects_garbage() {
        let registry = registry();
        assert!(matches!(
            registry.ingest_line("   "),
            Err(LoggerError::InvalidRecord { .. })
        ));
        assert!(matches!(
            registry.ingest_line(r#"{"level":"loud","name":"a"}"#),
            Err(LoggerError::JsonError(_))
        ));
    }

    #[test]
    fn test_reset_clears_metrics_and_nodes() {
        let registry = registry();
        registry.logger("a:b:c").info("x");
        assert_eq!(registry.node_count(), 4);
        assert_eq!(registry.metrics().records_emitted(), 1);

        registry.reset();
        assert_eq!(registry.node_count(), 1);
        assert_eq!(registry.metrics().records_emitted(), 0);
    }

    /// Copies each line into `inner`, then logs through its own registry.
    struct EchoSink {
        echo: Logger,
        inner: MemorySink,
    }

    impl Sink for EchoSink {
        fn write(&mut self, line: &[u8]) -> Result<()> {
            self.inner.write(line)?;
            self.echo.info("echo");
            Ok(())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    /// Inspects its own registry from inside `write`.
    struct InspectingSink {
        registry: Registry,
    }

    impl Sink for InspectingSink {
        fn write(&mut self, _line: &[u8]) -> Result<()> {
            let _ = self.registry.node_count();
            Ok(())
        }

        fn name(&self) -> &str {
            "inspecting"
        }
    }

    /// Logs through its registry when dropped.
    struct FarewellSink {
        farewell: Logger,
    }

    impl Sink for FarewellSink {
        fn write(&mut self, _line: &[u8]) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "farewell"
        }
    }

    impl Drop for FarewellSink {
        fn drop(&mut self) {
            self.farewell.info("bye");
        }
    }

    #[test]
    fn test_log_from_sink_is_dropped_not_deadlocked() {
        let registry = registry();
        let sink = MemorySink::new();
        registry.root().attach_sink(EchoSink {
            echo: registry.logger("echo"),
            inner: sink.clone(),
        });

        registry.logger("a").info("x");
        registry.logger("b").info("y");

        assert_eq!(sink.len(), 2);
        let metrics = registry.metrics();
        assert_eq!(metrics.records_emitted(), 2);
        assert_eq!(metrics.records_dropped(), 2);
        assert_eq!(metrics.sink_failures(), 0);
    }

    #[test]
    fn test_reentrant_inspection_is_contained() {
        let registry = registry();
        let sink = MemorySink::new();
        let root = registry.root();
        root.attach_sink(InspectingSink {
            registry: registry.clone(),
        });
        root.attach_sink(sink.clone());

        root.info("first");
        root.info("second");

        assert_eq!(sink.len(), 2);
        assert_eq!(registry.metrics().sink_failures(), 2);
        assert_eq!(registry.node_count(), 1);
    }

    #[test]
    fn test_sink_logging_on_drop_during_reset() {
        let registry = registry();
        registry.logger("a").attach_sink(FarewellSink {
            farewell: registry.logger("a"),
        });

        registry.reset();

        assert_eq!(registry.node_count(), 2);
        assert_eq!(registry.metrics().records_emitted(), 1);
        assert_eq!(registry.metrics().records_dropped(), 0);
    }

    #[test]
    fn test_global_is_a_singleton() {
        assert!(Registry::global().ptr_eq(Registry::global()));
    }
}
