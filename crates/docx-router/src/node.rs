/// Router nodes and the context used to build them
///
/// A node is built exactly once: a [`BuildContext`] collects the route items
/// and lazy child references declared by the node's registration logic, then
/// freezes them into an immutable [`RouterNode`] with its candidates already
/// in match order.
use crate::alias::AliasTable;
use crate::error::{Result, RouteError};
use crate::loader::{self, Loader};
use crate::order::sort_most_specific_first;
use crate::path::normalize_prefix;
use crate::pattern::{compile_with, CompiledPattern};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One registered (pattern, handler chain) pair
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: CompiledPattern,
    handlers: Vec<String>,
}

impl RouteEntry {
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Rule key of this item
    pub fn rule(&self) -> &str {
        self.pattern.rule()
    }

    /// Full chain: primary handler followed by filters
    pub fn handlers(&self) -> &[String] {
        &self.handlers
    }

    /// The primary handler
    pub fn handler(&self) -> &str {
        self.handlers.first().map(String::as_str).unwrap_or_default()
    }

    pub fn filters(&self) -> &[String] {
        self.handlers.get(1..).unwrap_or_default()
    }
}

/// Observable load state of a lazy child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
    /// Registration failed; the error is kept and never retried
    Failed,
}

/// A lazily-resolvable child reference
#[derive(Debug)]
pub struct ChildModule {
    /// Sub-prefix relative to the parent node
    prefix: String,
    source_ref: String,
    node: OnceCell<Result<Arc<RouterNode>>>,
}

impl ChildModule {
    fn new(prefix: String, source_ref: String) -> Self {
        Self {
            prefix,
            source_ref,
            node: OnceCell::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    pub fn state(&self) -> LoadState {
        match self.node.get() {
            None => LoadState::Unloaded,
            Some(Ok(_)) => LoadState::Loaded,
            Some(Err(_)) => LoadState::Failed,
        }
    }

    /// The loaded node, if loading already happened and succeeded
    pub fn loaded(&self) -> Option<&Arc<RouterNode>> {
        self.node.get().and_then(|result| result.as_ref().ok())
    }

    /// Loads the child on first use
    ///
    /// Concurrent callers block on the same cell, so registration logic runs
    /// at most once whatever its outcome.
    pub(crate) fn resolve(&self, loader: &Loader<'_>, parent_prefix: &str) -> Result<Arc<RouterNode>> {
        self.node
            .get_or_init(|| {
                let prefix = format!("{}{}", parent_prefix, self.prefix);
                loader.load(&self.source_ref, &prefix).map(Arc::new)
            })
            .clone()
    }
}

/// A routing unit: prefix, lazy children and route items
#[derive(Debug)]
pub struct RouterNode {
    prefix: String,
    source_ref: String,
    /// Most specific first
    children: Vec<ChildModule>,
    /// Most specific first
    items: Vec<RouteEntry>,
}

impl RouterNode {
    /// The implicit root: empty prefix, no source, nothing registered
    pub fn empty() -> Self {
        Self {
            prefix: String::new(),
            source_ref: String::new(),
            children: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Concatenation of every ancestor prefix matched to reach this node
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reference of the module that defined this node (empty for the root)
    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    /// Lazy children in delegation order
    pub fn children(&self) -> &[ChildModule] {
        &self.children
    }

    /// Route items in match order
    pub fn routes(&self) -> &[RouteEntry] {
        &self.items
    }

    pub fn child(&self, prefix: &str) -> Option<&ChildModule> {
        self.children.iter().find(|c| c.prefix == prefix)
    }

    pub fn route(&self, rule: &str) -> Option<&RouteEntry> {
        self.items.iter().find(|e| e.rule() == rule)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.items.is_empty()
    }
}

impl Default for RouterNode {
    fn default() -> Self {
        Self::empty()
    }
}

/// The node under construction, handed to registration logic
///
/// Replaces a process-wide "current router" slot: every registration call
/// targets the context it is invoked on.
pub struct BuildContext<'a> {
    prefix: String,
    source_ref: String,
    aliases: &'a AliasTable,
    children: BTreeMap<String, String>,
    items: BTreeMap<String, RouteEntry>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(prefix: &str, source_ref: &str, aliases: &'a AliasTable) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
            source_ref: source_ref.to_string(),
            aliases,
            children: BTreeMap::new(),
            items: BTreeMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    pub fn aliases(&self) -> &AliasTable {
        self.aliases
    }

    /// Registers a route item and returns its rule key
    ///
    /// The first handler is the primary one, the rest are filters. The
    /// pattern is compiled immediately, so a broken pattern fails the load
    /// of this module rather than a later dispatch. Registering the same rule
    /// twice keeps the latest handler chain.
    pub fn route<I, S>(&mut self, pattern: &str, handlers: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(pattern, handlers, false)
    }

    /// Registers a route item whose pattern also matches any continuation
    ///
    /// The continuation is returned as the last captured argument.
    pub fn route_wild<I, S>(&mut self, pattern: &str, handlers: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(pattern, handlers, true)
    }

    fn register<I, S>(&mut self, pattern: &str, handlers: I, wildcard: bool) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handlers: Vec<String> = handlers.into_iter().map(Into::into).collect();
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlerChain {
                pattern: pattern.to_string(),
            });
        }

        let pattern = compile_with(self.aliases, pattern, wildcard)?;
        let rule = pattern.rule().to_string();
        debug!(prefix = %self.prefix, rule = %rule, handler = %handlers[0], "registered route");

        self.items
            .insert(rule.clone(), RouteEntry { pattern, handlers });
        Ok(rule)
    }

    /// Declares a lazy child directly under `sub_prefix`
    pub fn mount(&mut self, sub_prefix: &str, source_ref: impl AsRef<Path>) -> &mut Self {
        let source_ref = source_ref.as_ref().to_string_lossy().into_owned();
        self.children.insert(normalize_prefix(sub_prefix), source_ref);
        self
    }

    /// Discovers route files in `directory` and records each as a lazy child
    ///
    /// Only the directory listing happens here; the files themselves are read
    /// when dispatch first descends into them. A missing directory adds nothing.
    pub fn expose(&mut self, directory: impl AsRef<Path>, pattern: &str) -> &mut Self {
        let directory = directory.as_ref();
        let discovered = loader::discover(directory, pattern);
        debug!(
            prefix = %self.prefix,
            directory = %directory.display(),
            pattern,
            count = discovered.len(),
            "exposed route modules"
        );
        self.children.extend(discovered);
        self
    }

    /// Freezes the collected registrations into a node
    pub(crate) fn finish(self) -> RouterNode {
        let mut children: Vec<ChildModule> = self
            .children
            .into_iter()
            .map(|(prefix, source_ref)| ChildModule::new(prefix, source_ref))
            .collect();
        sort_most_specific_first(&mut children, ChildModule::prefix);

        let mut items: Vec<RouteEntry> = self.items.into_values().collect();
        sort_most_specific_first(&mut items, RouteEntry::rule);

        RouterNode {
            prefix: self.prefix,
            source_ref: self.source_ref,
            children,
            items,
        }
    }
}
