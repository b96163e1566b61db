//! # DocX Router
//!
//! Resolves a request path to a handler chain and its captured arguments,
//! using a tree of route groups that are declared directly or discovered
//! lazily from a directory of route files.
//!
//! - **Alias patterns**: `/post/<int>` expands `<int>` to `([0-9\-]+)`
//! - **Lazy route groups**: child groups are only loaded when a request first
//!   descends into them, and each is loaded at most once
//! - **Greedy dispatch**: child prefixes first, then route items, each tried in
//!   descending key order with no backtracking
//!
//! ## Example
//!
//! ```
//! use docx_router::{ModuleRegistry, Router};
//!
//! let registry = ModuleRegistry::new().with_module("blog.toml", |ctx| {
//!     ctx.route("/<string>", ["show_article"])?;
//!     Ok(())
//! });
//!
//! let router = Router::new()
//!     .with_sources(registry)
//!     .define(|ctx| {
//!         ctx.route("/post/<int>", ["show_post"])?;
//!         ctx.mount("/blog", "blog.toml");
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let hit = router.dispatch("/post/42").unwrap().unwrap();
//! assert_eq!(hit.handlers, vec!["show_post"]);
//! assert_eq!(hit.args, vec!["42"]);
//! assert_eq!(hit.uri, "/post/42");
//!
//! let hit = router.dispatch("/blog/hello-world").unwrap().unwrap();
//! assert_eq!(hit.uri, "/blog/hello-world");
//!
//! assert!(router.dispatch("/post/abc").unwrap().is_none());
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod alias;
pub mod config;
mod dispatch;
mod error;
pub mod loader;
mod node;
pub mod order;
pub mod path;
pub mod pattern;

pub use alias::{AliasTable, DEFAULT_ALIASES, STANDARD_ALIASES};
pub use config::Config;
pub use dispatch::DispatchResult;
pub use error::{Result, RouteError};
pub use loader::{discover, ManifestSource, ModuleRegistry, ModuleSource, RouteManifest};
pub use node::{BuildContext, ChildModule, LoadState, RouteEntry, RouterNode};
pub use path::{normalize_request_path, to_prefix};
pub use pattern::{compile, compile_with, CompiledPattern};

use loader::Loader;

// ============================================================================
// Router
// ============================================================================

/// Entry point: owns the root node, the module source and the alias table
#[derive(Clone)]
pub struct Router {
    root: Arc<RouterNode>,
    sources: Arc<dyn ModuleSource>,
    aliases: Arc<AliasTable>,
}

/// One route item of a fully loaded tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteListing {
    /// Prefix of the node that owns the item
    pub prefix: String,
    /// Declared pattern, normalized
    pub pattern: String,
    pub rule: String,
    pub handlers: Vec<String>,
}

impl Router {
    /// An empty router with the standard aliases and no module source
    pub fn new() -> Self {
        Self {
            root: Arc::new(RouterNode::empty()),
            sources: Arc::new(ModuleRegistry::new()),
            aliases: Arc::new(AliasTable::default()),
        }
    }

    /// Sets where lazy children get their registration logic from
    pub fn with_sources(mut self, sources: impl ModuleSource + 'static) -> Self {
        self.sources = Arc::new(sources);
        self
    }

    /// Replaces the alias table
    ///
    /// Applies to patterns registered afterwards, so call it before
    /// [`Router::define`] or [`Router::load_root`].
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = Arc::new(aliases);
        self
    }

    /// Builds the root node from inline registration logic
    pub fn define<F>(mut self, register: F) -> Result<Self>
    where
        F: FnOnce(&mut BuildContext<'_>) -> Result<()>,
    {
        let mut ctx = BuildContext::new("", "", &self.aliases);
        register(&mut ctx)?;
        self.root = Arc::new(ctx.finish());
        Ok(self)
    }

    /// Builds the root node from a module of the configured source
    pub fn load_root(mut self, source_ref: &str) -> Result<Self> {
        let node = self.loader().load(source_ref, "")?;
        self.root = Arc::new(node);
        Ok(self)
    }

    pub fn root(&self) -> &RouterNode {
        &self.root
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolves `path` to a route
    ///
    /// `Ok(None)` means no route matched. Errors come only from lazy loads
    /// triggered by this call (or cached from an earlier failed load).
    pub fn dispatch(&self, path: &str) -> Result<Option<DispatchResult>> {
        dispatch::dispatch_node(&self.loader(), &self.root, path)
    }

    /// Loads every lazy child and lists all route items, depth first
    ///
    /// Items of a node come before its children, each in match order.
    pub fn load_all(&self) -> Result<Vec<RouteListing>> {
        let mut listing = Vec::new();
        self.collect(&self.root, &mut listing)?;
        Ok(listing)
    }

    fn collect(&self, node: &RouterNode, out: &mut Vec<RouteListing>) -> Result<()> {
        out.extend(node.routes().iter().map(|entry| RouteListing {
            prefix: node.prefix().to_string(),
            pattern: entry.pattern().raw().to_string(),
            rule: entry.rule().to_string(),
            handlers: entry.handlers().to_vec(),
        }));

        let loader = self.loader();
        for child in node.children() {
            let child_node = child.resolve(&loader, node.prefix())?;
            self.collect(&child_node, out)?;
        }
        Ok(())
    }

    fn loader(&self) -> Loader<'_> {
        Loader {
            sources: self.sources.as_ref(),
            aliases: &self.aliases,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .field("aliases", &self.aliases.len())
            .finish()
    }
}
