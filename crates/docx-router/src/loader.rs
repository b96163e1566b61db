/// Module loading and route-file discovery
///
/// A module is any addressable unit of registration logic. The loader
/// replays that logic against a fresh [`BuildContext`] and freezes the result
/// into a node. Two sources are provided: an in-process registry of
/// callbacks keyed by path, and declarative TOML route files on disk.
use crate::alias::AliasTable;
use crate::error::{Result, RouteError};
use crate::node::{BuildContext, RouterNode};
use crate::path::to_prefix;
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default file pattern for route files
pub const DEFAULT_GLOB: &str = "*.toml";

/// Resolves a module reference to its registration logic
pub trait ModuleSource: Send + Sync {
    /// Replays the registrations of `source_ref` against `ctx`
    ///
    /// A reference that cannot be read is treated as an empty module.
    fn register(&self, source_ref: &str, ctx: &mut BuildContext<'_>) -> Result<()>;
}

impl<T: ModuleSource + ?Sized> ModuleSource for Arc<T> {
    fn register(&self, source_ref: &str, ctx: &mut BuildContext<'_>) -> Result<()> {
        (**self).register(source_ref, ctx)
    }
}

/// Everything needed to materialize a child node
pub(crate) struct Loader<'a> {
    pub(crate) sources: &'a dyn ModuleSource,
    pub(crate) aliases: &'a AliasTable,
}

impl Loader<'_> {
    /// Builds the node for `source_ref` mounted at `prefix`
    pub(crate) fn load(&self, source_ref: &str, prefix: &str) -> Result<RouterNode> {
        debug!(source = source_ref, prefix, "loading route module");
        let mut ctx = BuildContext::new(prefix, source_ref, self.aliases);
        self.sources.register(source_ref, &mut ctx)?;
        let node = ctx.finish();
        debug!(
            source = source_ref,
            prefix,
            routes = node.routes().len(),
            children = node.children().len(),
            "loaded route module"
        );
        Ok(node)
    }
}

/// Lists files under `directory` matching `pattern` as (prefix, source ref) pairs
///
/// The glob is matched against each file's path relative to `directory`, with
/// `*` never crossing a `/`, so `*.toml` only sees the top level while
/// `*/*.toml` sees one level down. Wildcards never match a leading `.`, so
/// hidden files are skipped. `{a,b}` alternatives are expanded before
/// matching and symlinked files are listed like regular ones. The prefix is
/// derived from the relative path. Invalid patterns and missing directories
/// yield nothing.
pub fn discover(directory: &Path, pattern: &str) -> Vec<(String, String)> {
    let alternatives = expand_braces(pattern.trim_start_matches(['/', '\\']));
    let matchers = match alternatives
        .iter()
        .map(|alternative| Pattern::new(alternative))
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        Ok(matchers) => matchers,
        Err(e) => {
            warn!(pattern, error = %e, "invalid route file pattern");
            return Vec::new();
        }
    };
    let options = MatchOptions {
        require_literal_separator: true,
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut walker = WalkDir::new(directory)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if let Some(depth) = max_depth(&alternatives) {
        walker = walker.max_depth(depth);
    }

    walker
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(directory).ok()?;
            if !matchers
                .iter()
                .any(|matcher| matcher.matches_path_with(relative, options))
            {
                return None;
            }
            let prefix = to_prefix(&relative.to_string_lossy());
            Some((prefix, entry.path().to_string_lossy().into_owned()))
        })
        .collect()
}

/// Expands `{a,b}` groups into one pattern per alternative
///
/// Groups nest through recursion on the first group found. An unclosed `{`
/// is kept literally.
fn expand_braces(pattern: &str) -> Vec<String> {
    let open = match pattern.find('{') {
        Some(open) => open,
        None => return vec![pattern.to_string()],
    };
    let close = match pattern[open..].find('}') {
        Some(offset) => open + offset,
        None => return vec![pattern.to_string()],
    };

    let (head, body, tail) = (&pattern[..open], &pattern[open + 1..close], &pattern[close + 1..]);
    body.split(',')
        .flat_map(|alternative| expand_braces(&format!("{}{}{}", head, alternative, tail)))
        .collect()
}

/// Deepest directory level any alternative can reach, `None` when unbounded
fn max_depth(alternatives: &[String]) -> Option<usize> {
    if alternatives.iter().any(|alternative| alternative.contains("**")) {
        return None;
    }
    alternatives
        .iter()
        .map(|alternative| alternative.split('/').filter(|part| !part.is_empty()).count())
        .max()
}

/// Registration callback stored in a [`ModuleRegistry`]
pub type RegisterFn = dyn Fn(&mut BuildContext<'_>) -> Result<()> + Send + Sync;

/// In-process registration logic keyed by module path
///
/// Discovered files are looked up by their full path, so a directory scan
/// only needs the files to exist; their routes come from the callbacks.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<RegisterFn>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module (builder style)
    pub fn with_module<F>(mut self, source_ref: impl AsRef<Path>, register: F) -> Self
    where
        F: Fn(&mut BuildContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(source_ref, register);
        self
    }

    pub fn insert<F>(&mut self, source_ref: impl AsRef<Path>, register: F)
    where
        F: Fn(&mut BuildContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let key = source_ref.as_ref().to_string_lossy().into_owned();
        self.modules.insert(key, Arc::new(register));
    }

    pub fn contains(&self, source_ref: impl AsRef<Path>) -> bool {
        let key = source_ref.as_ref().to_string_lossy();
        self.modules.contains_key(&*key)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.modules.keys().collect();
        keys.sort();
        f.debug_struct("ModuleRegistry")
            .field("modules", &keys)
            .finish()
    }
}

impl ModuleSource for ModuleRegistry {
    fn register(&self, source_ref: &str, ctx: &mut BuildContext<'_>) -> Result<()> {
        match self.modules.get(source_ref) {
            Some(register) => register(ctx),
            None => {
                warn!(source = source_ref, "no registration logic for module, treating it as empty");
                Ok(())
            }
        }
    }
}

/// Declarative route file
///
/// ```toml
/// [[route]]
/// pattern = "/post/<int>"
/// handlers = ["show_post", "auth"]
///
/// [[expose]]
/// directory = "blog"
/// glob = "*.toml"
///
/// [[mount]]
/// prefix = "/admin"
/// source = "admin/index.toml"
/// ```
///
/// Relative directories and sources resolve against the file's own directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteDecl>,

    #[serde(default)]
    pub expose: Vec<ExposeDecl>,

    #[serde(default)]
    pub mount: Vec<MountDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDecl {
    pub pattern: String,
    pub handlers: Vec<String>,

    /// Match any continuation after the pattern
    #[serde(default)]
    pub wildcard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExposeDecl {
    #[serde(default = "default_directory")]
    pub directory: String,

    #[serde(default = "default_glob")]
    pub glob: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountDecl {
    pub prefix: String,
    pub source: String,
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_glob() -> String {
    DEFAULT_GLOB.to_string()
}

impl RouteManifest {
    pub fn parse(source_ref: &str, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RouteError::Manifest {
            source_ref: source_ref.to_string(),
            message: e.to_string(),
        })
    }

    /// Replays the declarations against `ctx`
    pub fn apply(&self, ctx: &mut BuildContext<'_>, base_dir: &Path) -> Result<()> {
        for decl in &self.routes {
            if decl.wildcard {
                ctx.route_wild(&decl.pattern, decl.handlers.iter().cloned())?;
            } else {
                ctx.route(&decl.pattern, decl.handlers.iter().cloned())?;
            }
        }
        for decl in &self.expose {
            ctx.expose(base_dir.join(&decl.directory), &decl.glob);
        }
        for decl in &self.mount {
            ctx.mount(&decl.prefix, base_dir.join(&decl.source));
        }
        Ok(())
    }
}

/// Reads [`RouteManifest`] files from disk
///
/// Missing or unreadable files produce an empty node; a readable file that
/// fails to parse fails the load.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestSource;

impl ManifestSource {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleSource for ManifestSource {
    fn register(&self, source_ref: &str, ctx: &mut BuildContext<'_>) -> Result<()> {
        let path = Path::new(source_ref);
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(source = source_ref, error = %e, "route file unreadable, treating it as empty");
                return Ok(());
            }
        };

        let manifest = RouteManifest::parse(source_ref, &content)?;
        manifest.apply(ctx, path.parent().unwrap_or_else(|| Path::new("")))
    }
}
