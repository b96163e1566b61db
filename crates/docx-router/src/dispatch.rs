/// Greedy dispatch over a router tree
///
/// Dispatch runs in two phases per node:
///
/// 1. **Delegation.** Child prefixes are tried most specific first. The first
///    prefix the path starts with wins: the child is loaded if needed and the
///    residual path is dispatched there. That choice is final, even when the
///    child ends up matching nothing.
/// 2. **Item matching.** Only when no child prefix matched, the node's own
///    route items are tried most specific first; the first match wins.
///
/// There is no backtracking at either commit point.
use crate::error::Result;
use crate::loader::Loader;
use crate::node::RouterNode;
use crate::path::normalize_request_path;
use serde::Serialize;
use tracing::trace;

/// Outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// Primary handler followed by its filters
    pub handlers: Vec<String>,
    /// Captured groups in pattern order, without the full match
    pub args: Vec<String>,
    /// Rule key of the winning route item
    pub rule: String,
    /// Residual path handed to the node that matched
    pub path: String,
    /// Ancestor prefixes joined with the consumed part of the path
    pub uri: String,
}

impl DispatchResult {
    pub fn handler(&self) -> &str {
        self.handlers.first().map(String::as_str).unwrap_or_default()
    }

    pub fn filters(&self) -> &[String] {
        self.handlers.get(1..).unwrap_or_default()
    }
}

/// Dispatches `path` starting at `node`
pub(crate) fn dispatch_node(
    loader: &Loader<'_>,
    node: &RouterNode,
    path: &str,
) -> Result<Option<DispatchResult>> {
    let path = normalize_request_path(path);

    if let Some(child) = node
        .children()
        .iter()
        .find(|child| path.starts_with(child.prefix()))
    {
        trace!(
            node = node.prefix(),
            child = child.prefix(),
            path = %path,
            "delegating to child"
        );
        let child_node = child.resolve(loader, node.prefix())?;
        return dispatch_node(loader, &child_node, &path[child.prefix().len()..]);
    }

    let matched = node.routes().iter().find_map(|entry| {
        entry
            .pattern()
            .captures(&path)
            .map(|(consumed, args)| (entry, consumed, args))
    });

    Ok(matched.map(|(entry, consumed, args)| {
        trace!(node = node.prefix(), rule = entry.rule(), path = %path, "matched route");
        DispatchResult {
            handlers: entry.handlers().to_vec(),
            args,
            rule: entry.rule().to_string(),
            path: path.to_string(),
            uri: join_uri(node.prefix(), consumed),
        }
    }))
}

/// Joins a node prefix with the consumed path, without a trailing slash
fn join_uri(prefix: &str, consumed: &str) -> String {
    let uri = format!("{}{}", prefix, consumed);
    let uri = uri.trim_end_matches('/');
    if uri.is_empty() {
        "/".to_string()
    } else {
        uri.to_string()
    }
}
