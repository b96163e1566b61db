/// Path utilities for request normalization and prefix derivation
///
/// All functions are **pure**: given same input, always produce same output with no side effects.
use std::borrow::Cow;

/// Normalizes a request path for matching
///
/// Lowercases the path, strips every trailing `/` and appends exactly one.
/// Compiled patterns accept an optional trailing slash, so matching behaves
/// the same whether or not the caller supplied one.
///
/// Returns `Cow::Borrowed` when the input is already in normalized form.
///
/// # Examples
///
/// ```
/// use docx_router::path::normalize_request_path;
///
/// assert_eq!(normalize_request_path("/Post/42"), "/post/42/");
/// assert_eq!(normalize_request_path("/post/42///"), "/post/42/");
/// assert_eq!(normalize_request_path(""), "/");
/// ```
pub fn normalize_request_path(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim_end_matches('/');

    // Fast path: already lowercase with a single trailing slash
    if trimmed.len() + 1 == path.len() && path.chars().all(|c| c.to_lowercase().eq([c])) {
        return Cow::Borrowed(path);
    }

    Cow::Owned(format!("{}/", trimmed.to_lowercase()))
}

/// Lowercases and strips trailing slashes, the canonical form of prefixes and raw patterns
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.to_lowercase().trim_end_matches('/').to_string()
}

/// Computes the routing prefix of a route file relative to its scanned directory
///
/// The extension is everything from the first `.` of the file name, so
/// `blog.routes.toml` and `blog.toml` both map to `/blog`. Backslashes become
/// `/`, the result is lowercased and trailing slashes are removed.
///
/// # Examples
///
/// ```
/// use docx_router::path::to_prefix;
///
/// assert_eq!(to_prefix("blog.toml"), "/blog");
/// assert_eq!(to_prefix("blog/Tag.toml"), "/blog/tag");
/// assert_eq!(to_prefix("\\admin\\users.toml"), "/admin/users");
/// ```
pub fn to_prefix(relative: &str) -> String {
    let relative = relative.trim_start_matches(['/', '\\']);
    let basename_start = relative.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let stem_end = relative[basename_start..]
        .find('.')
        .map(|dot| basename_start + dot)
        .unwrap_or(relative.len());

    let prefix = format!("/{}", &relative[..stem_end]).replace('\\', "/");
    normalize_prefix(&prefix)
}
