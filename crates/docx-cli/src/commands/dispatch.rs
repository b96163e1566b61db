use anyhow::{Context, Result};
use docx_router::Router;
use std::process::ExitCode;
use tracing::info;

/// Prints one JSON line per path; fails with exit code 1 if any path is unmatched
pub fn execute(router: &Router, paths: &[String]) -> Result<ExitCode> {
    let mut unmatched = 0usize;

    for path in paths {
        let result = router
            .dispatch(path)
            .with_context(|| format!("Failed to dispatch {}", path))?;

        match result {
            Some(hit) => {
                info!(path = %path, handler = hit.handler(), "matched");
                println!("{}", serde_json::to_string(&hit)?);
            }
            None => {
                unmatched += 1;
                println!("{}", serde_json::json!({ "path": path, "match": null }));
            }
        }
    }

    Ok(if unmatched == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
