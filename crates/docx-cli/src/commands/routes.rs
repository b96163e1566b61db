use anyhow::{Context, Result};
use colored::Colorize;
use docx_router::Router;
use std::process::ExitCode;

pub fn execute(router: &Router) -> Result<ExitCode> {
    let listing = router.load_all().context("Failed to load route files")?;

    if listing.is_empty() {
        println!("{}", "No routes registered".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    for item in &listing {
        let uri = format!("{}{}", item.prefix, item.pattern);
        let uri = if uri.is_empty() { "/" } else { uri.as_str() };
        let handler = item.handlers.first().map(String::as_str).unwrap_or_default();
        let filters = item.handlers.get(1..).unwrap_or_default().join(", ");

        println!("{}  {}  {}", uri.cyan().bold(), handler.green(), filters.as_str().dimmed());
    }

    println!();
    println!("{} routes", listing.len());
    Ok(ExitCode::SUCCESS)
}
