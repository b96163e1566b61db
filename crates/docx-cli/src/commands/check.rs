use anyhow::Result;
use colored::Colorize;
use docx_router::Router;
use std::process::ExitCode;

pub fn execute(router: &Router) -> Result<ExitCode> {
    match router.load_all() {
        Ok(listing) => {
            println!("{} {} routes loaded", "✓".green().bold(), listing.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
