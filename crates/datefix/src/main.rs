use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use datefix_core::config::load_config;
use datefix_core::pattern::DailyLinkPattern;
use datefix_core::rewrite::{RewriteOptions, rewrite_graph};
use datefix_core::runtime::{
    GraphOverrides, ResolutionContext, inspect_graph, normalize_for_display, resolve_graph,
};

#[derive(Debug, Parser)]
#[command(
    name = "datefix",
    version,
    about = "Rewrite zero-padded daily note links to Roam-style ordinal dates"
)]
struct Cli {
    #[arg(long, value_name = "PATH", help = "Path to the Logseq db to fix")]
    db: PathBuf,
    #[arg(long, help = "Do a dry run (do not actually modify any files)")]
    dry: bool,
    #[arg(long, value_name = "PATH", help = "Config file override")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = GraphOverrides {
        db: cli.db.clone(),
        config: cli.config.clone(),
    };
    let paths = resolve_graph(&context, &overrides)?;
    let config = load_config(&paths.config_path)?;
    let pattern = DailyLinkPattern::new(&config.dates.allowed_years)?;

    println!("Fixing the db at {}", normalize_for_display(&paths.graph_root));
    if cli.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }

    let status = inspect_graph(&paths);
    if !status.warnings.is_empty() {
        println!("warnings:");
        for warning in &status.warnings {
            println!("  - {warning}");
        }
    }

    let report = rewrite_graph(&paths, &pattern, &RewriteOptions { dry_run: cli.dry })?;

    if cli.dry {
        println!("Would update the following file lines:");
        for change in &report.changes {
            println!("  => {}: {}", change.relative_path, change.new_line);
        }
    }
    println!("files_scanned: {}", report.files_scanned);
    println!("files_changed: {}", report.files_changed);
    println!("lines_changed: {}", report.lines_changed);
    println!("\nDone.");

    Ok(())
}
