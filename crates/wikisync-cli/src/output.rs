//! Colored terminal output

use std::path::Path;

use colored::Colorize;
use wikisync_core::gate::{SectionKind, preview_sections};
use wikisync_core::{RunLedger, SyncPlan, SyncResult};

/// Print the three plan sections.
pub fn print_preview(plan: &SyncPlan) {
    println!(
        "{} Sync under {} ({})",
        "=>".blue().bold(),
        plan.root_title.cyan(),
        plan.root_id.to_string().dimmed()
    );

    for section in preview_sections(plan) {
        println!();
        let heading = format!("{} ({}):", section.heading, section.rows.len());
        let (marker, heading) = match section.kind {
            SectionKind::Creates => ("+".green(), heading.green().bold()),
            SectionKind::Updates => ("~".yellow(), heading.yellow().bold()),
            SectionKind::Deletes => ("-".red(), heading.red().bold()),
        };
        println!("{heading}");
        if section.rows.is_empty() {
            println!("   {}", "(none)".dimmed());
        }
        for row in &section.rows {
            let mut line = format!("   {marker} {}  {}", row.title, row.path.dimmed());
            if let Some(id) = &row.remote_id {
                line.push_str(&format!("  {}", format!("id={id}").dimmed()));
            }
            if !row.reasons.is_empty() {
                line.push_str(&format!("  ({})", row.reasons.join(", ")));
            }
            println!("{line}");
            if let Some(previous) = &row.previous_title {
                println!("       title: \"{previous}\" -> \"{}\"", row.title);
            }
        }
    }
    println!();
}

/// Print the counts of a finished or dry run.
pub fn print_result(result: &SyncResult) {
    let summary = format!(
        "{} created, {} updated, {} deleted, {} unchanged",
        result.created, result.updated, result.deleted, result.skipped
    );
    if result.dry_run {
        println!("{} Dry run: {summary}", "PLAN".cyan().bold());
    } else if result.changes() == 0 && result.is_clean() {
        println!("{} Already synchronized. No changes needed.", "OK".green().bold());
    } else if result.is_clean() {
        println!("{} Sync complete: {summary}", "OK".green().bold());
    } else {
        println!("{} Sync finished with errors: {summary}", "WARN".yellow().bold());
        for error in &result.errors {
            println!("   {} {error}", "!".yellow());
        }
    }
    if let Some(path) = &result.ledger_path {
        println!("   Run ledger: {}", path.display().to_string().dimmed());
    }
}

/// Print previous runs, newest first.
pub fn print_history(dir: &Path, ledgers: &[(std::path::PathBuf, RunLedger)]) {
    if ledgers.is_empty() {
        println!("No runs recorded in {}", dir.display());
        return;
    }
    println!("{} Runs recorded in {}", "=>".blue().bold(), dir.display());
    for (path, ledger) in ledgers {
        println!();
        println!(
            "{}  {} ({})  {} page(s)",
            ledger.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string().bold(),
            ledger.root_page_title.cyan(),
            ledger.root_page_id,
            ledger.created_pages.len()
        );
        println!("   {}", path.display().to_string().dimmed());
        for page in &ledger.created_pages {
            println!("   {} {} {}", "+".green(), page.title, format!("id={}", page.page_id).dimmed());
        }
    }
}
