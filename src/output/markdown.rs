//! Markdown report generation
//!
//! This module generates a human-readable report of a discovery run: the
//! competitors found, their product catalogs, and the businesses that were
//! skipped or failed.

use crate::crawler::DiscoveryOutcome;
use crate::model::{Competitor, ProductCategory};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run metadata printed in the report header
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: DateTime<Utc>,
    pub config_hash: Option<String>,
}

impl ReportMeta {
    pub fn now(config_hash: Option<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            config_hash,
        }
    }
}

/// Writes the markdown report for a discovery run
///
/// # Arguments
///
/// * `outcome` - The discovery outcome
/// * `meta` - Run metadata for the header
/// * `output_path` - Path where the markdown file should be written
pub fn write_report(
    outcome: &DiscoveryOutcome,
    meta: &ReportMeta,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(outcome, meta);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a discovery outcome as markdown
pub fn format_markdown_report(outcome: &DiscoveryOutcome, meta: &ReportMeta) -> String {
    let result = &outcome.result;
    let mut md = String::new();

    md.push_str(&format!("# Competitors in {}\n\n", result.location));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        meta.generated_at.to_rfc3339()
    ));
    if let Some(hash) = &meta.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if outcome.cancelled {
        md.push_str("- **Status**: cancelled (partial results)\n");
    }
    md.push('\n');

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Candidates**: {}\n", outcome.candidates));
    md.push_str(&format!("- **Competitors**: {}\n", result.total_found));
    md.push_str(&format!("- **Products**: {}\n", result.product_count()));
    md.push_str(&format!("- **Skipped (no website)**: {}\n", outcome.skipped.len()));
    md.push_str(&format!("- **Failures**: {}\n\n", outcome.failures.len()));

    if result.product_count() > 0 {
        md.push_str("## Products by Category\n\n");
        md.push_str("| Category | Products |\n");
        md.push_str("|----------|----------|\n");
        for category in ProductCategory::all() {
            let count = result
                .competitors
                .iter()
                .flat_map(|c| &c.products)
                .filter(|p| p.category == category)
                .count();
            if count > 0 {
                md.push_str(&format!("| {} | {} |\n", category, count));
            }
        }
        md.push('\n');
    }

    let mut competitors: Vec<&Competitor> = result.competitors.iter().collect();
    competitors.sort_by(|a, b| a.name.cmp(&b.name));

    for competitor in competitors {
        md.push_str(&format!("## {}\n\n", competitor.name));
        md.push_str(&format!("Website: {}\n\n", competitor.website));
        md.push_str("| Product | Category | Price | URL |\n");
        md.push_str("|---------|----------|-------|-----|\n");
        for product in &competitor.products {
            md.push_str(&format!(
                "| {} | {} | ${:.2} | {} |\n",
                escape_cell(&product.name),
                product.category,
                product.price,
                product.url
            ));
        }
        md.push('\n');
    }

    if !outcome.skipped.is_empty() {
        md.push_str("## Skipped Businesses\n\n");
        for name in &outcome.skipped {
            md.push_str(&format!("- {}\n", name));
        }
        md.push('\n');
    }

    if !outcome.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| Business | Kind | Message |\n");
        md.push_str("|----------|------|---------|\n");
        for failure in &outcome.failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&failure.business),
                failure.kind,
                escape_cell(&failure.message)
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
