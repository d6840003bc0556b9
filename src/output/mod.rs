//! Output module for discovery reports
//!
//! This module handles:
//! - Generating the markdown report of a discovery run
//! - Printing a short run summary to the terminal

mod markdown;

pub use markdown::{format_markdown_report, write_report, ReportMeta};

use crate::crawler::DiscoveryOutcome;

/// Prints a short summary of a discovery run to stdout
pub fn print_summary(outcome: &DiscoveryOutcome) {
    let result = &outcome.result;

    println!("\n=== Discovery Summary: {} ===", result.location);
    println!("Candidates:   {}", outcome.candidates);
    println!("Competitors:  {}", result.total_found);
    println!("Products:     {}", result.product_count());
    println!("Skipped:      {}", outcome.skipped.len());
    println!("Failures:     {}", outcome.failures.len());
    if outcome.cancelled {
        println!("Status:       cancelled (partial results)");
    }

    for competitor in &result.competitors {
        println!(
            "  - {} ({} products) {}",
            competitor.name,
            competitor.products.len(),
            competitor.website
        );
    }
}
