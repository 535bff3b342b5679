//! Progress display and the end-of-build summary.

use facet_core::BuildReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Progress bar over the discovered sources.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print the summary table and every failure to stderr.
pub fn print_summary(report: &BuildReport, registry: &Path) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("             Build Summary");
    eprintln!("  ====================================");
    eprintln!("    Sources:      {:>8}", report.images_discovered);
    eprintln!("    Manifests:    {:>8}", report.manifests.len());
    if report.failed_images() > 0 {
        eprintln!("    Failed:       {:>8}", report.failed_images());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Written:      {:>8}", report.variants_written);
    eprintln!("    Reused:       {:>8}", report.variants_reused);
    if report.failed_variants() > 0 {
        eprintln!("    Dropped:      {:>8}", report.failed_variants());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", report.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", report.images_per_second());
    eprintln!("  ====================================");
    if !report.manifests.is_empty() {
        eprintln!("    Registry: {}", registry.display());
    }

    if !report.is_clean() {
        eprintln!();
        for failure in &report.failures {
            eprintln!("    ✗ {}", failure);
        }
    }
}
