pub mod demo;
pub mod generate;
pub mod reviews;

pub use demo::*;
pub use generate::*;
pub use reviews::*;

use crate::cli::args::{Args, Command};
use crate::config::Config;
use crate::models::{GeneratedReview, GenerationSource, PostReceipt};
use crate::pipeline::{PipelineReport, PlatformOutcome};

/// Dispatch the subcommand. Returns `false` when there was nothing to run.
pub async fn route_command(args: &Args, config: &Config) -> anyhow::Result<bool> {
    match &args.command {
        Some(Command::Demo(demo_args)) => handle_demo_command(demo_args, config).await.map(|_| true),
        Some(Command::Generate(generate_args)) => {
            handle_generate_command(generate_args, config).await.map(|_| true)
        }
        Some(Command::Reviews(reviews_args)) => {
            handle_reviews_command(reviews_args, config).await.map(|_| true)
        }
        Some(Command::Version) => {
            println!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn print_review(review: &GeneratedReview) {
    match &review.source {
        GenerationSource::Service { provider } => println!("\n📝 Generated Review ({}):", provider),
        GenerationSource::Fallback => println!("\n📝 Generated Review (template):"),
    }
    println!("{}", "-".repeat(40));
    println!("{}", review.text);
    println!("{}", "-".repeat(40));
}

pub(crate) fn print_outcome(outcome: &PlatformOutcome) {
    match &outcome.result {
        Ok(receipt) => {
            let reference = receipt.reference().unwrap_or_else(|| "N/A".to_string());
            match receipt {
                PostReceipt::Simulated(_) => {
                    println!("✅ {}: review simulated (ID: {})", outcome.platform, reference)
                }
                _ => println!("✅ {}: review posted ({})", outcome.platform, reference),
            }
        }
        Err(e) => println!("❌ {}: {}", outcome.platform, e),
    }
}

/// Print every outcome and return the platforms that failed.
pub(crate) fn print_outcomes(report: &PipelineReport) -> Vec<String> {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    report.failures().map(|o| o.platform.clone()).collect()
}

/// Print every outcome and fail when any platform did.
pub(crate) fn report_outcomes(report: &PipelineReport) -> anyhow::Result<()> {
    let failed = print_outcomes(report);
    if !failed.is_empty() {
        anyhow::bail!("Posting failed on: {}", failed.join(", "));
    }
    Ok(())
}
