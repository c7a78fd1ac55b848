use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Default)]
#[command(
    name = "review-agent",
    version,
    about = "Turn a short description of a visit into a business review and post it",
    long_about = "review-agent writes a natural-sounding review from a brief description of your experience, using OpenAI or a local Ollama model (or a built-in template when neither is available), then posts it to one or more review platforms."
)]
pub struct Args {
    /// Text generation backend (openai, ollama or none)
    #[arg(short = 'P', long, global = true)]
    pub provider: Option<String>,

    /// Model to request from the provider
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Log level written to stderr (error, warn, info, debug, trace)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run two sample reviews through the mock platforms and the local directory
    Demo(DemoArgs),

    /// Generate a review and post it
    Generate(GenerateArgs),

    /// List reviews stored by the mock platform, newest first
    Reviews(ReviewsArgs),

    /// Print the version
    Version,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct DemoArgs {
    /// Directory for mock platform reviews
    #[arg(long = "reviews-dir", value_name = "DIR")]
    pub reviews_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Name of the business
    #[arg(short, long)]
    pub business: String,

    /// What happened during the visit
    #[arg(short, long)]
    pub experience: String,

    /// Star rating from 1 to 5
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: u8,

    /// Where the business is
    #[arg(short, long)]
    pub location: Option<String>,

    /// Date of the visit
    #[arg(short, long)]
    pub date: Option<String>,

    /// Print the review without posting it
    #[arg(long = "no-post", default_value_t = false)]
    pub no_post: bool,

    /// Directory for mock platform reviews
    #[arg(long = "reviews-dir", value_name = "DIR")]
    pub reviews_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ReviewsArgs {
    /// Only show reviews for this business id
    #[arg(short, long)]
    pub business: Option<String>,

    /// Directory for mock platform reviews
    #[arg(long = "reviews-dir", value_name = "DIR")]
    pub reviews_dir: Option<PathBuf>,
}
