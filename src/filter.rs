pub mod count;
pub mod pass;
pub mod rules;
pub mod update;

use clap::Args;

/// Composite filter column shared by every filter step
pub const FILTER: &str = "filter";
pub const FAIL: &str = "FAIL";

#[derive(Args)]
pub struct UpdateArgs {
    /// input tab-separated variants file with all annotation columns
    #[arg(short, long)]
    input: Box<str>,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,

    /// cluster flag column written by `cluster`
    #[arg(long, default_value = "cluster_10")]
    cluster_column: Box<str>,

    #[command(flatten)]
    cutoffs: rules::Cutoffs,
}

#[derive(Args)]
pub struct PassArgs {
    /// input tab-separated variants file with a filter column
    #[arg(short, long)]
    input: Box<str>,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,
}

#[derive(Args)]
pub struct CountArgs {
    /// input tab-separated variants file with a filter column
    #[arg(short, long)]
    input: Box<str>,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,
}
