mod bed_annotate;
mod cluster;
mod cohort;
mod error;
mod filter;
mod ranksum;
mod util;

use clap::{Parser, Subcommand};
use std::thread;

#[derive(Parser)]
#[command(version, about, long_about=None)]
#[command(propagate_version = true)]
///
/// varsift: annotate and filter tab-separated variant tables
///
struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// number of threads (default: all available cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append GATK rank-sum z-scores and normal-tail p-values
    Ranksum(ranksum::RankSumArgs),
    /// Append mappability, segdup and LCR columns from a BED intersection
    BedAnnotate(bed_annotate::BedAnnotateArgs),
    /// Flag variants with a neighbour in the same sample and chromosome
    Cluster(cluster::ClusterArgs),
    /// Count carriers per variant and estimate cohort allele frequency
    CohortAf(cohort::EstimateArgs),
    /// Join a cohort allele frequency table onto a variant table
    JoinAf(cohort::JoinArgs),
    /// Evaluate every filter rule and write the composite filter column
    UpdateFilter(filter::UpdateArgs),
    /// Keep only variants passing all filters
    PassOnly(filter::PassArgs),
    /// Count variants failing each filter rule
    FilterCount(filter::CountArgs),
}

/// main CLI for varsift
///
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let nthread_max = thread::available_parallelism()?.get();
    let nthread = match cli.threads {
        Some(x) => x.clamp(1, nthread_max),
        None => nthread_max,
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(nthread)
        .build_global()?;

    match &cli.commands {
        Commands::Ranksum(args) => {
            ranksum::run(args)?;
        }
        Commands::BedAnnotate(args) => {
            bed_annotate::run(args)?;
        }
        Commands::Cluster(args) => {
            cluster::run(args)?;
        }
        Commands::CohortAf(args) => {
            cohort::estimate::run(args)?;
        }
        Commands::JoinAf(args) => {
            cohort::join::run(args)?;
        }
        Commands::UpdateFilter(args) => {
            filter::update::run(args)?;
        }
        Commands::PassOnly(args) => {
            filter::pass::run(args)?;
        }
        Commands::FilterCount(args) => {
            filter::count::run(args)?;
        }
    }
    Ok(())
}
