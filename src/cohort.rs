pub mod estimate;
pub mod join;

use clap::Args;

/// Header of the carrier count table shared by both steps
pub const VAR_ID: &str = "var_id";
pub const N_CARRIERS: &str = "n_carriers";
pub const COHORT_FREQ: &str = "cohort_allele_frequency";

#[derive(Args)]
pub struct EstimateArgs {
    /// input tab-separated variants file (chr, pos, ref, alt columns)
    #[arg(short, long)]
    input: Box<str>,

    /// number of samples in the cohort
    #[arg(short = 'n', long)]
    cohort_size: u64,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,

    /// write each variant once instead of once per input record
    #[arg(long, default_value_t = false)]
    unique: bool,
}

#[derive(Args)]
pub struct JoinArgs {
    /// input tab-separated variants file (chr, pos, ref, alt columns)
    #[arg(short, long)]
    input: Box<str>,

    /// cohort allele frequency table from `cohort-af`
    #[arg(short, long)]
    cohort_af: Box<str>,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,
}
