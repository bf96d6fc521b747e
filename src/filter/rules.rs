use crate::error::Result;
use crate::util::misc::{is_missing, is_true_flag, paste};
use crate::util::table::{Column, Header, Record};

use clap::Args;

/// One pass/fail rule of the composite filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// rank-sum p-values (base quality, mapping quality, read position)
    Pv4,
    StrandBias,
    /// FDR-based minimum alt depth
    Fdr,
    /// mappability, segdup or low-complexity region
    RepeatRegion,
    VariantCluster,
    /// population allele frequency
    Maf,
    Coding,
    MucHla,
    DbSnp,
    CohortAf,
    Outlier,
}

impl Rule {
    /// Order of the tokens in the filter column
    pub const ALL: [Rule; 11] = [
        Rule::Pv4,
        Rule::StrandBias,
        Rule::Fdr,
        Rule::RepeatRegion,
        Rule::VariantCluster,
        Rule::Maf,
        Rule::Coding,
        Rule::MucHla,
        Rule::DbSnp,
        Rule::CohortAf,
        Rule::Outlier,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Rule::Pv4 => "PV4",
            Rule::StrandBias => "SB",
            Rule::Fdr => "FDR",
            Rule::RepeatRegion => "RR",
            Rule::VariantCluster => "VC",
            Rule::Maf => "MAF",
            Rule::Coding => "COD",
            Rule::MucHla => "MUC-HLA",
            Rule::DbSnp => "dbSNP",
            Rule::CohortAf => "CAF",
            Rule::Outlier => "OUT",
        }
    }

    /// `TAG_PASS` or `TAG_FAIL`
    pub fn token(&self, fail: bool) -> String {
        format!("{}_{}", self.tag(), if fail { "FAIL" } else { "PASS" })
    }
}

/// Thresholds of the numeric rules
#[derive(Args, Debug, Clone)]
pub struct Cutoffs {
    /// fail when BaseQRankSum_p is below this
    #[arg(long, default_value_t = 0.05)]
    pub pv4_bq: f64,

    /// fail when MapQRankSum_p is below this
    #[arg(long, default_value_t = 0.05)]
    pub pv4_mq: f64,

    /// fail when ReadPosRankSum_p is below this
    #[arg(long, default_value_t = 0.05)]
    pub pv4_rp: f64,

    /// fail when the population allele frequency is above this
    #[arg(long, default_value_t = 1e-4)]
    pub maf: f64,

    /// fail when the cohort allele frequency is at least this
    #[arg(long, default_value_t = 0.01)]
    pub caf: f64,
}

impl Default for Cutoffs {
    fn default() -> Self {
        Cutoffs {
            pv4_bq: 0.05,
            pv4_mq: 0.05,
            pv4_rp: 0.05,
            maf: 1e-4,
            caf: 0.01,
        }
    }
}

/// Every column the rules read, resolved once from the header
#[derive(Debug, Clone)]
struct RuleColumns {
    bq_p: Column,
    mq_p: Column,
    rp_p: Column,
    strand_bias: Column,
    fdr_min_alt: Column,
    alt_depth: Column,
    map_score: Column,
    segdup_score: Column,
    lcr_flag: Column,
    cluster: Column,
    max_af: Column,
    biotype: Column,
    symbol: Column,
    existing_variation: Column,
    cohort_af: Column,
    outlier: Column,
}

impl RuleColumns {
    fn from_header(header: &Header, cluster_column: &str) -> Result<Self> {
        Ok(RuleColumns {
            bq_p: header.column("BaseQRankSum_p")?,
            mq_p: header.column("MapQRankSum_p")?,
            rp_p: header.column("ReadPosRankSum_p")?,
            strand_bias: header.column("strand_bias_flag")?,
            fdr_min_alt: header.column("fdr.min.alt")?,
            alt_depth: header.column("altdp")?,
            map_score: header.column("map_score")?,
            segdup_score: header.column("segdup_score")?,
            lcr_flag: header.column("LCR_flag")?,
            cluster: header.column(cluster_column)?,
            max_af: header.column("MAX_AF")?,
            biotype: header.column("BIOTYPE")?,
            symbol: header.column("SYMBOL")?,
            existing_variation: header.column("Existing_variation")?,
            cohort_af: header.column("cohort_AF")?,
            outlier: header.column("outlier_flag")?,
        })
    }
}

/// The composite filter evaluated against one table
#[derive(Debug, Clone)]
pub struct RuleSet {
    cols: RuleColumns,
    cutoffs: Cutoffs,
}

impl RuleSet {
    pub fn new(header: &Header, cluster_column: &str, cutoffs: Cutoffs) -> Result<Self> {
        Ok(RuleSet {
            cols: RuleColumns::from_header(header, cluster_column)?,
            cutoffs,
        })
    }

    /// Whether each rule fails, in [`Rule::ALL`] order
    pub fn evaluate(&self, rec: &Record) -> Result<[bool; 11]> {
        let mut ret = [false; 11];
        for (j, rule) in Rule::ALL.iter().enumerate() {
            ret[j] = self.fails(*rule, rec)?;
        }
        Ok(ret)
    }

    /// Pipe-joined `TAG_STATUS` tokens
    pub fn filter_string(&self, rec: &Record) -> Result<Box<str>> {
        let tokens: Vec<String> = Rule::ALL
            .iter()
            .zip(self.evaluate(rec)?)
            .map(|(rule, fail)| rule.token(fail))
            .collect();
        Ok(paste(&tokens, "|"))
    }

    fn fails(&self, rule: Rule, rec: &Record) -> Result<bool> {
        let cols = &self.cols;
        let cutoffs = &self.cutoffs;

        let fail = match rule {
            Rule::Pv4 => {
                p_value_below(rec, &cols.bq_p, cutoffs.pv4_bq)?
                    || p_value_below(rec, &cols.mq_p, cutoffs.pv4_mq)?
                    || p_value_below(rec, &cols.rp_p, cutoffs.pv4_rp)?
            }
            Rule::StrandBias => rec.get(&cols.strand_bias)? == "1",
            Rule::Fdr => rec.get_f64(&cols.alt_depth)? < rec.get_f64(&cols.fdr_min_alt)?,
            Rule::RepeatRegion => {
                !is_missing(rec.get(&cols.map_score)?)
                    || !is_missing(rec.get(&cols.segdup_score)?)
                    || rec.get(&cols.lcr_flag)? != "no"
            }
            Rule::VariantCluster => is_true_flag(rec.get(&cols.cluster)?),
            Rule::Maf => frequency_or_zero(rec, &cols.max_af)? > cutoffs.maf,
            Rule::Coding => rec.get(&cols.biotype)? != "protein_coding",
            Rule::MucHla => {
                let gene = rec.get(&cols.symbol)?;
                gene.starts_with("MUC") || gene.starts_with("HLA")
            }
            Rule::DbSnp => rec.get(&cols.existing_variation)?.starts_with("rs"),
            Rule::CohortAf => frequency_or_zero(rec, &cols.cohort_af)? >= cutoffs.caf,
            // `.` reads as FALSE
            Rule::Outlier => rec.get(&cols.outlier)? == "TRUE",
        };
        Ok(fail)
    }
}

/// A missing p-value carries no evidence against the variant
fn p_value_below(rec: &Record, col: &Column, cutoff: f64) -> Result<bool> {
    if is_missing(rec.get(col)?) {
        return Ok(false);
    }
    Ok(rec.get_f64(col)? < cutoff)
}

/// Allele frequencies default to zero when not reported
fn frequency_or_zero(rec: &Record, col: &Column) -> Result<f64> {
    if is_missing(rec.get(col)?) {
        return Ok(0.0);
    }
    rec.get_f64(col)
}
