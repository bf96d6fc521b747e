use crate::error::Result;
use crate::util::file::{open_reader, open_writer};
use crate::util::misc::{is_missing, MISSING};
use crate::util::table::{Column, Record, TableReader};

use anyhow::{self, Context};
use clap::Args;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::HashMap;
use std::io::{BufRead, Write};

#[derive(Args)]
pub struct RankSumArgs {
    /// input tab-separated variants file with an INFO column
    #[arg(short, long)]
    input: Box<str>,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,
}

/// (INFO key, z column, p column) in output order
const RANK_SUMS: [(&str, &str, &str); 3] = [
    ("BaseQRankSum", "BaseQRankSum_z", "BaseQRankSum_p"),
    ("MQRankSum", "MapQRankSum_z", "MapQRankSum_p"),
    ("ReadPosRankSum", "ReadPosRankSum_z", "ReadPosRankSum_p"),
];

pub fn run(args: &RankSumArgs) -> anyhow::Result<()> {
    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;

    let nvar = annotate_rank_sums(input, &mut out)
        .with_context(|| format!("failed to annotate rank sums: {}", args.input))?;
    out.flush()?;

    log::info!("annotated rank-sum p-values for {} variants", nvar);
    Ok(())
}

/// Append the three z-scores and their standard normal CDF values
/// to every record. Returns the number of records written.
pub fn annotate_rank_sums<R: BufRead, W: Write + ?Sized>(
    input: R,
    out: &mut W,
) -> anyhow::Result<usize> {
    let reader = TableReader::new(input)?;
    let info = reader.header().column("INFO")?;
    let (mut header, records) = reader.read_all()?;

    for (_, z_col, _) in RANK_SUMS {
        header.push(z_col);
    }
    for (_, _, p_col) in RANK_SUMS {
        header.push(p_col);
    }
    header.write_to(out)?;

    let normal = Normal::new(0.0, 1.0)?;

    let annotated = records
        .into_par_iter()
        .map(|mut rec| -> Result<Record> {
            let (z_scores, p_values) = rank_sum_p_values(&rec, &info, &normal)?;
            for z in z_scores.iter() {
                rec.push(z);
            }
            for p in p_values.iter() {
                rec.push(p);
            }
            Ok(rec)
        })
        .collect::<Result<Vec<_>>>()?;

    for rec in annotated.iter() {
        rec.write_to(out)?;
    }
    Ok(annotated.len())
}

/// `key=value` pairs of an INFO field; flags without `=` are dropped
fn parse_info(info: &str) -> HashMap<&str, &str> {
    info.split(';').filter_map(|kv| kv.split_once('=')).collect()
}

/// z-scores as written in INFO (`.` when absent) and their one-sided
/// p-values (`.` when the z-score is missing)
fn rank_sum_p_values(
    rec: &Record,
    info_col: &Column,
    normal: &Normal,
) -> Result<([Box<str>; 3], [Box<str>; 3])> {
    let info = parse_info(rec.get(info_col)?);

    let mut z_scores: [Box<str>; 3] = Default::default();
    let mut p_values: [Box<str>; 3] = Default::default();

    for (j, (key, _, _)) in RANK_SUMS.iter().enumerate() {
        let z = info.get(key).copied().unwrap_or(MISSING);
        p_values[j] = if is_missing(z) {
            MISSING.into()
        } else {
            let zval = fast_float::parse::<f64, _>(z.trim())
                .map_err(|_| rec.parse_error(info_col, z, "a rank-sum z-score"))?;
            format!("{}", normal.cdf(zval)).into_boxed_str()
        };
        z_scores[j] = z.into();
    }
    Ok((z_scores, p_values))
}
