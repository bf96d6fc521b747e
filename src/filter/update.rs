use super::rules::{Cutoffs, RuleSet};
use super::{UpdateArgs, FILTER};
use crate::error::Result;
use crate::util::file::{open_reader, open_writer};
use crate::util::table::{Record, TableReader};

use anyhow::{self, Context};
use rayon::prelude::*;
use std::io::{BufRead, Write};

pub fn run(args: &UpdateArgs) -> anyhow::Result<()> {
    log::debug!("cutoffs: {:?}", args.cutoffs);

    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;

    let (nvar, npass) = update_filter(input, &args.cluster_column, &args.cutoffs, &mut out)
        .with_context(|| format!("failed to update filter column: {}", args.input))?;
    out.flush()?;

    log::info!("{} of {} variants pass every filter", npass, nvar);
    Ok(())
}

///
/// Write the composite filter of every record, overwriting an
/// existing `filter` column or appending a new one. Returns the
/// number of records and how many passed all rules.
///
pub fn update_filter<R: BufRead, W: Write + ?Sized>(
    input: R,
    cluster_column: &str,
    cutoffs: &Cutoffs,
    out: &mut W,
) -> anyhow::Result<(usize, usize)> {
    let reader = TableReader::new(input)?;
    let rules = RuleSet::new(reader.header(), cluster_column, cutoffs.clone())?;
    let (mut header, records) = reader.read_all()?;

    let filter_col = header.optional_column(FILTER);
    if filter_col.is_none() {
        header.push(FILTER);
    }
    header.write_to(out)?;

    let updated = records
        .into_par_iter()
        .map(|mut rec| -> Result<(Record, bool)> {
            let filt = rules.filter_string(&rec)?;
            let pass = !filt.contains(super::FAIL);
            match &filter_col {
                Some(col) => rec.set(col, &filt)?,
                None => rec.push(&filt),
            }
            Ok((rec, pass))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut npass = 0;
    for (rec, pass) in updated.iter() {
        rec.write_to(out)?;
        if *pass {
            npass += 1;
        }
    }
    Ok((updated.len(), npass))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const HEADER: &str = "id\tchr\tpos\tref\talt\tBaseQRankSum_p\tMapQRankSum_p\tReadPosRankSum_p\tstrand_bias_flag\tfdr.min.alt\taltdp\tmap_score\tsegdup_score\tLCR_flag\tcluster_10\tMAX_AF\tBIOTYPE\tSYMBOL\tExisting_variation\tcohort_AF\toutlier_flag";

    const ROWS: &str = "S1\tchr1\t100\tA\tT\t0.5\t0.5\t0.5\t0\t3\t10\t.\t.\tno\tFalse\t.\tprotein_coding\tTP53\t.\t.\tFALSE
S2\tchr1\t200\tG\tC\t0.01\t0.5\t.\t1\t3\t2\t0.8\t.\tyes\tTrue\t0.2\tlncRNA\tMUC16\trs99\t0.3\tTRUE
S3\tchr2\t300\tC\tA\t.\t.\t.\t0\t4\t4\t.\t.\tno\tFalse\tNA\tprotein_coding\tBRCA2\t.\t0.02\t.
";

    fn update(input: &str) -> (String, usize, usize) {
        let mut out = vec![];
        let (nvar, npass) =
            update_filter(Cursor::new(input), "cluster_10", &Cutoffs::default(), &mut out)
                .unwrap();
        (String::from_utf8(out).unwrap(), nvar, npass)
    }

    fn filters(output: &str) -> Vec<String> {
        output
            .lines()
            .skip(1)
            .map(|l| l.rsplit('\t').next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_append_filter_column() {
        let (output, nvar, npass) = update(&format!("{}\n{}", HEADER, ROWS));
        assert_eq!((nvar, npass), (3, 1));
        assert!(output.lines().next().unwrap().ends_with("\toutlier_flag\tfilter"));
        assert_eq!(
            filters(&output),
            [
                "PV4_PASS|SB_PASS|FDR_PASS|RR_PASS|VC_PASS|MAF_PASS|COD_PASS|MUC-HLA_PASS|dbSNP_PASS|CAF_PASS|OUT_PASS",
                "PV4_FAIL|SB_FAIL|FDR_FAIL|RR_FAIL|VC_FAIL|MAF_FAIL|COD_FAIL|MUC-HLA_FAIL|dbSNP_FAIL|CAF_FAIL|OUT_FAIL",
                "PV4_PASS|SB_PASS|FDR_PASS|RR_PASS|VC_PASS|MAF_PASS|COD_PASS|MUC-HLA_PASS|dbSNP_PASS|CAF_FAIL|OUT_PASS",
            ]
        );
    }

    #[test]
    fn test_existing_filter_overwritten_in_place() {
        let header = format!("filter\t{}", HEADER);
        let rows: String = ROWS.lines().map(|l| format!("stale\t{}\n", l)).collect();
        let (output, _, _) = update(&format!("{}\n{}", header, rows));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], header);
        assert!(lines[1].starts_with("PV4_PASS|"));
        assert!(lines[1].ends_with("\tFALSE"));
        assert!(!output.contains("stale"));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let (first, _, _) = update(&format!("{}\n{}", HEADER, ROWS));
        let (second, _, _) = update(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn test_row_order_preserved() {
        let many: String = (0..200)
            .map(|j| ROWS.lines().nth(j % 3).unwrap().replacen("S", &format!("S{}_", j), 1) + "\n")
            .collect();
        let (output, nvar, _) = update(&format!("{}\n{}", HEADER, many));
        assert_eq!(nvar, 200);
        for (j, line) in output.lines().skip(1).enumerate() {
            assert!(line.starts_with(&format!("S{}_", j)));
        }
    }
}
