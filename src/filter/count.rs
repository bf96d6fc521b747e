use super::{CountArgs, FAIL, FILTER};
use crate::error::Result;
use crate::util::file::{open_reader, open_writer};
use crate::util::misc::is_missing;
use crate::util::table::{Column, Record, TableReader};

use anyhow::{self, Context};
use std::io::{BufRead, Write};

/// Tags reported, in report order. IGV comes from manual review
/// upstream and is never written by `update-filter`.
const REPORT_TAGS: [&str; 12] = [
    "PV4", "SB", "FDR", "RR", "VC", "MAF", "COD", "MUC-HLA", "CAF", "IGV", "dbSNP", "OUT",
];

pub fn run(args: &CountArgs) -> anyhow::Result<()> {
    let input = open_reader(&args.input)?;
    let counts = count_filters(input)
        .with_context(|| format!("failed to count filters: {}", args.input))?;

    let mut out = open_writer(args.output.as_deref())?;
    write!(out, "{}", counts)?;
    out.flush()?;

    log::info!(
        "{} of {} variants pass every filter",
        counts.pass_all,
        counts.total
    );
    Ok(())
}

/// Per-tag failure tallies over a filtered table
#[derive(Debug)]
pub struct FilterCounts {
    total: usize,
    pass_all: usize,
    fails: [usize; 12],
}

impl FilterCounts {
    fn new() -> Self {
        FilterCounts {
            total: 0,
            pass_all: 0,
            fails: [0; 12],
        }
    }

    fn push(&mut self, rec: &Record, filter_col: &Column) -> Result<()> {
        let filt = rec.get(filter_col)?;
        self.total += 1;

        // a tag repeated within one record counts once, last status wins
        let mut failed: [Option<bool>; 12] = [None; 12];
        if !is_missing(filt) {
            for token in filt.split('|') {
                let (tag, status) = token
                    .split_once('_')
                    .ok_or_else(|| rec.malformed(filter_col, token))?;
                let j = REPORT_TAGS
                    .iter()
                    .position(|x| *x == tag)
                    .ok_or_else(|| rec.malformed(filter_col, token))?;
                failed[j] = Some(status == FAIL);
            }
        }
        for (n, fail) in self.fails.iter_mut().zip(failed) {
            if fail == Some(true) {
                *n += 1;
            }
        }

        if !filt.contains(FAIL) {
            self.pass_all += 1;
        }
        Ok(())
    }
}

impl std::fmt::Display for FilterCounts {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(fmt, "TOTAL: {}", self.total)?;
        for (tag, n) in REPORT_TAGS.iter().zip(self.fails.iter()) {
            writeln!(fmt, "#  {} : {}", tag, n)?;
        }
        writeln!(fmt, "PASSING ALL FILTERS: {}", self.pass_all)
    }
}

/// Tally failures per tag and records passing everything
pub fn count_filters<R: BufRead>(input: R) -> anyhow::Result<FilterCounts> {
    let reader = TableReader::new(input)?;
    let filter_col = reader.header().column(FILTER)?;

    let mut counts = FilterCounts::new();
    for rec in reader {
        counts.push(&rec?, &filter_col)?;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    impl FilterCounts {
        fn fail_count(&self, tag: &str) -> Option<usize> {
            REPORT_TAGS
                .iter()
                .position(|x| *x == tag)
                .map(|j| self.fails[j])
        }
    }

    const FILTERED: &str = "id\tfilter
S1\tPV4_PASS|SB_PASS|MUC-HLA_PASS|CAF_PASS
S2\tPV4_FAIL|SB_PASS|MUC-HLA_FAIL|CAF_PASS
S3\tPV4_FAIL|SB_FAIL|MUC-HLA_PASS|CAF_PASS|IGV_FAIL
";

    #[test]
    fn test_counts() {
        let counts = count_filters(Cursor::new(FILTERED)).unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pass_all, 1);
        assert_eq!(counts.fail_count("PV4"), Some(2));
        assert_eq!(counts.fail_count("SB"), Some(1));
        assert_eq!(counts.fail_count("MUC-HLA"), Some(1));
        assert_eq!(counts.fail_count("IGV"), Some(1));
        assert_eq!(counts.fail_count("CAF"), Some(0));
        assert_eq!(counts.fail_count("XYZ"), None);
    }

    #[test]
    fn test_report_format() {
        let counts = count_filters(Cursor::new(FILTERED)).unwrap();
        assert_eq!(
            counts.to_string(),
            "TOTAL: 3
#  PV4 : 2
#  SB : 1
#  FDR : 0
#  RR : 0
#  VC : 0
#  MAF : 0
#  COD : 0
#  MUC-HLA : 1
#  CAF : 0
#  IGV : 1
#  dbSNP : 0
#  OUT : 0
PASSING ALL FILTERS: 1
"
        );
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let err = count_filters(Cursor::new("id\tfilter\nS1\tPV4_PASS|XX_FAIL\n")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: malformed entry `XX_FAIL` in column `filter`"
        );
    }

    #[test]
    fn test_token_without_status_is_fatal() {
        assert!(count_filters(Cursor::new("id\tfilter\nS1\tPV4\n")).is_err());
    }

    #[test]
    fn test_empty_filter_counts_as_passing() {
        let counts = count_filters(Cursor::new("id\tfilter\nS1\t.\n")).unwrap();
        assert_eq!((counts.total, counts.pass_all), (1, 1));
    }

    #[test]
    fn test_repeated_tag_counts_once() {
        let input = "id\tfilter
S1\tPV4_FAIL|PV4_FAIL|SB_PASS
S2\tSB_FAIL|SB_PASS
S3\tRR_PASS|RR_FAIL
";
        let counts = count_filters(Cursor::new(input)).unwrap();
        assert_eq!(counts.fail_count("PV4"), Some(1));
        assert_eq!(counts.fail_count("SB"), Some(0));
        assert_eq!(counts.fail_count("RR"), Some(1));
        // pass-all still looks at the raw string
        assert_eq!(counts.pass_all, 0);
    }
}
