use super::{EstimateArgs, COHORT_FREQ, N_CARRIERS, VAR_ID};
use crate::error::TableError;
use crate::util::file::{open_reader, open_writer};
use crate::util::table::{Header, TableReader};
use crate::util::variant::VariantColumns;

use anyhow::{self, Context};
use std::collections::HashMap;
use std::io::{BufRead, Write};

pub fn run(args: &EstimateArgs) -> anyhow::Result<()> {
    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;

    let counts = estimate_cohort_af(input, args.cohort_size, args.unique, &mut out)
        .with_context(|| format!("failed to count carriers: {}", args.input))?;
    out.flush()?;

    log::info!(
        "counted {} records over {} distinct variants (cohort size {})",
        counts.nrecords(),
        counts.nvariants(),
        args.cohort_size
    );
    Ok(())
}

/// Number of records per variant key, remembering first-seen order
#[derive(Debug, Default)]
pub struct CarrierCounts {
    counts: HashMap<Box<str>, usize>,
    order: Vec<Box<str>>,
    nrecords: usize,
}

impl CarrierCounts {
    /// Every occurrence counts, the first one included
    pub fn add(&mut self, key: &str) {
        self.nrecords += 1;
        match self.counts.get_mut(key) {
            Some(n) => *n += 1,
            None => {
                self.counts.insert(key.into(), 1);
                self.order.push(key.into());
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn nrecords(&self) -> usize {
        self.nrecords
    }

    pub fn nvariants(&self) -> usize {
        self.order.len()
    }
}

///
/// Count carriers of each `chr:pos:ref:alt` and divide by the
/// cohort size. One output row per input record, or per distinct
/// variant when `unique` is set.
///
pub fn estimate_cohort_af<R: BufRead, W: Write + ?Sized>(
    input: R,
    cohort_size: u64,
    unique: bool,
    out: &mut W,
) -> anyhow::Result<CarrierCounts> {
    if cohort_size == 0 {
        return Err(TableError::InvalidArgument("cohort size must be positive".into()).into());
    }

    let reader = TableReader::new(input)?;
    let var_cols = VariantColumns::from_header(reader.header())?;
    let (_, records) = reader.read_all()?;

    let keys = records
        .iter()
        .map(|rec| var_cols.key(rec))
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts = CarrierCounts::default();
    for key in keys.iter() {
        counts.add(key);
    }

    let mut header = Header::parse(VAR_ID);
    header.push(N_CARRIERS);
    header.push(COHORT_FREQ);
    header.write_to(out)?;

    let emit = if unique { &counts.order } else { &keys };

    for key in emit.iter() {
        let n = counts.get(key);
        let freq = n as f64 / cohort_size as f64;
        writeln!(out, "{}\t{}\t{}", key, n, freq)?;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const VARIANTS: &str = "id\tchr\tpos\tref\talt
S1\tchr1\t12345\tA\tT
S2\tchr1\t12345\tA\tT
S3\tchr2\t500\tG\tC
S4\tchr1\t12345\tA\tT
";

    fn estimate(unique: bool) -> String {
        let mut out = vec![];
        estimate_cohort_af(Cursor::new(VARIANTS), 100, unique, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_every_occurrence_counts() {
        assert_eq!(
            estimate(false),
            "var_id\tn_carriers\tcohort_allele_frequency
chr1:12345:A:T\t3\t0.03
chr1:12345:A:T\t3\t0.03
chr2:500:G:C\t1\t0.01
chr1:12345:A:T\t3\t0.03
"
        );
    }

    #[test]
    fn test_unique_rows() {
        assert_eq!(
            estimate(true),
            "var_id\tn_carriers\tcohort_allele_frequency
chr1:12345:A:T\t3\t0.03
chr2:500:G:C\t1\t0.01
"
        );
    }

    #[test]
    fn test_counts_equal_occurrences() {
        let mut counts = CarrierCounts::default();
        for key in ["a", "b", "a", "c", "a", "b"] {
            counts.add(key);
        }
        assert_eq!(counts.get("a"), 3);
        assert_eq!(counts.get("b"), 2);
        assert_eq!(counts.get("c"), 1);
        assert_eq!(counts.get("d"), 0);
        assert_eq!(counts.nrecords(), 6);
        assert_eq!(counts.nvariants(), 3);
    }

    #[test]
    fn test_zero_cohort_size_rejected() {
        let mut out = vec![];
        let err = estimate_cohort_af(Cursor::new(VARIANTS), 0, false, &mut out).unwrap_err();
        assert!(err.to_string().contains("cohort size"));
    }
}
