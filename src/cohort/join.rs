use super::{JoinArgs, COHORT_FREQ, N_CARRIERS, VAR_ID};
use crate::error::Result;
use crate::util::file::{open_reader, open_writer};
use crate::util::misc::MISSING;
use crate::util::table::TableReader;
use crate::util::variant::VariantColumns;

use anyhow::{self, Context};
use std::collections::HashMap;
use std::io::{BufRead, Write};

pub fn run(args: &JoinArgs) -> anyhow::Result<()> {
    let freq_table = open_reader(&args.cohort_af)?;
    let cohort_af = CohortAfTable::from_reader(freq_table)
        .with_context(|| format!("failed to read cohort AF table: {}", args.cohort_af))?;
    log::info!(
        "loaded cohort AF for {} variants from {}",
        cohort_af.len(),
        args.cohort_af
    );

    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;
    let (nvar, nfound) = join_cohort_af(input, &cohort_af, &mut out)
        .with_context(|| format!("failed to join cohort AF: {}", args.input))?;
    out.flush()?;

    log::info!("found cohort AF for {} of {} variants", nfound, nvar);
    Ok(())
}

/// `var_id -> (n_carriers, cohort_allele_frequency)` kept verbatim
#[derive(Debug, Default)]
pub struct CohortAfTable {
    entries: HashMap<Box<str>, (Box<str>, Box<str>)>,
}

impl CohortAfTable {
    pub fn from_reader<R: BufRead>(input: R) -> Result<Self> {
        let reader = TableReader::new(input)?;
        let var_id = reader.header().column(VAR_ID)?;
        let n_carriers = reader.header().column(N_CARRIERS)?;
        let freq = reader.header().column(COHORT_FREQ)?;

        let mut entries = HashMap::new();
        for rec in reader {
            let rec = rec?;
            entries.insert(
                rec.get(&var_id)?.into(),
                (rec.get(&n_carriers)?.into(), rec.get(&freq)?.into()),
            );
        }
        Ok(CohortAfTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<(&str, &str)> {
        self.entries.get(key).map(|(n, f)| (n.as_ref(), f.as_ref()))
    }
}

/// Append `n_carriers` and `cohort_AF`, `.` for unseen variants.
/// Returns the number of records and how many were found.
pub fn join_cohort_af<R: BufRead, W: Write + ?Sized>(
    input: R,
    cohort_af: &CohortAfTable,
    out: &mut W,
) -> anyhow::Result<(usize, usize)> {
    let reader = TableReader::new(input)?;
    let var_cols = VariantColumns::from_header(reader.header())?;

    let mut header = reader.header().clone();
    header.push(N_CARRIERS);
    header.push("cohort_AF");
    header.write_to(out)?;

    let (mut nvar, mut nfound) = (0, 0);
    for rec in reader {
        let mut rec = rec?;
        let key = var_cols.key(&rec)?;
        let (n, freq) = match cohort_af.get(&key) {
            Some(x) => {
                nfound += 1;
                x
            }
            None => (MISSING, MISSING),
        };
        rec.push(n);
        rec.push(freq);
        rec.write_to(out)?;
        nvar += 1;
    }
    Ok((nvar, nfound))
}
