use crate::util::file::{open_reader, open_writer};
use crate::util::misc::flag_str;
use crate::util::table::TableReader;

use anyhow::{self, Context};
use clap::Args;
use std::collections::HashMap;
use std::io::{BufRead, Write};

#[derive(Args)]
pub struct ClusterArgs {
    /// input tab-separated variants file (id, chr, pos columns)
    #[arg(short, long)]
    input: Box<str>,

    /// maximum distance (bp) to another variant of the same sample
    #[arg(short, long)]
    distance: u32,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,
}

pub fn run(args: &ClusterArgs) -> anyhow::Result<()> {
    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;

    let (nvar, nclustered) = flag_clusters(input, args.distance, &mut out)
        .with_context(|| format!("failed to flag clusters: {}", args.input))?;
    out.flush()?;

    log::info!(
        "{} of {} variants lie within {} bp of another variant",
        nclustered,
        nvar,
        args.distance
    );
    Ok(())
}

/// sample -> chromosome -> variant positions
#[derive(Debug, Default)]
struct SamplePositions {
    samples: HashMap<Box<str>, HashMap<Box<str>, Vec<u64>>>,
}

impl SamplePositions {
    fn add(&mut self, sample: &str, chr: &str, pos: u64) {
        self.samples
            .entry(sample.into())
            .or_default()
            .entry(chr.into())
            .or_default()
            .push(pos);
    }

    /// sort and drop duplicate positions so neighbours can be found by
    /// binary search
    fn finalize(&mut self) {
        for chr_map in self.samples.values_mut() {
            for positions in chr_map.values_mut() {
                positions.sort_unstable();
                positions.dedup();
            }
        }
    }

    /// Is there a position at distance `0 < |pos - x| <= distance`?
    fn has_neighbour(&self, sample: &str, chr: &str, pos: u64, distance: u64) -> bool {
        let Some(positions) = self.samples.get(sample).and_then(|x| x.get(chr)) else {
            return false;
        };

        let lb = positions.partition_point(|&x| x < pos);
        let ub = positions.partition_point(|&x| x <= pos);

        let left = lb.checked_sub(1).map(|j| pos.abs_diff(positions[j]));
        let right = positions.get(ub).map(|x| x.abs_diff(pos));

        left.into_iter()
            .chain(right)
            .any(|dist| dist > 0 && dist <= distance)
    }
}

/// Append `cluster_<distance>` to every record. Returns the number of
/// records and the number flagged.
pub fn flag_clusters<R: BufRead, W: Write + ?Sized>(
    input: R,
    distance: u32,
    out: &mut W,
) -> anyhow::Result<(usize, usize)> {
    let reader = TableReader::new(input)?;
    let id_col = reader.header().column("id")?;
    let chr_col = reader.header().column("chr")?;
    let pos_col = reader.header().column("pos")?;
    let (mut header, records) = reader.read_all()?;

    let mut positions = SamplePositions::default();
    for rec in records.iter() {
        positions.add(rec.get(&id_col)?, rec.get(&chr_col)?, rec.get_u64(&pos_col)?);
    }
    positions.finalize();

    header.push(&format!("cluster_{}", distance));
    header.write_to(out)?;

    let nvar = records.len();
    let mut nclustered = 0;
    for mut rec in records.into_iter() {
        let flag = positions.has_neighbour(
            rec.get(&id_col)?,
            rec.get(&chr_col)?,
            rec.get_u64(&pos_col)?,
            u64::from(distance),
        );
        if flag {
            nclustered += 1;
        }
        rec.push(flag_str(flag));
        rec.write_to(out)?;
    }
    Ok((nvar, nclustered))
}
