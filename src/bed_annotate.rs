use crate::error::Result;
use crate::util::file::{open_reader, open_writer, read_lines};
use crate::util::misc::MISSING;
use crate::util::table::{Column, Record, TableReader, SEP};
use crate::util::variant::locus_key;

use anyhow::{self, Context};
use clap::Args;
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Write};

#[derive(Args)]
pub struct BedAnnotateArgs {
    /// input tab-separated variants file
    #[arg(short, long)]
    input: Box<str>,

    /// bedtools intersect output (chr, pos, .., source file, .., score)
    #[arg(short, long)]
    bed: Box<str>,

    /// output file (default: stdout)
    #[arg(short, long)]
    output: Option<Box<str>>,
}

pub fn run(args: &BedAnnotateArgs) -> anyhow::Result<()> {
    let lines = read_lines(&args.bed)?;
    let maps = RepeatMaps::from_lines(lines.iter().map(|x| x.as_ref()))
        .with_context(|| format!("failed to parse BED intersection: {}", args.bed))?;

    log::info!(
        "read {} mappability, {} segdup and {} LCR loci from {}",
        maps.mappability.len(),
        maps.segdup.len(),
        maps.lcr.len(),
        args.bed
    );

    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;
    let nvar = annotate_repeats(input, &maps, &mut out)
        .with_context(|| format!("failed to annotate: {}", args.input))?;
    out.flush()?;

    log::info!("annotated repeat regions for {} variants", nvar);
    Ok(())
}

enum RepeatSource {
    Mappability,
    Segdup,
    Lcr,
}

impl RepeatSource {
    /// The source BED file name tells which track a row came from
    fn from_file_name(name: &str) -> Option<Self> {
        if name.contains("map") {
            Some(RepeatSource::Mappability)
        } else if name.contains("segdup") {
            Some(RepeatSource::Segdup)
        } else if name.contains("LCR") {
            Some(RepeatSource::Lcr)
        } else {
            None
        }
    }
}

/// Locus-keyed repeat evidence built from one BED intersection file
#[derive(Debug, Default)]
pub struct RepeatMaps {
    mappability: HashMap<Box<str>, f64>,
    segdup: HashMap<Box<str>, f64>,
    lcr: HashSet<Box<str>>,
}

impl RepeatMaps {
    /// Build the maps from headerless intersection lines. Scores
    /// keep the maximum over all rows hitting the same locus.
    pub fn from_lines<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let chr_col = Column::at("chr", 0);
        let pos_col = Column::at("pos", 1);
        let source_col = Column::at("source", 3);
        let score_col = Column::at("score", 7);

        let mut ret = RepeatMaps::default();
        let mut nskipped = 0_usize;

        for (j, line) in lines.into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rec = Record::new(j + 1, line.split(SEP).map(|x| x.into()).collect());

            let key = locus_key(rec.get(&chr_col)?, rec.get(&pos_col)?);

            match RepeatSource::from_file_name(rec.get(&source_col)?) {
                Some(RepeatSource::Mappability) => {
                    insert_max(&mut ret.mappability, key, rec.get_f64(&score_col)?);
                }
                Some(RepeatSource::Segdup) => {
                    insert_max(&mut ret.segdup, key, rec.get_f64(&score_col)?);
                }
                Some(RepeatSource::Lcr) => {
                    ret.lcr.insert(key);
                }
                None => nskipped += 1,
            }
        }

        if nskipped > 0 {
            log::debug!("ignored {} rows from unrecognised sources", nskipped);
        }
        Ok(ret)
    }

    /// `map_score`, `segdup_score`, `LCR_flag` for a locus
    pub fn lookup(&self, key: &str) -> [Box<str>; 3] {
        let score = |map: &HashMap<Box<str>, f64>| -> Box<str> {
            map.get(key)
                .map_or(MISSING.into(), |x| format!("{}", x).into_boxed_str())
        };
        let lcr = if self.lcr.contains(key) { "yes" } else { "no" };
        [score(&self.mappability), score(&self.segdup), lcr.into()]
    }
}

fn insert_max(map: &mut HashMap<Box<str>, f64>, key: Box<str>, score: f64) {
    let x = map.entry(key).or_insert(score);
    if score > *x {
        *x = score;
    }
}

/// Append `map_score`, `segdup_score` and `LCR_flag` to each variant
pub fn annotate_repeats<R: BufRead, W: Write + ?Sized>(
    input: R,
    maps: &RepeatMaps,
    out: &mut W,
) -> anyhow::Result<usize> {
    let mut reader = TableReader::new(input)?;
    let chr_col = reader.header().column("chr")?;
    let pos_col = reader.header().column("pos")?;

    let mut header = reader.header().clone();
    for name in ["map_score", "segdup_score", "LCR_flag"] {
        header.push(name);
    }
    header.write_to(out)?;

    let mut nvar = 0;
    for rec in reader.by_ref() {
        let mut rec = rec?;
        let key = locus_key(rec.get(&chr_col)?, rec.get(&pos_col)?);
        for value in maps.lookup(&key).iter() {
            rec.push(value);
        }
        rec.write_to(out)?;
        nvar += 1;
    }
    Ok(nvar)
}
