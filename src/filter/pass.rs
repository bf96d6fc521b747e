use super::{PassArgs, FAIL, FILTER};
use crate::util::file::{open_reader, open_writer};
use crate::util::table::TableReader;

use anyhow::{self, Context};
use std::io::{BufRead, Write};

pub fn run(args: &PassArgs) -> anyhow::Result<()> {
    let input = open_reader(&args.input)?;
    let mut out = open_writer(args.output.as_deref())?;

    let (nvar, npass) = print_pass_only(input, &mut out)
        .with_context(|| format!("failed to select passing variants: {}", args.input))?;
    out.flush()?;

    log::info!("kept {} of {} variants", npass, nvar);
    Ok(())
}

/// Copy the header and every record whose filter has no `FAIL`
pub fn print_pass_only<R: BufRead, W: Write + ?Sized>(
    input: R,
    out: &mut W,
) -> anyhow::Result<(usize, usize)> {
    let reader = TableReader::new(input)?;
    let filter_col = reader.header().column(FILTER)?;
    reader.header().write_to(out)?;

    let (mut nvar, mut npass) = (0, 0);
    for rec in reader {
        let rec = rec?;
        nvar += 1;
        if !rec.get(&filter_col)?.contains(FAIL) {
            rec.write_to(out)?;
            npass += 1;
        }
    }
    Ok((nvar, npass))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_only_passing_records() {
        let input = "id\tfilter\tnote
S1\tPV4_PASS|SB_PASS|CAF_PASS\ta
S2\tPV4_PASS|SB_FAIL|CAF_PASS\tb
S3\tPV4_PASS|SB_PASS|CAF_FAIL\tc
S4\tPV4_PASS|SB_PASS|CAF_PASS\td
";
        let mut out = vec![];
        let (nvar, npass) = print_pass_only(Cursor::new(input), &mut out).unwrap();
        assert_eq!((nvar, npass), (4, 2));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id\tfilter\tnote
S1\tPV4_PASS|SB_PASS|CAF_PASS\ta
S4\tPV4_PASS|SB_PASS|CAF_PASS\td
"
        );
    }

    #[test]
    fn test_header_always_written() {
        let mut out = vec![];
        let (nvar, npass) =
            print_pass_only(Cursor::new("id\tfilter\nS1\tRR_FAIL\n"), &mut out).unwrap();
        assert_eq!((nvar, npass), (1, 0));
        assert_eq!(String::from_utf8(out).unwrap(), "id\tfilter\n");
    }

    #[test]
    fn test_requires_filter_column() {
        let mut out = vec![];
        let err = print_pass_only(Cursor::new("id\tchr\n"), &mut out).unwrap_err();
        assert!(err.to_string().contains("`filter`"));
    }
}
