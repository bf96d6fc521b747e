use anyhow::{self, Context};

use rust_htslib::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const STDIO: &str = "-";

fn is_bgzf(file_name: &str) -> bool {
    matches!(
        Path::new(file_name).extension().and_then(|x| x.to_str()),
        Some("gz") | Some("bgz")
    )
}

///
/// Open a buffered reader over `input_file`. `-` is stdin; `.gz`
/// and `.bgz` files go through the BGZF reader, which also reads
/// plain gzip.
///
pub fn open_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    if input_file == STDIO {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let buf: Box<dyn BufRead> = if is_bgzf(input_file) {
        let _file = bgzf::Reader::from_path(input_file)
            .with_context(|| format!("failed to open BGZF file: {}", input_file))?;
        Box::new(BufReader::new(_file))
    } else {
        let _file =
            File::open(input_file).with_context(|| format!("failed to open: {}", input_file))?;
        Box::new(BufReader::new(_file))
    };
    Ok(buf)
}

///
/// Open a buffered writer. No file (or `-`) means stdout.
///
/// A `.gz`/`.bgz` output gets its BGZF EOF block only when the
/// writer is dropped, and `bgzf::Writer` reports no error from that
/// last write. Call `flush()` before dropping so that buffered data
/// errors surface here.
///
pub fn open_writer(output_file: Option<&str>) -> anyhow::Result<Box<dyn Write>> {
    let buf: Box<dyn Write> = match output_file {
        None | Some(STDIO) => Box::new(BufWriter::new(io::stdout())),
        Some(path) if is_bgzf(path) => {
            let _file = bgzf::Writer::from_path(path)
                .with_context(|| format!("failed to create BGZF file: {}", path))?;
            Box::new(BufWriter::new(_file))
        }
        Some(path) => {
            let _file = File::create(path).with_context(|| format!("failed to create: {}", path))?;
            Box::new(BufWriter::new(_file))
        }
    };
    Ok(buf)
}

///
/// Read every line of the input_file into memory
///
pub fn read_lines(input_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    let buf = open_reader(input_file)?;
    let mut lines = vec![];
    for x in buf.lines() {
        lines.push(
            x.with_context(|| format!("failed to read: {}", input_file))?
                .into_boxed_str(),
        );
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgzf_extension() {
        assert!(is_bgzf("variants.tsv.gz"));
        assert!(is_bgzf("isec.bgz"));
        assert!(!is_bgzf("variants.tsv"));
        assert!(!is_bgzf("-"));
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("varsift_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    fn write_then_read(path: &str) -> Vec<Box<str>> {
        let mut out = open_writer(Some(path)).unwrap();
        out.write_all(b"id\tchr\nS1\tchr1\n").unwrap();
        out.flush().unwrap();
        drop(out);
        let lines = read_lines(path).unwrap();
        std::fs::remove_file(path).unwrap();
        lines
    }

    #[test]
    fn test_bgzf_round_trip() {
        let path = temp_path("round_trip.tsv.gz");
        let lines = write_then_read(&path);
        assert_eq!(lines, vec![Box::from("id\tchr"), Box::from("S1\tchr1")]);
    }

    #[test]
    fn test_plain_round_trip() {
        let path = temp_path("round_trip.tsv");
        let lines = write_then_read(&path);
        assert_eq!(lines, vec![Box::from("id\tchr"), Box::from("S1\tchr1")]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = open_reader("/nonexistent/variants.tsv").err().unwrap();
        assert!(format!("{:#}", err).contains("/nonexistent/variants.tsv"));
    }
}
