use crate::error::Result;
use crate::util::table::{Column, Header, Record};

/// Drop a leading `chr` so `chr1` and `1` name the same sequence
pub fn strip_chr(chr: &str) -> &str {
    chr.strip_prefix("chr").unwrap_or(chr)
}

/// `chr:pos:ref:alt`
pub fn variant_key(chr: &str, pos: &str, ref_allele: &str, alt_allele: &str) -> Box<str> {
    format!("{}:{}:{}:{}", chr, pos, ref_allele, alt_allele).into_boxed_str()
}

/// `chr:pos` with the `chr` prefix removed
pub fn locus_key(chr: &str, pos: &str) -> Box<str> {
    format!("{}:{}", strip_chr(chr), pos).into_boxed_str()
}

/// Columns identifying a variant in a table
#[derive(Debug, Clone)]
pub struct VariantColumns {
    chr: Column,
    pos: Column,
    ref_allele: Column,
    alt_allele: Column,
}

impl VariantColumns {
    pub fn from_header(header: &Header) -> Result<Self> {
        Ok(VariantColumns {
            chr: header.column("chr")?,
            pos: header.column("pos")?,
            ref_allele: header.column("ref")?,
            alt_allele: header.column("alt")?,
        })
    }

    pub fn key(&self, rec: &Record) -> Result<Box<str>> {
        Ok(variant_key(
            rec.get(&self.chr)?,
            rec.get(&self.pos)?,
            rec.get(&self.ref_allele)?,
            rec.get(&self.alt_allele)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(variant_key("chr1", "12345", "A", "T").as_ref(), "chr1:12345:A:T");
        assert_eq!(locus_key("chr1", "12345").as_ref(), "1:12345");
        assert_eq!(locus_key("1", "12345").as_ref(), "1:12345");
        assert_eq!(strip_chr("chrX"), "X");
    }

    #[test]
    fn test_variant_columns() {
        let header = Header::parse("id\tchr\tpos\tref\talt");
        let cols = VariantColumns::from_header(&header).unwrap();
        let rec = Record::new(
            2,
            vec!["S1".into(), "chr2".into(), "5".into(), "G".into(), "C".into()],
        );
        assert_eq!(cols.key(&rec).unwrap().as_ref(), "chr2:5:G:C");

        let header = Header::parse("id\tchr\tpos\tref");
        assert!(VariantColumns::from_header(&header).is_err());
    }
}
