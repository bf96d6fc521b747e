use crate::error::{Result, TableError};
use crate::util::misc::paste;

use std::collections::HashMap;
use std::io::{BufRead, Lines, Write};

pub const SEP: char = '\t';
const SEP_STR: &str = "\t";

/// A named column resolved against a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: Box<str>,
    index: usize,
}

impl Column {
    /// Fixed-position column of a headerless file
    pub fn at(name: &str, index: usize) -> Self {
        Column {
            name: name.into(),
            index,
        }
    }
}

/// Header line of a tab-separated table with its name -> index map
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<Box<str>>,
    name2idx: HashMap<Box<str>, usize>,
}

impl Header {
    pub fn parse(line: &str) -> Self {
        let mut ret = Header {
            names: vec![],
            name2idx: HashMap::new(),
        };
        for name in line.split(SEP) {
            ret.push(name);
        }
        ret
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.name2idx.get(name).copied()
    }

    /// Resolve a column that must be present
    pub fn column(&self, name: &str) -> Result<Column> {
        self.position(name)
            .map(|index| Column {
                name: name.into(),
                index,
            })
            .ok_or_else(|| TableError::MissingColumn(name.into()))
    }

    /// Resolve a column if present
    pub fn optional_column(&self, name: &str) -> Option<Column> {
        self.column(name).ok()
    }

    /// Append a new column name at the end
    pub fn push(&mut self, name: &str) -> Column {
        let index = self.names.len();
        self.names.push(name.into());
        // later duplicates shadow earlier ones
        self.name2idx.insert(name.into(), index);
        Column {
            name: name.into(),
            index,
        }
    }

    /// Whether a data line is really this header repeated
    fn is_repeated_by(&self, first_field: &str) -> bool {
        self.names.first().map_or(false, |x| x.as_ref() == first_field)
    }

    pub fn to_line(&self) -> Box<str> {
        paste(&self.names, SEP_STR)
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.to_line().as_bytes())?;
        out.write_all(b"\n")
    }
}

/// One data line with its 1-based line number
#[derive(Debug, Clone)]
pub struct Record {
    line: usize,
    fields: Vec<Box<str>>,
}

impl Record {
    pub fn new(line: usize, fields: Vec<Box<str>>) -> Self {
        Record { line, fields }
    }

    pub fn get(&self, col: &Column) -> Result<&str> {
        self.fields
            .get(col.index)
            .map(|x| x.as_ref())
            .ok_or_else(|| TableError::ShortRow {
                line: self.line,
                column: col.name.clone(),
                found: self.fields.len(),
            })
    }

    pub fn get_f64(&self, col: &Column) -> Result<f64> {
        let value = self.get(col)?;
        fast_float::parse::<f64, _>(value.trim())
            .map_err(|_| self.parse_error(col, value, "a number"))
    }

    /// Non-negative integer such as a genomic position
    pub fn get_u64(&self, col: &Column) -> Result<u64> {
        let value = self.get(col)?;
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| self.parse_error(col, value, "an integer"))
    }

    pub fn parse_error(&self, col: &Column, value: &str, expected: &'static str) -> TableError {
        TableError::ParseValue {
            line: self.line,
            column: col.name.clone(),
            value: value.into(),
            expected,
        }
    }

    pub fn malformed(&self, col: &Column, value: &str) -> TableError {
        TableError::Malformed {
            line: self.line,
            column: col.name.clone(),
            value: value.into(),
        }
    }

    /// Overwrite a field in place
    pub fn set(&mut self, col: &Column, value: &str) -> Result<()> {
        let found = self.fields.len();
        match self.fields.get_mut(col.index) {
            Some(x) => {
                *x = value.into();
                Ok(())
            }
            None => Err(TableError::ShortRow {
                line: self.line,
                column: col.name.clone(),
                found,
            }),
        }
    }

    pub fn push(&mut self, value: &str) {
        self.fields.push(value.into());
    }

    pub fn to_line(&self) -> Box<str> {
        paste(&self.fields, SEP_STR)
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.to_line().as_bytes())?;
        out.write_all(b"\n")
    }
}

///
/// Streams a header-labelled tab-separated table. The first
/// non-empty line is the header; blank lines and repeated header
/// lines are skipped.
///
pub struct TableReader<R> {
    lines: Lines<R>,
    header: Header,
    line_no: usize,
}

impl<R: BufRead> TableReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let mut line_no = 0;
        while let Some(line) = lines.next() {
            let line = line?;
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Ok(TableReader {
                lines,
                header: Header::parse(&line),
                line_no,
            });
        }
        Err(TableError::EmptyInput)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Read the remaining records into memory
    pub fn read_all(self) -> Result<(Header, Vec<Record>)> {
        let header = self.header.clone();
        let records = self.collect::<Result<Vec<_>>>()?;
        Ok((header, records))
    }
}

impl<R: BufRead> Iterator for TableReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<Box<str>> = line.split(SEP).map(|x| x.into()).collect();

            if self.header.is_repeated_by(&fields[0]) {
                log::debug!("skipping repeated header at line {}", self.line_no);
                continue;
            }

            return Some(Ok(Record::new(self.line_no, fields)));
        }
    }
}
