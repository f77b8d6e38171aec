//! Tab-separated tables.
//!
//! Catalogue tables are plain TSV: a header row, no quoting, and lines
//! starting with `#` treated as comments on read.

use std::io::{Read, Write};
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Trim, WriterBuilder};

use super::error::{CatalogError, CatalogResult};

/// A header and its rows; short rows are padded with empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Where the table was read from, for error messages.
    origin: String,
    header: Vec<String>,
    rows: Vec<Row>,
}

/// One data row with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: u64,
    pub values: Vec<String>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            origin: String::from("<memory>"),
            header,
            rows: Vec::new(),
        }
    }

    /// Read a table from a file.
    pub fn read(path: &Path) -> CatalogResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Read a table from any reader; `origin` names it in errors.
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> CatalogResult<Self> {
        let table_error = |e| CatalogError::Table {
            path: origin.to_string(),
            source: e,
        };
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let header: Vec<String> = reader
            .headers()
            .map_err(table_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record).map_err(table_error)? {
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            let mut values: Vec<String> = record.iter().map(str::to_string).collect();
            values.resize(header.len().max(values.len()), String::new());
            rows.push(Row { line, values });
        }

        tracing::trace!(origin, rows = rows.len(), "read table");
        Ok(Self {
            origin: origin.to_string(),
            header,
            rows,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, compared case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Position of a column that must exist.
    pub fn require(&self, name: &str) -> CatalogResult<usize> {
        self.column(name).ok_or_else(|| CatalogError::MissingColumn {
            path: self.origin.clone(),
            column: name.to_string(),
        })
    }

    pub fn push(&mut self, values: Vec<String>) {
        let line = self.rows.len() as u64 + 2;
        self.rows.push(Row { line, values });
    }

    /// Write header and rows.
    pub fn write(&self, path: &Path) -> CatalogResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let file = std::fs::File::create(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.to_writer(file, &path.display().to_string())
    }

    pub fn to_writer<W: Write>(&self, writer: W, target: &str) -> CatalogResult<()> {
        let mut writer = TsvWriter::new(writer, target);
        writer.write_row(&self.header)?;
        for row in &self.rows {
            writer.write_row(&row.values)?;
        }
        writer.flush()
    }
}

impl Row {
    /// Value at a column position; empty when out of range.
    pub fn get(&self, index: usize) -> &str {
        self.values.get(index).map_or("", String::as_str)
    }

    /// Value at an optional column position, `None` when absent or empty.
    pub fn non_empty(&self, index: Option<usize>) -> Option<&str> {
        index.map(|i| self.get(i)).filter(|v| !v.is_empty())
    }
}

/// Streaming TSV writer; rows may differ in length.
pub struct TsvWriter<W: Write> {
    inner: csv::Writer<W>,
    target: String,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(writer: W, target: &str) -> Self {
        let inner = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .from_writer(writer);
        Self {
            inner,
            target: target.to_string(),
        }
    }

    pub fn write_row<I, T>(&mut self, row: I) -> CatalogResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner
            .write_record(row)
            .map_err(|e| CatalogError::Table {
                path: self.target.clone(),
                source: e,
            })
    }

    pub fn flush(&mut self) -> CatalogResult<()> {
        self.inner.flush().map_err(|e| CatalogError::Io {
            path: self.target.clone(),
            source: e,
        })
    }
}
