//! Batch file decoder
//!
//! Reads a comma-separated product file with a header row. Columns are
//! located by their normalized header:
//!
//! - `product_name` - the product name
//! - `image_url__*` - image references, in header order
//!
//! Every other column is ignored. Records are produced lazily; the first
//! malformed row ends the sequence with an error.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PRODUCT_NAME_COLUMN: &str = "product_name";
pub const IMAGE_COLUMN_PREFIX: &str = "image_url__";

/// One decoded product row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product_name")]
    pub name: Option<String>,
    #[serde(rename = "image_urls")]
    pub image_references: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open batch file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read header row: {0}")]
    Header(#[source] csv::Error),

    #[error("Malformed row at line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Strip whitespace, a byte-order mark, and one leading and one trailing quote
pub fn normalize_header(raw: &str) -> &str {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}

/// A normalized header key and every column index that carries it
#[derive(Debug)]
struct Column {
    key: String,
    indices: Vec<usize>,
}

impl Column {
    /// The last cell for this key that the record actually has
    fn value<'r>(&self, record: &'r csv::StringRecord) -> Option<&'r str> {
        self.indices.iter().rev().find_map(|&i| record.get(i))
    }
}

/// Where the interesting columns live in a given header row
#[derive(Debug)]
struct ColumnLayout {
    name: Option<Column>,
    images: Vec<Column>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        // Keys keep the position of their first occurrence.
        let mut columns: Vec<Column> = Vec::new();
        for (index, raw) in headers.iter().enumerate() {
            let key = normalize_header(raw);
            match columns.iter_mut().find(|c| c.key == key) {
                Some(column) => column.indices.push(index),
                None => columns.push(Column {
                    key: key.to_string(),
                    indices: vec![index],
                }),
            }
        }

        let mut name = None;
        let mut images = Vec::new();
        for column in columns {
            if column.key == PRODUCT_NAME_COLUMN {
                name = Some(column);
            } else if column.key.starts_with(IMAGE_COLUMN_PREFIX) {
                images.push(column);
            }
        }

        Self { name, images }
    }

    fn extract(&self, record: &csv::StringRecord) -> ProductRecord {
        ProductRecord {
            name: self
                .name
                .as_ref()
                .and_then(|c| c.value(record))
                .map(str::to_string),
            image_references: self
                .images
                .iter()
                .filter_map(|c| c.value(record))
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Lazy sequence of [`ProductRecord`] over a reader
pub struct ProductRecords<R> {
    reader: csv::Reader<R>,
    layout: ColumnLayout,
    record: csv::StringRecord,
    finished: bool,
}

impl<R: Read> ProductRecords<R> {
    /// Read the header row and prepare to yield records
    pub fn from_reader(source: R) -> Result<Self, DecodeError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers().map_err(DecodeError::Header)?;
        let layout = ColumnLayout::from_headers(headers);

        tracing::debug!(
            has_name_column = layout.name.is_some(),
            image_columns = layout.images.len(),
            "Batch header decoded"
        );

        Ok(Self {
            reader,
            layout,
            record: csv::StringRecord::new(),
            finished: false,
        })
    }
}

impl<R: Read> Iterator for ProductRecords<R> {
    type Item = Result<ProductRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(self.layout.extract(&self.record))),
            Ok(false) => {
                self.finished = true;
                None
            },
            Err(source) => {
                self.finished = true;
                let line = source.position().map(|p| p.line()).unwrap_or(0);
                Some(Err(DecodeError::Row { line, source }))
            },
        }
    }
}

/// Decode a whole staged file
pub fn decode_file(path: &Path) -> Result<Vec<ProductRecord>, DecodeError> {
    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    ProductRecords::from_reader(file)?.collect()
}
