use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{encode_record, DatasetError};
use crate::product::Product;

/// Written once, before the first record.
pub const ARRAY_OPENER: &str = "[\n  ";
/// Written after every record (legacy) or between records (json_array).
pub const RECORD_SEPARATOR: &str = "  ,\n  ";
const ARRAY_CLOSER: &str = "]\n";

/// How records are framed in the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFraming {
    /// Separator after every record and no closing bracket. Not valid JSON,
    /// but byte-compatible with files downstream consumers already read.
    #[default]
    Legacy,
    /// Separator between records and a closing bracket on finish.
    JsonArray,
}

/// Streams products into an array-shaped output, one record at a time.
///
/// Every record goes straight to the underlying writer. If the run aborts,
/// whatever was written stays behind as a truncated document.
pub struct RecordWriter<W: Write> {
    inner: W,
    framing: OutputFraming,
    records: usize,
}

impl RecordWriter<File> {
    /// Create (or truncate) the output file and write the array opener.
    pub fn create(path: &Path, framing: OutputFraming) -> Result<Self, DatasetError> {
        let file = File::create(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Writing {:?} output to {}", framing, path.display());
        Self::new(file, framing)
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(mut inner: W, framing: OutputFraming) -> Result<Self, DatasetError> {
        inner
            .write_all(ARRAY_OPENER.as_bytes())
            .map_err(DatasetError::Write)?;
        Ok(Self {
            inner,
            framing,
            records: 0,
        })
    }

    pub fn write_record(&mut self, product: &Product) -> Result<(), DatasetError> {
        let encoded = encode_record(product).map_err(DatasetError::Encode)?;

        if self.framing == OutputFraming::JsonArray && self.records > 0 {
            self.write_raw(RECORD_SEPARATOR.as_bytes())?;
        }
        self.write_raw(&encoded)?;
        if self.framing == OutputFraming::Legacy {
            self.write_raw(RECORD_SEPARATOR.as_bytes())?;
        }

        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Close the array (json_array framing only), flush and hand back the writer.
    pub fn finish(mut self) -> Result<W, DatasetError> {
        if self.framing == OutputFraming::JsonArray {
            self.write_raw(ARRAY_CLOSER.as_bytes())?;
        }
        self.inner.flush().map_err(DatasetError::Write)?;
        Ok(self.inner)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), DatasetError> {
        self.inner.write_all(bytes).map_err(DatasetError::Write)
    }
}
