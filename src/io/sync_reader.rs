//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over ledger commands from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize command rows
//! sequentially, converting each into a [`Command`]. It maintains streaming
//! behavior by processing one row at a time without loading the entire file
//! into memory.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row parsing errors are yielded as Err variants in the
//!   iterator, with row numbers for debugging

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::io::csv_format::{convert_csv_record, Command, CsvRecord};

/// Synchronous CSV command reader
///
/// Provides an iterator interface over ledger commands.
/// Maintains streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    row_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// Opens the CSV file and prepares it for streaming iteration.
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (for the optional trailing columns)
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the command CSV file
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self { reader, row_num: 0 })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Command, String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.row_num += 1;
        let row_num = self.row_num;

        match self.reader.deserialize::<CsvRecord>().next()? {
            Ok(csv_record) => Some(
                convert_csv_record(csv_record).map_err(|e| format!("row {row_num}: {e}")),
            ),
            Err(e) => Some(Err(format!("row {row_num}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransferRequest;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_reader_yields_commands_in_order() {
        let file = create_temp_csv(
            "op,account,counterparty,amount\n\
             open,ACC-1,,1000.00\n\
             transfer,ACC-1,ACC-2,300.00\n",
        );

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<Command> = reader.map(Result::unwrap).collect();

        assert_eq!(
            commands,
            vec![
                Command::Open {
                    ref_id: "ACC-1".to_string(),
                    initial_balance: Decimal::new(100000, 2),
                },
                Command::Transfer(TransferRequest {
                    source_ref: "ACC-1".to_string(),
                    destination_ref: "ACC-2".to_string(),
                    amount: Some(Decimal::new(30000, 2)),
                }),
            ]
        );
    }

    #[test]
    fn test_reader_yields_errors_for_malformed_rows() {
        let file = create_temp_csv(
            "op,account,counterparty,amount\n\
             open,ACC-1,,not-a-number\n\
             open,ACC-2,,50.00\n",
        );

        let results: Vec<Result<Command, String>> =
            SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[0].as_ref().unwrap_err().contains("row 1"));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_reader_trims_whitespace() {
        let file = create_temp_csv("op,account,counterparty,amount\n open , ACC-1 ,, 10.00 \n");

        let commands: Vec<Command> = SyncReader::new(file.path())
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(
            commands,
            vec![Command::Open {
                ref_id: "ACC-1".to_string(),
                initial_balance: Decimal::new(1000, 2),
            }]
        );
    }

    #[test]
    fn test_reader_fails_for_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
