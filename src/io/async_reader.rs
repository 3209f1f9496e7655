//! Asynchronous CSV reader with batch interface
//!
//! Provides a batched streaming interface over ledger commands from a CSV
//! file. Used by the asynchronous replay strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for the async runtime
//! - Batch reading so partitioning and concurrent processing can work on
//!   bounded chunks

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

use crate::io::csv_format::{convert_csv_record, Command, CsvRecord};

/// Asynchronous CSV command reader
///
/// Provides batch reading over ledger commands.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of ledger commands
    ///
    /// This method reads up to `batch_size` rows from the CSV file,
    /// converting them to commands. Invalid rows are logged and skipped.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of commands to read
    ///
    /// # Returns
    ///
    /// A vector of successfully converted commands.
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Command> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(command) => batch.push(command),
                    Err(e) => tracing::warn!(error = %e, "skipping malformed command row"),
                },
                Some(Err(e)) => tracing::warn!(error = %e, "skipping unparseable CSV row"),
                None => break,
            }
        }

        batch
    }
}
