//! Positional CSV reader for Price Paid Data files.

use std::io::Read;

use csv::{ErrorKind as CsvErrorKind, ReaderBuilder, StringRecord, Trim};

use super::error::{ImportError, ImportResult};
use super::record::PricePaidRow;

/// Number of columns of a Price Paid Data line.
pub const PRICE_PAID_COLUMNS: usize = 16;

/// Next item of a Price Paid Data file.
#[derive(Debug)]
pub enum ReadRow {
    /// A line with all columns. Lines are numbered from 1, header included.
    Row { line: u64, row: PricePaidRow },
    /// A line that could not be split into columns.
    Invalid { line: u64, message: String },
}

/// Streams [`PricePaidRow`]s out of a CSV source.
///
/// The file has no header; if the first line starts with `transactionId`
/// it is skipped.
pub struct PricePaidReader<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
    line: u64,
}

impl<R: Read> PricePaidReader<R> {
    pub fn new(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);

        Self {
            reader,
            record: StringRecord::with_capacity(256, PRICE_PAID_COLUMNS),
            line: 0,
        }
    }

    /// Reads the next data line.
    ///
    /// Lines with the wrong column count or invalid UTF-8 are reported as
    /// [`ReadRow::Invalid`] and reading continues; other CSV failures end
    /// the file with an error.
    pub fn next_row(&mut self) -> ImportResult<Option<ReadRow>> {
        loop {
            self.line += 1;
            let line = self.line;

            match self.reader.read_record(&mut self.record) {
                Ok(false) => return Ok(None),
                Ok(true) => {}
                Err(error) if matches!(error.kind(), CsvErrorKind::Utf8 { .. }) => {
                    return Ok(Some(ReadRow::Invalid {
                        line,
                        message: "line is not valid UTF-8".to_owned(),
                    }));
                }
                Err(error) => return Err(ImportError::Csv(error)),
            }

            if self.record.len() != PRICE_PAID_COLUMNS {
                return Ok(Some(ReadRow::Invalid {
                    line,
                    message: format!(
                        "expected {PRICE_PAID_COLUMNS} columns, found {}",
                        self.record.len()
                    ),
                }));
            }

            let row: PricePaidRow = self.record.deserialize(None)?;
            if line == 1 && row.is_header() {
                continue;
            }

            return Ok(Some(ReadRow::Row { line, row }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
transactionId,price,dateOfTransfer,postcode,propertyType,oldNew,duration,paon,saon,street,locality,town,district,county,ppd,recordStatus
{A1},250000,2022-01-14 00:00,SW1A 2AA,F,N,L,10,FLAT 2,DOWNING STREET,,LONDON,WESTMINSTER,GREATER LONDON,A,A
{A2}, 180000 ,2022-02-01,M1 1AE,T,N,F,5,,OXFORD ROAD,,MANCHESTER,MANCHESTER,GREATER MANCHESTER,A,A
{A3},90000,2022-03-01
";

    #[test]
    fn header_is_skipped_and_rows_are_numbered() -> anyhow::Result<()> {
        let mut reader = PricePaidReader::new(SAMPLE.as_bytes());

        let Some(ReadRow::Row { line, row }) = reader.next_row()? else {
            anyhow::bail!("expected first data row");
        };
        assert_eq!(line, 2);
        assert_eq!(row.transaction_id, "{A1}");
        assert_eq!(row.saon, "FLAT 2");
        assert_eq!(row.locality, "");

        let Some(ReadRow::Row { row, .. }) = reader.next_row()? else {
            anyhow::bail!("expected second data row");
        };
        assert_eq!(row.price, "180000");

        let Some(ReadRow::Invalid { line, message }) = reader.next_row()? else {
            anyhow::bail!("expected short row to be invalid");
        };
        assert_eq!(line, 4);
        assert!(message.contains("found 3"));

        assert!(reader.next_row()?.is_none());
        Ok(())
    }

    #[test]
    fn file_without_header() -> anyhow::Result<()> {
        let data = "{B1},100000,2020-05-05,B33 8TH,D,Y,F,1,,HIGH STREET,,BIRMINGHAM,,,A,A\n";
        let mut reader = PricePaidReader::new(data.as_bytes());

        let Some(ReadRow::Row { line, row }) = reader.next_row()? else {
            anyhow::bail!("expected data row");
        };
        assert_eq!(line, 1);
        assert_eq!(row.old_new, "Y");
        Ok(())
    }
}
