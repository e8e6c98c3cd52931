use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use csv::{Reader, StringRecord};
use fractal_core::{ErrCode, FractalError, PriceSource};
use rust_decimal::Decimal;
use tracing::warn;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One OHLCV bar from an input file
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub timestamp: NaiveDateTime,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl CsvRecord {
    pub fn price(&self, source: PriceSource) -> Decimal {
        source.pick(self.open, self.high, self.low, self.close)
    }
}

/// Read every bar of `path`, time-ordered and without duplicate timestamps
pub fn load_records(path: &Path) -> Result<Vec<CsvRecord>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut rdr = Reader::from_reader(file);
    let mut records = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        // Row 1 is the header.
        let csv_record = parse_csv_record(&record).map_err(|e| {
            FractalError::data(
                ErrCode::SrcDataFormat,
                format!("{}: row {}: {}", path.display(), row + 2, e),
            )
        })?;
        records.push(csv_record);
    }

    let dropped = prepare_records(&mut records);
    if dropped > 0 {
        warn!(path = %path.display(), dropped, "dropped bars with duplicate timestamps");
    }
    Ok(records)
}

/// Sort by timestamp and drop repeated timestamps, keeping the first.
/// Returns how many records were dropped.
pub fn prepare_records(records: &mut Vec<CsvRecord>) -> usize {
    let before = records.len();
    records.sort_by_key(|r| r.timestamp);
    records.dedup_by_key(|r| r.timestamp);
    before - records.len()
}

pub fn parse_csv_record(record: &StringRecord) -> Result<CsvRecord, FractalError> {
    if record.len() < 6 {
        return Err(FractalError::data(
            ErrCode::SrcDataFormat,
            format!("expected 6 columns, got {}", record.len()),
        ));
    }

    let timestamp = NaiveDateTime::parse_from_str(record[0].trim(), TIME_FORMAT).map_err(|e| {
        FractalError::data(
            ErrCode::SrcDataFormat,
            format!("bad timestamp {:?}: {}", &record[0], e),
        )
    })?;

    Ok(CsvRecord {
        timestamp,
        open: parse_decimal(&record[1], "open")?,
        high: parse_decimal(&record[2], "high")?,
        low: parse_decimal(&record[3], "low")?,
        close: parse_decimal(&record[4], "close")?,
        volume: parse_decimal(&record[5], "volume")?,
    })
}

fn parse_decimal(field: &str, name: &str) -> Result<Decimal, FractalError> {
    let field = field.trim();
    Decimal::from_str(field)
        .or_else(|_| Decimal::from_scientific(field))
        .map_err(|e| {
            FractalError::data(
                ErrCode::SrcDataFormat,
                format!("bad {} {:?}: {}", name, field, e),
            )
        })
}
