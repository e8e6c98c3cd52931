use std::error::Error;
use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    Csv,
    Json,
}

/// One evaluated bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub source: String,
    pub timestamp: String,
    pub price: Decimal,
    pub value: Decimal,
    pub is_formed: bool,
}

pub enum RowSink<W: Write> {
    Csv(csv::Writer<W>),
    Json(W),
}

impl<W: Write> RowSink<W> {
    pub fn new(format: OutputFormat, writer: W) -> Self {
        match format {
            OutputFormat::Csv => RowSink::Csv(csv::Writer::from_writer(writer)),
            OutputFormat::Json => RowSink::Json(writer),
        }
    }

    pub fn write(&mut self, row: &OutputRow) -> Result<(), Box<dyn Error>> {
        match self {
            RowSink::Csv(wtr) => wtr.serialize(row)?,
            RowSink::Json(wtr) => {
                serde_json::to_writer(&mut *wtr, row)?;
                wtr.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        match self {
            RowSink::Csv(wtr) => wtr.flush(),
            RowSink::Json(wtr) => wtr.flush(),
        }
    }
}
