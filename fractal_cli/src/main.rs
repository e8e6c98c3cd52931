mod output;
mod record;

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use fractal_core::{
    ErrCode, FractalError, FractalRsi, FractalRsiConfig, IndicatorValue, PriceSource,
    StreamingIndicator,
};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use output::{OutputFormat, OutputRow, RowSink};
use record::{load_records, CsvRecord, TIME_FORMAT};

#[derive(Parser, Debug)]
#[command(name = "fractal-rsi")]
#[command(about = "Evaluate the fractal-adaptive RSI over OHLCV CSV files", long_about = None)]
struct Cli {
    /// CSV file, or a directory whose *.csv files are processed in name order
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file with period / normal_speed / max_history
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    period: Option<usize>,

    #[arg(long)]
    normal_speed: Option<usize>,

    #[arg(long)]
    max_history: Option<usize>,

    /// Bar field fed to the indicator (open, high, low, close, median, typical)
    #[arg(long, default_value = "close")]
    source: PriceSource,

    /// Output format (csv, json)
    #[arg(long, default_value = "csv")]
    format: OutputFormat,

    /// Skip rows that are not formed
    #[arg(long)]
    formed_only: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    info!(
        period = config.period,
        normal_speed = config.normal_speed,
        max_history = config.history_cap(),
        source = %cli.source,
        "configuration resolved"
    );

    let stdout = io::stdout();
    let mut sink = RowSink::new(cli.format, stdout.lock());
    for path in collect_inputs(&cli.input)? {
        info!(path = %path.display(), "processing file");
        process_csv_file(&path, &config, &cli, &mut sink)?;
    }
    sink.flush()?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<FractalRsiConfig, FractalError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                FractalError::config(
                    ErrCode::ConfigFormat,
                    format!("{}: {}", path.display(), e),
                )
            })?;
            FractalRsiConfig::from_json_str(&text)?
        }
        None => FractalRsiConfig::default(),
    };

    apply_overrides(&mut config, cli.period, cli.normal_speed, cli.max_history);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(
    config: &mut FractalRsiConfig,
    period: Option<usize>,
    normal_speed: Option<usize>,
    max_history: Option<usize>,
) {
    if let Some(period) = period {
        config.period = period;
    }
    if let Some(normal_speed) = normal_speed {
        config.normal_speed = normal_speed;
    }
    if let Some(max_history) = max_history {
        config.max_history = Some(max_history);
    }
}

fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, FractalError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(FractalError::data(
            ErrCode::SrcDataNotFound,
            format!("{} does not exist", input.display()),
        ));
    }

    let entries = fs::read_dir(input).map_err(|e| {
        FractalError::data(
            ErrCode::SrcDataNotFound,
            format!("{}: {}", input.display(), e),
        )
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| {
                FractalError::data(
                    ErrCode::SrcDataNotFound,
                    format!("{}: {}", input.display(), e),
                )
            })?
            .path();
        if path.extension().and_then(|s| s.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(FractalError::data(
            ErrCode::SrcDataNotFound,
            format!("no csv files in {}", input.display()),
        ));
    }
    Ok(files)
}

fn process_csv_file<W: io::Write>(
    path: &Path,
    config: &FractalRsiConfig,
    cli: &Cli,
    sink: &mut RowSink<W>,
) -> Result<(), Box<dyn Error>> {
    let records = load_records(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let mut indicator = FractalRsi::<Decimal>::with_config(*config)?;
    let rows = evaluate(&mut indicator, &records, cli.source, &name);

    let formed = rows.iter().filter(|r| r.is_formed).count();
    for row in rows.iter().filter(|r| r.is_formed || !cli.formed_only) {
        sink.write(row)?;
    }

    info!(
        source = %name,
        rows = rows.len(),
        formed,
        last_value = ?rows.last().map(|r| r.value),
        "file evaluated"
    );
    Ok(())
}

/// Feed every bar through `indicator` in order
fn evaluate<I>(
    indicator: &mut I,
    records: &[CsvRecord],
    source: PriceSource,
    name: &str,
) -> Vec<OutputRow>
where
    I: StreamingIndicator<Input = Decimal, Output = IndicatorValue<Decimal>>,
{
    records
        .iter()
        .map(|record| {
            let price = record.price(source);
            let out = indicator.process(price);
            OutputRow {
                source: name.to_string(),
                timestamp: record.timestamp.format(TIME_FORMAT).to_string(),
                price,
                value: out.value,
                is_formed: out.is_formed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_csv_record;
    use std::str::FromStr;

    fn bars(closes: &[&str]) -> Vec<CsvRecord> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let ts = format!("2024-01-01 00:{:02}:00", i);
                let fields = vec![ts.as_str(), close, close, close, close, "0"];
                parse_csv_record(&csv::StringRecord::from(fields)).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_evaluate_worked_trace() {
        let mut indicator = FractalRsi::<Decimal>::new(2, 2).unwrap();
        let rows = evaluate(&mut indicator, &bars(&["10", "11", "9"]), PriceSource::Close, "t");

        assert_eq!(rows.len(), 3);
        assert!(!rows[0].is_formed);
        assert_eq!(rows[1].value, Decimal::from(50));
        assert!(rows[2].is_formed);
        assert_eq!(rows[2].value, Decimal::ZERO);
        assert_eq!(rows[2].timestamp, "2024-01-01 00:02:00");
        assert_eq!(rows[2].source, "t");
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = FractalRsiConfig::default();
        apply_overrides(&mut config, Some(12), None, Some(100));
        assert_eq!(config.period, 12);
        assert_eq!(config.normal_speed, 30);
        assert_eq!(config.max_history, Some(100));
    }

    #[test]
    fn test_collect_inputs_missing_path() {
        let err = collect_inputs(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.code(), ErrCode::SrcDataNotFound);
    }

    #[test]
    fn test_collect_inputs_empty_dir() {
        let dir = std::env::temp_dir().join(format!("fractal_cli_empty_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.txt"), "not a csv").unwrap();

        let err = collect_inputs(&dir).unwrap_err();
        assert_eq!(err.code(), ErrCode::SrcDataNotFound);
        assert!(err.to_string().contains("no csv files"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resolve_config_long_period_override() {
        let cli = Cli::try_parse_from(["fractal-rsi", "--input", "x", "--period", "600"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.period, 600);
        assert_eq!(config.history_cap(), 601);

        let cli = Cli::try_parse_from([
            "fractal-rsi", "--input", "x", "--period", "600", "--max-history", "600",
        ])
        .unwrap();
        let err = resolve_config(&cli).unwrap_err();
        assert_eq!(err.code(), ErrCode::HistoryTooShort);
    }

    #[test]
    fn test_cli_parses_enums() {
        let cli = Cli::try_parse_from([
            "fractal-rsi",
            "--input",
            "data.csv",
            "--source",
            "median",
            "--format",
            "json",
            "--period",
            "14",
            "--formed-only",
        ])
        .unwrap();
        assert_eq!(cli.source, PriceSource::Median);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.period, Some(14));
        assert!(cli.formed_only);

        assert!(Cli::try_parse_from(["fractal-rsi", "--input", "x", "--source", "vwap"]).is_err());
    }

    #[test]
    fn test_load_and_evaluate_file() {
        let dir = std::env::temp_dir().join(format!("fractal_cli_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.csv");
        fs::write(
            &path,
            "timestamp,open,high,low,close,volume\n\
             2024-01-01 00:02:00,9,9,9,9,1\n\
             2024-01-01 00:00:00,10,10,10,10,1\n\
             2024-01-01 00:01:00,11,11,11,11,1\n\
             2024-01-01 00:01:00,12,12,12,12,1\n",
        )
        .unwrap();

        assert_eq!(collect_inputs(&dir).unwrap(), vec![path.clone()]);

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 3);

        let mut indicator = FractalRsi::<Decimal>::new(2, 2).unwrap();
        let rows = evaluate(&mut indicator, &records, PriceSource::Close, "sample");
        assert_eq!(rows[2].value, Decimal::from_str("0").unwrap());

        fs::remove_dir_all(&dir).unwrap();
    }
}
