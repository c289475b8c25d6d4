//! File sink tests against temporary directories.

use chrono::NaiveDate;
use daycast_core::domain::Bar;
use daycast_runner::{CsvSink, ParquetSink, PersistenceError, SinkTarget, TableSink};
use polars::prelude::*;

fn bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    (0..n)
        .map(|i| Bar {
            date: base + chrono::Duration::days(i as i64),
            open: 10.0 + i as f64,
            high: 11.0 + i as f64,
            low: 9.0 + i as f64,
            close: 10.5 + i as f64,
            volume: 100 * (i as u64 + 1),
        })
        .collect()
}

#[test]
fn csv_sink_overwrites_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let target = SinkTarget::new(dir.path().to_string_lossy(), "SPY");
    let sink = CsvSink::new();

    assert_eq!(sink.write(&bars(5), &target).unwrap(), 5);
    assert_eq!(sink.write(&bars(2), &target).unwrap(), 2);

    let text = std::fs::read_to_string(CsvSink::path_for(&target)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
    assert_eq!(lines[1], "2024-04-01,10,11,9,10.5,100");
    assert!(!dir.path().join("SPY.csv.tmp").exists());
}

#[test]
fn csv_sink_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a/b");
    let target = SinkTarget::new(nested.to_string_lossy(), "QQQ");
    CsvSink::new().write(&bars(1), &target).unwrap();
    assert!(nested.join("QQQ.csv").exists());
}

#[test]
fn parquet_sink_roundtrips_through_polars() {
    let dir = tempfile::tempdir().unwrap();
    let target = SinkTarget::new(dir.path().to_string_lossy(), "IWM");
    assert_eq!(ParquetSink::new().write(&bars(4), &target).unwrap(), 4);

    let file = std::fs::File::open(ParquetSink::path_for(&target)).unwrap();
    let df = ParquetReader::new(file).finish().unwrap();
    assert_eq!(df.height(), 4);
    assert_eq!(df.width(), 6);
    for name in ["Date", "Open", "High", "Low", "Close", "Volume"] {
        assert!(df.column(name).is_ok(), "missing column {name}");
    }
    assert_eq!(df.column("Date").unwrap().dtype(), &DataType::Date);
    assert!(!dir.path().join("IWM.parquet.tmp").exists());
}

#[test]
fn file_sinks_reject_tabs_that_leave_destination() {
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("out");
    let target = SinkTarget::new(dest.to_string_lossy(), "../escaped");

    let err = CsvSink::new().write(&bars(1), &target).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
    let err = ParquetSink::new().write(&bars(1), &target).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));

    assert!(!root.path().join("escaped.csv").exists());
    assert!(!root.path().join("escaped.parquet").exists());
}
