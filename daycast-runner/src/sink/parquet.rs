//! Parquet file sink: `{destination}/{tab}.parquet` via polars.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use daycast_core::domain::Bar;
use polars::prelude::*;

use super::{PersistenceError, SinkTarget, TableSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct ParquetSink;

impl ParquetSink {
    pub fn new() -> Self {
        Self
    }

    pub fn path_for(target: &SinkTarget) -> PathBuf {
        Path::new(&target.destination).join(format!("{}.parquet", target.tab))
    }
}

/// Bars as a DataFrame with columns `Date` (Date), `Open`..`Close` (f64), `Volume` (u64).
pub fn bars_to_dataframe(bars: &[Bar]) -> Result<DataFrame> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("Date".into(), dates)
            .cast(&DataType::Date)
            .context("date cast")?,
        Column::new("Open".into(), opens),
        Column::new("High".into(), highs),
        Column::new("Low".into(), lows),
        Column::new("Close".into(), closes),
        Column::new("Volume".into(), volumes),
    ])
    .context("dataframe creation")
}

fn write_atomic(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("parquet.tmp");
    let file = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    ParquetWriter::new(file).finish(df).context("write parquet")?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        anyhow::anyhow!("rename into {}: {e}", path.display())
    })
}

impl TableSink for ParquetSink {
    fn name(&self) -> &str {
        "parquet"
    }

    fn write(&self, bars: &[Bar], target: &SinkTarget) -> Result<usize, PersistenceError> {
        target.check_file_tab()?;
        let path = Self::path_for(target);
        let mut df = bars_to_dataframe(bars).map_err(|e| PersistenceError::Encode(format!("{e:#}")))?;
        write_atomic(&path, &mut df).map_err(|e| PersistenceError::Io(format!("{e:#}")))?;
        tracing::debug!(path = %path.display(), rows = df.height(), "wrote parquet");
        Ok(df.height())
    }
}
