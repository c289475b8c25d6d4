//! CSV file sink: `{destination}/{tab}.csv`, replaced atomically.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use daycast_core::domain::Bar;

use super::{sheet_rows, PersistenceError, SinkTarget, TableSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSink;

impl CsvSink {
    pub fn new() -> Self {
        Self
    }

    pub fn path_for(target: &SinkTarget) -> PathBuf {
        Path::new(&target.destination).join(format!("{}.csv", target.tab))
    }
}

fn write_atomic(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut wtr = csv::Writer::from_path(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        for row in rows {
            wtr.write_record(row)?;
        }
        wtr.flush().context("flush CSV writer")?;
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        anyhow::anyhow!("rename into {}: {e}", path.display())
    })
}

impl TableSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn write(&self, bars: &[Bar], target: &SinkTarget) -> Result<usize, PersistenceError> {
        target.check_file_tab()?;
        let path = Self::path_for(target);
        write_atomic(&path, &sheet_rows(bars)).map_err(|e| PersistenceError::Io(format!("{e:#}")))?;
        tracing::debug!(path = %path.display(), rows = bars.len(), "wrote csv");
        Ok(bars.len())
    }
}
