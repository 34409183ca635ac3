use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use jum_core::EventRecord;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Append-only JSONL log of run events, one file per UTC day.
#[derive(Debug, Clone)]
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_for(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("run_events_{}.jsonl", day.format("%Y-%m-%d")))
    }

    /// Append one record to the file for the record's day.
    pub async fn append(&self, record: &EventRecord) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(record.timestamp.date_naive()))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Read every record logged on `day`. A missing file is an empty log;
    /// malformed lines are skipped.
    pub async fn read_events(&self, day: NaiveDate) -> std::io::Result<Vec<EventRecord>> {
        let path = self.file_for(day);
        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();
        let mut n = 0;
        while let Some(line) = lines.next_line().await? {
            n += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("{}:{n}: skipping malformed event: {e}", path.display()),
            }
        }
        Ok(records)
    }
}
