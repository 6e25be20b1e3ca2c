//! Append-only JSONL log of processed interactions.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One processed interaction. Immutable once appended; `content` and
/// `reply` hold redacted text only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// When the record was created (RFC 3339)
    pub timestamp: String,
    /// When the prompt was sent to the model (RFC 3339)
    pub sent_at: String,
    /// When the reply came back (RFC 3339)
    pub received_at: String,
    /// Author of the inbound message
    pub user: String,
    /// Redacted message content
    pub content: String,
    /// Generated reply
    pub reply: String,
    /// Source conversation/channel
    pub channel: String,
    /// Model that produced the reply
    pub model: String,
}

/// Aggregate numbers reported by `!stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogStats {
    pub total: usize,
    pub avg_latency_secs: f64,
}

/// Append-only JSONL interaction log.
///
/// The file is opened, written and closed per append; a whole line goes
/// out in one write so concurrent writers cannot interleave partial lines.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    path: PathBuf,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line, creating the containing
    /// directory if absent. Write failures propagate; a lost record must
    /// never be silent.
    pub fn append(&self, record: &InteractionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating log directory {}", parent.display()))?;
            }
        }

        let line = serde_json::to_string(record).context("serializing interaction record")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening interaction log {}", self.path.display()))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("appending to interaction log {}", self.path.display()))?;
        Ok(())
    }

    /// Scan the log: count records and average the send→receive latency
    /// over records where both timestamps parse. Malformed lines are
    /// skipped individually; a missing file reports zeros.
    pub fn stats(&self) -> Result<LogStats> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LogStats::default());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("opening interaction log {}", self.path.display())
                });
            }
        };

        let mut total = 0usize;
        let mut latencies: Vec<f64> = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.context("reading interaction log")?;
            if line.trim().is_empty() {
                continue;
            }
            let record: InteractionRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    debug!(error = %e, "Skipping malformed log line");
                    continue;
                }
            };
            total += 1;
            if let (Ok(sent), Ok(received)) = (
                DateTime::parse_from_rfc3339(&record.sent_at),
                DateTime::parse_from_rfc3339(&record.received_at),
            ) {
                let elapsed = (received - sent).num_milliseconds() as f64 / 1000.0;
                latencies.push(elapsed);
            }
        }

        let avg_latency_secs = if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        };

        Ok(LogStats {
            total,
            avg_latency_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sent_at: &str, received_at: &str) -> InteractionRecord {
        InteractionRecord {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            sent_at: sent_at.to_string(),
            received_at: received_at.to_string(),
            user: "alice".to_string(),
            content: "How do fees work?".to_string(),
            reply: "Fees are 0.1%.".to_string(),
            channel: "chan-1".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }

    #[test]
    fn test_stats_on_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("interactions.jsonl"));
        let stats = log.stats().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_latency_secs, 0.0);
    }

    #[test]
    fn test_append_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("data").join("interactions.jsonl"));
        log.append(&record(
            "2026-01-01T00:00:00+00:00",
            "2026-01-01T00:00:02+00:00",
        ))
        .unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_stats_counts_and_averages() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("interactions.jsonl"));
        log.append(&record(
            "2026-01-01T00:00:00+00:00",
            "2026-01-01T00:00:02+00:00",
        ))
        .unwrap();
        log.append(&record(
            "2026-01-01T00:00:00+00:00",
            "2026-01-01T00:00:04+00:00",
        ))
        .unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert!((stats.avg_latency_secs - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.jsonl");
        let log = InteractionLog::new(&path);
        log.append(&record(
            "2026-01-01T00:00:00+00:00",
            "2026-01-01T00:00:02+00:00",
        ))
        .unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "this is not json").unwrap();
        writeln!(file, "{{\"also\": \"not a record\"}}").unwrap();

        log.append(&record(
            "2026-01-01T00:00:00+00:00",
            "2026-01-01T00:00:02+00:00",
        ))
        .unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert!((stats.avg_latency_secs - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unparseable_timestamps_excluded_from_latency() {
        let dir = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(dir.path().join("interactions.jsonl"));
        log.append(&record("not-a-time", "also-not-a-time")).unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.avg_latency_secs, 0.0);
    }
}
