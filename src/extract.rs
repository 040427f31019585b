//! Runs the external extraction program against uploaded files and reads
//! the CSV reports it produces.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Mutex;

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::types::ExtractionStatus;

/// Drives the configured extraction program. Runs for the same repository
/// are serialized by a per-repository lock held across the invocation, so
/// two uploads cannot write the shared report file at once.
pub struct Extractor {
    config: ExtractConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Extractor {
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Runs extraction for one repository and returns the terminal outcome.
    /// Each attempt is bounded by the configured timeout; a hung process is
    /// killed. Failed attempts are retried up to the configured bound, after
    /// which the run is terminally failed.
    pub async fn run(&self, repo_key: &str, input: &Path, output: &Path) -> Result<ExtractionStatus> {
        let lock = self.repo_lock(repo_key).await;
        let _guard = lock.lock().await;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }

        for attempt in 1..=self.config.attempts {
            match self.run_once(input, output).await {
                Ok(()) => {
                    tracing::info!(repo = repo_key, attempt, "extraction completed");
                    return Ok(ExtractionStatus::Completed);
                }
                Err(e) => {
                    tracing::warn!(
                        repo = repo_key,
                        attempt,
                        max_attempts = self.config.attempts,
                        "extraction attempt failed: {e}"
                    );
                }
            }
        }

        Ok(ExtractionStatus::Failed)
    }

    async fn run_once(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("--file").arg(input);
        cmd.arg("--output").arg(output);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the future on timeout must also stop the process
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(Error::Io)?;

        let out = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::Extraction(format!(
                    "timed out after {}s",
                    self.config.timeout.as_secs_f64()
                ))
            })?
            .map_err(Error::Io)?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(Error::Extraction(format!(
                "exited with {}: {}",
                out.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn repo_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }
}

/// Reads an extraction report into one JSON object per CSV row, keyed by
/// the header line. A missing report reads as empty; the run simply has
/// not produced one yet.
pub fn read_report(path: &Path) -> Result<Vec<serde_json::Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Extraction(format!("unreadable report: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Extraction(format!("invalid report header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Extraction(format!("invalid report row: {e}")))?;

        let mut row = serde_json::Map::new();
        for (i, field) in record.iter().enumerate() {
            let key = headers
                .get(i)
                .map_or_else(|| format!("column_{i}"), str::to_string);
            row.insert(key, serde_json::Value::String(field.to_string()));
        }
        rows.push(serde_json::Value::Object(row));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn extractor(program: PathBuf, timeout: Duration, attempts: u32) -> Extractor {
        Extractor::new(ExtractConfig {
            program,
            timeout,
            attempts,
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_writes_output() {
        let temp = TempDir::new().unwrap();
        // Arguments arrive as: --file <input> --output <output>
        let script = write_script(temp.path(), "extract.sh", "cp \"$2\" \"$4\"");
        let input = temp.path().join("SRS.txt");
        std::fs::write(&input, "req-1,shall frobnicate\n").unwrap();
        let output = temp.path().join("extracted/alpha/latest_extracted.csv");

        let ex = extractor(script, Duration::from_secs(5), 2);
        let status = ex.run("repo-1", &input, &output).await.unwrap();

        assert_eq!(status, ExtractionStatus::Completed);
        assert!(output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_exhausts_attempts() {
        let temp = TempDir::new().unwrap();
        // Record each invocation, then fail
        let script = write_script(temp.path(), "extract.sh", "echo x >> \"$2.count\"\nexit 3");
        let input = temp.path().join("SRS.txt");
        std::fs::write(&input, "data").unwrap();
        let output = temp.path().join("out.csv");

        let ex = extractor(script, Duration::from_secs(5), 3);
        let status = ex.run("repo-1", &input, &output).await.unwrap();

        assert_eq!(status, ExtractionStatus::Failed);
        let count = std::fs::read_to_string(temp.path().join("SRS.txt.count")).unwrap();
        assert_eq!(count.lines().count(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_program_times_out_as_failed() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "extract.sh", "sleep 30");
        let input = temp.path().join("SRS.txt");
        std::fs::write(&input, "data").unwrap();
        let output = temp.path().join("out.csv");

        let ex = extractor(script, Duration::from_millis(200), 1);
        let status = ex.run("repo-1", &input, &output).await.unwrap();

        assert_eq!(status, ExtractionStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_program_is_failed_not_error() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("SRS.txt");
        std::fs::write(&input, "data").unwrap();

        let ex = extractor(
            temp.path().join("does-not-exist"),
            Duration::from_secs(1),
            2,
        );
        let status = ex
            .run("repo-1", &input, &temp.path().join("out.csv"))
            .await
            .unwrap();

        assert_eq!(status, ExtractionStatus::Failed);
    }

    #[test]
    fn test_read_report_rows_keyed_by_header() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("latest_extracted.csv");
        std::fs::write(
            &report,
            "id,requirement,priority\nR1,shall start,high\nR2,shall stop,low\n",
        )
        .unwrap();

        let rows = read_report(&report).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "R1");
        assert_eq!(rows[0]["requirement"], "shall start");
        assert_eq!(rows[1]["priority"], "low");
    }

    #[test]
    fn test_read_report_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let rows = read_report(&temp.path().join("absent.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_report_ragged_rows_get_positional_keys() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("latest_extracted.csv");
        std::fs::write(&report, "id,requirement\nR1,shall start,extra\n").unwrap();

        let rows = read_report(&report).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "R1");
        assert_eq!(rows[0]["column_2"], "extra");
    }
}
