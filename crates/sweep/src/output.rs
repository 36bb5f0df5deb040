//! Sweep output files.
//!
//! # Output Files
//!
//! - `runs.jsonl` - one [`RunRow`] per line
//! - `steps.jsonl` - one [`StepRow`] per line, only when step recording is on
//! - `summary.json` - metrics per grid point plus jobs rejected for their seed
//!
//! Rows are JSON Lines so plotting tools can stream them.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use gov_core::{MetricsCollector, MetricsSummary, RunResult};
use gov_records::{RunRow, StepRow};

use crate::runner::{InvalidJob, SweepReport};

const RUNS_FILE: &str = "runs.jsonl";
const STEPS_FILE: &str = "steps.jsonl";
const SUMMARY_FILE: &str = "summary.json";

/// Errors that can occur during output operations.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct OutputWriter {
    output_dir: PathBuf,
    runs_writer: BufWriter<File>,
    /// Present only when step rows are recorded
    steps_writer: Option<BufWriter<File>>,
    runs_written: u64,
}

impl OutputWriter {
    /// Creates the directory if needed and truncates the row files.
    pub fn new(output_dir: &Path, record_steps: bool) -> Result<Self, OutputError> {
        fs::create_dir_all(output_dir)?;

        let runs_file = File::create(output_dir.join(RUNS_FILE))?;
        let steps_writer = if record_steps {
            Some(BufWriter::new(File::create(output_dir.join(STEPS_FILE))?))
        } else {
            None
        };

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            runs_writer: BufWriter::new(runs_file),
            steps_writer,
            runs_written: 0,
        })
    }

    /// Writes one run's row, and its step rows when recording steps.
    pub fn write_run(&mut self, label: &str, run: &RunResult) -> Result<(), OutputError> {
        writeln!(self.runs_writer, "{}", run.run_row(label).to_jsonl()?)?;
        if let Some(steps) = self.steps_writer.as_mut() {
            for row in run.step_rows(label) {
                writeln!(steps, "{}", row.to_jsonl()?)?;
            }
        }
        self.runs_written += 1;
        Ok(())
    }

    /// Writes every run of a report followed by its summary, then flushes.
    pub fn write_report(&mut self, report: &SweepReport) -> Result<(), OutputError> {
        for job in &report.runs {
            self.write_run(&job.label, &job.result)?;
        }
        self.flush()?;
        self.write_summary(&report.summaries(), report.skipped, &report.invalid)
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.runs_writer.flush()?;
        if let Some(steps) = self.steps_writer.as_mut() {
            steps.flush()?;
        }
        Ok(())
    }

    pub fn runs_written(&self) -> u64 {
        self.runs_written
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `summary.json` with per-point metrics and the jobs rejected for
    /// their seed.
    pub fn write_summary(
        &self,
        summaries: &BTreeMap<String, MetricsSummary>,
        skipped: usize,
        invalid: &[InvalidJob],
    ) -> Result<(), OutputError> {
        let summary = serde_json::json!({
            "runs_written": self.runs_written,
            "runs_skipped": skipped,
            "invalid_jobs": invalid,
            "points": summaries,
            "files": {
                "runs": RUNS_FILE,
                "steps": self.steps_writer.as_ref().map(|_| STEPS_FILE),
            }
        });

        let file = File::create(self.output_dir.join(SUMMARY_FILE))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
        Ok(())
    }
}

/// Reads rows written by [`OutputWriter`].
#[derive(Debug)]
pub struct OutputReader {
    output_dir: PathBuf,
}

impl OutputReader {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn from_dir(output_dir: &Path) -> Self {
        Self::new(output_dir)
    }

    pub fn read_runs(&self) -> Result<Vec<RunRow>, OutputError> {
        read_lines(&self.output_dir.join(RUNS_FILE), RunRow::from_jsonl)
    }

    /// Step rows, or an empty list when steps were not recorded.
    pub fn read_steps(&self) -> Result<Vec<StepRow>, OutputError> {
        let path = self.output_dir.join(STEPS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_lines(&path, StepRow::from_jsonl)
    }

    /// Recomputes per-point metrics from `runs.jsonl`.
    pub fn summarize(&self) -> Result<BTreeMap<String, MetricsSummary>, OutputError> {
        let mut collectors: BTreeMap<String, MetricsCollector> = BTreeMap::new();
        for row in self.read_runs()? {
            collectors.entry(row.label.clone()).or_default().record_row(&row);
        }
        Ok(collectors
            .into_iter()
            .map(|(label, collector)| (label, collector.generate_summary()))
            .collect())
    }
}

fn read_lines<T>(
    path: &Path,
    parse: impl Fn(&str) -> Result<T, serde_json::Error>,
) -> Result<Vec<T>, OutputError> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines() {
        if !line.trim().is_empty() {
            rows.push(parse(line)?);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::{run_experiment, ExperimentConfig, NetworkSpec};
    use tempfile::tempdir;

    fn make_run(seed: u64) -> RunResult {
        let config = ExperimentConfig {
            network: NetworkSpec::random(15, 0.3),
            ..Default::default()
        };
        run_experiment(&config, seed).unwrap()
    }

    #[test]
    fn test_output_writer_creation() {
        let dir = tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), false).unwrap();

        assert_eq!(writer.runs_written(), 0);
        assert_eq!(writer.output_dir(), dir.path());
        assert!(dir.path().join(RUNS_FILE).exists());
        assert!(!dir.path().join(STEPS_FILE).exists());
    }

    #[test]
    fn test_write_and_read_runs() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path(), true).unwrap();
        let runs = [make_run(1), make_run(2)];

        writer.write_run("a", &runs[0]).unwrap();
        writer.write_run("b", &runs[1]).unwrap();
        writer.flush().unwrap();

        let reader = OutputReader::from_dir(dir.path());
        let rows = reader.read_runs().unwrap();
        assert_eq!(rows, vec![runs[0].run_row("a"), runs[1].run_row("b")]);

        let steps = reader.read_steps().unwrap();
        let expected = runs[0].records().len() + runs[1].records().len();
        assert_eq!(steps.len(), expected);
        assert_eq!(steps[0].label, "a");
    }

    #[test]
    fn test_read_steps_when_not_recorded() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path(), false).unwrap();
        writer.write_run("a", &make_run(1)).unwrap();
        writer.flush().unwrap();

        assert!(OutputReader::from_dir(dir.path()).read_steps().unwrap().is_empty());
    }

    #[test]
    fn test_output_writer_summary() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path(), false).unwrap();
        let run = make_run(3);
        writer.write_run("base", &run).unwrap();
        writer.flush().unwrap();

        let summaries = gov_core::aggregate_by_key([("base".to_string(), &run)]);
        let invalid = [InvalidJob {
            label: "base".to_string(),
            point: 0,
            seed: 9,
            reason: "too sparse".to_string(),
        }];
        writer.write_summary(&summaries, 4, &invalid).unwrap();

        let content = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        assert!(content.contains("\"runs_written\": 1"));
        assert!(content.contains("\"runs_skipped\": 4"));
        assert!(content.contains("too sparse"));
        assert!(content.contains("runs.jsonl"));

        let reread = OutputReader::from_dir(dir.path()).summarize().unwrap();
        assert_eq!(reread["base"].runs, 1);
        assert_eq!(reread["base"].converged, summaries["base"].converged);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dir = tempdir().unwrap();
        let row = make_run(5).run_row("x");
        fs::write(
            dir.path().join(RUNS_FILE),
            format!("{}\n\n{}\n", row.to_jsonl().unwrap(), row.to_jsonl().unwrap()),
        )
        .unwrap();

        assert_eq!(OutputReader::from_dir(dir.path()).read_runs().unwrap().len(), 2);
    }

    #[test]
    fn test_output_error_display() {
        let io_err = OutputError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "test error",
        ));
        assert!(io_err.to_string().contains("I/O error"));

        let json_err = OutputError::Json(RunRow::from_jsonl("not valid json {{{").unwrap_err());
        assert!(json_err.to_string().contains("JSON error"));
    }
}
