//! Replay of recorded readings.
//!
//! A replay file holds one JSON payload per line, as captured from the
//! broker. Every line is ingested in order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use weatherwatch_engine::Ingestor;

/// Counts from one replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    /// Non-empty lines read.
    pub lines: u64,
    pub accepted: u64,
    pub dropped: u64,
}

/// Ingest every line of the file at `path`.
pub fn replay(path: &Path, ingestor: &Ingestor) -> Result<ReplaySummary> {
    let file =
        File::open(path).with_context(|| format!("Failed to open replay file {}", path.display()))?;
    let summary = replay_reader(BufReader::new(file), ingestor)
        .with_context(|| format!("Failed to read replay file {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        lines = summary.lines,
        accepted = summary.accepted,
        dropped = summary.dropped,
        "replay finished"
    );
    Ok(summary)
}

/// Ingest every non-empty line of `reader`.
pub fn replay_reader<R: BufRead>(reader: R, ingestor: &Ingestor) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for line in reader.split(b'\n') {
        let line = line?;
        let payload = line.trim_ascii();
        if payload.is_empty() {
            continue;
        }
        summary.lines += 1;
        if ingestor.ingest(payload).is_accepted() {
            summary.accepted += 1;
        } else {
            summary.dropped += 1;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use weatherwatch_engine::{StationStatus, StationStore};

    #[test]
    fn replays_file_line_by_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"stationId":"A","temperature":"20.5","humidity":"50","timestamp":"2024-01-02T12:34:56Z"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, r#"{{"stationId":"B","temperature":-999,"humidity":50}}"#).unwrap();

        let ingestor = Ingestor::new(StationStore::default());
        let summary = replay(file.path(), &ingestor).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                lines: 3,
                accepted: 2,
                dropped: 1
            }
        );

        let snapshot = ingestor.store().snapshot();
        assert_eq!(snapshot.get("A").unwrap().status, StationStatus::Ok);
        assert_eq!(snapshot.get("B").unwrap().status, StationStatus::Invalid);
    }

    #[test]
    fn invalid_utf8_lines_do_not_abort_replay() {
        let mut data = br#"{"stationId":"A","temperature":1,"humidity":1}"#.to_vec();
        data.extend_from_slice(b"\n\xff\xfe\n");

        let ingestor = Ingestor::new(StationStore::default());
        let summary = replay_reader(Cursor::new(data), &ingestor).unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let ingestor = Ingestor::new(StationStore::default());
        let err = replay(Path::new("/nonexistent/readings.jsonl"), &ingestor).unwrap_err();
        assert!(err.to_string().contains("Failed to open replay file"));
    }
}
