//! Output formatting and persistence for derived results.
//!
//! Supports pretty-printing, JSON serialization, CSV append for stats rows,
//! and JSON files for derived series.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::stats::SampleStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a result using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a result as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`SampleStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &SampleStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}

/// Writes a derived series (or any serializable result) to a JSON file,
/// creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    debug!(path, "Wrote JSON output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SampleStats;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let stats = SampleStats::default();
        print_pretty(&stats);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let stats = SampleStats::default();
        print_json(&stats).unwrap();
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("commute_pulse_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let stats = SampleStats::default();
        append_record(&path, &stats).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("commute_pulse_test_header.csv");
        let _ = fs::remove_file(&path);

        let stats = SampleStats::default();
        append_record(&path, &stats).unwrap();
        append_record(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header line should appear exactly once
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_round_trips() {
        let path = temp_path("commute_pulse_test_series.json");
        let _ = fs::remove_file(&path);

        let stats = SampleStats::from_rows(&[]);
        write_json(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["total_rows"], 0);

        fs::remove_file(&path).unwrap();
    }
}
