//! CLI commands for the betting engine.

pub mod evaluate;
pub mod grade;
pub mod report;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use grade::{run_grade, GradeArgs};
pub use report::{run_report, ReportArgs};

use anyhow::{Context, Result};
use betedge_core::{ConfigLoader, EngineConfig};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Loads engine config, with an optional profile overlay.
fn load_config(path: &Path, profile: Option<&str>) -> Result<EngineConfig> {
    match profile {
        Some(profile) => ConfigLoader::load_with_profile(path, profile),
        None => ConfigLoader::load(path),
    }
}

/// Parses an RFC 3339 timestamp, defaulting to now.
fn parse_time(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid RFC 3339 timestamp: {raw}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
