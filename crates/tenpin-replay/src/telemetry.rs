use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const TURN_TARGET: &str = "tenpin_core::turn";
pub const GAME_TARGET: &str = "tenpin_replay::game";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub turns: TurnTelemetrySummary,
    pub games: GameTelemetrySummary,
}

/// Counts of session actions seen in the log.
#[derive(Debug, Default, Serialize)]
pub struct TurnTelemetrySummary {
    pub count: usize,
    pub actions: BTreeMap<String, usize>,
    pub ignored: BTreeMap<String, usize>,
    pub completions: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct GameTelemetrySummary {
    pub count: usize,
    pub avg_total: Option<f64>,
}

/// Aggregate turn and game events from a JSON telemetry log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut summary = TelemetrySummary::default();
    let mut total_sum = 0.0f64;

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match target {
            TURN_TARGET => {
                let turns = &mut summary.turns;
                turns.count += 1;
                let action = label(fields.get("action"));
                *turns.actions.entry(action).or_insert(0) += 1;
                if let Some(reason) = fields.get("ignored") {
                    *turns.ignored.entry(label(Some(reason))).or_insert(0) += 1;
                }
                if fields.get("completed").and_then(Value::as_bool) == Some(true) {
                    turns.completions += 1;
                }
            }
            GAME_TARGET => {
                summary.games.count += 1;
                if let Some(total) = fields.get("total").and_then(Value::as_f64) {
                    total_sum += total;
                }
            }
            _ => {}
        }
    }

    if summary.games.count > 0 {
        summary.games.avg_total = Some(total_sum / summary.games.count as f64);
    }
    Ok(summary)
}

fn label(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("<unset>")
        .to_string()
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(
        &json_path,
        serde_json::to_vec_pretty(&summary).map_err(TelemetryError::from)?,
    )
    .map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary json",
        source,
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let turns = &outputs.summary.turns;
    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    section.push_str(&format!("- Turn events captured: {}\n", turns.count));
    section.push_str(&format!("- Games completed: {}\n", turns.completions));
    if let Some(value) = outputs.summary.games.avg_total {
        section.push_str(&format!("- Avg logged total: {:.1}\n", value));
    }
    section.push_str(&counts_section("Actions", &turns.actions));
    section.push_str(&counts_section("Ignored Actions", &turns.ignored));

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn counts_section(title: &str, counts: &BTreeMap<String, usize>) -> String {
    let mut section = format!("\n### {title}\n");
    if counts.is_empty() {
        section.push_str("- <none>\n");
    } else {
        for (label, count) in counts {
            section.push_str(&format!("- {}: {}\n", label, count));
        }
    }
    section
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push_str(&format!("- Turn events: {}\n", summary.turns.count));
    output.push_str(&format!("- Game events: {}\n", summary.games.count));
    output.push_str(&counts_section("Actions", &summary.turns.actions));
    output.push_str(&counts_section("Ignored Actions", &summary.turns.ignored));
    output
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    #[test]
    fn summarises_turn_and_game_events() {
        let lines = vec![
            r#"{"level":"DEBUG","target":"tenpin_core::turn","fields":{"action":"strike_or_spare","frame":1,"throw":1,"next_frame":2,"next_throw":1}}"#,
            r#"{"level":"DEBUG","target":"tenpin_core::turn","fields":{"action":"undo","ignored":"at_start"}}"#,
            r#"{"level":"DEBUG","target":"tenpin_core::turn","fields":{"action":"commit","frame":10,"throw":2,"completed":true}}"#,
            r#"{"level":"INFO","target":"tenpin_replay::game","fields":{"total":180,"session":"clean"}}"#,
            r#"{"level":"INFO","target":"tenpin_replay::game","fields":{"total":120,"session":"sim"}}"#,
            r#"{"level":"INFO","target":"something_else","fields":{}}"#,
        ];
        let file = write_temp_file(&lines);
        let summary = summarise_telemetry(file.path()).expect("summarise");
        assert_eq!(summary.turns.count, 3);
        assert_eq!(summary.turns.actions.get("undo"), Some(&1));
        assert_eq!(summary.turns.actions.get("strike_or_spare"), Some(&1));
        assert_eq!(summary.turns.ignored.get("at_start"), Some(&1));
        assert_eq!(summary.turns.completions, 1);
        assert_eq!(summary.games.count, 2);
        assert_eq!(summary.games.avg_total, Some(150.0));
    }

    #[test]
    fn handles_missing_file() {
        let path = Path::new("tests/does/not/exist.jsonl");
        let summary = summarise_telemetry(path).expect("summarise missing file");
        assert_eq!(summary.turns.count, 0);
        assert!(summary.games.avg_total.is_none());
        assert!(summary.turns.actions.is_empty());
    }

    #[test]
    fn appends_highlights_to_summary_markdown() {
        let mut summary_file = tempfile::NamedTempFile::new().expect("summary temp file");
        write!(summary_file, "# Replay Summary\n").expect("seed summary content");

        let mut actions = BTreeMap::new();
        actions.insert("commit".to_string(), 12);
        let mut ignored = BTreeMap::new();
        ignored.insert("pin_not_standing".to_string(), 2);

        let outputs = TelemetryOutputs {
            summary: TelemetrySummary {
                turns: TurnTelemetrySummary {
                    count: 14,
                    actions,
                    ignored,
                    completions: 1,
                },
                games: GameTelemetrySummary {
                    count: 1,
                    avg_total: Some(187.0),
                },
            },
            json_path: PathBuf::from("telemetry_summary.json"),
            markdown_path: PathBuf::from("telemetry_summary.md"),
        };

        append_highlights_to_markdown(summary_file.path(), &outputs).expect("append highlights");

        let contents = std::fs::read_to_string(summary_file.path()).expect("read summary file");
        assert!(contents.starts_with("# Replay Summary"));
        assert!(contents.contains("## Telemetry Highlights"));
        assert!(contents.contains("Turn events captured: 14"));
        assert!(contents.contains("Avg logged total: 187.0"));
        assert!(contents.contains("- commit: 12"));
        assert!(contents.contains("### Ignored Actions"));
        assert!(contents.contains("- pin_not_standing: 2"));
    }
}
