use crate::analyzer::share::{DailyLeader, ShareTable};
use crate::config::Group;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const NEAR_LEADER_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub group: Group,
    pub ever_leaders: Vec<String>,
    pub near_leaders: Vec<String>,
    pub threshold: f64,
    pub final_leaders: Vec<String>,
    pub total_minutes: f64,
    pub daily_leaders: Vec<DailyLeader>,
}

pub fn build_year_summary(table: &ShareTable, threshold: f64) -> YearSummary {
    YearSummary {
        year: table.year,
        group: table.group,
        ever_leaders: ever_leaders(table),
        near_leaders: near_leaders(table, threshold),
        threshold,
        final_leaders: table
            .leaders()
            .last()
            .map(|leader| leader.entities.clone())
            .unwrap_or_default(),
        total_minutes: table.total_minutes(),
        daily_leaders: table.leaders().to_vec(),
    }
}

pub fn ever_leaders(table: &ShareTable) -> Vec<String> {
    first_occurrences(
        table
            .rows()
            .iter()
            .filter(|row| row.is_leader)
            .map(|row| row.entity.as_str()),
    )
}

pub fn near_leaders(table: &ShareTable, threshold: f64) -> Vec<String> {
    first_occurrences(
        table
            .rows()
            .iter()
            .filter(|row| row.share >= threshold)
            .map(|row| row.entity.as_str()),
    )
}

pub(crate) fn first_occurrences<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(ToOwned::to_owned)
        .collect()
}

pub fn render_summary(summary: &YearSummary) -> String {
    let title = summary.group.title();
    let singular = summary.group.singular();

    format!(
        "\n{title}s that were ever top {singular}:\n{}\n\n{title}s that ever reached {:.0}% of the top {singular}:\n{}\n\nTop {singular} at the end of {}: {}\nTotal listening in {}: {}\n",
        list_names(&summary.ever_leaders),
        summary.threshold * 100.0,
        list_names(&summary.near_leaders),
        summary.year,
        if summary.final_leaders.is_empty() {
            "None".to_string()
        } else {
            summary.final_leaders.join(", ")
        },
        summary.year,
        format_minutes(summary.total_minutes),
    )
}

pub fn summary_path(output_dir: &Path, year: i32, group: Group) -> PathBuf {
    output_dir.join(format!("{year}_streaming_{group}.json"))
}

pub fn save_summary(summary: &YearSummary, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let path = summary_path(output_dir, summary.year, summary.group);
    let json_content =
        serde_json::to_string_pretty(summary).context("Failed to serialize summary JSON")?;
    fs::write(&path, json_content)
        .with_context(|| format!("Failed to write summary JSON: {}", path.display()))?;

    Ok(path)
}

fn list_names(names: &[String]) -> String {
    if names.is_empty() {
        return "- None".to_string();
    }

    names
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_minutes(minutes: f64) -> String {
    let whole = minutes.max(0.0).round() as u64;
    let hours = whole / 60;
    let remain = whole % 60;

    if hours > 0 {
        format!("{whole} min ({hours}h {remain}m)")
    } else {
        format!("{whole} min")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NEAR_LEADER_THRESHOLD, build_year_summary, ever_leaders, near_leaders, render_summary,
        save_summary,
    };
    use crate::analyzer::share::build_share_table;
    use crate::analyzer::share::tests::play;
    use crate::config::Group;
    use std::fs;
    use tempfile::TempDir;

    fn table() -> crate::analyzer::share::ShareTable {
        let events = vec![
            play("2022-01-01 09:00", 10.0, "Zola Jesus"),
            play("2022-01-01 10:00", 9.0, "Arca"),
            play("2022-01-02 10:00", 5.0, "Arca"),
            play("2022-01-02 11:00", 1.0, "Mid"),
            play("2022-01-03 11:00", 20.0, "Late"),
        ];

        build_share_table(&events, 2022, Group::Artists).expect("table")
    }

    #[test]
    fn leaders_follow_first_occurrence_order() {
        let table = table();

        assert_eq!(ever_leaders(&table), vec!["Zola Jesus", "Arca", "Late"]);
    }

    #[test]
    fn near_leaders_use_threshold() {
        let table = table();

        assert_eq!(
            near_leaders(&table, NEAR_LEADER_THRESHOLD),
            vec!["Arca", "Zola Jesus", "Late"]
        );
        assert_eq!(near_leaders(&table, 1.0), ever_leaders(&table));
        assert_eq!(near_leaders(&table, 0.01).len(), 4);
    }

    #[test]
    fn near_leaders_are_not_alphabetical() {
        let events = vec![
            play("2022-01-01 09:00", 10.0, "B"),
            play("2022-01-01 10:00", 1.0, "A"),
            play("2022-01-02 10:00", 9.0, "A"),
        ];
        let table = build_share_table(&events, 2022, Group::Artists).expect("table");

        assert_eq!(near_leaders(&table, NEAR_LEADER_THRESHOLD), vec!["B", "A"]);
    }

    #[test]
    fn summary_renders_both_lists() {
        let summary = build_year_summary(&table(), NEAR_LEADER_THRESHOLD);
        let text = render_summary(&summary);

        assert_eq!(summary.final_leaders, vec!["Late"]);
        assert_eq!(summary.total_minutes, 45.0);
        assert!(text.contains("Artists that were ever top artist:\n- Zola Jesus\n- Arca\n- Late"));
        assert!(text.contains("Artists that ever reached 80% of the top artist:"));
        assert!(text.contains("Top artist at the end of 2022: Late"));
        assert!(text.contains("Total listening in 2022: 45 min"));
    }

    #[test]
    fn summary_is_saved_as_json_next_to_the_chart() {
        let dir = TempDir::new().expect("temp dir");
        let output_dir = dir.path().join("output");
        let summary = build_year_summary(&table(), NEAR_LEADER_THRESHOLD);

        let path = save_summary(&summary, &output_dir).expect("save summary");

        assert_eq!(path, output_dir.join("2022_streaming_artists.json"));
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read summary"))
                .expect("valid json");
        assert_eq!(saved["year"], 2022);
        assert_eq!(saved["group"], "artists");
        assert_eq!(saved["ever_leaders"][2], "Late");
        assert_eq!(saved["final_leaders"][0], "Late");
        assert_eq!(saved["daily_leaders"][0]["date"], "2022-01-01");
        assert_eq!(saved["daily_leaders"][0]["entities"][0], "Zola Jesus");
        assert_eq!(saved["daily_leaders"].as_array().map(Vec::len), Some(3));
    }
}
