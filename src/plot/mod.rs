use crate::analyzer::report::first_occurrences;
use crate::analyzer::share::ShareTable;
use crate::config::{Group, RunConfig};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CHART_WIDTH: i32 = 1500;
const CHART_HEIGHT: i32 = 750;
const LEGEND_COLUMNS: usize = 9;
const LEGEND_ROW_HEIGHT: i32 = 24;
const LEGEND_LABEL_CHARS: usize = 20;

pub fn output_path(output_dir: &Path, year: i32, group: Group) -> PathBuf {
    output_dir.join(format!("{year}_streaming_{group}.png"))
}

// January is skipped: a handful of early plays can put anyone on top.
pub fn qualifying_entities(table: &ShareTable, cutoff: f64) -> Vec<String> {
    first_occurrences(
        table
            .rows()
            .iter()
            .filter(|row| row.date.month() > 1 && row.share >= cutoff)
            .map(|row| row.entity.as_str()),
    )
}

pub fn render_share_chart(table: &ShareTable, config: &RunConfig) -> Result<PathBuf> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let path = output_path(&config.output_dir, table.year, table.group);
    let entities = qualifying_entities(table, config.cutoff);

    if entities.is_empty() {
        warn!(
            cutoff = config.cutoff,
            group = %table.group,
            "nothing reached the cutoff after January; the chart will have no lines"
        );
    }

    draw_chart(table, &entities, &path)
        .with_context(|| format!("Failed to render chart: {}", path.display()))?;

    info!(path = %path.display(), lines = entities.len(), "chart saved");
    Ok(path)
}

fn draw_chart(table: &ShareTable, entities: &[String], path: &Path) -> Result<()> {
    let year = table.year;
    let legend_rows = entities.len().div_ceil(LEGEND_COLUMNS).max(1) as i32;
    let legend_height = 48 + legend_rows * LEGEND_ROW_HEIGHT;

    let root = BitMapBackend::new(path, (CHART_WIDTH as u32, (CHART_HEIGHT + legend_height) as u32))
        .into_drawing_area();
    root.fill(&WHITE)?;
    let (chart_area, legend_area) = root.split_vertically(CHART_HEIGHT);

    let days_in_year = NaiveDate::from_ymd_opt(year, 12, 31)
        .with_context(|| format!("Invalid year: {year}"))?
        .ordinal() as i32;

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(
            format!("{year} listening share of the top {}", table.group.singular()),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (0..days_in_year).with_key_points(month_starts(year)),
            0f64..1.05f64,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|day| month_label(year, *day))
        .y_desc(format!(
            "Minutes normalized by top {} minutes",
            table.group.singular()
        ))
        .draw()?;

    for (index, entity) in entities.iter().enumerate() {
        let points = table
            .series(entity)
            .map(|row| (row.date.ordinal0() as i32, row.share))
            .collect::<Vec<_>>();

        chart.draw_series(LineSeries::new(
            points,
            Palette99::pick(index).stroke_width(2),
        ))?;
    }

    legend_area.draw(&Text::new(
        table.group.title(),
        (CHART_WIDTH / 2 - 30, 8),
        ("sans-serif", 18),
    ))?;

    let column_width = CHART_WIDTH / LEGEND_COLUMNS as i32;
    for (index, entity) in entities.iter().enumerate() {
        let x = 20 + (index % LEGEND_COLUMNS) as i32 * column_width;
        let y = 44 + (index / LEGEND_COLUMNS) as i32 * LEGEND_ROW_HEIGHT;

        legend_area.draw(&PathElement::new(
            vec![(x, y), (x + 20, y)],
            Palette99::pick(index).stroke_width(3),
        ))?;
        legend_area.draw(&Text::new(
            legend_label(entity),
            (x + 26, y - 8),
            ("sans-serif", 14),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn month_starts(year: i32) -> Vec<i32> {
    (1..=12)
        .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1))
        .map(|date| date.ordinal0() as i32)
        .collect()
}

fn month_label(year: i32, day: i32) -> String {
    u32::try_from(day + 1)
        .ok()
        .and_then(|ordinal| NaiveDate::from_yo_opt(year, ordinal))
        .map(|date| date.format("%b").to_string())
        .unwrap_or_default()
}

fn legend_label(entity: &str) -> String {
    if entity.chars().count() <= LEGEND_LABEL_CHARS {
        return entity.to_string();
    }

    let truncated = entity
        .chars()
        .take(LEGEND_LABEL_CHARS - 1)
        .collect::<String>();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::{legend_label, month_label, month_starts, output_path, qualifying_entities};
    use crate::analyzer::report::ever_leaders;
    use crate::analyzer::share::build_share_table;
    use crate::analyzer::share::tests::play;
    use crate::config::Group;
    use std::path::{Path, PathBuf};

    fn table() -> crate::analyzer::share::ShareTable {
        let events = vec![
            play("2022-01-01 09:00", 5.0, "Early"),
            play("2022-01-05 09:00", 100.0, "January Star"),
            play("2022-01-06 09:00", 10.0, "Steady"),
            play("2022-02-01 09:00", 100.0, "Steady"),
            play("2022-03-01 09:00", 1.0, "Minor"),
        ];

        build_share_table(&events, 2022, Group::Artists).expect("table")
    }

    #[test]
    fn output_path_encodes_year_and_group() {
        assert_eq!(
            output_path(Path::new("../output"), 2022, Group::Albums),
            PathBuf::from("../output/2022_streaming_albums.png")
        );
    }

    #[test]
    fn january_shares_do_not_qualify() {
        let table = table();

        assert!(ever_leaders(&table).contains(&"Early".to_string()));
        assert_eq!(
            qualifying_entities(&table, 0.33),
            vec!["January Star", "Steady"]
        );
    }

    #[test]
    fn full_cutoff_keeps_only_later_leaders() {
        let table = table();

        assert_eq!(qualifying_entities(&table, 1.0), vec!["Steady"]);
    }

    #[test]
    fn tiny_cutoff_keeps_everyone_seen_after_january() {
        let table = table();

        assert_eq!(
            qualifying_entities(&table, 0.001),
            vec!["Early", "January Star", "Steady", "Minor"]
        );
    }

    #[test]
    fn chart_order_follows_first_qualifying_date() {
        let events = vec![
            play("2022-02-01 09:00", 10.0, "Zeal"),
            play("2022-02-01 10:00", 1.0, "Aurora"),
            play("2022-03-01 09:00", 20.0, "Aurora"),
        ];
        let table = build_share_table(&events, 2022, Group::Artists).expect("table");

        assert_eq!(qualifying_entities(&table, 0.5), vec!["Zeal", "Aurora"]);
    }

    #[test]
    fn january_only_year_has_nothing_to_plot() {
        let events = vec![
            play("2022-01-01 09:00", 10.0, "A"),
            play("2022-01-20 09:00", 30.0, "B"),
        ];
        let table = build_share_table(&events, 2022, Group::Artists).expect("table");

        assert!(qualifying_entities(&table, 0.33).is_empty());
        assert!(qualifying_entities(&table, 0.001).is_empty());
    }

    #[test]
    fn month_axis_uses_month_starts() {
        let starts = month_starts(2024);

        assert_eq!(starts.len(), 12);
        assert_eq!(starts[0], 0);
        assert_eq!(starts[2], 60);
        assert_eq!(month_label(2024, starts[2]), "Mar");
        assert_eq!(month_label(2022, 364), "Dec");
        assert_eq!(month_label(2022, 365), "");
    }

    #[test]
    fn long_legend_labels_are_shortened() {
        assert_eq!(legend_label("Bonobo"), "Bonobo");
        assert_eq!(
            legend_label("An Awesome Wave (Deluxe Edition)").chars().count(),
            20
        );
    }
}
