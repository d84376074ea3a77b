pub mod report;
pub mod share;

use crate::analyzer::report::{NEAR_LEADER_THRESHOLD, YearSummary};
use crate::analyzer::share::ShareTable;
use crate::config::RunConfig;
use crate::loader::record::PlayEvent;
use anyhow::{Context, Result};
use tracing::info;

pub fn analyze_year(config: &RunConfig, events: &[PlayEvent]) -> Result<(ShareTable, YearSummary)> {
    let table = share::build_share_table(events, config.year, config.group)
        .with_context(|| format!("Failed to build {} share table", config.group))?;
    let summary = report::build_year_summary(&table, NEAR_LEADER_THRESHOLD);

    info!(
        year = config.year,
        group = %config.group,
        entities = table.entities().len(),
        dates = table.dates().len(),
        daily_rows = table.daily_aggregates().len(),
        leaders = summary.ever_leaders.len(),
        "listening share computed"
    );

    Ok((table, summary))
}
