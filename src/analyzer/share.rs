use crate::config::Group;
use crate::error::AnalysisError;
use crate::loader::record::PlayEvent;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub entity: String,
    pub date: NaiveDate,
    pub minutes_played: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareRow {
    pub date: NaiveDate,
    pub entity: String,
    pub minutes_played: f64,
    pub cumulative_minutes: f64,
    pub leader_minutes: f64,
    pub is_leader: bool,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLeader {
    pub date: NaiveDate,
    pub minutes: f64,
    pub entities: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ShareTable {
    pub year: i32,
    pub group: Group,
    daily: Vec<DailyAggregate>,
    dates: Vec<NaiveDate>,
    entities: Vec<String>,
    rows: Vec<ShareRow>,
    leaders: Vec<DailyLeader>,
}

impl ShareTable {
    pub fn rows(&self) -> &[ShareRow] {
        &self.rows
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn leaders(&self) -> &[DailyLeader] {
        &self.leaders
    }

    pub fn daily_aggregates(&self) -> &[DailyAggregate] {
        &self.daily
    }

    pub fn series<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a ShareRow> + 'a {
        self.rows.iter().filter(move |row| row.entity == entity)
    }

    pub fn total_minutes(&self) -> f64 {
        self.daily.iter().map(|row| row.minutes_played).sum()
    }
}

pub fn build_share_table(
    events: &[PlayEvent],
    year: i32,
    group: Group,
) -> Result<ShareTable, AnalysisError> {
    let in_year = events
        .iter()
        .filter(|event| event.end_time.is_some_and(|time| time.year() == year))
        .collect::<Vec<_>>();

    let daily = aggregate_daily(&in_year, group);
    if daily.is_empty() {
        return Err(AnalysisError::EmptyResult { year });
    }

    let dates = daily
        .iter()
        .map(|row| row.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    let entities = daily
        .iter()
        .map(|row| row.entity.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();

    let mut rows = densify(&daily, &dates, &entities);
    let leaders = annotate_leaders(&mut rows);

    debug!(
        year,
        plays = in_year.len(),
        dates = dates.len(),
        entities = entities.len(),
        "share table built"
    );

    Ok(ShareTable {
        year,
        group,
        daily,
        dates,
        entities,
        rows,
        leaders,
    })
}

pub fn aggregate_daily(events: &[&PlayEvent], group: Group) -> Vec<DailyAggregate> {
    let totals = events
        .iter()
        .filter_map(|event| {
            let entity = event.entity(group)?;
            let date = event.end_time?.date();
            Some((entity, date, event.minutes_played()))
        })
        .fold(HashMap::new(), |mut acc, (entity, date, minutes)| {
            let entry = acc.entry((entity.to_string(), date)).or_insert(0.0_f64);
            *entry += minutes;
            acc
        });

    let mut daily = totals
        .into_iter()
        .map(|((entity, date), minutes_played)| DailyAggregate {
            entity,
            date,
            minutes_played,
        })
        .collect::<Vec<_>>();

    daily.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| right.minutes_played.total_cmp(&left.minutes_played))
            .then_with(|| left.entity.cmp(&right.entity))
    });
    daily
}

fn densify(daily: &[DailyAggregate], dates: &[NaiveDate], entities: &[String]) -> Vec<ShareRow> {
    let played = daily
        .iter()
        .map(|row| ((row.date, row.entity.as_str()), row.minutes_played))
        .collect::<HashMap<_, _>>();
    let mut running = HashMap::<&str, f64>::with_capacity(entities.len());

    dates
        .iter()
        .flat_map(|date| entities.iter().map(move |entity| (*date, entity)))
        .map(|(date, entity)| {
            let minutes_played = played
                .get(&(date, entity.as_str()))
                .copied()
                .unwrap_or_default();
            let cumulative = running.entry(entity.as_str()).or_insert(0.0);
            *cumulative += minutes_played;

            ShareRow {
                date,
                entity: entity.clone(),
                minutes_played,
                cumulative_minutes: *cumulative,
                leader_minutes: 0.0,
                is_leader: false,
                share: 0.0,
            }
        })
        .collect()
}

// Rows must be grouped by date.
fn annotate_leaders(rows: &mut [ShareRow]) -> Vec<DailyLeader> {
    rows.chunk_by_mut(|left, right| left.date == right.date)
        .map(|day| {
            let leader_minutes = day
                .iter()
                .map(|row| row.cumulative_minutes)
                .fold(f64::NEG_INFINITY, f64::max);

            day.iter_mut().for_each(|row| {
                row.leader_minutes = leader_minutes;
                row.is_leader = row.cumulative_minutes == leader_minutes;
                row.share = if leader_minutes > 0.0 {
                    row.cumulative_minutes / leader_minutes
                } else {
                    1.0
                };
            });

            DailyLeader {
                date: day[0].date,
                minutes: leader_minutes,
                entities: day
                    .iter()
                    .filter(|row| row.is_leader)
                    .map(|row| row.entity.clone())
                    .collect(),
            }
        })
        .collect()
}
