use crate::types::{
    ChartPoint, ChartRow, DashboardSummary, DateRange, Metrics, PersonStats, PersonSummaryRow,
    Record,
};
use crate::util::{average, date_key, display_date, format_number};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Aggregate statistics over any set of records. Empty input gives zeros and
/// an empty date range.
pub fn calculate_metrics(records: &[Record]) -> Metrics {
    if records.is_empty() {
        return Metrics::default();
    }
    let distances: Vec<f64> = records.iter().map(|r| r.distance).collect();
    let total_distance: f64 = distances.iter().sum();
    let min_distance = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let max_distance = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = records.iter().map(|r| r.date).min();
    let end = records.iter().map(|r| r.date).max();

    Metrics {
        total_distance,
        average_distance: average(&distances),
        min_distance,
        max_distance,
        run_count: records.len(),
        date_range: DateRange { start, end },
    }
}

/// Length of the active period in whole days, rounded up. `None` for an
/// empty range.
pub fn active_period_days(range: &DateRange) -> Option<i64> {
    let (start, end) = (range.start?, range.end?);
    let secs = (end - start).num_seconds();
    Some((secs + 86_399).div_euclid(86_400))
}

/// Per-person statistics, largest total first. Ties keep the order in which
/// people first appear.
pub fn calculate_person_stats(records: &[Record]) -> Vec<PersonStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Record>)> = Vec::new();
    for r in records {
        let slot = *index.entry(r.person.as_str()).or_insert_with(|| {
            groups.push((r.person.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(r.clone());
    }

    let grand_total: f64 = records.iter().map(|r| r.distance).sum();
    let mut stats: Vec<PersonStats> = groups
        .into_iter()
        .map(|(person, person_records)| {
            let metrics = calculate_metrics(&person_records);
            let percentage_of_total = if grand_total > 0.0 {
                metrics.total_distance / grand_total * 100.0
            } else {
                0.0
            };
            PersonStats {
                person,
                metrics,
                records: person_records,
                percentage_of_total,
            }
        })
        .collect();

    // `sort_by` is stable, so equal totals stay in first-seen order.
    stats.sort_by(|a, b| {
        b.metrics
            .total_distance
            .partial_cmp(&a.metrics.total_distance)
            .unwrap_or(Ordering::Equal)
    });
    stats
}

/// Pivot records into one point per calendar date, ascending. Several runs
/// by the same person on one date are summed.
pub fn prepare_chart_data(records: &[Record]) -> Vec<ChartPoint> {
    let mut by_date: BTreeMap<String, ChartPoint> = BTreeMap::new();
    for r in records {
        let key = date_key(&r.date);
        let point = by_date.entry(key.clone()).or_insert_with(|| ChartPoint {
            iso_date: key,
            display_date: display_date(&r.date),
            distances: BTreeMap::new(),
        });
        *point.distances.entry(r.person.clone()).or_insert(0.0) += r.distance;
    }
    by_date.into_values().collect()
}

/// Distinct people in the order they first appear.
pub fn unique_people(records: &[Record]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.person.as_str()))
        .map(|r| r.person.clone())
        .collect()
}

pub fn generate_dashboard_summary(records: &[Record]) -> DashboardSummary {
    DashboardSummary {
        overall_metrics: calculate_metrics(records),
        person_stats: calculate_person_stats(records),
        chart_data: prepare_chart_data(records),
        unique_people: unique_people(records),
        total_records: records.len(),
    }
}

pub fn person_summary_rows(stats: &[PersonStats]) -> Vec<PersonSummaryRow> {
    let day = |d: Option<chrono::NaiveDateTime>| d.map(|d| date_key(&d)).unwrap_or_default();
    stats
        .iter()
        .enumerate()
        .map(|(idx, s)| PersonSummaryRow {
            rank: idx + 1,
            person: s.person.clone(),
            total_miles: format_number(s.metrics.total_distance, 2),
            avg_miles: format_number(s.metrics.average_distance, 2),
            min_miles: format_number(s.metrics.min_distance, 2),
            max_miles: format_number(s.metrics.max_distance, 2),
            runs: s.metrics.run_count,
            share_of_total: format!("{:.1}%", s.percentage_of_total),
            first_run: day(s.metrics.date_range.start),
            last_run: day(s.metrics.date_range.end),
        })
        .collect()
}

/// Flatten chart points into fixed columns following `people`.
pub fn chart_rows(points: &[ChartPoint], people: &[String]) -> Vec<ChartRow> {
    points
        .iter()
        .map(|p| ChartRow {
            date: p.iso_date.clone(),
            display_date: p.display_date.clone(),
            cells: people.iter().map(|name| p.distances.get(name).copied()).collect(),
        })
        .collect()
}
