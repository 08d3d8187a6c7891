use super::activity::{monthly_activity, CategoryActivitySeries};
use super::domain::Interval;
use super::layout::{build_layout, TimelineLayout};
use super::months::{month_grid, year_boundaries};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Why a report came back with nothing to show. Distinct from a populated
/// report with zero-valued series so the caller can render an explicit
/// "nothing selected" state instead of an empty chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoCategoriesSelected,
    NoMatchingIntervals,
}

impl EmptyReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoCategoriesSelected => "no categories selected",
            Self::NoMatchingIntervals => "no contracts match the selected categories",
        }
    }
}

/// Headline figures for the selected slice of the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub contracts: usize,
    pub persons: usize,
    pub categories: usize,
    pub first_start: NaiveDate,
    pub last_end: NaiveDate,
}

/// Per-category roll-up: contract count, distinct persons, mean duration.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub contracts: usize,
    pub persons: usize,
    pub mean_duration_days: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineReportData {
    pub stats: DatasetStats,
    pub activity: Vec<CategoryActivitySeries>,
    pub activity_year_boundaries: Vec<i32>,
    pub layout: TimelineLayout,
    pub layout_year_boundaries: Vec<i32>,
    pub summaries: Vec<CategorySummary>,
}

/// Everything the rendering layer needs for one invocation, or an explicit
/// empty outcome. Building a report is pure: same intervals and selection,
/// same report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimelineReport {
    Empty { reason: EmptyReason },
    Populated(TimelineReportData),
}

impl TimelineReport {
    /// Builds both views over the sanitized intervals, restricted to the
    /// selected categories in the caller's order.
    pub fn build(intervals: &[Interval], categories: &[String]) -> Self {
        // Intervals must come from the sanitizer; anything else is a
        // programming error, not a data condition.
        debug_assert!(
            intervals
                .iter()
                .all(|interval| interval.start <= interval.end),
            "unsanitized interval reached report construction"
        );

        if categories.is_empty() {
            return Self::Empty {
                reason: EmptyReason::NoCategoriesSelected,
            };
        }

        let scoped: Vec<Interval> = intervals
            .iter()
            .filter(|interval| categories.contains(&interval.category))
            .cloned()
            .collect();

        if scoped.is_empty() {
            return Self::Empty {
                reason: EmptyReason::NoMatchingIntervals,
            };
        }

        let activity = monthly_activity(&scoped, categories);

        // Year markers for the aggregated view follow its month grid extent;
        // the detailed view follows the raw date extent. The two are computed
        // independently on purpose.
        let grid = month_grid(&scoped);
        let activity_year_boundaries = match (grid.first(), grid.last()) {
            (Some(&first), Some(&last)) => year_boundaries(first, last),
            _ => Vec::new(),
        };

        let layout = build_layout(&scoped, categories);

        let stats = dataset_stats(&scoped);
        let layout_year_boundaries = year_boundaries(stats.first_start, stats.last_end);
        let summaries = category_summaries(&scoped, categories);

        Self::Populated(TimelineReportData {
            stats,
            activity,
            activity_year_boundaries,
            layout,
            layout_year_boundaries,
            summaries,
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// The sorted distinct categories of a sanitized dataset. Callers use this
/// to offer a selection and to default it to "everything".
pub fn available_categories(intervals: &[Interval]) -> Vec<String> {
    let mut categories: Vec<String> = intervals
        .iter()
        .map(|interval| interval.category.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    categories.sort();
    categories
}

fn dataset_stats(scoped: &[Interval]) -> DatasetStats {
    let mut first_start = scoped[0].start;
    let mut last_end = scoped[0].end;
    let mut persons: HashSet<&str> = HashSet::new();
    let mut categories: HashSet<&str> = HashSet::new();

    for interval in scoped {
        first_start = first_start.min(interval.start);
        last_end = last_end.max(interval.end);
        persons.insert(interval.person_id.as_str());
        categories.insert(interval.category.as_str());
    }

    DatasetStats {
        contracts: scoped.len(),
        persons: persons.len(),
        categories: categories.len(),
        first_start,
        last_end,
    }
}

fn category_summaries(scoped: &[Interval], categories: &[String]) -> Vec<CategorySummary> {
    categories
        .iter()
        .filter_map(|category| {
            let members: Vec<&Interval> = scoped
                .iter()
                .filter(|interval| &interval.category == category)
                .collect();
            if members.is_empty() {
                return None;
            }

            let persons: HashSet<&str> =
                members.iter().map(|m| m.person_id.as_str()).collect();
            let total_days: i64 = members.iter().map(|m| m.duration_days).sum();
            let mean = total_days as f64 / members.len() as f64;

            Some(CategorySummary {
                category: category.clone(),
                contracts: members.len(),
                persons: persons.len(),
                mean_duration_days: (mean * 10.0).round() / 10.0,
            })
        })
        .collect()
}
