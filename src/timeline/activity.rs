use super::domain::Interval;
use super::months::month_span;
use chrono::NaiveDate;
use serde::Serialize;

/// Active-contract counts for one category, sampled at the first day of each
/// month. `months` and `counts` are always the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryActivitySeries {
    pub category: String,
    pub months: Vec<NaiveDate>,
    pub counts: Vec<usize>,
}

impl CategoryActivitySeries {
    fn empty(category: &str) -> Self {
        Self {
            category: category.to_string(),
            months: Vec::new(),
            counts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Counts active contracts per month for each selected category, in the
/// caller's selection order.
///
/// The month grid covers the combined range of every selected category. A
/// contract is counted at month point `m` when `start <= m <= end`; the test
/// samples the month's first instant only, it is not a month-overlap test.
/// Selected categories with no surviving intervals yield an empty series.
pub fn monthly_activity(intervals: &[Interval], categories: &[String]) -> Vec<CategoryActivitySeries> {
    let scoped: Vec<&Interval> = intervals
        .iter()
        .filter(|interval| categories.contains(&interval.category))
        .collect();

    let earliest = scoped.iter().map(|interval| interval.start).min();
    let latest = scoped.iter().map(|interval| interval.end).max();
    let grid = match (earliest, latest) {
        (Some(min), Some(max)) => month_span(min, max),
        _ => Vec::new(),
    };

    categories
        .iter()
        .map(|category| {
            let members: Vec<&&Interval> = scoped
                .iter()
                .filter(|interval| &interval.category == category)
                .collect();

            if members.is_empty() {
                return CategoryActivitySeries::empty(category);
            }

            let counts = grid
                .iter()
                .map(|&month| {
                    members
                        .iter()
                        .filter(|interval| interval.start <= month && interval.end >= month)
                        .count()
                })
                .collect();

            CategoryActivitySeries {
                category: category.clone(),
                months: grid.clone(),
                counts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn interval(person: &str, category: &str, start: NaiveDate, end: NaiveDate) -> Interval {
        Interval {
            person_id: format!("{person:0>9}"),
            category: category.to_string(),
            start,
            end,
            duration_days: (end - start).num_days(),
        }
    }

    fn selection(categories: &[&str]) -> Vec<String> {
        categories.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn counts_contracts_active_at_month_starts() {
        let intervals = vec![
            interval("P1", "A", date(2020, 1, 10), date(2020, 3, 5)),
            interval("P2", "A", date(2020, 2, 1), date(2020, 2, 20)),
        ];

        let series = monthly_activity(&intervals, &selection(&["A"]));
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].months,
            vec![date(2020, 1, 1), date(2020, 2, 1), date(2020, 3, 1)]
        );
        // P1 has not yet started at the Jan 1 sampling point.
        assert_eq!(series[0].counts, vec![0, 2, 1]);
    }

    #[test]
    fn containment_is_closed_on_both_ends() {
        // Starts exactly on a month point and ends exactly on the next one.
        let intervals = vec![interval("P1", "A", date(2021, 4, 1), date(2021, 5, 1))];
        let series = monthly_activity(&intervals, &selection(&["A"]));
        assert_eq!(series[0].counts, vec![1, 1]);
    }

    #[test]
    fn grid_covers_combined_range_of_selection() {
        let intervals = vec![
            interval("P1", "A", date(2020, 1, 1), date(2020, 2, 15)),
            interval("P2", "B", date(2020, 4, 1), date(2020, 5, 10)),
        ];

        let series = monthly_activity(&intervals, &selection(&["A", "B"]));
        assert_eq!(series[0].months.len(), 5);
        assert_eq!(series[0].counts, vec![1, 1, 0, 0, 0]);
        assert_eq!(series[1].counts, vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn selected_category_without_data_yields_empty_series() {
        let intervals = vec![interval("P1", "A", date(2020, 1, 15), date(2020, 2, 15))];
        let series = monthly_activity(&intervals, &selection(&["A", "Ghost"]));

        assert_eq!(series.len(), 2);
        assert!(!series[0].is_empty());
        assert_eq!(series[1].category, "Ghost");
        assert!(series[1].is_empty());
        assert!(series[1].counts.is_empty());
    }

    #[test]
    fn unselected_categories_never_leak_into_counts() {
        let intervals = vec![
            interval("P1", "A", date(2020, 1, 1), date(2020, 6, 15)),
            interval("P2", "B", date(2020, 1, 1), date(2020, 6, 15)),
        ];

        let series = monthly_activity(&intervals, &selection(&["A"]));
        assert_eq!(series.len(), 1);
        assert!(series[0].counts.iter().all(|&count| count == 1));
    }

    #[test]
    fn per_category_counts_sum_to_union_counts() {
        let intervals = vec![
            interval("P1", "A", date(2020, 1, 10), date(2020, 3, 5)),
            interval("P2", "A", date(2020, 2, 1), date(2020, 2, 20)),
            interval("P3", "B", date(2020, 1, 20), date(2020, 4, 2)),
        ];

        let split = monthly_activity(&intervals, &selection(&["A", "B"]));

        // Same data relabeled into a single category gives the union counts.
        let merged: Vec<Interval> = intervals
            .iter()
            .cloned()
            .map(|mut interval| {
                interval.category = "All".to_string();
                interval
            })
            .collect();
        let union = monthly_activity(&merged, &selection(&["All"]));

        for (index, total) in union[0].counts.iter().enumerate() {
            let sum: usize = split.iter().map(|series| series.counts[index]).sum();
            assert_eq!(sum, *total);
        }
    }

    #[test]
    fn empty_selection_yields_no_series() {
        let intervals = vec![interval("P1", "A", date(2020, 1, 15), date(2020, 2, 15))];
        assert!(monthly_activity(&intervals, &[]).is_empty());
    }
}
