use super::domain::Interval;
use chrono::{Datelike, NaiveDate};

/// Ascending first-of-month sampling points covering the whole interval set,
/// from the month of the earliest start to the month of the latest end.
/// Empty input yields an empty grid.
pub fn month_grid(intervals: &[Interval]) -> Vec<NaiveDate> {
    let earliest = intervals.iter().map(|interval| interval.start).min();
    let latest = intervals.iter().map(|interval| interval.end).max();

    match (earliest, latest) {
        (Some(min), Some(max)) => month_span(min, max),
        _ => Vec::new(),
    }
}

/// First-of-month points from the month containing `min` through the month
/// containing `max`, stepping one calendar month. Only year and month of the
/// bounds matter; an inverted range yields an empty sequence.
pub fn month_span(min: NaiveDate, max: NaiveDate) -> Vec<NaiveDate> {
    let last = month_floor(max);
    let mut point = month_floor(min);
    let mut grid = Vec::new();

    while point <= last {
        grid.push(point);
        point = next_month(point);
    }

    grid
}

/// Calendar years whose January 1st lies strictly after `min` and on or
/// before `max`. An inverted or degenerate range yields no boundaries.
pub fn year_boundaries(min: NaiveDate, max: NaiveDate) -> Vec<i32> {
    if min > max {
        return Vec::new();
    }

    // Jan 1 of min's own year is never strictly after min, so boundaries
    // start at the following year.
    (min.year() + 1..=max.year()).collect()
}

fn month_floor(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}

fn next_month(point: NaiveDate) -> NaiveDate {
    let (year, month) = if point.month() == 12 {
        (point.year() + 1, 1)
    } else {
        (point.year(), point.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("month is in 1..=12")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn interval(start: NaiveDate, end: NaiveDate) -> Interval {
        Interval {
            person_id: "000000001".to_string(),
            category: "A".to_string(),
            start,
            end,
            duration_days: (end - start).num_days(),
        }
    }

    #[test]
    fn grid_spans_floored_months_regardless_of_day() {
        let grid = month_grid(&[interval(date(2020, 1, 10), date(2020, 3, 5))]);
        assert_eq!(
            grid,
            vec![date(2020, 1, 1), date(2020, 2, 1), date(2020, 3, 1)]
        );
    }

    #[test]
    fn grid_rolls_over_year_boundaries() {
        let grid = month_grid(&[interval(date(2019, 11, 30), date(2020, 2, 1))]);
        assert_eq!(
            grid,
            vec![
                date(2019, 11, 1),
                date(2019, 12, 1),
                date(2020, 1, 1),
                date(2020, 2, 1)
            ]
        );
    }

    #[test]
    fn grid_covers_single_month() {
        let grid = month_grid(&[interval(date(2022, 6, 3), date(2022, 6, 27))]);
        assert_eq!(grid, vec![date(2022, 6, 1)]);
    }

    #[test]
    fn empty_interval_set_yields_empty_grid() {
        assert!(month_grid(&[]).is_empty());
    }

    #[test]
    fn inverted_span_yields_empty_grid() {
        assert!(month_span(date(2022, 5, 1), date(2022, 3, 1)).is_empty());
    }

    #[test]
    fn year_boundaries_exclude_jan_first_at_min() {
        assert_eq!(
            year_boundaries(date(2020, 1, 1), date(2022, 6, 1)),
            vec![2021, 2022]
        );
    }

    #[test]
    fn year_boundaries_include_jan_first_at_max() {
        assert_eq!(
            year_boundaries(date(2020, 6, 15), date(2022, 1, 1)),
            vec![2021, 2022]
        );
    }

    #[test]
    fn year_boundaries_empty_within_one_year() {
        assert!(year_boundaries(date(2021, 2, 1), date(2021, 11, 30)).is_empty());
    }

    #[test]
    fn year_boundaries_empty_for_inverted_range() {
        assert!(year_boundaries(date(2022, 1, 1), date(2020, 1, 1)).is_empty());
    }
}
