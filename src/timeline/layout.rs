use super::domain::Interval;
use serde::Serialize;

/// One interval placed on its own display row.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalRow {
    pub row: usize,
    #[serde(flatten)]
    pub interval: Interval,
}

/// The contiguous row range occupied by one category, plus the row where the
/// rendering layer should anchor the category label.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBlock {
    pub category: String,
    pub first_row: usize,
    pub last_row: usize,
    pub anchor_row: f64,
}

/// A deterministic vertical arrangement of every surviving interval.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimelineLayout {
    pub rows: Vec<IntervalRow>,
    pub blocks: Vec<CategoryBlock>,
    pub height: usize,
}

impl TimelineLayout {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Assigns one row per interval, processing categories in the caller's order
/// (never re-sorted) and, within a category, grouping intervals by person in
/// first-appearance order. Two blank separator rows sit between consecutive
/// category blocks; categories without intervals contribute neither rows nor
/// a separator. `height` is the number of rows actually used.
pub fn build_layout(intervals: &[Interval], categories: &[String]) -> TimelineLayout {
    let mut layout = TimelineLayout::default();
    let mut next_row = 0usize;

    for category in categories {
        let members: Vec<&Interval> = intervals
            .iter()
            .filter(|interval| &interval.category == category)
            .collect();

        if members.is_empty() {
            continue;
        }

        if !layout.blocks.is_empty() {
            next_row += 2;
        }
        let first_row = next_row;

        let mut person_order: Vec<&str> = Vec::new();
        for member in &members {
            if !person_order.contains(&member.person_id.as_str()) {
                person_order.push(member.person_id.as_str());
            }
        }

        for person in person_order {
            for member in members.iter().filter(|m| m.person_id == person) {
                layout.rows.push(IntervalRow {
                    row: next_row,
                    interval: (*member).clone(),
                });
                next_row += 1;
            }
        }

        let last_row = next_row - 1;
        layout.blocks.push(CategoryBlock {
            category: category.clone(),
            first_row,
            last_row,
            anchor_row: (first_row + last_row) as f64 / 2.0,
        });
    }

    layout.height = next_row;
    layout
}
