pub mod activity;
pub mod domain;
pub mod import;
pub mod layout;
pub mod months;
pub mod report;
pub mod sanitize;

pub use activity::{monthly_activity, CategoryActivitySeries};
pub use domain::{Interval, RawContractRecord, RawField, RawValue, RejectReason, RejectedRecord};
pub use import::ContractCsvImporter;
pub use layout::{build_layout, CategoryBlock, IntervalRow, TimelineLayout};
pub use months::{month_grid, month_span, year_boundaries};
pub use report::{available_categories, EmptyReason, TimelineReport, TimelineReportData};
pub use sanitize::{sanitize_record, sanitize_records, SanitizeOutcome};
