use super::domain::{
    Interval, RawContractRecord, RawField, RawValue, RejectReason, RejectedRecord,
    MAX_DURATION_DAYS, PERSON_ID_WIDTH,
};
use chrono::{DateTime, Duration, NaiveDate};

/// Result of sanitizing one batch: the surviving intervals in input order,
/// plus a diagnostic per dropped row.
#[derive(Debug, Clone, Default)]
pub struct SanitizeOutcome {
    pub intervals: Vec<Interval>,
    pub rejected: Vec<RejectedRecord>,
}

impl SanitizeOutcome {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Validates and normalizes a batch of raw records. Bad rows are dropped
/// with a diagnostic; they never abort the batch.
pub fn sanitize_records<I>(records: I) -> SanitizeOutcome
where
    I: IntoIterator<Item = RawContractRecord>,
{
    let mut outcome = SanitizeOutcome::default();

    for (index, record) in records.into_iter().enumerate() {
        match sanitize_record(&record) {
            Ok(interval) => outcome.intervals.push(interval),
            Err(reason) => outcome.rejected.push(RejectedRecord {
                row: index + 1,
                reason,
            }),
        }
    }

    outcome
}

/// Validates a single raw record, or explains why it cannot be used.
pub fn sanitize_record(record: &RawContractRecord) -> Result<Interval, RejectReason> {
    let person_id = parse_person_id(&record.person_id)?;
    let category = parse_category(&record.category)?;
    let start = parse_date(&record.start, RawField::Start)?;
    let end = parse_date(&record.end, RawField::End)?;

    let duration_days = (end - start).num_days();
    if duration_days < 0 {
        return Err(RejectReason::NegativeDuration {
            days: duration_days,
        });
    }
    if duration_days > MAX_DURATION_DAYS {
        return Err(RejectReason::ExcessiveDuration {
            days: duration_days,
        });
    }

    Ok(Interval {
        person_id,
        category,
        start,
        end,
        duration_days,
    })
}

fn parse_person_id(value: &RawValue) -> Result<String, RejectReason> {
    let missing = RejectReason::Missing {
        field: RawField::PersonId,
    };

    match value {
        RawValue::Missing => Err(missing),
        RawValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(missing)
            } else {
                Ok(zero_pad(trimmed))
            }
        }
        RawValue::Number(raw) => {
            if raw.is_finite() && raw.fract() == 0.0 && *raw >= 0.0 {
                Ok(zero_pad(&format!("{}", *raw as u64)))
            } else {
                Err(RejectReason::Unparseable {
                    field: RawField::PersonId,
                })
            }
        }
        RawValue::Date(_) => Err(RejectReason::Unparseable {
            field: RawField::PersonId,
        }),
    }
}

fn zero_pad(raw: &str) -> String {
    format!("{raw:0>width$}", width = PERSON_ID_WIDTH)
}

fn parse_category(value: &RawValue) -> Result<String, RejectReason> {
    let missing = RejectReason::Missing {
        field: RawField::Category,
    };

    match value {
        RawValue::Missing => Err(missing),
        RawValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(missing)
            } else {
                Ok(trimmed.to_string())
            }
        }
        RawValue::Number(raw) if raw.is_finite() && raw.fract() == 0.0 => {
            Ok(format!("{}", *raw as i64))
        }
        RawValue::Number(raw) if raw.is_finite() => Ok(format!("{raw}")),
        RawValue::Number(_) | RawValue::Date(_) => Err(RejectReason::Unparseable {
            field: RawField::Category,
        }),
    }
}

fn parse_date(value: &RawValue, field: RawField) -> Result<NaiveDate, RejectReason> {
    match value {
        RawValue::Missing => Err(RejectReason::Missing { field }),
        RawValue::Date(date) => Ok(*date),
        RawValue::Number(serial) => {
            serial_to_date(*serial).ok_or(RejectReason::Unparseable { field })
        }
        RawValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(RejectReason::Missing { field });
            }
            parse_date_text(trimmed).ok_or(RejectReason::Unparseable { field })
        }
    }
}

fn parse_date_text(trimmed: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    // Spreadsheet serials survive text round trips as bare numbers.
    if let Ok(serial) = trimmed.parse::<f64>() {
        return serial_to_date(serial);
    }

    None
}

/// Interprets an Excel-style serial date: whole days since 1899-12-30.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_record(person_id: &str, category: &str, start: &str, end: &str) -> RawContractRecord {
        RawContractRecord {
            person_id: RawValue::Text(person_id.to_string()),
            category: RawValue::Text(category.to_string()),
            start: RawValue::Text(start.to_string()),
            end: RawValue::Text(end.to_string()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn normalizes_person_id_to_nine_digits() {
        let interval = sanitize_record(&text_record("1234", "  Peon ", "2020-01-10", "2020-03-05"))
            .expect("record is valid");
        assert_eq!(interval.person_id, "000001234");
        assert_eq!(interval.category, "Peon");
        assert_eq!(interval.duration_days, 55);
    }

    #[test]
    fn leaves_wide_person_ids_untouched() {
        let interval =
            sanitize_record(&text_record("12345678X9", "A", "2020-01-10", "2020-01-10"))
                .expect("record is valid");
        assert_eq!(interval.person_id, "12345678X9");
    }

    #[test]
    fn accepts_numeric_person_id() {
        let record = RawContractRecord {
            person_id: RawValue::Number(87654321.0),
            category: RawValue::Text("A".to_string()),
            start: RawValue::Date(date(2021, 2, 1)),
            end: RawValue::Date(date(2021, 2, 28)),
        };
        let interval = sanitize_record(&record).expect("record is valid");
        assert_eq!(interval.person_id, "087654321");
    }

    #[test]
    fn parses_slash_dates_and_rfc3339() {
        let interval = sanitize_record(&text_record(
            "1",
            "A",
            "10/01/2020",
            "2020-03-05T00:00:00Z",
        ))
        .expect("record is valid");
        assert_eq!(interval.start, date(2020, 1, 10));
        assert_eq!(interval.end, date(2020, 3, 5));
    }

    #[test]
    fn interprets_numeric_dates_as_spreadsheet_serials() {
        // 2021-01-01 is serial 44197 in the 1900 date system.
        let record = RawContractRecord {
            person_id: RawValue::Text("1".to_string()),
            category: RawValue::Text("A".to_string()),
            start: RawValue::Number(44197.0),
            end: RawValue::Text("44228".to_string()),
        };
        let interval = sanitize_record(&record).expect("record is valid");
        assert_eq!(interval.start, date(2021, 1, 1));
        assert_eq!(interval.end, date(2021, 2, 1));
    }

    #[test]
    fn rejects_end_before_start() {
        let reason = sanitize_record(&text_record("1", "A", "2021-05-01", "2021-04-01"))
            .expect_err("inverted range must be rejected");
        assert!(matches!(reason, RejectReason::NegativeDuration { days: -30 }));
    }

    #[test]
    fn duration_cap_is_inclusive() {
        let start = date(2000, 1, 1);
        let at_cap = start + Duration::days(MAX_DURATION_DAYS);
        let over_cap = at_cap + Duration::days(1);

        let keep = RawContractRecord {
            person_id: RawValue::Text("1".to_string()),
            category: RawValue::Text("A".to_string()),
            start: RawValue::Date(start),
            end: RawValue::Date(at_cap),
        };
        assert_eq!(
            sanitize_record(&keep).expect("cap is inclusive").duration_days,
            MAX_DURATION_DAYS
        );

        let drop = RawContractRecord {
            end: RawValue::Date(over_cap),
            ..keep
        };
        assert!(matches!(
            sanitize_record(&drop),
            Err(RejectReason::ExcessiveDuration { days: 10_001 })
        ));
    }

    #[test]
    fn rejects_missing_and_blank_fields() {
        let reason = sanitize_record(&text_record("  ", "A", "2020-01-01", "2020-01-02"))
            .expect_err("blank person id");
        assert!(matches!(
            reason,
            RejectReason::Missing {
                field: RawField::PersonId
            }
        ));

        let record = RawContractRecord {
            person_id: RawValue::Text("1".to_string()),
            category: RawValue::Text("A".to_string()),
            start: RawValue::Missing,
            end: RawValue::Date(date(2020, 1, 2)),
        };
        assert!(matches!(
            sanitize_record(&record),
            Err(RejectReason::Missing {
                field: RawField::Start
            })
        ));
    }

    #[test]
    fn batch_keeps_order_and_numbers_rejections() {
        let outcome = sanitize_records(vec![
            text_record("2", "B", "2020-02-01", "2020-02-20"),
            text_record("1", "A", "not-a-date", "2020-03-05"),
            text_record("3", "A", "2020-01-10", "2020-03-05"),
        ]);

        assert_eq!(outcome.intervals.len(), 2);
        assert_eq!(outcome.intervals[0].person_id, "000000002");
        assert_eq!(outcome.intervals[1].person_id, "000000003");

        assert_eq!(outcome.rejected_count(), 1);
        assert_eq!(outcome.rejected[0].row, 2);
        assert!(matches!(
            outcome.rejected[0].reason,
            RejectReason::Unparseable {
                field: RawField::Start
            }
        ));
    }
}
