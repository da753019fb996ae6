use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use campus_types::models::DateValue;

/// HTML `datetime-local` input format.
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

const AWARE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

enum Reading {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

fn read(raw: &str) -> Option<Reading> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Reading::Aware(dt));
    }
    for fmt in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(Reading::Aware(dt));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Reading::Naive(ndt));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Reading::Naive)
}

/// Parse an upstream date string. Values without an offset are taken as UTC.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    read(raw).map(|reading| match reading {
        Reading::Aware(dt) => dt.with_timezone(&Utc),
        Reading::Naive(ndt) => ndt.and_utc(),
    })
}

/// Turn a raw date into a parsed one when possible; otherwise hand it back unchanged.
pub fn normalize(value: DateValue) -> DateValue {
    match value {
        DateValue::Raw(raw) => match parse(&raw) {
            Some(dt) => DateValue::Parsed(dt),
            None => DateValue::Raw(raw),
        },
        parsed @ DateValue::Parsed(_) => parsed,
    }
}

/// [`normalize`] for an optional field; a missing field stays missing.
pub fn normalize_field(field: &mut Option<DateValue>) {
    *field = field.take().map(normalize);
}

/// Render a date for a `datetime-local` input, keeping the sender's wall-clock
/// time. Unreadable values come back as they are.
pub fn format_datetime_local(value: &DateValue) -> String {
    match value {
        DateValue::Parsed(dt) => dt.format(DATETIME_LOCAL).to_string(),
        DateValue::Raw(raw) => match read(raw) {
            Some(Reading::Aware(dt)) => dt.format(DATETIME_LOCAL).to_string(),
            Some(Reading::Naive(ndt)) => ndt.format(DATETIME_LOCAL).to_string(),
            None => raw.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zulu_string_becomes_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap();
        assert_eq!(
            normalize(DateValue::from("2024-01-02T03:04:00Z")),
            DateValue::Parsed(expected)
        );
    }

    #[test]
    fn garbage_is_returned_unchanged() {
        assert_eq!(
            normalize(DateValue::from("NOT_A_DATE")),
            DateValue::Raw("NOT_A_DATE".into())
        );
    }

    #[test]
    fn parsed_value_is_left_alone() {
        let value = DateValue::Parsed(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
        assert_eq!(normalize(value.clone()), value);
        assert_eq!(normalize(normalize(DateValue::from("2024-05-06T07:08:09Z"))), value);
    }

    #[test]
    fn offsets_are_converted_and_naive_values_read_as_utc() {
        assert_eq!(
            parse("2024-01-02T05:04:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap())
        );
        assert_eq!(
            parse("2024-01-02T03:04:05.250"),
            Some(
                Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
                    + chrono::Duration::milliseconds(250)
            )
        );
        assert_eq!(
            parse("2024-01-02 03:04"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap())
        );
        assert_eq!(
            parse("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse("2024-13-45"), None);
    }

    #[test]
    fn missing_field_passes_through() {
        let mut field = None;
        normalize_field(&mut field);
        assert_eq!(field, None);

        let mut field = Some(DateValue::from("later"));
        normalize_field(&mut field);
        assert_eq!(field, Some(DateValue::Raw("later".into())));
    }

    #[test]
    fn datetime_local_keeps_wall_clock() {
        assert_eq!(
            format_datetime_local(&DateValue::from("2024-01-02T03:04:00Z")),
            "2024-01-02T03:04"
        );
        assert_eq!(
            format_datetime_local(&DateValue::from("2024-01-04T05:06:00+02:00")),
            "2024-01-04T05:06"
        );
        assert_eq!(format_datetime_local(&DateValue::from("soon")), "soon");
    }
}
