use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::{codes, AppError};

const CALENDAR_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn invalid_date(raw: &str) -> AppError {
    AppError::new(codes::INVALID_DATE, "Publication date is not a valid ISO-8601 date")
        .with_details(format!("raw={raw}"))
}

/// Parse a source-provided publication date into a UTC calendar date.
///
/// Accepted, in order:
/// - RFC 3339 timestamps (converted to UTC before taking the date),
/// - plain `YYYY-MM-DD`,
/// - anything whose first ten characters are `YYYY-MM-DD` (arXiv timestamps without
///   an offset, or with trailing junk).
pub fn parse_published_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_date(raw));
    }

    if let Ok(dt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(dt.to_offset(UtcOffset::UTC).date());
    }

    let prefix = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(prefix, CALENDAR_DATE).map_err(|_| invalid_date(raw))
}

#[cfg(test)]
mod tests {
    use super::parse_published_date;
    use time::macros::date;

    #[test]
    fn parses_calendar_dates_and_timestamps() {
        assert_eq!(parse_published_date("2025-05-14").unwrap(), date!(2025 - 05 - 14));
        assert_eq!(
            parse_published_date("2025-05-14T17:59:59Z").unwrap(),
            date!(2025 - 05 - 14)
        );
        assert_eq!(
            parse_published_date(" 2025-05-14T23:30:00-02:00 ").unwrap(),
            date!(2025 - 05 - 15)
        );
        assert_eq!(
            parse_published_date("2025-05-14 garbage").unwrap(),
            date!(2025 - 05 - 14)
        );
    }

    #[test]
    fn rejects_unparsable_dates() {
        for raw in ["", "   ", "yesterday", "2025-13-01", "2025-02-30", "14/05/2025", "2025"] {
            let err = parse_published_date(raw).unwrap_err();
            assert_eq!(err.code, "RECENCY_INVALID_DATE", "raw={raw:?}");
        }
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert!(parse_published_date("二〇二五年五月十四日").is_err());
    }
}
