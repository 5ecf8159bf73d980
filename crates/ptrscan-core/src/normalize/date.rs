use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::{clean_text, is_placeholder};

/// Date templates tried in order: `(chrono format, has time suffix)`.
pub const DATE_FORMATS: [(&str, bool); 8] = [
    ("%m/%d/%Y", false),
    ("%m/%d/%y", false),
    ("%Y-%m-%d", false),
    ("%d-%m-%Y", false),
    ("%m-%d-%Y", false),
    ("%b %d, %Y", false),
    ("%B %d, %Y", false),
    ("%m/%d/%Y %I:%M:%S %p", true),
];

/// `%Y` accepts short years, so four-digit templates reject anything earlier.
const MIN_YEAR: i32 = 1900;

/// First template that parses wins; placeholders and unparseable text are `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = clean_text(raw);
    if is_placeholder(&text) {
        return None;
    }

    DATE_FORMATS.iter().find_map(|(format, timed)| {
        let date = if *timed {
            NaiveDateTime::parse_from_str(&text, format)
                .ok()
                .map(|value| value.date())
        } else {
            NaiveDate::parse_from_str(&text, format).ok()
        }?;

        let four_digit_year = format.contains("%Y");
        (!four_digit_year || date.year() >= MIN_YEAR).then_some(date)
    })
}
