//! Some utility functions

use chrono::NaiveDate;

pub mod comparison;

/// Format a date the way the report displays it, e.g. `Jan 05, 2025`
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_format() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(&date), "Jan 05, 2025");

        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(format_date(&date), "Dec 31, 2024");
    }
}
