use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

/// Calendar date in `YYYY-MM-DD` form, used to address daily log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportDate(pub Date);

impl ReportDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn inner(&self) -> &Date {
        &self.0
    }

    pub fn into_inner(self) -> Date {
        self.0
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for ReportDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let date =
            Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
                CoreError::invalid_date(format!(
                    "Failed to parse date '{s}' (expected YYYY-MM-DD): {e}"
                ))
            })?;
        Ok(ReportDate(date))
    }
}

impl Serialize for ReportDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReportDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ReportDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn parses_and_formats_iso_dates() {
        let date: ReportDate = "2024-01-01".parse().unwrap();
        assert_eq!(
            date.into_inner(),
            Date::from_calendar_date(2024, Month::January, 1).unwrap()
        );
        assert_eq!(date.to_string(), "2024-01-01");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!("2024-13-01".parse::<ReportDate>().is_err());
        assert!("01.01.2024".parse::<ReportDate>().is_err());
        assert!("".parse::<ReportDate>().is_err());
    }

    #[test]
    fn serde_uses_iso_string() {
        let date: ReportDate = "2025-04-13".parse().unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2025-04-13\"");
        let back: ReportDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
