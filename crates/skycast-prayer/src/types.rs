//! Prayer times domain types and Aladhan wire models.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::PrayerError;

/// Aladhan calculation method id.
///
/// 2 is the Islamic Society of North America.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationMethod(pub u8);

impl Default for CalculationMethod {
    fn default() -> Self {
        Self(2)
    }
}

/// The five daily prayers plus sunrise, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub fajr: NaiveTime,
    pub sunrise: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl PrayerTimes {
    /// `(name, time)` pairs in the order they occur during the day
    pub fn entries(&self) -> [(&'static str, NaiveTime); 6] {
        [
            ("Fajr", self.fajr),
            ("Sunrise", self.sunrise),
            ("Dhuhr", self.dhuhr),
            ("Asr", self.asr),
            ("Maghrib", self.maghrib),
            ("Isha", self.isha),
        ]
    }

    /// The first prayer after `now`, if any remain today.
    pub fn next_after(&self, now: NaiveTime) -> Option<(&'static str, NaiveTime)> {
        self.entries()
            .into_iter()
            .filter(|(name, _)| *name != "Sunrise")
            .find(|(_, time)| *time > now)
    }
}

/// One day of the monthly calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTimings {
    /// Gregorian date as reported, `DD-MM-YYYY`
    pub date: String,
    pub times: PrayerTimes,
}

/// Reduce `"04:31 (+06)"` to its `HH:MM` part and parse it.
pub fn parse_clock(field: &str, raw: &str) -> Result<NaiveTime, PrayerError> {
    let clock = raw.split_whitespace().next().unwrap_or_default();
    NaiveTime::parse_from_str(clock, "%H:%M").map_err(|e| {
        PrayerError::InvalidResponse(format!("{} time {:?} is invalid: {}", field, raw, e))
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarResponse {
    pub data: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub data: Option<serde_json::Value>,
    pub status: Option<String>,
}

impl ErrorResponse {
    pub fn message(&self) -> Option<String> {
        match &self.data {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => self.status.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarDay {
    pub timings: RawTimings,
    pub date: CalendarDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarDate {
    pub gregorian: GregorianDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GregorianDate {
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawTimings {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl CalendarDay {
    pub fn into_day(self) -> Result<DayTimings, PrayerError> {
        let t = &self.timings;
        let times = PrayerTimes {
            fajr: parse_clock("Fajr", &t.fajr)?,
            sunrise: parse_clock("Sunrise", &t.sunrise)?,
            dhuhr: parse_clock("Dhuhr", &t.dhuhr)?,
            asr: parse_clock("Asr", &t.asr)?,
            maghrib: parse_clock("Maghrib", &t.maghrib)?,
            isha: parse_clock("Isha", &t.isha)?,
        };
        Ok(DayTimings {
            date: self.date.gregorian.date,
            times,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_clock_strips_zone_suffix() {
        assert_eq!(parse_clock("Fajr", "04:31 (+06)").unwrap(), hm(4, 31));
        assert_eq!(parse_clock("Isha", "19:58").unwrap(), hm(19, 58));
    }

    #[test]
    fn test_parse_clock_rejects_garbage() {
        let err = parse_clock("Asr", "soon").unwrap_err();
        assert!(err.to_string().contains("Asr"));
        assert!(parse_clock("Asr", "").is_err());
    }

    #[test]
    fn test_calendar_day_conversion() {
        let day: CalendarDay = serde_json::from_value(serde_json::json!({
            "timings": {
                "Fajr": "03:48 (+06)", "Sunrise": "05:11 (+06)", "Dhuhr": "11:55 (+06)",
                "Asr": "15:22 (+06)", "Sunset": "18:39 (+06)", "Maghrib": "18:39 (+06)",
                "Isha": "20:02 (+06)", "Imsak": "03:38 (+06)", "Midnight": "23:55 (+06)"
            },
            "date": { "readable": "02 Jun 2024", "gregorian": { "date": "02-06-2024" } }
        }))
        .unwrap();

        let day = day.into_day().unwrap();
        assert_eq!(day.date, "02-06-2024");
        assert_eq!(day.times.maghrib, hm(18, 39));
    }

    #[test]
    fn test_next_prayer_skips_sunrise() {
        let times = PrayerTimes {
            fajr: hm(4, 0),
            sunrise: hm(5, 20),
            dhuhr: hm(12, 0),
            asr: hm(15, 30),
            maghrib: hm(18, 40),
            isha: hm(20, 0),
        };
        assert_eq!(times.next_after(hm(4, 30)), Some(("Dhuhr", hm(12, 0))));
        assert_eq!(times.next_after(hm(3, 0)), Some(("Fajr", hm(4, 0))));
        assert_eq!(times.next_after(hm(21, 0)), None);
    }
}
