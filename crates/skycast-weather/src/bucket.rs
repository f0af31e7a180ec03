//! Groups 3-hour forecast samples into per-day summaries.
//!
//! Days are keyed by weekday name in the viewer's time zone, not by calendar
//! date. A forecast window longer than a week therefore merges both Mondays
//! into one bucket. Upstream forecasts cover five days, so this does not
//! happen with real data.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One forecast point as delivered by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub temperature_c: f64,
    pub icon: String,
    pub description: String,
}

impl ForecastSample {
    /// Extract a sample from one entry of the `/forecast` `list` array.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedSampleError`] naming the first missing or mistyped field.
    pub fn from_entry(index: usize, entry: &Value) -> Result<Self, MalformedSampleError> {
        let timestamp = field(index, entry, "/dt", "dt")?
            .as_i64()
            .ok_or_else(|| MalformedSampleError::invalid(index, "dt", "expected an integer"))?;

        let temperature_c = field(index, entry, "/main/temp", "main.temp")?
            .as_f64()
            .ok_or_else(|| MalformedSampleError::invalid(index, "main.temp", "expected a number"))?;

        let icon = text_field(index, entry, "/weather/0/icon", "weather[0].icon")?;
        let description =
            text_field(index, entry, "/weather/0/description", "weather[0].description")?;

        Ok(Self {
            timestamp,
            temperature_c,
            icon,
            description,
        })
    }
}

fn field<'a>(
    index: usize,
    entry: &'a Value,
    pointer: &str,
    name: &'static str,
) -> Result<&'a Value, MalformedSampleError> {
    entry
        .pointer(pointer)
        .filter(|v| !v.is_null())
        .ok_or_else(|| MalformedSampleError::missing(index, name))
}

fn text_field(
    index: usize,
    entry: &Value,
    pointer: &str,
    name: &'static str,
) -> Result<String, MalformedSampleError> {
    field(index, entry, pointer, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| MalformedSampleError::invalid(index, name, "expected a string"))
}

/// A sample that could not be turned into a forecast entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("forecast sample {index}: field `{field}` {reason}")]
pub struct MalformedSampleError {
    /// Position of the offending sample in the input
    pub index: usize,
    pub field: &'static str,
    pub reason: String,
}

impl MalformedSampleError {
    fn missing(index: usize, field: &'static str) -> Self {
        Self {
            index,
            field,
            reason: "is missing".to_string(),
        }
    }

    fn invalid(index: usize, field: &'static str, reason: &str) -> Self {
        Self {
            index,
            field,
            reason: format!("is invalid: {}", reason),
        }
    }
}

/// One row of a day's hourly breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// "3 PM"
    pub time_label: String,
    pub temperature_c: i32,
    pub icon: String,
    pub description: String,
}

/// Summary of every sample sharing a weekday name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Weekday name, e.g. "Monday"
    pub day_label: String,
    pub max_temp: i32,
    pub min_temp: i32,
    /// Icon of the first sample in the bucket
    pub icon: String,
    /// Description of the first sample in the bucket
    pub description: String,
    pub hourly: Vec<HourlyEntry>,
}

impl DayBucket {
    fn new(day_label: String) -> Self {
        Self {
            day_label,
            max_temp: 0,
            min_temp: 0,
            icon: String::new(),
            description: String::new(),
            hourly: Vec::new(),
        }
    }

    fn finalize(&mut self) {
        if let Some(first) = self.hourly.first() {
            self.icon = first.icon.clone();
            self.description = first.description.clone();
        }
        let temps = self.hourly.iter().map(|h| h.temperature_c);
        self.max_temp = temps.clone().max().unwrap_or_default();
        self.min_temp = temps.min().unwrap_or_default();
    }

    /// First three letters of the day name, for chart axes.
    pub fn short_label(&self) -> &str {
        match self.day_label.char_indices().nth(3) {
            Some((end, _)) => &self.day_label[..end],
            None => &self.day_label,
        }
    }

    /// Mean of the hourly temperatures, rounded like the temperatures themselves.
    pub fn average_temp(&self) -> i32 {
        if self.hourly.is_empty() {
            return 0;
        }
        let sum: i64 = self.hourly.iter().map(|h| i64::from(h.temperature_c)).sum();
        round_half_up(sum as f64 / self.hourly.len() as f64)
    }

    /// Number of forecast points that fell on this day.
    pub fn hours_covered(&self) -> usize {
        self.hourly.len()
    }
}

/// Round to the nearest integer, halves towards positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i32
}

/// Group samples into day buckets in first-seen weekday order.
///
/// Labels are computed in `tz`. Buckets are not sorted.
///
/// # Errors
///
/// Fails without partial output if a temperature is not finite or a
/// timestamp is out of range.
pub fn bucketize<Tz>(
    samples: &[ForecastSample],
    tz: &Tz,
) -> Result<Vec<DayBucket>, MalformedSampleError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut buckets: Vec<DayBucket> = Vec::new();

    for (index, sample) in samples.iter().enumerate() {
        if !sample.temperature_c.is_finite() {
            return Err(MalformedSampleError::invalid(
                index,
                "main.temp",
                "temperature is not finite",
            ));
        }

        let local = DateTime::<Utc>::from_timestamp(sample.timestamp, 0)
            .ok_or_else(|| MalformedSampleError::invalid(index, "dt", "timestamp out of range"))?
            .with_timezone(tz);

        let day_label = local.format("%A").to_string();
        let entry = HourlyEntry {
            time_label: local.format("%-I %p").to_string(),
            temperature_c: round_half_up(sample.temperature_c),
            icon: sample.icon.clone(),
            description: sample.description.clone(),
        };

        let position = match buckets.iter().position(|b| b.day_label == day_label) {
            Some(position) => position,
            None => {
                buckets.push(DayBucket::new(day_label));
                buckets.len() - 1
            }
        };
        buckets[position].hourly.push(entry);
    }

    for bucket in &mut buckets {
        bucket.finalize();
    }

    tracing::debug!(
        "Bucketized {} forecast samples into {} days",
        samples.len(),
        buckets.len()
    );
    Ok(buckets)
}

/// Parse raw `/forecast` list entries and bucketize them.
///
/// # Errors
///
/// Returns the first [`MalformedSampleError`]; no buckets are produced in that case.
pub fn bucketize_entries<Tz>(
    entries: &[Value],
    tz: &Tz,
) -> Result<Vec<DayBucket>, MalformedSampleError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let samples = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| ForecastSample::from_entry(i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    bucketize(&samples, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;
    use std::collections::BTreeSet;

    // Monday 2024-01-01 00:00:00 UTC
    const MONDAY_MIDNIGHT_UTC: i64 = 1_704_067_200;
    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn sample(timestamp: i64, temperature_c: f64, icon: &str) -> ForecastSample {
        ForecastSample {
            timestamp,
            temperature_c,
            icon: icon.to_string(),
            description: format!("desc {}", icon),
        }
    }

    fn five_day_series() -> Vec<ForecastSample> {
        (0..40)
            .map(|i| {
                let temp = 15.0 + (i % 8) as f64 * 1.3;
                sample(MONDAY_MIDNIGHT_UTC + i * 3 * HOUR, temp, &format!("{:02}d", i % 4))
            })
            .collect()
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let buckets = bucketize(&[], &Utc).unwrap();
        assert!(buckets.is_empty());
        let buckets = bucketize_entries(&[], &Utc).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_single_day_scenario() {
        let temps = [20.4, 22.6, 19.1, 23.0, 21.5];
        let samples: Vec<_> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| sample(MONDAY_MIDNIGHT_UTC + 3 * HOUR * i as i64, *t, "01d"))
            .collect();

        let buckets = bucketize(&samples, &Utc).unwrap();

        assert_eq!(buckets.len(), 1);
        let day = &buckets[0];
        assert_eq!(day.day_label, "Monday");
        assert_eq!(day.max_temp, 23);
        assert_eq!(day.min_temp, 19);
        assert_eq!(day.hourly.len(), 5);
        let rounded: Vec<i32> = day.hourly.iter().map(|h| h.temperature_c).collect();
        assert_eq!(rounded, vec![20, 23, 19, 23, 22]);
    }

    #[test]
    fn test_hour_labels_are_twelve_hour() {
        let samples = vec![
            sample(MONDAY_MIDNIGHT_UTC, 10.0, "01n"),
            sample(MONDAY_MIDNIGHT_UTC + 9 * HOUR, 10.0, "01d"),
            sample(MONDAY_MIDNIGHT_UTC + 12 * HOUR, 10.0, "01d"),
            sample(MONDAY_MIDNIGHT_UTC + 15 * HOUR, 10.0, "01d"),
        ];
        let buckets = bucketize(&samples, &Utc).unwrap();
        let labels: Vec<&str> = buckets[0].hourly.iter().map(|h| h.time_label.as_str()).collect();
        assert_eq!(labels, vec!["12 AM", "9 AM", "12 PM", "3 PM"]);
    }

    #[test]
    fn test_time_zone_shifts_day_boundaries() {
        // 22:00 UTC Monday is 04:00 Tuesday in UTC+6
        let samples = vec![sample(MONDAY_MIDNIGHT_UTC + 22 * HOUR, 25.0, "01n")];
        let dhaka = FixedOffset::east_opt(6 * 3600).unwrap();

        let utc_buckets = bucketize(&samples, &Utc).unwrap();
        let local_buckets = bucketize(&samples, &dhaka).unwrap();

        assert_eq!(utc_buckets[0].day_label, "Monday");
        assert_eq!(utc_buckets[0].hourly[0].time_label, "10 PM");
        assert_eq!(local_buckets[0].day_label, "Tuesday");
        assert_eq!(local_buckets[0].hourly[0].time_label, "4 AM");
    }

    #[test]
    fn test_iana_zone_is_accepted() {
        let samples = vec![sample(MONDAY_MIDNIGHT_UTC, 0.0, "13n")];
        // 2024-01-01 00:00 UTC is Sunday evening in New York
        let buckets = bucketize(&samples, &chrono_tz::America::New_York).unwrap();
        assert_eq!(buckets[0].day_label, "Sunday");
        assert_eq!(buckets[0].hourly[0].time_label, "7 PM");
    }

    #[test]
    fn test_bucket_order_is_first_seen() {
        let samples = vec![
            sample(MONDAY_MIDNIGHT_UTC + 2 * DAY, 1.0, "a"), // Wednesday
            sample(MONDAY_MIDNIGHT_UTC, 2.0, "b"),           // Monday
            sample(MONDAY_MIDNIGHT_UTC + 2 * DAY + HOUR, 3.0, "c"),
            sample(MONDAY_MIDNIGHT_UTC + DAY, 4.0, "d"), // Tuesday
        ];
        let buckets = bucketize(&samples, &Utc).unwrap();
        let labels: Vec<&str> = buckets.iter().map(|b| b.day_label.as_str()).collect();
        assert_eq!(labels, vec!["Wednesday", "Monday", "Tuesday"]);
        assert_eq!(buckets[0].hourly.len(), 2);
    }

    #[test]
    fn test_same_weekday_across_weeks_merges() {
        let mut samples = five_day_series();
        samples.push(sample(MONDAY_MIDNIGHT_UTC + 7 * DAY + 6 * HOUR, -3.4, "50d"));

        let buckets = bucketize(&samples, &Utc).unwrap();
        let mondays: Vec<_> = buckets.iter().filter(|b| b.day_label == "Monday").collect();

        assert_eq!(mondays.len(), 1);
        let monday = mondays[0];
        assert_eq!(monday.hourly.len(), 9);
        assert_eq!(monday.min_temp, -3);
        assert_eq!(monday.icon, "00d");
        assert_eq!(buckets.len(), 5);
    }

    #[test]
    fn test_distinct_labels_preserved() {
        let samples = five_day_series();
        let expected: BTreeSet<String> = samples
            .iter()
            .map(|s| {
                DateTime::<Utc>::from_timestamp(s.timestamp, 0)
                    .unwrap()
                    .format("%A")
                    .to_string()
            })
            .collect();

        let buckets = bucketize(&samples, &Utc).unwrap();
        let actual: BTreeSet<String> = buckets.iter().map(|b| b.day_label.clone()).collect();

        assert_eq!(buckets.len(), actual.len(), "duplicate labels in output");
        assert_eq!(actual, expected);
        let total: usize = buckets.iter().map(|b| b.hourly.len()).sum();
        assert_eq!(total, samples.len());
    }

    #[test]
    fn test_min_max_come_from_rounded_samples() {
        let buckets = bucketize(&five_day_series(), &Utc).unwrap();
        for bucket in &buckets {
            assert!(bucket.max_temp >= bucket.min_temp);
            assert!(bucket.hourly.iter().any(|h| h.temperature_c == bucket.max_temp));
            assert!(bucket.hourly.iter().any(|h| h.temperature_c == bucket.min_temp));
        }
    }

    #[test]
    fn test_representative_is_first_sample() {
        let samples = vec![
            sample(MONDAY_MIDNIGHT_UTC + 3 * HOUR, 5.0, "10d"),
            sample(MONDAY_MIDNIGHT_UTC + 6 * HOUR, 9.0, "01d"),
        ];
        let buckets = bucketize(&samples, &Utc).unwrap();
        assert_eq!(buckets[0].icon, "10d");
        assert_eq!(buckets[0].description, "desc 10d");
    }

    #[test]
    fn test_idempotent() {
        let samples = five_day_series();
        let first = bucketize(&samples, &Utc).unwrap();
        let second = bucketize(&samples, &Utc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounding_before_aggregation() {
        // raw max is 20.4 but two samples round to 20, raw min 19.5 rounds to 20 as well
        let samples = vec![
            sample(MONDAY_MIDNIGHT_UTC, 19.5, "a"),
            sample(MONDAY_MIDNIGHT_UTC + HOUR, 20.4, "b"),
        ];
        let buckets = bucketize(&samples, &Utc).unwrap();
        assert_eq!(buckets[0].max_temp, 20);
        assert_eq!(buckets[0].min_temp, 20);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(19.1), 19);
        assert_eq!(round_half_up(0.49999999999999994), 0);
    }

    #[test]
    fn test_non_finite_temperature_rejected() {
        let samples = vec![
            sample(MONDAY_MIDNIGHT_UTC, 1.0, "a"),
            sample(MONDAY_MIDNIGHT_UTC + HOUR, f64::NAN, "b"),
        ];
        let err = bucketize(&samples, &Utc).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.field, "main.temp");
    }

    #[test]
    fn test_out_of_range_timestamp_rejected() {
        let samples = vec![sample(i64::MAX, 1.0, "a")];
        let err = bucketize(&samples, &Utc).unwrap_err();
        assert_eq!(err.field, "dt");
    }

    #[test]
    fn test_entries_parse_openweather_shape() {
        let entries = vec![
            json!({
                "dt": MONDAY_MIDNIGHT_UTC,
                "main": { "temp": 21.6, "feels_like": 21.0 },
                "weather": [
                    { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01n" }
                ]
            }),
            json!({
                "dt": MONDAY_MIDNIGHT_UTC + 3 * HOUR,
                "main": { "temp": 18.2 },
                "weather": [{ "description": "few clouds", "icon": "02n" }]
            }),
        ];

        let buckets = bucketize_entries(&entries, &Utc).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].max_temp, 22);
        assert_eq!(buckets[0].min_temp, 18);
        assert_eq!(buckets[0].description, "clear sky");
        assert_eq!(buckets[0].hourly[1].icon, "02n");
    }

    #[test]
    fn test_missing_fields_are_named() {
        let weather = json!([{ "icon": "a", "description": "b" }]);
        let cases = [
            (json!({ "main": { "temp": 1.0 }, "weather": weather }), "dt"),
            (json!({ "dt": 1, "weather": weather }), "main.temp"),
            (json!({ "dt": 1, "main": { "temp": 1.0 }, "weather": [] }), "weather[0].icon"),
            (
                json!({ "dt": 1, "main": { "temp": 1.0 }, "weather": [{ "icon": "a" }] }),
                "weather[0].description",
            ),
            (json!({ "dt": 1, "main": { "temp": null }, "weather": weather }), "main.temp"),
        ];

        for (entry, field) in cases {
            let err = ForecastSample::from_entry(0, &entry).unwrap_err();
            assert_eq!(err.field, field);
            assert!(err.reason.contains("missing"), "{}", err);
        }
    }

    #[test]
    fn test_mistyped_field_is_invalid() {
        let entry = json!({
            "dt": "yesterday",
            "main": { "temp": 1.0 },
            "weather": [{ "icon": "a", "description": "b" }]
        });
        let err = ForecastSample::from_entry(3, &entry).unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(err.field, "dt");
        assert!(err.reason.contains("invalid"));
    }

    #[test]
    fn test_malformed_entry_yields_no_buckets() {
        let weather = json!([{ "icon": "a", "description": "b" }]);
        let entries = vec![
            json!({ "dt": MONDAY_MIDNIGHT_UTC, "main": { "temp": 1.0 }, "weather": weather }),
            json!({ "dt": MONDAY_MIDNIGHT_UTC + HOUR, "main": {}, "weather": weather }),
        ];
        let err = bucketize_entries(&entries, &Utc).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.to_string(), "forecast sample 1: field `main.temp` is missing");
    }

    #[test]
    fn test_day_helpers() {
        let samples = vec![
            sample(MONDAY_MIDNIGHT_UTC, 10.0, "a"),
            sample(MONDAY_MIDNIGHT_UTC + 3 * HOUR, 11.0, "a"),
            sample(MONDAY_MIDNIGHT_UTC + 6 * HOUR, 13.0, "a"),
        ];
        let bucket = &bucketize(&samples, &Utc).unwrap()[0];
        assert_eq!(bucket.short_label(), "Mon");
        // (10 + 11 + 13) / 3 = 11.33
        assert_eq!(bucket.average_temp(), 11);
        assert_eq!(bucket.hours_covered(), 3);
    }

    #[test]
    fn test_offset_zone_and_utc_agree_for_zero_offset() {
        let samples = five_day_series();
        let zero = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            bucketize(&samples, &Utc).unwrap(),
            bucketize(&samples, &zero).unwrap()
        );
        assert_eq!(
            Utc.timestamp_opt(MONDAY_MIDNIGHT_UTC, 0).unwrap().format("%A").to_string(),
            "Monday"
        );
    }
}
