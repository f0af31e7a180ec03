//! Plain-text rendering of dashboard cards.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use skycast_core::AppError;
use skycast_prayer::PrayerTimes;
use skycast_weather::air_quality::{downsample, next_hours};
use skycast_weather::bucket::round_half_up;
use skycast_weather::{icon_url, AirQualityReading, CurrentWeather, Forecast};
use std::fmt::{Result, Write};

use crate::dashboard::{comparison_rows, CitySnapshot, Snapshot};

/// Days shown in the dashboard's forecast card
const CARD_FORECAST_DAYS: usize = 3;
/// Hours of air quality forecast shown
const AIR_FORECAST_HOURS: usize = 24;
/// Hourly points per trend sample
const AIR_TREND_STEP: usize = 6;

fn clock(time: DateTime<Utc>, tz: &Tz) -> String {
    time.with_timezone(tz).format("%-I:%M %p").to_string()
}

pub fn current(out: &mut impl Write, weather: &CurrentWeather, tz: &Tz) -> Result {
    match &weather.country {
        Some(country) => write!(out, "{}, {}", weather.location_name, country)?,
        None => write!(out, "{}", weather.location_name)?,
    }
    writeln!(out, " ({})", weather.condition.description())?;
    writeln!(
        out,
        "  {}°C (feels like {}°C), {}",
        round_half_up(weather.temperature),
        round_half_up(weather.feels_like),
        weather.description
    )?;
    writeln!(
        out,
        "  Humidity {}%  Wind {:.1} m/s",
        weather.humidity, weather.wind_speed
    )?;
    if let Some(sun) = &weather.sun {
        writeln!(
            out,
            "  Sunrise {}  Sunset {}  Day length {}",
            clock(sun.sunrise, tz),
            clock(sun.sunset, tz),
            sun.format_day_length()
        )?;
    }
    writeln!(out, "  Icon {}", icon_url(&weather.icon))?;
    writeln!(out, "  Updated {}", clock(weather.observed_at, tz))
}

/// Every forecast day with its hourly breakdown.
pub fn forecast(out: &mut impl Write, forecast: &Forecast) -> Result {
    writeln!(out, "Forecast for {}", forecast.city_name)?;

    for day in &forecast.days {
        writeln!(
            out,
            "  {:<10} {:>3}°C / {:>3}°C  avg {:>3}°C  {} ({} readings)",
            day.day_label,
            day.max_temp,
            day.min_temp,
            day.average_temp(),
            day.description,
            day.hours_covered()
        )?;
        let hours: Vec<String> = day
            .hourly
            .iter()
            .map(|h| format!("{} {}°", h.time_label, h.temperature_c))
            .collect();
        writeln!(out, "             {}", hours.join(" | "))?;
    }
    Ok(())
}

/// The first few days, one line each.
pub fn forecast_card(out: &mut impl Write, forecast: &Forecast) -> Result {
    writeln!(out, "Forecast")?;
    for day in forecast.days.iter().take(CARD_FORECAST_DAYS) {
        writeln!(
            out,
            "  {} {:>3}° / {:>3}°  {}",
            day.short_label(),
            day.max_temp,
            day.min_temp,
            day.description
        )?;
    }
    Ok(())
}

pub fn air(
    out: &mut impl Write,
    reading: &AirQualityReading,
    outlook: &[AirQualityReading],
    tz: &Tz,
) -> Result {
    let level = reading.level();

    writeln!(out, "Air quality: {} (index {})", level.label(), reading.index)?;
    writeln!(out, "  {}", level.health_recommendation())?;

    let components: Vec<String> = reading
        .components
        .labeled()
        .iter()
        .map(|(label, value)| format!("{} {:.1}", label, value))
        .collect();
    writeln!(out, "  {} μg/m³", components.join("  "))?;

    let upcoming = downsample(next_hours(outlook, AIR_FORECAST_HOURS), AIR_TREND_STEP);
    if !upcoming.is_empty() {
        let trend: Vec<String> = upcoming
            .iter()
            .map(|r| format!("{} {}", clock(r.timestamp, tz), r.level().label()))
            .collect();
        writeln!(out, "  Next {}h: {}", AIR_FORECAST_HOURS, trend.join(" → "))?;
    }
    Ok(())
}

/// Past readings thinned to one per `AIR_TREND_STEP` hours, on the US scale.
pub fn air_history(out: &mut impl Write, history: &[AirQualityReading], tz: &Tz) -> Result {
    let points = downsample(history, AIR_TREND_STEP);
    let Some(latest) = points.last() else {
        return writeln!(out, "No air quality history available");
    };

    writeln!(out, "Air quality trend")?;
    for r in &points {
        let category = r.us_category();
        writeln!(
            out,
            "  {:<14} US AQI {:>3}  {:<30} ({})",
            r.timestamp.with_timezone(tz).format("%a %-I %p").to_string(),
            r.us_index(),
            category.label(),
            r.level().label()
        )?;
    }
    writeln!(out, "  {}", latest.us_category().health_recommendation())
}

pub fn prayer(out: &mut impl Write, times: &PrayerTimes, now: DateTime<Tz>) -> Result {
    writeln!(out, "Prayer times")?;
    for (name, time) in times.entries() {
        writeln!(out, "  {:<8} {}", name, time.format("%H:%M"))?;
    }
    if let Some((name, time)) = times.next_after(now.time()) {
        writeln!(out, "  Next: {} at {}", name, time.format("%H:%M"))?;
    }
    Ok(())
}

fn table_row(out: &mut impl Write, label: &str, left: &str, right: &str) -> Result {
    writeln!(out, "{:<12} {:>14} {:>14}", label, left, right)
}

pub fn comparison(out: &mut impl Write, home: &CitySnapshot, away: &CitySnapshot) -> Result {
    table_row(out, "", &home.name, &away.name)?;

    for row in comparison_rows(&home.weather, &away.weather) {
        table_row(out, row.label, &row.left, &row.right)?;
    }

    let day = |c: &CitySnapshot| c.day_length().unwrap_or_else(|| "-".to_string());
    table_row(out, "Day Length", &day(home), &day(away))?;

    if let (Some(a), Some(b)) = (&home.prayer, &away.prayer) {
        for ((name, left), (_, right)) in a.entries().into_iter().zip(b.entries()) {
            let left = left.format("%H:%M").to_string();
            let right = right.format("%H:%M").to_string();
            table_row(out, name, &left, &right)?;
        }
    }
    Ok(())
}

fn failed(out: &mut impl Write, card: &str, error: &AppError) -> Result {
    writeln!(out, "{}: {}", card, error.user_message())
}

pub fn snapshot(out: &mut impl Write, snapshot: &Snapshot, tz: &Tz) -> Result {
    match &snapshot.current {
        Ok(weather) => current(out, weather, tz)?,
        Err(e) => failed(out, "Current weather", e)?,
    }
    writeln!(out)?;

    match &snapshot.forecast {
        Ok(f) => forecast_card(out, f)?,
        Err(e) => failed(out, "Forecast", e)?,
    }
    writeln!(out)?;

    match (&snapshot.air_quality, &snapshot.air_forecast) {
        (Ok(reading), Ok(outlook)) => air(out, reading, outlook, tz)?,
        (Ok(reading), Err(_)) => air(out, reading, &[], tz)?,
        (Err(e), _) => failed(out, "Air quality", e)?,
    }

    match &snapshot.prayer {
        Some(Ok(times)) => {
            writeln!(out)?;
            prayer(out, times, snapshot.fetched_at)
        }
        Some(Err(e)) => {
            writeln!(out)?;
            failed(out, "Prayer times", e)
        }
        None => Ok(()),
    }
}
