//! Plain-text views: weather card, forecast list, settings panel.

use std::fmt::Write as _;

use chrono::Local;
use skylook_core::{
    ForecastDay, LocationSuggestion, TemperatureUnit, UserPreferences, WeatherSnapshot,
    units::display_round,
};

fn temp(value: i64, unit: TemperatureUnit) -> String {
    format!("{value}{}", unit.symbol())
}

pub fn weather_card(snapshot: &WeatherSnapshot, prefs: &UserPreferences) -> String {
    let unit = prefs.unit;
    let current = &snapshot.current;
    let location = &snapshot.location;

    let now = display_round(unit.pick(current.temp_c, current.temp_f));
    let feels_like = display_round(unit.pick(current.feels_like_c, current.feels_like_f));
    let wind = display_round(unit.pick(current.wind_kph, current.wind_mph));
    let marker = if prefs.is_favorite(&location.name) { " ★" } else { "" };

    let mut out = String::new();
    if location.country.is_empty() {
        let _ = writeln!(out, "{}{marker}", location.name);
    } else {
        let _ = writeln!(out, "{}, {}{marker}", location.name, location.country);
    }
    let _ = writeln!(
        out,
        "Updated {}",
        location.localtime.with_timezone(&Local).format("%I:%M %p")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}  {}", temp(now, unit), current.condition.text);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Feels like  {}", temp(feels_like, unit));
    let _ = writeln!(out, "  Humidity    {}%", current.humidity);
    let _ = writeln!(out, "  Wind        {wind} {}", unit.wind_unit());
    if let Some(pressure) = current.pressure_mb {
        let _ = writeln!(out, "  Pressure    {} hPa", display_round(pressure));
    }
    let _ = writeln!(out, "  UV index    {}", current.uv);
    out
}

pub fn forecast(days: &[ForecastDay], unit: TemperatureUnit) -> String {
    let mut out = format!("{}-Day Forecast\n", days.len());

    for (i, day) in days.iter().enumerate() {
        let label = if i == 0 {
            "Today".to_string()
        } else {
            day.date.format("%a, %b %-d").to_string()
        };
        let max = display_round(unit.pick(day.maxtemp_c, day.maxtemp_f));
        let min = display_round(unit.pick(day.mintemp_c, day.mintemp_f));

        let _ = writeln!(
            out,
            "  {label:<12} {:<20} {:>3}% rain  {} / {}",
            day.condition.text,
            day.chance_of_rain,
            temp(max, unit),
            temp(min, unit),
        );
    }
    out
}

pub fn settings(prefs: &UserPreferences) -> String {
    let mut out = String::from("Settings\n");
    let _ = writeln!(out, "  Temperature unit: {}", prefs.unit.label());
    let _ = writeln!(out, "  Last searched:    {}", prefs.last_searched);
    let _ = writeln!(out);
    out.push_str(&favorites(prefs));
    out
}

pub fn favorites(prefs: &UserPreferences) -> String {
    if prefs.favorites.is_empty() {
        return "No favorite cities yet. Add some with `skylook fav add <city>`.\n".to_string();
    }

    let mut out = format!("Favorite cities ({})\n", prefs.favorites.len());
    for name in &prefs.favorites {
        let _ = writeln!(out, "  - {name}");
    }
    out
}

pub fn suggestions(found: &[LocationSuggestion]) -> String {
    if found.is_empty() {
        return "No matching locations.\n".to_string();
    }

    found.iter().fold(String::new(), |mut out, s| {
        let _ = writeln!(out, "{:<40} ({:.4}, {:.4})", s.label(), s.lat, s.lon);
        out
    })
}
