//! Grouping of fixed-interval forecast steps into calendar days.

use chrono::{DateTime, FixedOffset};

use crate::{
    model::{Condition, ForecastDay},
    units::celsius_to_fahrenheit,
};

/// One time-step of a forecast feed, already in metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    /// Unix timestamp (seconds).
    pub dt: i64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition: Condition,
    /// Precipitation probability in `0.0..=1.0`.
    pub pop: Option<f64>,
}

/// Collapse `steps` into at most one [`ForecastDay`] per calendar date.
///
/// Dates are taken in `offset` (the location's UTC offset). Days keep the order
/// in which their first step appeared, and only the first `days` are returned.
/// The first condition seen for a date stays as its representative; the
/// Fahrenheit extremes are always recomputed from the Celsius extremes.
pub fn group_by_day(steps: &[ForecastStep], offset: FixedOffset, days: usize) -> Vec<ForecastDay> {
    let mut out: Vec<ForecastDay> = Vec::new();

    for step in steps {
        let Some(at) = DateTime::from_timestamp(step.dt, 0) else {
            tracing::debug!(dt = step.dt, "skipping forecast step with invalid timestamp");
            continue;
        };
        let date = at.with_timezone(&offset).date_naive();
        let rain = rain_percent(step.pop);

        match out.iter_mut().find(|d| d.date == date) {
            Some(day) => {
                day.maxtemp_c = day.maxtemp_c.max(step.temp_max_c);
                day.mintemp_c = day.mintemp_c.min(step.temp_min_c);
                day.maxtemp_f = celsius_to_fahrenheit(day.maxtemp_c);
                day.mintemp_f = celsius_to_fahrenheit(day.mintemp_c);
                day.chance_of_rain = day.chance_of_rain.max(rain);
            }
            None => out.push(ForecastDay {
                date,
                maxtemp_c: step.temp_max_c,
                maxtemp_f: celsius_to_fahrenheit(step.temp_max_c),
                mintemp_c: step.temp_min_c,
                mintemp_f: celsius_to_fahrenheit(step.temp_min_c),
                condition: step.condition.clone(),
                chance_of_rain: rain,
            }),
        }
    }

    out.truncate(days);
    out
}

fn rain_percent(pop: Option<f64>) -> u8 {
    pop.map(|p| (p.clamp(0.0, 1.0) * 100.0).round() as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-03-10T00:00:00Z
    const MIDNIGHT: i64 = 1_710_028_800;
    const STEP: i64 = 3 * 3600;

    fn cond(text: &str) -> Condition {
        Condition {
            text: text.to_string(),
            icon: format!("{text}.png"),
            code: None,
        }
    }

    fn step(dt: i64, temp: f64, text: &str) -> ForecastStep {
        ForecastStep {
            dt,
            temp_min_c: temp,
            temp_max_c: temp,
            condition: cond(text),
            pop: None,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn single_day_takes_extremes_of_all_steps() {
        let steps = vec![
            step(MIDNIGHT, 4.0, "clear sky"),
            step(MIDNIGHT + STEP, 2.5, "few clouds"),
            step(MIDNIGHT + 2 * STEP, 11.0, "rain"),
            step(MIDNIGHT + 3 * STEP, 7.0, "rain"),
        ];

        let days = group_by_day(&steps, utc(), 5);
        assert_eq!(days.len(), 1);

        let day = &days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(day.maxtemp_c, 11.0);
        assert_eq!(day.mintemp_c, 2.5);
        assert_eq!(day.maxtemp_f, celsius_to_fahrenheit(11.0));
        assert_eq!(day.mintemp_f, celsius_to_fahrenheit(2.5));
    }

    #[test]
    fn first_condition_is_kept_for_the_day() {
        let steps = vec![
            step(MIDNIGHT, 4.0, "clear sky"),
            step(MIDNIGHT + STEP, 9.0, "thunderstorm"),
        ];

        let days = group_by_day(&steps, utc(), 5);
        assert_eq!(days[0].condition.text, "clear sky");
    }

    #[test]
    fn uses_min_and_max_fields_independently() {
        let mut warm = step(MIDNIGHT, 0.0, "a");
        (warm.temp_min_c, warm.temp_max_c) = (3.0, 5.0);
        let mut cool = step(MIDNIGHT + STEP, 0.0, "b");
        (cool.temp_min_c, cool.temp_max_c) = (1.0, 4.0);
        let steps = vec![warm, cool];

        let days = group_by_day(&steps, utc(), 5);
        assert_eq!(days[0].maxtemp_c, 5.0);
        assert_eq!(days[0].mintemp_c, 1.0);
    }

    #[test]
    fn caps_to_requested_days_in_order() {
        let steps: Vec<_> = (0..40)
            .map(|i| step(MIDNIGHT + i * STEP, i as f64, "clouds"))
            .collect();

        let days = group_by_day(&steps, utc(), 3);
        let dates: Vec<_> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2024-03-10", "2024-03-11", "2024-03-12"]);
    }

    #[test]
    fn dates_follow_the_location_offset() {
        // 23:00 UTC on the 10th is already the 11th in UTC+2.
        let steps = vec![step(MIDNIGHT + 23 * 3600, 5.0, "clear sky")];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let days = group_by_day(&steps, plus_two, 5);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn chance_of_rain_is_the_daily_peak() {
        let mut wet = step(MIDNIGHT + STEP, 5.0, "rain");
        wet.pop = Some(0.64);
        let mut damp = step(MIDNIGHT, 5.0, "clouds");
        damp.pop = Some(0.2);

        let days = group_by_day(&[damp, wet], utc(), 5);
        assert_eq!(days[0].chance_of_rain, 64);
    }

    #[test]
    fn empty_feed_gives_no_days() {
        assert!(group_by_day(&[], utc(), 5).is_empty());
    }
}
