//! Turns a [`LocationInfo`] into display rows.
//!
//! Rendering is pure: no I/O, no failure paths, and the same record always
//! yields the same rows.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{CurrencyRates, Language, LocationInfo, NO_DATA};

/// One table line; the table has a single column.
pub type Row = Vec<String>;

pub fn render(info: &LocationInfo) -> Vec<Row> {
    let location = &info.location;
    let weather = &info.weather;
    let news = &info.news;

    let area = match format_area(location.area) {
        Some(area) => format!("Площадь страны: {area} км. кв."),
        None => format!("Площадь страны: {NO_DATA}"),
    };
    let visibility = match weather.visibility {
        Some(meters) => format!("Видимость: {meters} м."),
        None => format!("Видимость: {NO_DATA}"),
    };

    [
        "Информация о стране".to_string(),
        format!("Страна: {}", location.name),
        area,
        format!("Столица: {}", location.capital),
        format!("Временная зона столицы: {}", location.timezone),
        format!("Текущее время в столице: {}", location.current_time),
        format!("Координаты столицы: {} д. {} ш.", location.longitude, location.latitude),
        format!("Регион: {}", location.subregion),
        format!("Языки: {}", format_languages(&location.languages)),
        format!("Население страны: {} чел.", format_population(location.population)),
        format!("Курсы валют: {}", format_currency_rates(&info.currency_rates)),
        "Информация о погоде".to_string(),
        format!("Погода: {} °C", weather.temperature),
        format!("Описание погоды: {}", weather.description),
        visibility,
        format!("Скорость ветра: {} м/с", weather.wind_speed),
        format!("Топ 3 новости за последнее время из {}", location.name),
        format!("1. {}", news.article1),
        format!("2. {}", news.article2),
        format!("3. {}", news.article3),
    ]
    .into_iter()
    .map(|line| vec![line])
    .collect()
}

/// Whole square kilometers, truncated toward zero.
///
/// `None` when the area is unknown. Upstream data uses exactly `0.0` for
/// "unknown", so that value is treated like a missing one.
pub fn format_area(area: Option<f64>) -> Option<String> {
    match area {
        Some(area) if area != 0.0 && area.is_finite() => Some(format!("{}", area.trunc() as i64)),
        _ => None,
    }
}

pub fn format_languages(languages: &[Language]) -> String {
    languages
        .iter()
        .map(|lang| format!("{} ({})", lang.name, lang.native_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Digits grouped by three with `.`: 1234567 -> "1.234.567".
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn format_currency_rates(rates: &CurrencyRates) -> String {
    rates
        .iter()
        .map(|entry| format!("{} = {} руб.", entry.code, round_rate(entry.rate)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Two decimal places, ties away from zero (61.005 -> 61.01).
fn round_rate(rate: Decimal) -> Decimal {
    let mut rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, News, Weather};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn france() -> LocationInfo {
        LocationInfo {
            location: Location {
                name: "France".into(),
                alpha2_code: "FR".into(),
                capital: "Paris".into(),
                latitude: 48.8566,
                longitude: 2.3522,
                area: Some(551695.7),
                population: 67_000_000,
                subregion: "Western Europe".into(),
                languages: vec![Language { name: "French".into(), native_name: "français".into() }],
                currencies: vec!["EUR".into()],
                timezone: "Europe/Paris".into(),
                current_time: "14:03:27".into(),
            },
            weather: Weather {
                temperature: 18.5,
                description: "ясно".into(),
                visibility: Some(10000),
                wind_speed: 3.6,
            },
            news: News {
                article1: "First".into(),
                article2: "Second".into(),
                article3: "Third".into(),
            },
            currency_rates: [("USD", dec("91.0305")), ("EUR", dec("99.0388"))].into_iter().collect(),
        }
    }

    fn lines(info: &LocationInfo) -> Vec<String> {
        render(info).into_iter().map(|mut row| row.remove(0)).collect()
    }

    #[test]
    fn renders_rows_in_fixed_order() {
        let rows = render(&france());
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|row| row.len() == 1));

        assert_eq!(
            lines(&france()),
            [
                "Информация о стране",
                "Страна: France",
                "Площадь страны: 551695 км. кв.",
                "Столица: Paris",
                "Временная зона столицы: Europe/Paris",
                "Текущее время в столице: 14:03:27",
                "Координаты столицы: 2.3522 д. 48.8566 ш.",
                "Регион: Western Europe",
                "Языки: French (français)",
                "Население страны: 67.000.000 чел.",
                "Курсы валют: USD = 91.03 руб., EUR = 99.04 руб.",
                "Информация о погоде",
                "Погода: 18.5 °C",
                "Описание погоды: ясно",
                "Видимость: 10000 м.",
                "Скорость ветра: 3.6 м/с",
                "Топ 3 новости за последнее время из France",
                "1. First",
                "2. Second",
                "3. Third",
            ]
        );
    }

    #[test]
    fn rendering_is_repeatable() {
        let info = france();
        assert_eq!(render(&info), render(&info));
    }

    #[test]
    fn zero_area_renders_no_data() {
        let mut info = france();
        info.location.area = Some(0.0);

        assert_eq!(lines(&info)[2], "Площадь страны: Нет данных");
    }

    #[test]
    fn area_is_truncated_not_rounded() {
        assert_eq!(format_area(Some(0.99)).as_deref(), Some("0"));
        assert_eq!(format_area(Some(640679.999)).as_deref(), Some("640679"));
        assert_eq!(format_area(Some(1.0)).as_deref(), Some("1"));
        assert_eq!(format_area(Some(0.0)), None);
        assert_eq!(format_area(Some(-0.0)), None);
        assert_eq!(format_area(None), None);
    }

    #[test]
    fn languages_keep_order() {
        let languages = vec![
            Language { name: "German".into(), native_name: "Deutsch".into() },
            Language { name: "French".into(), native_name: "français".into() },
            Language { name: "Italian".into(), native_name: "Italiano".into() },
        ];

        assert_eq!(
            format_languages(&languages),
            "German (Deutsch), French (français), Italian (Italiano)"
        );
    }

    #[test]
    fn empty_languages_render_empty_row_value() {
        let mut info = france();
        info.location.languages.clear();

        assert_eq!(format_languages(&[]), "");
        assert_eq!(lines(&info)[8], "Языки: ");
    }

    #[test]
    fn population_groups_with_periods() {
        assert_eq!(format_population(0), "0");
        assert_eq!(format_population(999), "999");
        assert_eq!(format_population(1000), "1.000");
        assert_eq!(format_population(12345), "12.345");
        assert_eq!(format_population(1234567), "1.234.567");
        assert_eq!(format_population(67_000_000), "67.000.000");
        assert_eq!(format_population(u64::MAX), "18.446.744.073.709.551.615");
    }

    #[test]
    fn currency_rates_round_half_up() {
        let below: CurrencyRates = [("USD", dec("61.004999"))].into_iter().collect();
        let tie: CurrencyRates = [("USD", dec("61.005"))].into_iter().collect();
        let whole: CurrencyRates = [("CNY", dec("12"))].into_iter().collect();

        assert_eq!(format_currency_rates(&below), "USD = 61.00 руб.");
        assert_eq!(format_currency_rates(&tie), "USD = 61.01 руб.");
        assert_eq!(format_currency_rates(&whole), "CNY = 12.00 руб.");
    }

    #[test]
    fn currency_rates_keep_insertion_order() {
        let rates: CurrencyRates =
            [("JPY", dec("0.584427")), ("USD", dec("91.0305")), ("EUR", dec("99.0388"))]
                .into_iter()
                .collect();

        assert_eq!(
            format_currency_rates(&rates),
            "JPY = 0.58 руб., USD = 91.03 руб., EUR = 99.04 руб."
        );
    }

    #[test]
    fn empty_currency_rates_render_empty_string() {
        assert_eq!(format_currency_rates(&CurrencyRates::new()), "");
    }

    #[test]
    fn whole_floats_print_without_fraction() {
        let mut info = france();
        info.weather.temperature = 18.0;
        info.weather.wind_speed = 0.25;

        assert_eq!(lines(&info)[12], "Погода: 18 °C");
        assert_eq!(lines(&info)[15], "Скорость ветра: 0.25 м/с");
    }

    #[test]
    fn unknown_visibility_renders_no_data() {
        let mut info = france();
        info.weather.visibility = None;

        assert_eq!(lines(&info)[14], "Видимость: Нет данных");
    }
}
