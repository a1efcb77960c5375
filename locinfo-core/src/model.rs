use rust_decimal::Decimal;

/// Marker shown wherever a value is unknown.
pub const NO_DATA: &str = "Нет данных";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub native_name: String,
}

/// Country and capital facts produced by a `LocationResolver`.
///
/// `timezone` and `current_time` stay empty until the pipeline back-fills
/// them through [`Location::set_local_time`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Location {
    pub name: String,
    pub alpha2_code: String,
    pub capital: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Square kilometers. Both `None` and `Some(0.0)` mean "unknown".
    pub area: Option<f64>,
    pub population: u64,
    pub subregion: String,
    pub languages: Vec<Language>,
    /// ISO 4217 codes of the currencies used in the country.
    pub currencies: Vec<String>,
    pub timezone: String,
    pub current_time: String,
}

impl Location {
    pub fn set_local_time(&mut self, timezone: String, current_time: String) {
        self.timezone = timezone;
        self.current_time = current_time;
    }

    #[cfg(test)]
    pub(crate) fn has_local_time(&self) -> bool {
        !self.timezone.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub temperature: f64,
    pub description: String,
    /// Meters, when reported.
    pub visibility: Option<u32>,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct News {
    pub article1: String,
    pub article2: String,
    pub article3: String,
}

impl News {
    /// Takes the first three headlines, padding with [`NO_DATA`].
    pub fn from_headlines<I>(headlines: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut iter = headlines.into_iter();
        let mut next = || iter.next().unwrap_or_else(|| NO_DATA.to_string());

        Self { article1: next(), article2: next(), article3: next() }
    }

    #[cfg(test)]
    pub(crate) fn articles(&self) -> [&str; 3] {
        [&self.article1, &self.article2, &self.article3]
    }
}

/// One exchange rate: rubles per one unit of `code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRate {
    pub code: String,
    pub rate: Decimal,
}

/// Exchange rates in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrencyRates(Vec<CurrencyRate>);

impl CurrencyRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rate, or replaces the rate of an existing code in place.
    pub fn insert(&mut self, code: impl Into<String>, rate: Decimal) {
        let code = code.into();
        match self.0.iter_mut().find(|entry| entry.code == code) {
            Some(entry) => entry.rate = rate,
            None => self.0.push(CurrencyRate { code, rate }),
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, code: &str) -> Option<Decimal> {
        self.0.iter().find(|entry| entry.code == code).map(|entry| entry.rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyRate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for CurrencyRates {
    fn from_iter<T: IntoIterator<Item = (S, Decimal)>>(iter: T) -> Self {
        let mut rates = Self::new();
        for (code, rate) in iter {
            rates.insert(code, rate);
        }
        rates
    }
}

/// Everything gathered for one query, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub location: Location,
    pub weather: Weather,
    pub news: News,
    pub currency_rates: CurrencyRates,
}
