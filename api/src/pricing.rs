//! Price list and the public price calculator
//!
//! Rates are hard-coded weekly prices per screen in EUR.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::screens::{MAJOR_CITIES, REGIONS_TOKEN};

/// Weekly rate for any city outside the major ones
pub const REGIONAL_WEEKLY_RATE: u32 = 180;

/// Viaduct screens are only sold together, as one weekly package
pub const VIADUCT_PACKAGE_WEEKLY: u32 = 1500;

const CITY_RATES: [(&str, u32); 5] = [
    ("Vilnius", 420),
    ("Kaunas", 340),
    ("Klaipėda", 300),
    ("Šiauliai", 240),
    ("Panevėžys", 240),
];

pub fn weekly_rate(city: &str) -> u32 {
    CITY_RATES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|&(_, rate)| rate)
        .unwrap_or(REGIONAL_WEEKLY_RATE)
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub city: String,
    pub screens: u32,
    pub weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub city: String,
    pub rate: u32,
    pub screens: u32,
    pub weeks: u32,
    pub total: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("At least one screen is required")]
    NoScreens,
    #[error("Campaign must last at least one week")]
    NoWeeks,
}

pub fn quote(request: &QuoteRequest) -> Result<Quote, QuoteError> {
    if request.screens == 0 {
        return Err(QuoteError::NoScreens);
    }
    if request.weeks == 0 {
        return Err(QuoteError::NoWeeks);
    }
    let rate = weekly_rate(request.city.trim());
    Ok(Quote {
        city: request.city.trim().to_string(),
        rate,
        screens: request.screens,
        weeks: request.weeks,
        total: u64::from(rate) * u64::from(request.screens) * u64::from(request.weeks),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RateRow {
    pub city: &'static str,
    pub weekly_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: &'static str,
    pub description: &'static str,
    pub weekly_price: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceList {
    pub currency: &'static str,
    pub rates: Vec<RateRow>,
    pub packages: Vec<Package>,
}

pub fn price_list() -> PriceList {
    let mut rates: Vec<RateRow> = CITY_RATES
        .iter()
        .map(|&(city, weekly_rate)| RateRow { city, weekly_rate })
        .collect();
    rates.push(RateRow {
        city: REGIONS_TOKEN,
        weekly_rate: REGIONAL_WEEKLY_RATE,
    });

    PriceList {
        currency: "EUR",
        rates,
        packages: vec![
            Package {
                name: "Viaduct package",
                description: "All viaduct screens, sold together only",
                weekly_price: VIADUCT_PACKAGE_WEEKLY,
            },
            Package {
                name: "Major cities",
                description: "One screen in each of the five major cities",
                weekly_price: MAJOR_CITIES.iter().map(|c| weekly_rate(c)).sum(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(city: &str, screens: u32, weeks: u32) -> QuoteRequest {
        QuoteRequest {
            city: city.to_string(),
            screens,
            weeks,
        }
    }

    #[test]
    fn major_city_rates() {
        assert_eq!(weekly_rate("Vilnius"), 420);
        assert_eq!(weekly_rate("Klaipėda"), 300);
        assert_eq!(weekly_rate("Alytus"), REGIONAL_WEEKLY_RATE);
    }

    #[test]
    fn quote_multiplies_rate_screens_and_weeks() {
        let q = quote(&request("Kaunas", 3, 2)).expect("quote");
        assert_eq!(q.rate, 340);
        assert_eq!(q.total, 340 * 3 * 2);
    }

    #[test]
    fn quote_rejects_zero_inputs() {
        assert_eq!(quote(&request("Vilnius", 0, 1)), Err(QuoteError::NoScreens));
        assert_eq!(quote(&request("Vilnius", 1, 0)), Err(QuoteError::NoWeeks));
    }

    #[test]
    fn price_list_covers_major_cities_and_regions() {
        let list = price_list();
        assert_eq!(list.rates.len(), 6);
        assert_eq!(list.rates.last().map(|r| r.city), Some("Regionai"));
        assert_eq!(list.packages[1].weekly_price, 420 + 340 + 300 + 240 + 240);
    }
}
