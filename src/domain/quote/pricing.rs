//! Deterministic price estimation.
//!
//! The estimate is a function of weight, route distance and a per-service
//! multiplier. Distance comes from resolved coordinates when geocoding
//! succeeded, otherwise a fixed default keeps the quote flowing (flagged as
//! an unverified address upstream).

use chrono::NaiveDate;

use super::draft::{Coordinates, ServiceLevel};

/// Distance assumed when one or both addresses could not be geocoded.
pub const DEFAULT_DISTANCE_KM: f64 = 1500.0;

/// Mean earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Rate card for the price function. All coefficients are non-negative so
/// the estimate is monotone non-decreasing in weight and distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCard {
    /// Flat handling fee.
    pub base_fee: f64,
    /// Per metric ton.
    pub per_ton: f64,
    /// Per kilometer of route distance.
    pub per_km: f64,
    /// Multiplier applied when the shipment is declared hazardous.
    pub hazardous_multiplier: f64,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            base_fee: 75.0,
            per_ton: 40.0,
            per_km: 1.1,
            hazardous_multiplier: 1.25,
        }
    }
}

impl RateCard {
    /// Computes the estimated price, rounded to whole cents.
    pub fn price(
        &self,
        weight_tons: f64,
        distance_km: f64,
        level: ServiceLevel,
        hazardous: bool,
    ) -> f64 {
        let mut price = self.base_fee + weight_tons * self.per_ton + distance_km * self.per_km;
        price *= level.multiplier();
        if hazardous {
            price *= self.hazardous_multiplier;
        }
        (price * 100.0).round() / 100.0
    }
}

/// Great-circle distance between two coordinates (haversine).
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Route distance from optionally resolved endpoints.
///
/// Falls back to [`DEFAULT_DISTANCE_KM`] when either endpoint is missing.
pub fn route_distance_km(origin: Option<&Coordinates>, destination: Option<&Coordinates>) -> f64 {
    match (origin, destination) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => DEFAULT_DISTANCE_KM,
    }
}

/// Delivery estimate: pickup date plus the service level's transit time.
pub fn estimated_delivery(pickup: NaiveDate, level: ServiceLevel) -> NaiveDate {
    pickup + chrono::Duration::days(level.transit_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn los_angeles() -> Coordinates {
        Coordinates::new(34.0522, -118.2437)
    }

    fn new_york() -> Coordinates {
        Coordinates::new(40.7128, -74.0060)
    }

    #[test]
    fn haversine_la_to_ny_is_roughly_3940_km() {
        let d = haversine_km(&los_angeles(), &new_york());
        assert!((d - 3940.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let d = haversine_km(&los_angeles(), &los_angeles());
        assert!(d < 1e-6);
    }

    #[test]
    fn route_distance_defaults_without_coordinates() {
        assert_eq!(route_distance_km(None, None), DEFAULT_DISTANCE_KM);
        assert_eq!(
            route_distance_km(Some(&los_angeles()), None),
            DEFAULT_DISTANCE_KM
        );
    }

    #[test]
    fn express_costs_more_than_standard() {
        let card = RateCard::default();
        let standard = card.price(10.0, 1000.0, ServiceLevel::Standard, false);
        let express = card.price(10.0, 1000.0, ServiceLevel::Express, false);
        assert!(express > standard);
    }

    #[test]
    fn hazardous_surcharge_applies() {
        let card = RateCard::default();
        let plain = card.price(10.0, 1000.0, ServiceLevel::Standard, false);
        let hazmat = card.price(10.0, 1000.0, ServiceLevel::Standard, true);
        assert!(hazmat > plain);
    }

    #[test]
    fn delivery_estimate_adds_transit_days() {
        let pickup: NaiveDate = "2026-09-01".parse().unwrap();
        assert_eq!(
            estimated_delivery(pickup, ServiceLevel::Express),
            "2026-09-03".parse::<NaiveDate>().unwrap()
        );
    }

    proptest! {
        #[test]
        fn price_monotone_in_weight(
            w1 in 0.0f64..500.0,
            delta in 0.0f64..100.0,
            d in 0.0f64..20_000.0,
        ) {
            let card = RateCard::default();
            let lo = card.price(w1, d, ServiceLevel::Standard, false);
            let hi = card.price(w1 + delta, d, ServiceLevel::Standard, false);
            prop_assert!(hi >= lo);
        }

        #[test]
        fn price_monotone_in_distance(
            w in 0.0f64..500.0,
            d1 in 0.0f64..20_000.0,
            delta in 0.0f64..5_000.0,
        ) {
            let card = RateCard::default();
            let lo = card.price(w, d1, ServiceLevel::Standard, false);
            let hi = card.price(w, d1 + delta, ServiceLevel::Standard, false);
            prop_assert!(hi >= lo);
        }

        #[test]
        fn price_is_deterministic(w in 0.0f64..500.0, d in 0.0f64..20_000.0) {
            let card = RateCard::default();
            prop_assert_eq!(
                card.price(w, d, ServiceLevel::Economy, true),
                card.price(w, d, ServiceLevel::Economy, true)
            );
        }
    }
}
