//! Minute-by-minute crowd forecasts for a single zone.

use chrono::Utc;
use drishti_types::{ForecastPoint, RiskLevel, Zone, ZoneForecast};
use rand::Rng;

use crate::config::ForecastConfig;
use crate::random::{float_between, round2};

/// Per-minute drift of the count, as a fraction of the current count.
const TREND_RANGE: (f64, f64) = (-0.1, 0.2);
/// Per-minute jitter on top of the trend.
const NOISE_RANGE: (f64, f64) = (-0.05, 0.05);
/// Confidence lost per minute of horizon.
const CONFIDENCE_DECAY: f64 = 0.02;
/// Confidence never drops below this.
const CONFIDENCE_FLOOR: f64 = 0.6;

/// Produces [`ZoneForecast`]s from a zone's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecaster {
    horizon_minutes: u32,
}

impl Forecaster {
    /// Forecaster looking `horizon_minutes` ahead.
    pub const fn new(horizon_minutes: u32) -> Self {
        Self { horizon_minutes }
    }

    /// Build from the `forecast` config section.
    pub const fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.horizon_minutes)
    }

    /// Forecast the zone's people count for each minute of the horizon.
    ///
    /// Every point is drawn independently from the current count; the
    /// zone itself is not modified.
    pub fn forecast<R: Rng + ?Sized>(self, zone: &Zone, rng: &mut R) -> ZoneForecast {
        let current = zone.people_count;
        let predictions = (1..=self.horizon_minutes)
            .map(|minute| {
                let trend = float_between(rng, TREND_RANGE.0, TREND_RANGE.1);
                let noise = float_between(rng, NOISE_RANGE.0, NOISE_RANGE.1);
                ForecastPoint {
                    time_offset: minute,
                    predicted_count: scale_count(current, 1.0 + trend + noise),
                    confidence: confidence_at(minute),
                }
            })
            .collect();

        let risk_assessment = RiskLevel::from_people_count(current);
        let recommendation = if risk_assessment == RiskLevel::High {
            format!("Monitor zone {} closely", zone.id)
        } else {
            String::from("Normal monitoring")
        };

        ZoneForecast {
            zone_id: zone.id.clone(),
            current_count: current,
            predictions,
            risk_assessment,
            recommendation,
            timestamp: Utc::now(),
        }
    }
}

/// `floor(count * factor)`, never below zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_count(count: u32, factor: f64) -> u32 {
    // Non-negative after the clamp; `as` saturates at u32::MAX.
    (f64::from(count) * factor).floor().max(0.0) as u32
}

/// Confidence for a point `minute` minutes out.
fn confidence_at(minute: u32) -> f64 {
    round2(CONFIDENCE_DECAY.mul_add(-f64::from(minute), 1.0)).max(CONFIDENCE_FLOOR)
}
