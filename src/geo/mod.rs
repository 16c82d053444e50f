use serde::Deserialize;

use crate::error::AppError;
use crate::models::partner::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Callers send coordinates either as JSON numbers or as decimal
/// strings; both forms go through the same validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
}

pub fn parse_coordinate(raw: &RawCoordinate) -> Result<f64, AppError> {
    let value = match raw {
        RawCoordinate::Number(n) => *n,
        RawCoordinate::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::InvalidCoordinate(s.clone()))?,
    };

    // Rejecting NaN and infinity here keeps them out of every distance
    // comparison downstream.
    if !value.is_finite() {
        return Err(AppError::InvalidCoordinate(value.to_string()));
    }

    Ok(value)
}

pub fn parse_point(lat: &RawCoordinate, lng: &RawCoordinate) -> Result<GeoPoint, AppError> {
    Ok(GeoPoint {
        lat: parse_coordinate(lat)?,
        lng: parse_coordinate(lng)?,
    })
}
