use serde::Deserialize;

use crate::config::ObserverConfig;
use crate::coordinates::GeodeticPosition;
use crate::error::DataUnavailable;

#[derive(Debug)]
pub struct Observer {
    pub name: String,
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
    pub altitude: f64,  // meters
}

/// The parts of an ipinfo-style geolocation response we use.
#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    loc: Option<String>,
    city: Option<String>,
    country: Option<String>,
}

impl Observer {
    pub fn new(name: String, lat: f64, lon: f64, alt: f64) -> Self {
        Self {
            name,
            latitude: lat,
            longitude: lon,
            altitude: alt,
        }
    }

    pub fn from_config(config: &ObserverConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.latitude,
            config.longitude,
            config.altitude,
        )
    }

    /// Looks up the caller's public IP location.
    pub fn from_ip(agent: &ureq::Agent, url: &str) -> Result<Self, DataUnavailable> {
        log::debug!("geolocating observer via {}", url);
        let body = agent
            .get(url)
            .call()
            .map_err(|e| DataUnavailable::from((url, e)))?
            .into_string()
            .map_err(|e| DataUnavailable::malformed(url, e))?;

        let observer = parse_geolocation(url, &body)?;
        log::info!(
            "observer located at {:.4}, {:.4} ({})",
            observer.latitude,
            observer.longitude,
            observer.name
        );
        Ok(observer)
    }

    pub fn position(&self) -> GeodeticPosition {
        GeodeticPosition::new(self.longitude, self.latitude, self.altitude)
    }
}

/// Parses a geolocation body whose `loc` field reads `"<lat>,<lon>"`.
pub fn parse_geolocation(url: &str, body: &str) -> Result<Observer, DataUnavailable> {
    let response: GeolocationResponse =
        serde_json::from_str(body).map_err(|e| DataUnavailable::malformed(url, e))?;

    let loc = response
        .loc
        .ok_or_else(|| DataUnavailable::malformed(url, "missing `loc` field"))?;
    let (lat, lon) = loc
        .split_once(',')
        .ok_or_else(|| DataUnavailable::malformed(url, format!("unexpected loc {loc:?}")))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| DataUnavailable::malformed(url, format!("bad latitude in {loc:?}")))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| DataUnavailable::malformed(url, format!("bad longitude in {loc:?}")))?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(DataUnavailable::malformed(
            url,
            format!("latitude {latitude} out of range"),
        ));
    }
    if !longitude.is_finite() {
        return Err(DataUnavailable::malformed(
            url,
            format!("longitude {longitude} is not finite"),
        ));
    }

    let name = match (response.city, response.country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(place), None) | (None, Some(place)) => place,
        (None, None) => "IP location".to_string(),
    };

    Ok(Observer::new(name, latitude, longitude, 0.0))
}
