use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinates::GeodeticPosition;
use crate::error::DataUnavailable;

/// One telemetry sample as reported by the wheretheiss.at API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SatelliteTelemetry {
    pub name: String,
    pub id: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64, // kilometers
    #[serde(default)]
    pub velocity: Option<f64>, // km/h
    #[serde(default)]
    pub visibility: Option<String>,
    pub timestamp: i64, // unix seconds
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

impl SatelliteTelemetry {
    pub fn position(&self) -> GeodeticPosition {
        GeodeticPosition::new(self.longitude, self.latitude, self.altitude * 1000.0)
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Fetches the current sample for `satellite_id` from `base_url`.
    pub fn fetch(
        agent: &ureq::Agent,
        base_url: &str,
        satellite_id: u32,
    ) -> Result<Self, DataUnavailable> {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), satellite_id);
        log::debug!("fetching telemetry from {}", url);

        let body = match agent.get(&url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| DataUnavailable::malformed(&url, e))?,
            // The API explains unknown ids in the body of its 404
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                    return Err(DataUnavailable::Rejected {
                        url,
                        message: api_error.error,
                    });
                }
                return Err(DataUnavailable::Status { url, status });
            }
            Err(e) => return Err(DataUnavailable::from((url.as_str(), e))),
        };

        let telemetry = parse_telemetry(&url, &body)?;
        log::info!(
            "{} at {:.4}, {:.4}, {:.1} km",
            telemetry.name,
            telemetry.latitude,
            telemetry.longitude,
            telemetry.altitude
        );
        Ok(telemetry)
    }
}

pub fn parse_telemetry(url: &str, body: &str) -> Result<SatelliteTelemetry, DataUnavailable> {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return Err(DataUnavailable::Rejected {
            url: url.to_string(),
            message: api_error.error,
        });
    }

    let telemetry: SatelliteTelemetry =
        serde_json::from_str(body).map_err(|e| DataUnavailable::malformed(url, e))?;

    if !(-90.0..=90.0).contains(&telemetry.latitude) || !telemetry.longitude.is_finite() {
        return Err(DataUnavailable::malformed(
            url,
            format!(
                "position {}, {} out of range",
                telemetry.latitude, telemetry.longitude
            ),
        ));
    }

    Ok(telemetry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const URL: &str = "https://api.wheretheiss.at/v1/satellites/25544";

    const SAMPLE: &str = r#"{
        "name": "iss",
        "id": 25544,
        "latitude": 50.11496269845,
        "longitude": 118.07900427317,
        "altitude": 408.05526028199,
        "velocity": 27635.971970874,
        "visibility": "daylight",
        "footprint": 4446.1877699772,
        "timestamp": 1364069476,
        "daynum": 2456375.3411574,
        "solar_lat": 1.3327003598631,
        "solar_lon": 238.78610691196,
        "units": "kilometers"
    }"#;

    #[test]
    fn test_parse_telemetry() {
        let telemetry = parse_telemetry(URL, SAMPLE).unwrap();
        assert_eq!(telemetry.name, "iss");
        assert_eq!(telemetry.id, 25544);
        assert_eq!(telemetry.visibility.as_deref(), Some("daylight"));
        assert_approx_eq!(telemetry.velocity.unwrap(), 27635.971970874);

        let position = telemetry.position();
        assert_approx_eq!(position.altitude_m, 408_055.26028199, 1e-6);
        assert_eq!(position.latitude_deg, 50.11496269845);
        assert_eq!(position.longitude_deg, 118.07900427317);

        let time = telemetry.time().unwrap();
        assert_eq!(time.to_rfc3339(), "2013-03-23T20:11:16+00:00");
    }

    #[test]
    fn test_optional_fields_may_be_missing() {
        let body = r#"{"name":"iss","id":25544,"latitude":-12.5,"longitude":-60.0,"altitude":420.0,"timestamp":0}"#;
        let telemetry = parse_telemetry(URL, body).unwrap();
        assert!(telemetry.velocity.is_none());
        assert!(telemetry.visibility.is_none());
        assert_eq!(telemetry.position().altitude_m, 420_000.0);
    }

    #[test]
    fn test_api_error_is_rejected() {
        let err = parse_telemetry(URL, r#"{"error":"satellite not found","status":404}"#).unwrap_err();
        match err {
            DataUnavailable::Rejected { message, .. } => assert_eq!(message, "satellite not found"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_telemetry_is_not_zero_filled() {
        let err = parse_telemetry(URL, r#"{"name":"iss","id":25544,"timestamp":0}"#).unwrap_err();
        assert!(matches!(err, DataUnavailable::Malformed { .. }));

        let body = r#"{"name":"iss","id":25544,"latitude":95.0,"longitude":0.0,"altitude":420.0,"timestamp":0}"#;
        assert!(matches!(
            parse_telemetry(URL, body),
            Err(DataUnavailable::Malformed { .. })
        ));
    }
}
