use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::look::ObserverResult;
use crate::observer::Observer;
use crate::satellite::SatelliteTelemetry;

#[derive(Serialize)]
struct JsonReport<'a> {
    satellite: &'a SatelliteTelemetry,
    observer: JsonObserver<'a>,
    range_m: f64,
    azimuth_deg: f64,
    elevation_angle_deg: f64,
    horizon_elevation_deg: f64,
    compass_bearing_deg: f64,
    above_horizon: bool,
}

#[derive(Serialize)]
struct JsonObserver<'a> {
    name: &'a str,
    latitude: f64,
    longitude: f64,
}

pub fn render_text(
    observer: &Observer,
    telemetry: &SatelliteTelemetry,
    view: &ObserverResult,
    precision: usize,
) -> Result<String> {
    let p = precision;
    let mut out = String::new();

    let time = telemetry
        .time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("t={}", telemetry.timestamp));

    writeln!(
        out,
        "{} ({}) at {}",
        telemetry.name.to_uppercase(),
        telemetry.id,
        time
    )?;
    writeln!(
        out,
        "  Position:          {:.4}°, {:.4}°, {:.p$} km",
        telemetry.latitude, telemetry.longitude, telemetry.altitude
    )?;
    if let Some(visibility) = &telemetry.visibility {
        writeln!(out, "  Visibility:        {}", visibility)?;
    }
    writeln!(
        out,
        "Observer: {} ({:.4}°, {:.4}°)",
        observer.name, observer.latitude, observer.longitude
    )?;
    writeln!(
        out,
        "  Range:             {:.p$} m ({:.p$} km)",
        view.range_m,
        view.range_km()
    )?;
    writeln!(
        out,
        "  Azimuth:           {:.p$}° from north toward west (compass bearing {:.p$}°)",
        view.azimuth_deg,
        view.compass_bearing_deg()
    )?;
    writeln!(
        out,
        "  Zenith angle:      {:.p$}°",
        view.elevation_angle_deg
    )?;
    writeln!(
        out,
        "  Horizon elevation: {:.p$}° ({})",
        view.horizon_elevation_deg(),
        if view.is_above_horizon() {
            "above horizon"
        } else {
            "below horizon"
        }
    )?;

    Ok(out)
}

pub fn render_json(
    observer: &Observer,
    telemetry: &SatelliteTelemetry,
    view: &ObserverResult,
) -> Result<String> {
    let report = JsonReport {
        satellite: telemetry,
        observer: JsonObserver {
            name: &observer.name,
            latitude: observer.latitude,
            longitude: observer.longitude,
        },
        range_m: view.range_m,
        azimuth_deg: view.azimuth_deg,
        elevation_angle_deg: view.elevation_angle_deg,
        horizon_elevation_deg: view.horizon_elevation_deg(),
        compass_bearing_deg: view.compass_bearing_deg(),
        above_horizon: view.is_above_horizon(),
    };
    Ok(serde_json::to_string(&report)?)
}
