use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("observer and target coincide; range and direction are undefined")]
    ZeroDisplacement,

    #[error("observer is at a pole; the local north/west/up frame is undefined")]
    PolarSingularity,

    #[error("latitude {0}° is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("altitude {0} m places the point below the center of the Earth")]
    BelowEarthCenter(f64),

    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
}

/// A collaborator could not produce a usable position.
#[derive(Debug, Error)]
pub enum DataUnavailable {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} rejected the request: {message}")]
    Rejected { url: String, message: String },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl DataUnavailable {
    pub fn malformed(url: &str, reason: impl std::fmt::Display) -> Self {
        DataUnavailable::Malformed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<(&str, ureq::Error)> for DataUnavailable {
    fn from((url, err): (&str, ureq::Error)) -> Self {
        match err {
            ureq::Error::Status(status, _) => DataUnavailable::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => DataUnavailable::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        }
    }
}
