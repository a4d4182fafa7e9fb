use std::fmt;

use serde::{Deserialize, Serialize};

/// Equatorial pointing: right ascension in hours, declination in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    ra_hours: f64,
    dec_degrees: f64,
}

impl Coordinate {
    /// Returns `None` for values a mount cannot actually point at.
    pub fn new(ra_hours: f64, dec_degrees: f64) -> Option<Self> {
        let ra_ok = ra_hours.is_finite() && (0.0..24.0).contains(&ra_hours);
        let dec_ok = dec_degrees.is_finite() && (-90.0..=90.0).contains(&dec_degrees);
        (ra_ok && dec_ok).then_some(Self {
            ra_hours,
            dec_degrees,
        })
    }

    pub fn ra_hours(&self) -> f64 {
        self.ra_hours
    }

    pub fn dec_degrees(&self) -> f64 {
        self.dec_degrees
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RA: {}, DEC: {}",
            sexagesimal(self.ra_hours),
            sexagesimal(self.dec_degrees)
        )
    }
}

/// Formats a value as `[-]DD:MM:SS`, rounded to the nearest second.
pub fn sexagesimal(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let total = (value.abs() * 3600.0).round() as u64;
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}
