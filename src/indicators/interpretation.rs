//! Human-readable interpretation of a criteria assessment
//!
//! Translates a territory grade, the category presence weights, and the two
//! accessibility quartiles into a list of interpretation strings. Inputs are
//! range-validated before anything is produced.

use crate::{Result, TransportFramesError};
use serde::Deserialize;

/// Query parameters of the interpretation endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct InterpretationRequest {
    /// Territory grade in [0, 5]
    pub grade: f64,

    /// Railway station presence weight (0.0 or 0.35)
    pub weight_r_stops: f64,

    /// Bus stop presence weight (0.0 or 0.35)
    pub weight_b_stops: f64,

    /// Port/ferry presence weight (0.0 or 0.2)
    pub weight_ferry: f64,

    /// Aerodrome presence weight (0.0 or 0.1)
    pub weight_aero: f64,

    /// Private transport accessibility quartile (1 = best, 4 = worst)
    pub car_access_quartile: u8,

    /// Public transport accessibility quartile (1 = best, 4 = worst)
    pub public_access_quartile: u8,
}

impl InterpretationRequest {
    fn validate(&self) -> Result<()> {
        check_range("grade", self.grade, 0.0, 5.0)?;
        check_range("weight_r_stops", self.weight_r_stops, 0.0, 0.35)?;
        check_range("weight_b_stops", self.weight_b_stops, 0.0, 0.35)?;
        check_range("weight_ferry", self.weight_ferry, 0.0, 0.2)?;
        check_range("weight_aero", self.weight_aero, 0.0, 0.1)?;
        check_quartile("car_access_quartile", self.car_access_quartile)?;
        check_quartile("public_access_quartile", self.public_access_quartile)?;
        Ok(())
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(TransportFramesError::Validation(format!(
            "{} must be within [{}, {}], got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

fn check_quartile(name: &str, value: u8) -> Result<()> {
    if !(1..=4).contains(&value) {
        return Err(TransportFramesError::Validation(format!(
            "{} must be within [1, 4], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Produce interpretation strings for a criteria assessment
pub fn interpret(request: &InterpretationRequest) -> Result<Vec<String>> {
    request.validate()?;

    let mut lines = Vec::new();

    let frame_phrase = if request.grade >= 4.0 {
        "well integrated into the regional transport frame"
    } else if request.grade >= 2.0 {
        "moderately integrated into the regional transport frame"
    } else {
        "weakly integrated into the regional transport frame"
    };
    lines.push(format!(
        "The territory is graded {:.1} out of 5.0: {}.",
        request.grade, frame_phrase
    ));

    lines.push(presence_line(request.weight_r_stops, "railway stations"));
    lines.push(presence_line(request.weight_b_stops, "bus stops"));
    lines.push(presence_line(request.weight_ferry, "ports or ferry crossings"));
    lines.push(presence_line(request.weight_aero, "aerodromes"));

    lines.push(format!(
        "Private transport accessibility is {}.",
        quartile_phrase(request.car_access_quartile)
    ));
    lines.push(format!(
        "Public transport accessibility is {}.",
        quartile_phrase(request.public_access_quartile)
    ));

    Ok(lines)
}

fn presence_line(weight: f64, what: &str) -> String {
    if weight > 0.0 {
        format!("The territory has access to {}.", what)
    } else {
        format!("The territory has no access to {}.", what)
    }
}

fn quartile_phrase(quartile: u8) -> &'static str {
    match quartile {
        1 => "in the best quartile for the region",
        2 => "above the regional median",
        3 => "below the regional median",
        _ => "in the worst quartile for the region",
    }
}
