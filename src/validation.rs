//! Field rules enforced before a request is sent.
//!
//! Every validated field is described by one [`Rule`] in a static table; the
//! per-field `validate_*` functions and the dynamic [`validate`] entry point
//! all run through the same checks.

use serde_json::Value;

use crate::error::ValidationError;

const NUMERIC: &str = "int or float";
const TEXT: &str = "str";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Numeric,
    Text,
    /// Opaque values forwarded as-is.
    FreeForm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Constraint {
    Any,
    /// Inclusive on both ends.
    Range { min: f64, max: f64 },
    Numbers(&'static [f64]),
    Strings(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rule {
    pub(crate) field: &'static str,
    pub(crate) kind: Kind,
    pub(crate) constraint: Constraint,
}

const fn numeric(field: &'static str, constraint: Constraint) -> Rule {
    Rule {
        field,
        kind: Kind::Numeric,
        constraint,
    }
}

const fn text(field: &'static str, constraint: Constraint) -> Rule {
    Rule {
        field,
        kind: Kind::Text,
        constraint,
    }
}

const fn free(field: &'static str) -> Rule {
    Rule {
        field,
        kind: Kind::FreeForm,
        constraint: Constraint::Any,
    }
}

pub(crate) const FORMAT: Rule = free("format");
pub(crate) const SYSTEM_SIZE: Rule = numeric(
    "system_size",
    Constraint::Range {
        min: 0.05,
        max: 500000.0,
    },
);
pub(crate) const ADDRESS: Rule = free("address");
pub(crate) const LAT: Rule = numeric(
    "lat",
    Constraint::Range {
        min: -90.0,
        max: 90.0,
    },
);
pub(crate) const LON: Rule = numeric(
    "lon",
    Constraint::Range {
        min: -180.0,
        max: 180.0,
    },
);
pub(crate) const FILE_ID: Rule = free("file_id");
pub(crate) const DATASET: Rule = text("dataset", Constraint::Strings(&["tmy2", "tmy3", "intl"]));
pub(crate) const TIMEFRAME: Rule = text("timeframe", Constraint::Strings(&["hourly", "monthly"]));
pub(crate) const AZIMUTH: Rule = numeric(
    "azimuth",
    Constraint::Range {
        min: 0.0,
        max: 360.0,
    },
);
pub(crate) const DERATE: Rule = numeric("derate", Constraint::Range { min: 0.0, max: 1.0 });
pub(crate) const TILT: Rule = numeric("tilt", Constraint::Any);
pub(crate) const TILT_EQ_LAT: Rule = numeric("tilt_eq_lat", Constraint::Numbers(&[0.0, 1.0]));
pub(crate) const TRACK_MODE: Rule = numeric("track_mode", Constraint::Numbers(&[0.0, 1.0, 2.0]));
pub(crate) const INOCT: Rule = numeric(
    "inoct",
    Constraint::Range {
        min: 30.0,
        max: 80.0,
    },
);
// A power temperature coefficient is always negative, so 0 is rejected.
pub(crate) const GAMMA: Rule = numeric(
    "gamma",
    Constraint::Range {
        min: -2.0,
        max: -0.01,
    },
);
pub(crate) const CALLBACK: Rule = free("callback");

/// All request parameters, in the order they are sent.
pub(crate) const RULES: &[Rule] = &[
    FORMAT,
    SYSTEM_SIZE,
    ADDRESS,
    LAT,
    LON,
    FILE_ID,
    DATASET,
    TIMEFRAME,
    AZIMUTH,
    DERATE,
    TILT,
    TILT_EQ_LAT,
    TRACK_MODE,
    INOCT,
    GAMMA,
    CALLBACK,
];

pub(crate) fn rule(field: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.field == field)
}

fn allowed_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn allowed_strings(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn check_number(
    rule: &Rule,
    value: Option<f64>,
) -> Result<Option<f64>, ValidationError> {
    let Some(v) = value else {
        return Ok(None);
    };

    if !v.is_finite() {
        return Err(ValidationError::WrongType {
            field: rule.field,
            expected: NUMERIC,
        });
    }

    match rule.constraint {
        Constraint::Range { min, max } if !(min <= v && v <= max) => {
            Err(ValidationError::OutOfRange {
                field: rule.field,
                value: v,
                min,
                max,
            })
        }
        Constraint::Numbers(allowed) if !allowed.contains(&v) => {
            Err(ValidationError::NotAllowed {
                field: rule.field,
                value: v.to_string(),
                allowed: allowed_numbers(allowed),
            })
        }
        _ => Ok(Some(v)),
    }
}

pub(crate) fn check_text<'a>(
    rule: &Rule,
    value: Option<&'a str>,
) -> Result<Option<&'a str>, ValidationError> {
    let Some(v) = value else {
        return Ok(None);
    };

    match rule.constraint {
        Constraint::Strings(allowed) if !allowed.contains(&v) => {
            Err(ValidationError::NotAllowed {
                field: rule.field,
                value: v.to_string(),
                allowed: allowed_strings(allowed),
            })
        }
        _ => Ok(Some(v)),
    }
}

/// Validates a dynamically typed value for `field`.
///
/// Unlike the typed `validate_*` functions this also performs the type check:
/// numeric fields require a JSON number, `dataset`/`timeframe` require a
/// string, and free-form fields accept any scalar. `null` means "not set" and
/// yields `Ok(None)`.
pub fn validate(field: &str, value: &Value) -> Result<Option<Value>, ValidationError> {
    let rule = rule(field).ok_or_else(|| ValidationError::UnknownField(field.to_string()))?;

    if value.is_null() {
        return Ok(None);
    }

    match rule.kind {
        Kind::Numeric => {
            let n = value.as_f64().ok_or(ValidationError::WrongType {
                field: rule.field,
                expected: NUMERIC,
            })?;
            check_number(rule, Some(n))?;
        }
        Kind::Text => {
            let s = value.as_str().ok_or(ValidationError::WrongType {
                field: rule.field,
                expected: TEXT,
            })?;
            check_text(rule, Some(s))?;
        }
        Kind::FreeForm => {
            if value.is_array() || value.is_object() {
                return Err(ValidationError::NotScalar { field: rule.field });
            }
        }
    }

    Ok(Some(value.clone()))
}

pub fn validate_system_size(system_size: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&SYSTEM_SIZE, system_size)
}

pub fn validate_lat(lat: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&LAT, lat)
}

pub fn validate_lon(lon: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&LON, lon)
}

pub fn validate_dataset(dataset: Option<&str>) -> Result<Option<&str>, ValidationError> {
    check_text(&DATASET, dataset)
}

pub fn validate_timeframe(timeframe: Option<&str>) -> Result<Option<&str>, ValidationError> {
    check_text(&TIMEFRAME, timeframe)
}

pub fn validate_azimuth(azimuth: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&AZIMUTH, azimuth)
}

pub fn validate_derate(derate: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&DERATE, derate)
}

/// Tilt is only type-checked; any finite angle is accepted.
pub fn validate_tilt(tilt: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&TILT, tilt)
}

pub fn validate_tilt_eq_lat(tilt_eq_lat: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&TILT_EQ_LAT, tilt_eq_lat)
}

pub fn validate_track_mode(track_mode: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&TRACK_MODE, track_mode)
}

pub fn validate_inoct(inoct: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&INOCT, inoct)
}

pub fn validate_gamma(gamma: Option<f64>) -> Result<Option<f64>, ValidationError> {
    check_number(&GAMMA, gamma)
}
