use serde_json::Value;

use crate::error::ValidationError;
use crate::validation::{self, Rule, check_number, check_text};

/// Query parameters for one PVWatts v4 request.
///
/// Every field is optional. `Default` sets `dataset=tmy3`, `timeframe=monthly`,
/// `tilt_eq_lat=0` and `track_mode=1`; set a field to `None` to leave it out
/// of the query entirely.
///
/// ```
/// use pvwatts::RequestParams;
///
/// let params = RequestParams::default()
///     .system_size(4.0)
///     .lat(40.0)
///     .lon(-105.0)
///     .azimuth(180.0)
///     .tilt(40.0)
///     .derate(0.77);
/// assert!(params.to_query().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    /// Response format; the service understands `json` and `xml`.
    pub format: Option<String>,
    /// Nameplate DC capacity in kW.
    pub system_size: Option<f64>,
    /// Site address, geocoded by the service when `lat`/`lon` are absent.
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Identifier of a specific weather file.
    pub file_id: Option<String>,
    pub dataset: Option<String>,
    pub timeframe: Option<String>,
    /// Degrees clockwise from true north.
    pub azimuth: Option<f64>,
    pub derate: Option<f64>,
    pub tilt: Option<f64>,
    pub tilt_eq_lat: Option<f64>,
    /// 0 = fixed, 1 = one-axis, 2 = two-axis.
    pub track_mode: Option<f64>,
    pub inoct: Option<f64>,
    pub gamma: Option<f64>,
    /// JSONP callback name.
    pub callback: Option<String>,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            format: None,
            system_size: None,
            address: None,
            lat: None,
            lon: None,
            file_id: None,
            dataset: Some("tmy3".to_string()),
            timeframe: Some("monthly".to_string()),
            azimuth: None,
            derate: None,
            tilt: None,
            tilt_eq_lat: Some(0.0),
            track_mode: Some(1.0),
            inoct: None,
            gamma: None,
            callback: None,
        }
    }
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from a JSON object of `name -> value`.
    ///
    /// Each entry is validated, including its JSON type. `null` clears a field
    /// (defaults included); keys the service does not know are rejected.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let map = value.as_object().ok_or(ValidationError::NotAnObject)?;
        let mut params = Self::default();

        for (name, raw) in map {
            let v = validation::validate(name, raw)?;
            params.set(name, v.as_ref());
        }

        Ok(params)
    }

    fn set(&mut self, name: &str, value: Option<&Value>) {
        let num = || value.and_then(Value::as_f64);
        let text = || value.map(scalar_to_string);
        match name {
            "format" => self.format = text(),
            "system_size" => self.system_size = num(),
            "address" => self.address = text(),
            "lat" => self.lat = num(),
            "lon" => self.lon = num(),
            "file_id" => self.file_id = text(),
            "dataset" => self.dataset = text(),
            "timeframe" => self.timeframe = text(),
            "azimuth" => self.azimuth = num(),
            "derate" => self.derate = num(),
            "tilt" => self.tilt = num(),
            "tilt_eq_lat" => self.tilt_eq_lat = num(),
            "track_mode" => self.track_mode = num(),
            "inoct" => self.inoct = num(),
            "gamma" => self.gamma = num(),
            "callback" => self.callback = text(),
            _ => {}
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn system_size(mut self, kw: f64) -> Self {
        self.system_size = Some(kw);
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn lat(mut self, lat: f64) -> Self {
        self.lat = Some(lat);
        self
    }

    pub fn lon(mut self, lon: f64) -> Self {
        self.lon = Some(lon);
        self
    }

    pub fn file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    pub fn azimuth(mut self, azimuth: f64) -> Self {
        self.azimuth = Some(azimuth);
        self
    }

    pub fn derate(mut self, derate: f64) -> Self {
        self.derate = Some(derate);
        self
    }

    pub fn tilt(mut self, tilt: f64) -> Self {
        self.tilt = Some(tilt);
        self
    }

    pub fn tilt_eq_lat(mut self, tilt_eq_lat: f64) -> Self {
        self.tilt_eq_lat = Some(tilt_eq_lat);
        self
    }

    pub fn track_mode(mut self, track_mode: f64) -> Self {
        self.track_mode = Some(track_mode);
        self
    }

    pub fn inoct(mut self, inoct: f64) -> Self {
        self.inoct = Some(inoct);
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Validates every field and renders the query pairs in wire order.
    ///
    /// Absent fields are omitted. The API key is not part of the result; the
    /// client appends it at dispatch time.
    pub fn to_query(&self) -> Result<Vec<(&'static str, String)>, ValidationError> {
        let mut q = Vec::with_capacity(validation::RULES.len() + 1);

        push_text(&mut q, &validation::FORMAT, self.format.as_deref())?;
        push_number(&mut q, &validation::SYSTEM_SIZE, self.system_size)?;
        push_text(&mut q, &validation::ADDRESS, self.address.as_deref())?;
        push_number(&mut q, &validation::LAT, self.lat)?;
        push_number(&mut q, &validation::LON, self.lon)?;
        push_text(&mut q, &validation::FILE_ID, self.file_id.as_deref())?;
        push_text(&mut q, &validation::DATASET, self.dataset.as_deref())?;
        push_text(&mut q, &validation::TIMEFRAME, self.timeframe.as_deref())?;
        push_number(&mut q, &validation::AZIMUTH, self.azimuth)?;
        push_number(&mut q, &validation::DERATE, self.derate)?;
        push_number(&mut q, &validation::TILT, self.tilt)?;
        push_number(&mut q, &validation::TILT_EQ_LAT, self.tilt_eq_lat)?;
        push_number(&mut q, &validation::TRACK_MODE, self.track_mode)?;
        push_number(&mut q, &validation::INOCT, self.inoct)?;
        push_number(&mut q, &validation::GAMMA, self.gamma)?;
        push_text(&mut q, &validation::CALLBACK, self.callback.as_deref())?;

        Ok(q)
    }
}

fn push_number(
    q: &mut Vec<(&'static str, String)>,
    rule: &Rule,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(v) = check_number(rule, value)? {
        q.push((rule.field, v.to_string()));
    }
    Ok(())
}

fn push_text(
    q: &mut Vec<(&'static str, String)>,
    rule: &Rule,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(v) = check_text(rule, value)? {
        q.push((rule.field, v.to_string()));
    }
    Ok(())
}

fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(q: &[(&'static str, String)]) -> Vec<&'static str> {
        q.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn defaults_only() {
        let q = RequestParams::default().to_query().unwrap();
        assert_eq!(
            q,
            vec![
                ("dataset", "tmy3".to_string()),
                ("timeframe", "monthly".to_string()),
                ("tilt_eq_lat", "0".to_string()),
                ("track_mode", "1".to_string()),
            ]
        );
    }

    #[test]
    fn full_request_keeps_wire_order() {
        let params = RequestParams::default()
            .callback("cb")
            .gamma(-0.5)
            .inoct(45.0)
            .tilt(40.0)
            .derate(0.77)
            .azimuth(180.0)
            .file_id("0-94018")
            .lon(-105.0)
            .lat(40.0)
            .address("Boulder, CO")
            .system_size(4.0)
            .format("json");
        let q = params.to_query().unwrap();
        assert_eq!(
            keys(&q),
            vec![
                "format",
                "system_size",
                "address",
                "lat",
                "lon",
                "file_id",
                "dataset",
                "timeframe",
                "azimuth",
                "derate",
                "tilt",
                "tilt_eq_lat",
                "track_mode",
                "inoct",
                "gamma",
                "callback",
            ]
        );
        assert!(q.contains(&("derate", "0.77".to_string())));
        assert!(q.contains(&("system_size", "4".to_string())));
    }

    #[test]
    fn first_failure_aborts() {
        let err = RequestParams::default()
            .system_size(0.0)
            .lat(100.0)
            .to_query()
            .unwrap_err();
        assert_eq!(err.field(), Some("system_size"));
    }

    #[test]
    fn cleared_defaults_are_omitted() {
        let params = RequestParams {
            dataset: None,
            track_mode: None,
            ..Default::default()
        };
        let q = params.to_query().unwrap();
        assert_eq!(keys(&q), vec!["timeframe", "tilt_eq_lat"]);
    }

    #[test]
    fn from_value_builds_and_validates() {
        let params = RequestParams::from_value(&json!({
            "system_size": 4,
            "lat": 40,
            "lon": -105,
            "dataset": "tmy2",
            "file_id": 94018,
            "track_mode": null
        }))
        .unwrap();

        assert_eq!(params.system_size, Some(4.0));
        assert_eq!(params.dataset.as_deref(), Some("tmy2"));
        assert_eq!(params.file_id.as_deref(), Some("94018"));
        assert_eq!(params.track_mode, None);
        assert_eq!(params.timeframe.as_deref(), Some("monthly"));
    }

    #[test]
    fn from_value_rejects_bad_input() {
        assert_eq!(
            RequestParams::from_value(&json!({"lat": "north"})).unwrap_err(),
            ValidationError::WrongType {
                field: "lat",
                expected: "int or float"
            }
        );
        assert!(RequestParams::from_value(&json!({"dataset": "tmy4"})).is_err());
        assert!(RequestParams::from_value(&json!({"losses": 14})).is_err());
        assert_eq!(
            RequestParams::from_value(&json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject
        );
    }
}
