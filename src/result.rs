use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// Decoded PVWatts response.
///
/// The body is kept exactly as the service returned it; the accessors below
/// are conveniences over the v4 layout
/// (`inputs`, `outputs`, `station_info`, `errors`, `warnings`, `version`).
#[derive(Debug, Clone, PartialEq)]
pub struct PvWattsResult {
    raw: Value,
}

/// Monthly-timeframe outputs, as returned when `timeframe=monthly`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyOutputs {
    pub ac_monthly: Vec<f64>,
    pub ac_annual: f64,
    #[serde(default)]
    pub solrad_monthly: Vec<f64>,
    #[serde(default)]
    pub solrad_annual: Option<f64>,
    #[serde(default)]
    pub dc_monthly: Vec<f64>,
    #[serde(default)]
    pub poa_monthly: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationInfo {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub elev: Option<f64>,
    #[serde(default)]
    pub tz: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub solar_resource_file: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl PvWattsResult {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The response body as decoded.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Top-level member of the response object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn inputs(&self) -> Option<&Value> {
        self.raw.get("inputs")
    }

    pub fn outputs(&self) -> Option<&Value> {
        self.raw.get("outputs")
    }

    /// A single member of `outputs`, e.g. `output("ac_annual")`.
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs().and_then(|o| o.get(name))
    }

    /// Service version string reported in the body.
    pub fn version(&self) -> Option<&str> {
        self.raw.get("version").and_then(Value::as_str)
    }

    pub fn errors(&self) -> Vec<&str> {
        string_list(self.raw.get("errors"))
    }

    pub fn warnings(&self) -> Vec<&str> {
        string_list(self.raw.get("warnings"))
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn station_info(&self) -> Option<StationInfo> {
        self.raw
            .get("station_info")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Decodes `outputs` into a caller-chosen type.
    pub fn outputs_as<T: DeserializeOwned>(&self) -> Result<T> {
        let outputs = self.outputs().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(outputs)?)
    }

    pub fn monthly(&self) -> Result<MonthlyOutputs> {
        self.outputs_as()
    }

    pub fn ac_annual(&self) -> Option<f64> {
        self.output("ac_annual").and_then(Value::as_f64)
    }

    pub fn solrad_annual(&self) -> Option<f64> {
        self.output("solrad_annual").and_then(Value::as_f64)
    }

    pub fn ac_monthly(&self) -> Option<Vec<f64>> {
        self.number_list("ac_monthly")
    }

    pub fn solrad_monthly(&self) -> Option<Vec<f64>> {
        self.number_list("solrad_monthly")
    }

    pub fn dc_monthly(&self) -> Option<Vec<f64>> {
        self.number_list("dc_monthly")
    }

    pub fn poa_monthly(&self) -> Option<Vec<f64>> {
        self.number_list("poa_monthly")
    }

    /// Hourly AC output (W), present when `timeframe=hourly`.
    pub fn ac(&self) -> Option<Vec<f64>> {
        self.number_list("ac")
    }

    /// Hourly DC output (W), present when `timeframe=hourly`.
    pub fn dc(&self) -> Option<Vec<f64>> {
        self.number_list("dc")
    }

    fn number_list(&self, name: &str) -> Option<Vec<f64>> {
        self.output(name)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }
}

impl From<Value> for PvWattsResult {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

impl From<PvWattsResult> for Value {
    fn from(result: PvWattsResult) -> Self {
        result.raw
    }
}

fn string_list(v: Option<&Value>) -> Vec<&str> {
    v.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
