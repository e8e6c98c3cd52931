use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::{ErrCode, FractalError, Result};

pub const DEFAULT_PERIOD: usize = 30;
pub const DEFAULT_NORMAL_SPEED: usize = 30;
pub const DEFAULT_MAX_HISTORY: usize = 500;

/// Fractal RSI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalRsiConfig {
    /// Window length for the fractal dimension estimate, >= 2
    pub period: usize,

    /// Base RSI length before adaptation, >= 1
    pub normal_speed: usize,

    /// Cap on retained price history, >= period + 1. `None` sizes the cap
    /// from `period`, see [`FractalRsiConfig::history_cap`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
}

impl Default for FractalRsiConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            normal_speed: DEFAULT_NORMAL_SPEED,
            max_history: None,
        }
    }
}

impl FractalRsiConfig {
    /// Create a validated config with the history cap sized from `period`
    pub fn new(period: usize, normal_speed: usize) -> Result<Self> {
        let config = Self {
            period,
            normal_speed,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_history(mut self, max_history: usize) -> Result<Self> {
        self.max_history = Some(max_history);
        self.validate()?;
        Ok(self)
    }

    /// Build from loose key/value pairs, rejecting unknown keys
    pub fn from_map(conf: Option<HashMap<String, Value>>) -> Result<Self> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());
        let default = Self::default();

        let config = Self {
            period: conf.get("period")?.unwrap_or(default.period),
            normal_speed: conf.get("normal_speed")?.unwrap_or(default.normal_speed),
            max_history: conf.get("max_history")?,
        };

        conf.check()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON object such as `{"period": 20, "normal_speed": 14}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let conf: HashMap<String, Value> = serde_json::from_str(json)?;
        Self::from_map(Some(conf))
    }

    pub fn validate(&self) -> Result<()> {
        if self.period < 2 {
            return Err(FractalError::config(
                ErrCode::PeriodOutOfRange,
                format!("period must be >= 2, got {}", self.period),
            ));
        }
        if self.normal_speed < 1 {
            return Err(FractalError::config(
                ErrCode::SpeedOutOfRange,
                format!("normal_speed must be >= 1, got {}", self.normal_speed),
            ));
        }
        match self.max_history {
            Some(max_history) if max_history <= self.period => Err(FractalError::config(
                ErrCode::HistoryTooShort,
                format!(
                    "max_history must be >= period + 1 = {}, got {}",
                    self.period + 1,
                    max_history
                ),
            )),
            _ => Ok(()),
        }
    }

    /// Retained history length: the explicit `max_history`, else
    /// `DEFAULT_MAX_HISTORY` grown to at least `period + 1`
    pub fn history_cap(&self) -> usize {
        self.max_history
            .unwrap_or_else(|| DEFAULT_MAX_HISTORY.max(self.period.saturating_add(1)))
    }

    /// Samples needed before the first formed value can appear
    pub fn warmup_period(&self) -> usize {
        self.period + 1
    }
}

/// Key/value config that tracks which keys were consumed
struct ConfigWithCheck {
    conf: HashMap<String, Value>,
}

impl ConfigWithCheck {
    fn new(conf: HashMap<String, Value>) -> Self {
        Self { conf }
    }

    fn get<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.conf.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                FractalError::config(
                    ErrCode::ParaError,
                    format!("invalid value for {}: {} ({})", key, value, e),
                )
            }),
        }
    }

    fn check(self) -> Result<()> {
        let mut unknown: Vec<&String> = self.conf.keys().collect();
        if unknown.is_empty() {
            return Ok(());
        }
        unknown.sort();
        Err(FractalError::config(
            ErrCode::ParaError,
            format!("unknown para = {:?}", unknown),
        ))
    }
}
