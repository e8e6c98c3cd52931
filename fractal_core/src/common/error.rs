use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error codes for the fractal indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Config errors (0-99)
    #[strum(serialize = "_CONFIG_ERR_BEGIN")]
    ConfigErrBegin = 0,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 1,
    #[strum(serialize = "PERIOD_OUT_OF_RANGE")]
    PeriodOutOfRange = 2,
    #[strum(serialize = "SPEED_OUT_OF_RANGE")]
    SpeedOutOfRange = 3,
    #[strum(serialize = "HISTORY_TOO_SHORT")]
    HistoryTooShort = 4,
    #[strum(serialize = "CONFIG_FORMAT_ERROR")]
    ConfigFormat = 5,
    #[strum(serialize = "_CONFIG_ERR_END")]
    ConfigErrEnd = 99,

    // Source data errors (100-199)
    #[strum(serialize = "_DATA_ERR_BEGIN")]
    DataErrBegin = 100,
    #[strum(serialize = "SRC_DATA_NOT_FOUND")]
    SrcDataNotFound = 101,
    #[strum(serialize = "SRC_DATA_FORMAT_ERROR")]
    SrcDataFormat = 102,
    #[strum(serialize = "_DATA_ERR_END")]
    DataErrEnd = 199,
}

impl ErrCode {
    pub fn is_config_err(&self) -> bool {
        let code = *self as i32;
        code > Self::ConfigErrBegin as i32 && code < Self::ConfigErrEnd as i32
    }

    pub fn is_data_err(&self) -> bool {
        let code = *self as i32;
        code > Self::DataErrBegin as i32 && code < Self::DataErrEnd as i32
    }
}

#[derive(Debug, Error)]
pub enum FractalError {
    /// Rejected parameters; raised only while building a config or an indicator.
    #[error("{code}: {msg}")]
    Config { code: ErrCode, msg: String },

    /// Malformed or missing source data.
    #[error("{code}: {msg}")]
    Data { code: ErrCode, msg: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FractalError {
    pub fn config(code: ErrCode, msg: impl Into<String>) -> Self {
        FractalError::Config {
            code,
            msg: msg.into(),
        }
    }

    pub fn data(code: ErrCode, msg: impl Into<String>) -> Self {
        FractalError::Data {
            code,
            msg: msg.into(),
        }
    }

    pub fn code(&self) -> ErrCode {
        match self {
            FractalError::Config { code, .. } | FractalError::Data { code, .. } => *code,
            FractalError::Json(_) => ErrCode::ConfigFormat,
        }
    }

    pub fn is_config_err(&self) -> bool {
        self.code().is_config_err()
    }

    pub fn is_data_err(&self) -> bool {
        self.code().is_data_err()
    }
}

pub type Result<T> = std::result::Result<T, FractalError>;
