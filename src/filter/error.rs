use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid value '{value}' for filter '{param}'")]
    InvalidFilterValue {
        param: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Invalid field name: {0}")]
    InvalidField(String),
}

impl FilterError {
    /// Query parameter the error refers to, for field-level reporting.
    pub fn param(&self) -> &str {
        match self {
            FilterError::InvalidFilterValue { param, .. } => param,
            FilterError::InvalidField(field) => field,
        }
    }
}
