use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Integration failed at tick {tick}: {message}")]
    Integration { tick: usize, message: String },

    #[error("Invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn invalid(name: &'static str, value: f64) -> Self {
        SimError::InvalidParameter { name, value }
    }
}
