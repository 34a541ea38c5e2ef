use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmissionError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error(
        "Quadrature did not converge on [{lower:e}, {upper:e}]: requested eps_abs={eps_abs:e} \
         eps_rel={eps_rel:e}, achieved error={achieved:e} after {subdivisions} subdivisions"
    )]
    Integration {
        eps_abs: f64,
        eps_rel: f64,
        achieved: f64,
        lower: f64,
        upper: f64,
        subdivisions: usize,
    },

    #[error("Sequence error: expected phase {expected}, found {found}")]
    Sequence {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Insufficient data for fit: {bins} populated bin(s) in window, need at least 2")]
    InsufficientData { bins: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type EmissionResult<T> = Result<T, EmissionError>;
