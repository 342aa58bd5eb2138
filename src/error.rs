use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TotpError {
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("One-time password error: {0}")]
    Otp(#[from] TotpError),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(reqwest::Error),

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(reqwest::Error),
}
