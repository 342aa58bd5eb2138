use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LoginConfig;
use crate::error::LoginError;
use crate::secret::Secret;
use crate::totp::{now_code, Code, GetTime, TotpParams};
use crate::writer::OutErr;

pub const SUCCESS_STATUS: u16 = 200;

/// Form body sent to the login endpoint, field order as serialized.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub otp: String,
}

impl LoginForm {
    pub fn new(config: &LoginConfig, otp: &Code) -> Self {
        LoginForm {
            username: config.username.clone(),
            password: config.password.clone(),
            otp: otp.to_string(),
        }
    }
}

pub trait Transport {
    /// Sends `form` as a urlencoded POST body and returns the status code.
    fn post_form(&self, url: &str, form: &LoginForm) -> Result<u16, LoginError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &LoginConfig) -> Result<Self, LoginError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(LoginError::Client)?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, form: &LoginForm) -> Result<u16, LoginError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(LoginError::Transport)?;

        Ok(response.status().as_u16())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failure,
}

impl LoginOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            LoginOutcome::Success => "Successfully logged in.",
            LoginOutcome::Failure => "Failed to log in.",
        }
    }

    pub fn is_success(&self) -> bool {
        *self == LoginOutcome::Success
    }
}

/// Posts the credentials with the current code once.
///
/// Only a 200 response counts as success. A request that fails before a
/// response arrives is logged and reported as a failure; errors computing
/// the code are returned.
pub fn submit_login(
    config: &LoginConfig,
    secret: &Secret,
    params: &TotpParams,
    clock: &impl GetTime,
    transport: &impl Transport,
) -> Result<LoginOutcome, LoginError> {
    let otp = now_code(secret, params, clock)?;
    let form = LoginForm::new(config, &otp);

    debug!(url = %config.login_url, username = %config.username, "submitting login form");

    match transport.post_form(&config.login_url, &form) {
        Ok(status) if status == SUCCESS_STATUS => {
            info!(status, "login accepted");
            Ok(LoginOutcome::Success)
        }
        Ok(status) => {
            info!(status, "login rejected");
            Ok(LoginOutcome::Failure)
        }
        Err(err) => {
            warn!(error = %err, "login request failed");
            Ok(LoginOutcome::Failure)
        }
    }
}

pub fn run_login<W>(
    config: &LoginConfig,
    secret: &Secret,
    params: &TotpParams,
    clock: &impl GetTime,
    transport: &impl Transport,
    writer: &mut W,
) -> LoginOutcome
where
    W: OutErr,
{
    let outcome = match submit_login(config, secret, params, clock, transport) {
        Ok(outcome) => outcome,
        Err(err) => {
            writer.write_err(&format!("{}\n", err));
            LoginOutcome::Failure
        }
    };

    writer.write(&format!("{}\n", outcome.message()));
    outcome
}
