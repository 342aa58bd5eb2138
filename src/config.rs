use std::time::Duration;

pub const DEFAULT_USERNAME: &str = "your_username";
pub const DEFAULT_PASSWORD: &str = "your_password";
pub const DEFAULT_LOGIN_URL: &str = "https://www.example.com/login";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to submit one login request.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginConfig {
    pub username: String,
    pub password: String,
    pub login_url: String,
    /// Upper bound for the whole request
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl LoginConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        login_url: impl Into<String>,
    ) -> Self {
        LoginConfig {
            username: username.into(),
            password: password.into(),
            login_url: login_url.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        LoginConfig::new(DEFAULT_USERNAME, DEFAULT_PASSWORD, DEFAULT_LOGIN_URL)
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("login_url", &self.login_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
