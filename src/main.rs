use std::process::ExitCode;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use totp_login::config::LoginConfig;
use totp_login::login::{run_login, HttpTransport, LoginOutcome};
use totp_login::secret::generate_secret;
use totp_login::totp::{Clock, TotpParams};
use totp_login::writer::{LoginWriter, OutErr};

fn main() -> ExitCode {
    // Logs go to stderr, stdout carries only the result line
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", err);
    }

    let config = LoginConfig::default();
    let mut writer = LoginWriter::new();

    // A fresh secret is never shared with the server, so this code cannot
    // match a real verifier. Enrollment would have to supply it instead.
    let secret = generate_secret();

    let transport = match HttpTransport::new(&config) {
        Ok(transport) => transport,
        Err(err) => {
            error!(error = %err, "unable to build HTTP client");
            writer.write(&format!("{}\n", LoginOutcome::Failure.message()));
            return ExitCode::FAILURE;
        }
    };

    let outcome = run_login(
        &config,
        &secret,
        &TotpParams::default(),
        &Clock::new(),
        &transport,
        &mut writer,
    );

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
