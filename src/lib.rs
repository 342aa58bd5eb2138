pub mod config;
pub mod error;
pub mod hotp;
pub mod login;
pub mod secret;
pub mod totp;
pub mod writer;
