//! The `utils` module collects shared pieces used across the relay: the
//! error types every component reports with and the logging setup.

pub mod error;
pub mod logging;
