//! Errors

use core::fmt;

/// Link bring-up errors
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Error {
    /// Reference clock frequency is not a positive finite number
    InvalidReferenceFrequency,

    /// Requested line rate is not a positive finite number
    InvalidLineRate,

    /// Requested line rate is beyond what the transceiver can do
    LineRateTooHigh { line_rate: f64 },

    /// No (N1, N2, M, D) combination realizes the requested line rate
    ConfigNotFound { ref_freq: f64, line_rate: f64 },

    /// GPIO pin error
    Pin,

    /// Transmit-path initializer reported an error
    TransmitInit,

    /// Receive-path initializer reported an error
    ReceiveInit,

    /// The link supervisor has not been started
    NotStarted,

    /// The link supervisor was already started
    AlreadyStarted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidReferenceFrequency => f.write_str("invalid reference clock frequency"),
            Error::InvalidLineRate => f.write_str("invalid line rate"),
            Error::LineRateTooHigh { line_rate } =>
                write!(f, "line rate {:3.2} Gbps is too high", line_rate / 1e9),
            Error::ConfigNotFound { ref_freq, line_rate } =>
                write!(f, "no config found for {:3.2} MHz refclk / {:3.2} Gbps linerate",
                       ref_freq / 1e6, line_rate / 1e9),
            Error::Pin => f.write_str("pin error"),
            Error::TransmitInit => f.write_str("transmit initializer error"),
            Error::ReceiveInit => f.write_str("receive initializer error"),
            Error::NotStarted => f.write_str("link not started"),
            Error::AlreadyStarted => f.write_str("link already started"),
        }
    }
}
