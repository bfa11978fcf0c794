#![cfg_attr(not(test), no_std)]

//! 7-series GTP transceiver link bring-up.
//!
//! `config` finds quad PLL dividers for a line rate, `link` sequences PLL
//! lock, transmit and receive path initialization and keeps the receiver
//! comma aligned.

pub mod constants;
pub mod errors;
pub mod config;
pub mod options;
pub mod cdc;
pub mod pll;
pub mod init;
pub mod aligner;
pub mod link;

pub use crate::config::{solve, LinkConfig};
pub use crate::errors::Error;
pub use crate::link::{Link, LinkState, LinkStatus};
pub use crate::options::LinkOptions;
