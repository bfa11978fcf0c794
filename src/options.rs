///! Link configuration surface, fixed at construction time

use crate::{config::*, constants::*, errors::*};


/// Comma alignment supervision
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Alignment {
    /// Link is ready once the receive path is initialized
    Disabled,
    /// Link is ready once commas are found and stable
    Enabled,
}

/// Transceiver loopback
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Loopback {
    /// Normal operation, serial pads in use
    Off,
    /// Near-end PMA loopback inside the transceiver
    Internal,
}

impl Loopback {
    /// LOOPBACK port value
    pub fn bits(self: Self) -> u8 {
        match self {
            Loopback::Off => 0b000,
            Loopback::Internal => 0b010,
        }
    }
}

/// Serial data polarity
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Polarity {
    Normal,
    Inverted,
}

impl Polarity {
    /// TXPOLARITY / RXPOLARITY port value
    pub fn bit(self: Self) -> bool {
        self == Polarity::Inverted
    }
}

/// Check period of the alignment monitor
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CheckPeriod {
    /// Seconds, converted to receive word clock cycles
    Seconds(f64),
    /// Receive word clock cycles
    Ticks(u32),
}


/// Link options.
/// Defaults: alignment enabled, no loopback, normal polarities,
/// 10ms check period, K28.5 comma.
/// `loopback` and the polarities are not driven by `Link`; the integrator
/// wires `bits()`/`bit()` to the LOOPBACK, TXPOLARITY and RXPOLARITY ports.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinkOptions {
    pub ref_freq: f64,
    pub line_rate: f64,
    pub alignment: Alignment,
    pub loopback: Loopback,
    pub tx_polarity: Polarity,
    pub rx_polarity: Polarity,
    pub check_period: CheckPeriod,
    pub grace_checks: u32,
    pub comma: u16,
}

impl LinkOptions {

    /// Options for a `line_rate` link driven from a `ref_freq` reference clock.
    pub fn new(ref_freq: f64, line_rate: f64) -> Self {
        LinkOptions {
            ref_freq,
            line_rate,
            alignment: Alignment::Enabled,
            loopback: Loopback::Off,
            tx_polarity: Polarity::Normal,
            rx_polarity: Polarity::Normal,
            check_period: CheckPeriod::Seconds(CHECK_PERIOD),
            grace_checks: GRACE_CHECKS,
            comma: COMMA,
        }
    }

    pub fn alignment(mut self: Self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn loopback(mut self: Self, loopback: Loopback) -> Self {
        self.loopback = loopback;
        self
    }

    pub fn tx_polarity(mut self: Self, polarity: Polarity) -> Self {
        self.tx_polarity = polarity;
        self
    }

    pub fn rx_polarity(mut self: Self, polarity: Polarity) -> Self {
        self.rx_polarity = polarity;
        self
    }

    pub fn check_period(mut self: Self, period: CheckPeriod) -> Self {
        self.check_period = period;
        self
    }

    /// Good checks required after the first comma before the link is ready
    pub fn grace_checks(mut self: Self, checks: u32) -> Self {
        self.grace_checks = checks;
        self
    }

    /// 10-bit comma pattern; its complement is matched too
    pub fn comma(mut self: Self, comma: u16) -> Self {
        self.comma = comma & CHAR_MASK as u16;
        self
    }

    /// Run the PLL solver for these options
    pub fn solve(self: &Self) -> Result<LinkConfig, Error> {
        solve(self.ref_freq, self.line_rate)
    }

    /// Alignment check period in receive word clock cycles, rounded up.
    pub fn check_period_ticks(self: &Self, config: &LinkConfig) -> u32 {
        match self.check_period {
            CheckPeriod::Ticks(t) => t.max(1),
            CheckPeriod::Seconds(s) => {
                // ceil() is not available in core
                let ticks = s * config.word_clock();
                let whole = ticks as u32;
                let whole = if (whole as f64) < ticks { whole.saturating_add(1) } else { whole };
                whole.max(1)
            }
        }
    }
}
