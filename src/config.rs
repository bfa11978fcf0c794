///! PLL configuration / line rate calculations

use core::fmt;

use crate::{constants::*, errors::*};


/// Divider settings of the quad PLL plus the frequencies they produce.
///
/// ```text
/// CLKOUT   = CLKIN x (N1 x N2) / M
/// LINERATE = CLKOUT x 2 / D
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinkConfig {
    /// Feedback divider FBDIV_45 (4 or 5)
    pub n1: u32,
    /// Feedback divider FBDIV (1 to 5)
    pub n2: u32,
    /// Reference clock divider (1 or 2)
    pub m: u32,
    /// Output rate divider (1, 2, 4 or 8)
    pub d: u32,
    /// VCO frequency, Hz
    pub vco_freq: f64,
    /// Reference clock frequency, Hz
    pub ref_freq: f64,
    /// Serial line rate, b/s
    pub line_rate: f64,
}


/// Search for PLL dividers that turn `ref_freq` into `line_rate`.
///
/// The search walks N1, N2, M and D in ascending order and the first
/// combination whose VCO frequency sits inside the VCO band and whose
/// derived line rate matches the request wins. The same input always
/// yields the same configuration.
pub fn solve(ref_freq: f64, line_rate: f64) -> Result<LinkConfig, Error> {
    (if !(ref_freq.is_finite() && ref_freq > 0.0) { Err(Error::InvalidReferenceFrequency) } else { Ok(()) })?;
    (if !(line_rate.is_finite() && line_rate > 0.0) { Err(Error::InvalidLineRate) } else { Ok(()) })?;
    (if line_rate >= LINE_RATE_MAX { Err(Error::LineRateTooHigh { line_rate }) } else { Ok(()) })?;

    for &n1 in N1_VALUES.iter() {
        for &n2 in N2_VALUES.iter() {
            for &m in M_VALUES.iter() {
                let vco_freq = ref_freq * (n1 * n2) as f64 / m as f64;
                if !(VCO_FREQ_MIN..=VCO_FREQ_MAX).contains(&vco_freq) {
                    continue;
                }
                for &d in D_VALUES.iter() {
                    if rate_matches(vco_freq * 2.0 / d as f64, line_rate) {
                        let config = LinkConfig { n1, n2, m, d, vco_freq, ref_freq, line_rate };
                        log::info!("{}", config);
                        return Ok(config);
                    }
                }
            }
        }
    }

    let err = Error::ConfigNotFound { ref_freq, line_rate };
    log::error!("{}", err);
    Err(err)
}

/// Relative comparison, `LINE_RATE_TOLERANCE` wide.
fn rate_matches(derived: f64, target: f64) -> bool {
    // abs() from f64 is not available in core
    let diff = if derived > target { derived - target } else { target - derived };
    diff <= target * LINE_RATE_TOLERANCE
}


impl LinkConfig {

    /// VCO frequency recomputed from the dividers.
    /// CLKOUT = CLKIN x (N1 x N2) / M
    pub fn derived_vco_freq(self: &Self) -> f64 {
        self.ref_freq * (self.n1 * self.n2) as f64 / self.m as f64
    }

    /// Line rate recomputed from the dividers.
    /// LINERATE = CLKOUT x 2 / D
    pub fn derived_line_rate(self: &Self) -> f64 {
        self.derived_vco_freq() * 2.0 / self.d as f64
    }

    /// Parallel word clock (TXUSRCLK / RXUSRCLK), Hz.
    /// One `DATA_WIDTH` bit word is transferred per cycle.
    pub fn word_clock(self: &Self) -> f64 {
        self.line_rate / DATA_WIDTH as f64
    }
}


impl fmt::Display for LinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GTPQuadPLL")?;
        writeln!(f, "  CLKIN    = {}MHz", self.ref_freq / 1e6)?;
        writeln!(f, "  CLKOUT   = CLKIN x (N1 x N2) / M = {}MHz x ({} x {}) / {}",
                 self.ref_freq / 1e6, self.n1, self.n2, self.m)?;
        writeln!(f, "           = {}GHz", self.vco_freq / 1e9)?;
        writeln!(f, "  LINERATE = CLKOUT x 2 / D = {}GHz x 2 / {}", self.vco_freq / 1e9, self.d)?;
        write!(f, "           = {}GHz", self.line_rate / 1e9)
    }
}
