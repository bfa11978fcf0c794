///! Quad PLL controller

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::config::*;
use crate::errors::*;


/// Opaque clock handle, frequency in Hz
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Clock(pub f64);

/// Observed PLL pin levels
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PllState {
    pub locked: bool,
    pub reset_asserted: bool,
}


/// Quad PLL (GTPE2_COMMON PLL0) running a solved `LinkConfig`.
///
/// Only the link supervisor owning this controller drives its reset.
pub struct PllController<RST, LOCK> {
    config: LinkConfig,
    pin_reset: RST,
    pin_lock: LOCK,
    reset_asserted: bool,
}


impl<RST, LOCK> PllController<RST, LOCK>
where RST: OutputPin,
      LOCK: InputPin,
{
    /// Wraps the PLL.
    ///
    /// `config` - dividers the PLL was instantiated with
    /// `pin_reset` - PLL0RESET, active high
    /// `pin_lock` - PLL0LOCK
    ///
    pub fn new(
        config: LinkConfig,
        pin_reset: RST,
        pin_lock: LOCK,
    ) -> Self {
        PllController { config, pin_reset, pin_lock, reset_asserted: false }
    }

    pub fn config(self: &Self) -> &LinkConfig {
        &self.config
    }

    /// Asserts PLL reset
    pub fn reset(self: &mut Self) -> Result<(), Error> {
        self.pin_reset.set_high().map_err(|_| Error::Pin)?;
        self.reset_asserted = true;
        Ok(())
    }

    /// Releases PLL reset, the PLL starts acquiring lock
    pub fn release(self: &mut Self) -> Result<(), Error> {
        self.pin_reset.set_low().map_err(|_| Error::Pin)?;
        self.reset_asserted = false;
        Ok(())
    }

    /// Current lock indication. Asynchronous to any clock domain.
    #[inline]
    pub fn lock(self: &Self) -> Result<bool, Error> {
        self.pin_lock.is_high().map_err(|_| Error::Pin)
    }

    pub fn state(self: &Self) -> Result<PllState, Error> {
        Ok(PllState { locked: self.lock()?, reset_asserted: self.reset_asserted })
    }

    /// Non-blocking wait for lock
    pub fn wait_lock(self: &Self) -> nb::Result<(), Error> {
        if self.lock()? { Ok(()) } else { Err(nb::Error::WouldBlock) }
    }

    /// PLL0OUTCLK, the VCO output. Only valid while locked.
    pub fn output_clock(self: &Self) -> nb::Result<Clock, Error> {
        self.wait_lock()?;
        Ok(Clock(self.config.vco_freq))
    }

    /// PLL0OUTREFCLK, the reference clock as seen by the PLL. Only valid while locked.
    pub fn output_ref_clock(self: &Self) -> nb::Result<Clock, Error> {
        self.wait_lock()?;
        Ok(Clock(self.config.ref_freq))
    }
}
