//! Transmit / receive path initializer capabilities
//!
//! The reset micro-sequences of the transceiver (GTTXRESET, TXDLYSRESET,
//! phase alignment, GTRXRESET, RXSYNC...) live behind these traits. The
//! link supervisor only gates them on PLL lock and waits for `done`.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::constants::*;
use crate::errors::*;


/// Initializer of one transceiver path.
pub trait PathInit {
    type Error;

    /// Holds the initializer in reset (`true`) or lets it run (`false`).
    /// `done` must read false while held.
    fn hold_reset(&mut self, hold: bool) -> Result<(), Self::Error>;

    /// PLL lock level, already synchronized to the initializer's domain.
    fn pll_lock(&mut self, _locked: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    /// True once the path reset sequence has completed
    fn done(&mut self) -> Result<bool, Self::Error>;
}


/// Receive path initializer, restartable on alignment loss.
pub trait RxPathInit: PathInit {
    /// Aborts and re-runs the receive reset sequence.
    /// `done` must read false from this call until the new sequence completes.
    fn restart(&mut self) -> Result<(), Self::Error>;
}


/// Initializer state machine living in fabric, seen through two pins.
///
/// `done` must be called once per edge of the initializer's domain: it
/// also releases the reset after a restart. The done pin is ignored
/// after a hold or restart until it has been seen low, so a level left
/// over from the previous sequence is never reported.
pub struct PinInit<RST, DONE> {
    pin_reset: RST,
    pin_done: DONE,
    held: bool,
    restart_edges: u32,
    stale_done: bool,
}

impl<RST, DONE> PinInit<RST, DONE>
where RST: OutputPin,
      DONE: InputPin,
{
    /// `pin_reset` - initializer reset, active high
    /// `pin_done` - initializer done flag
    pub fn new(pin_reset: RST, pin_done: DONE) -> Self {
        PinInit { pin_reset, pin_done, held: false, restart_edges: 0, stale_done: false }
    }

    /// Gives the pins back
    pub fn free(self: Self) -> (RST, DONE) {
        (self.pin_reset, self.pin_done)
    }
}

impl<RST, DONE> PathInit for PinInit<RST, DONE>
where RST: OutputPin,
      DONE: InputPin,
{
    type Error = Error;

    fn hold_reset(&mut self, hold: bool) -> Result<(), Error> {
        self.held = hold;
        self.restart_edges = 0;
        if hold {
            self.stale_done = true;
            self.pin_reset.set_high().map_err(|_| Error::Pin)
        } else {
            self.pin_reset.set_low().map_err(|_| Error::Pin)
        }
    }

    fn done(&mut self) -> Result<bool, Error> {
        if self.restart_edges > 0 {
            self.restart_edges -= 1;
            if self.restart_edges == 0 && !self.held {
                self.pin_reset.set_low().map_err(|_| Error::Pin)?;
            }
            return Ok(false);
        }
        if self.held {
            return Ok(false);
        }

        let done = self.pin_done.is_high().map_err(|_| Error::Pin)?;
        if !done {
            self.stale_done = false;
        }
        Ok(done && !self.stale_done)
    }
}

impl<RST, DONE> RxPathInit for PinInit<RST, DONE>
where RST: OutputPin,
      DONE: InputPin,
{
    /// Asserts the reset pin; the following `done` calls release it
    fn restart(&mut self) -> Result<(), Error> {
        self.pin_reset.set_high().map_err(|_| Error::Pin)?;
        // the restart edge's own `done` call counts too
        self.restart_edges = INIT_RESTART_EDGES + 1;
        self.stale_done = true;
        Ok(())
    }
}
