///! Comma alignment monitor (receive domain)

use crate::constants::*;


/// Alignment monitor state
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AlignState {
    /// No comma seen since the last restart
    Searching,
    /// Comma seen, waiting for this many more clean check periods
    Confirming(u32),
    /// Commas seen every period, no disparity errors
    Locked,
}


/// Pattern and timing of the periodic alignment check
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AlignmentWindow {
    /// 10-bit comma; its complement (other running disparity) matches too
    pub comma: u16,
    /// Check period, receive clock cycles
    pub period: u32,
    /// Cycles since the last check
    elapsed: u32,
}

impl AlignmentWindow {
    pub fn new(comma: u16, period: u32) -> Self {
        AlignmentWindow { comma: comma & CHAR_MASK as u16, period: period.max(1), elapsed: 0 }
    }

    /// Counts one cycle, true when the check period has elapsed
    #[inline]
    fn tick(self: &mut Self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.period {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    #[inline]
    fn is_comma(self: &Self, c: u32) -> bool {
        let comma = self.comma as u32;
        c == comma || c == (!comma & CHAR_MASK)
    }
}

/// 8b10b characters carry four, five or six ones
#[inline]
fn disparity_ok(c: u32) -> bool {
    (4..=6).contains(&c.count_ones())
}


/// Watches the received word stream for the comma.
///
/// Issues a one-cycle `restart` when no comma shows up within a check
/// period, or when a check period after the first sighting sees no comma
/// or a disparity error. `ready` drops on the same cycle as `restart` and
/// only comes back after a new run of clean periods.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AlignmentMonitor {
    window: AlignmentWindow,
    grace_checks: u32,
    state: AlignState,
    comma_seen: bool,
    error_seen: bool,
    errors: u32,
}

impl AlignmentMonitor {
    pub fn new(window: AlignmentWindow, grace_checks: u32) -> Self {
        AlignmentMonitor {
            window,
            grace_checks,
            state: AlignState::Searching,
            comma_seen: false,
            error_seen: false,
            errors: 0,
        }
    }

    pub fn window(self: &Self) -> &AlignmentWindow {
        &self.window
    }

    pub fn state(self: &Self) -> AlignState {
        self.state
    }

    #[inline]
    pub fn ready(self: &Self) -> bool {
        self.state == AlignState::Locked
    }

    /// Disparity errors seen while confirming or locked, saturating
    pub fn error_count(self: &Self) -> u32 {
        self.errors
    }

    /// Back to searching with a fresh check period. The error count is kept.
    pub fn reset(self: &mut Self) {
        self.state = AlignState::Searching;
        self.window.elapsed = 0;
        self.comma_seen = false;
        self.error_seen = false;
    }

    /// Receive clock edge with the received `DATA_WIDTH` bit word.
    /// Returns the restart pulse.
    pub fn clock(self: &mut Self, word: u32) -> bool {
        if self.window.is_comma(word & CHAR_MASK) {
            self.comma_seen = true;
        }
        if self.state != AlignState::Searching {
            for c in [word & CHAR_MASK, (word >> CHAR_WIDTH) & CHAR_MASK].iter() {
                if !disparity_ok(*c) {
                    self.error_seen = true;
                    self.errors = self.errors.saturating_add(1);
                }
            }
        }

        if !self.window.tick() {
            return false;
        }

        let restart = self.check();
        self.comma_seen = false;
        self.error_seen = false;
        restart
    }

    fn check(self: &mut Self) -> bool {
        let clean = self.comma_seen && !self.error_seen;
        let next = match self.state {
            // errors are expected right after a receiver reset
            AlignState::Searching if self.comma_seen => Some(self.confirm(self.grace_checks)),
            AlignState::Confirming(n) if clean => Some(self.confirm(n - 1)),
            AlignState::Locked if clean => Some(AlignState::Locked),
            _ => None,
        };

        match next {
            Some(state) => {
                if state != self.state {
                    log::debug!("alignment {:?} -> {:?}", self.state, state);
                }
                self.state = state;
                false
            }
            None => {
                log::debug!("alignment check failed in {:?} (comma {}, errors {})",
                            self.state, self.comma_seen, self.error_seen);
                self.state = AlignState::Searching;
                true
            }
        }
    }

    #[inline]
    fn confirm(self: &Self, remaining: u32) -> AlignState {
        if remaining == 0 { AlignState::Locked } else { AlignState::Confirming(remaining) }
    }
}
