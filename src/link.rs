//! Link bring-up supervisor
//!
//! Three clock domains are involved:
//! - control: this state machine, the PLL controller and the transmit
//!   initializer (the transmit clock does not exist until the transmit
//!   path is up),
//! - transmit: the receive initializer, clocked from the transmit path,
//! - receive: the alignment monitor, clocked by the recovered clock.
//!
//! Each domain advances only when its `tick_*` method is called. Every
//! signal between domains goes through `cdc`. Resets are asserted
//! directly and released through a synchronizer.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::aligner::*;
use crate::cdc::*;
use crate::config::*;
use crate::constants::*;
use crate::errors::*;
use crate::init::*;
use crate::options::*;
use crate::pll::*;


/// Supervisor state
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LinkState {
    Idle,
    AwaitingPll,
    InitializingTransmit,
    InitializingReceive,
    AligningReceive,
    Ready,
    Restarting,
}

/// Status exposed for monitoring
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinkStatus {
    pub link_ready: bool,
    pub state: LinkState,
    /// Disparity errors seen by the alignment monitor
    pub global_error_count: u32,
    /// Receive path restarts caused by alignment loss or timeout
    pub restarts: u32,
}


/// Control domain view of the other domains
struct ControlDomain {
    pll_lock: MultiReg,
    rx_done: MultiReg,
    aligned: MultiReg,
    errors: BusSynchronizer<u32>,
    align_restart: PulseSynchronizer,
    rx_restart: Handshake,
    rx_hold: bool,
    monitor_enable: bool,
}

/// Transmit domain registers
struct TransmitDomain {
    pll_lock: MultiReg,
    rx_hold: MultiReg,
    rx_hold_applied: bool,
    rx_done: bool,
}

/// Receive domain registers
struct ReceiveDomain {
    monitor: Option<AlignmentMonitor>,
    enable: MultiReg,
    ready: bool,
}


/// Brings the link up and keeps it aligned.
///
/// PLL lock gates the transmit initializer, transmit done gates the
/// receive initializer, receive done gates the alignment monitor. A
/// restart from the monitor re-runs the receive initializer only.
pub struct Link<RST, LOCK, TX, RX> {
    options: LinkOptions,
    pll: PllController<RST, LOCK>,
    tx: TX,
    rx: RX,
    state: LinkState,
    pll_reset_cycles: u32,
    restarts: u32,
    cd: ControlDomain,
    td: TransmitDomain,
    rd: ReceiveDomain,
}


impl<RST, LOCK, TX, RX> Link<RST, LOCK, TX, RX>
where RST: OutputPin,
      LOCK: InputPin,
      TX: PathInit,
      RX: RxPathInit,
{
    /// Solves the PLL configuration and assembles the supervisor in `Idle`.
    ///
    /// `pll_reset` / `pll_lock` - quad PLL reset and lock pins
    /// `tx` - transmit path initializer, clocked with the control domain
    /// `rx` - receive path initializer, clocked with the transmit domain
    ///
    /// Fails if no PLL configuration realizes the requested line rate.
    pub fn new(
        options: LinkOptions,
        pll_reset: RST,
        pll_lock: LOCK,
        tx: TX,
        rx: RX,
    ) -> Result<Self, Error> {
        let config = options.solve()?;
        let monitor = match options.alignment {
            Alignment::Enabled => Some(AlignmentMonitor::new(
                AlignmentWindow::new(options.comma, options.check_period_ticks(&config)),
                options.grace_checks,
            )),
            Alignment::Disabled => None,
        };

        Ok(Link {
            options,
            pll: PllController::new(config, pll_reset, pll_lock),
            tx,
            rx,
            state: LinkState::Idle,
            pll_reset_cycles: 0,
            restarts: 0,
            cd: ControlDomain {
                pll_lock: MultiReg::new(false),
                rx_done: MultiReg::new(false),
                aligned: MultiReg::new(false),
                errors: BusSynchronizer::new(0),
                align_restart: PulseSynchronizer::new(),
                rx_restart: Handshake::new(),
                rx_hold: true,
                monitor_enable: false,
            },
            td: TransmitDomain {
                pll_lock: MultiReg::new(false),
                rx_hold: MultiReg::new(true),
                rx_hold_applied: true,
                rx_done: false,
            },
            rd: ReceiveDomain {
                monitor,
                enable: MultiReg::new(false),
                ready: false,
            },
        })
    }

    pub fn options(self: &Self) -> &LinkOptions {
        &self.options
    }

    pub fn config(self: &Self) -> &LinkConfig {
        self.pll.config()
    }

    pub fn pll(self: &Self) -> &PllController<RST, LOCK> {
        &self.pll
    }

    pub fn tx(self: &Self) -> &TX {
        &self.tx
    }

    pub fn rx(self: &Self) -> &RX {
        &self.rx
    }

    /// None when alignment is disabled
    pub fn monitor(self: &Self) -> Option<&AlignmentMonitor> {
        self.rd.monitor.as_ref()
    }

    pub fn state(self: &Self) -> LinkState {
        self.state
    }

    #[inline]
    pub fn link_ready(self: &Self) -> bool {
        self.state == LinkState::Ready
    }

    pub fn status(self: &Self) -> LinkStatus {
        LinkStatus {
            link_ready: self.link_ready(),
            state: self.state,
            global_error_count: self.cd.errors.get(),
            restarts: self.restarts,
        }
    }

    /// Non-blocking wait for `Ready`. Does not advance any domain.
    pub fn poll(self: &Self) -> nb::Result<(), Error> {
        match self.state {
            LinkState::Idle => Err(nb::Error::Other(Error::NotStarted)),
            LinkState::Ready => Ok(()),
            _ => Err(nb::Error::WouldBlock),
        }
    }

    /// Leaves `Idle`: asserts the PLL reset and holds both initializers in reset.
    pub fn start(self: &mut Self) -> Result<(), Error> {
        if self.state != LinkState::Idle {
            return Err(Error::AlreadyStarted);
        }

        self.pll.reset()?;
        self.pll_reset_cycles = PLL_RESET_CYCLES;
        self.tx.hold_reset(true).map_err(|_| Error::TransmitInit)?;
        self.rx.hold_reset(true).map_err(|_| Error::ReceiveInit)?;
        self.cd.rx_hold = true;
        self.goto(LinkState::AwaitingPll);
        Ok(())
    }

    /// Control domain clock edge
    pub fn tick_control(self: &mut Self) -> Result<(), Error> {
        if self.state == LinkState::Idle {
            return Ok(());
        }

        let pll_lock = self.cd.pll_lock.clock(self.pll.lock()?);
        let rx_done = self.cd.rx_done.clock(self.td.rx_done);
        let aligned = self.cd.aligned.clock(self.rd.ready);
        let align_restart = self.cd.align_restart.clock();
        self.cd.errors.dest_clock();
        self.cd.rx_restart.source_clock();

        self.tx.pll_lock(pll_lock).map_err(|_| Error::TransmitInit)?;

        if align_restart && !matches!(self.state, LinkState::AligningReceive | LinkState::Ready) {
            log::debug!("ignoring alignment restart in {:?}", self.state);
        }

        match self.state {
            LinkState::Idle => {}

            LinkState::AwaitingPll => {
                if self.pll_reset_cycles > 0 {
                    self.pll_reset_cycles -= 1;
                    if self.pll_reset_cycles == 0 {
                        self.pll.release()?;
                    }
                } else if pll_lock {
                    self.tx.hold_reset(false).map_err(|_| Error::TransmitInit)?;
                    self.goto(LinkState::InitializingTransmit);
                }
            }

            LinkState::InitializingTransmit => {
                if self.tx.done().map_err(|_| Error::TransmitInit)? {
                    self.cd.rx_hold = false;
                    self.goto(LinkState::InitializingReceive);
                }
            }

            LinkState::InitializingReceive => {
                if rx_done {
                    self.goto(LinkState::AligningReceive);
                    match self.options.alignment {
                        Alignment::Enabled => self.cd.monitor_enable = true,
                        Alignment::Disabled => self.goto(LinkState::Ready),
                    }
                }
            }

            LinkState::AligningReceive | LinkState::Ready if align_restart => {
                self.restarts = self.restarts.wrapping_add(1);
                log::warn!("alignment lost in {:?}, restarting receive path ({} restarts)",
                           self.state, self.restarts);
                self.cd.monitor_enable = false;
                // Restarting only exits once the previous request is acknowledged
                let accepted = self.cd.rx_restart.request();
                debug_assert!(accepted, "receive restart requested while one is in flight");
                self.goto(LinkState::Restarting);
            }

            LinkState::AligningReceive => {
                if aligned {
                    self.goto(LinkState::Ready);
                }
            }

            LinkState::Ready => {}

            LinkState::Restarting => {
                if self.cd.rx_restart.is_idle() {
                    self.goto(LinkState::InitializingReceive);
                }
            }
        }

        Ok(())
    }

    /// Transmit domain clock edge
    pub fn tick_transmit(self: &mut Self) -> Result<(), Error> {
        if self.state == LinkState::Idle {
            return Ok(());
        }

        let pll_lock = self.td.pll_lock.clock(self.pll.lock()?);
        let hold = self.td.rx_hold.clock(self.cd.rx_hold);
        if hold != self.td.rx_hold_applied {
            self.rx.hold_reset(hold).map_err(|_| Error::ReceiveInit)?;
            self.td.rx_hold_applied = hold;
        }
        if self.cd.rx_restart.dest_clock() {
            log::debug!("receive initializer restart");
            self.rx.restart().map_err(|_| Error::ReceiveInit)?;
        }
        self.rx.pll_lock(pll_lock).map_err(|_| Error::ReceiveInit)?;
        self.td.rx_done = self.rx.done().map_err(|_| Error::ReceiveInit)?;
        Ok(())
    }

    /// Receive domain clock edge with the received `DATA_WIDTH` bit word
    pub fn tick_receive(self: &mut Self, word: u32) {
        if self.state == LinkState::Idle {
            return;
        }

        let enable = self.rd.enable.clock(self.cd.monitor_enable);
        let monitor = match self.rd.monitor.as_mut() {
            Some(monitor) => monitor,
            None => return,
        };

        let restart = if enable {
            monitor.clock(word)
        } else {
            monitor.reset();
            false
        };
        self.rd.ready = monitor.ready();
        self.cd.align_restart.send(restart);
        self.cd.errors.source_clock(monitor.error_count());
    }

    fn goto(self: &mut Self, next: LinkState) {
        log::info!("link: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
