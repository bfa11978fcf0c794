#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::v2::{InputPin, OutputPin};

use gtp_link::constants::*;
use gtp_link::init::{PathInit, PinInit, RxPathInit};
use gtp_link::options::CheckPeriod;
use gtp_link::{Link, LinkOptions, LinkState};


/// Shared pin level, counts rising edges driven through `OutputPin`
#[derive(Clone, Default)]
pub struct MockPin {
    level: Rc<Cell<bool>>,
    rises: Rc<Cell<u32>>,
}

impl MockPin {
    pub fn new(level: bool) -> Self {
        let pin = MockPin::default();
        pin.level.set(level);
        pin
    }

    pub fn set(&self, level: bool) {
        self.level.set(level);
    }

    pub fn level(&self) -> bool {
        self.level.get()
    }

    pub fn rises(&self) -> u32 {
        self.rises.get()
    }
}

impl OutputPin for MockPin {
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.level.get() {
            self.rises.set(self.rises.get() + 1);
        }
        self.level.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.level.set(false);
        Ok(())
    }
}

impl InputPin for MockPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.level.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.level.get())
    }
}


#[derive(Debug, Default)]
pub struct InitState {
    /// Cycles between release (or restart) and done
    pub latency: u32,
    pub countdown: u32,
    pub held: bool,
    pub locked: bool,
    /// Reports done regardless of anything else
    pub force_done: bool,
    /// Never reports done
    pub stall: bool,
    pub holds: u32,
    pub restarts: u32,
}

/// Initializer that finishes `latency` cycles after being released with the PLL locked
#[derive(Clone, Default)]
pub struct MockInit(pub Rc<RefCell<InitState>>);

impl MockInit {
    pub fn new(latency: u32) -> Self {
        let init = MockInit::default();
        init.0.borrow_mut().latency = latency;
        init
    }

    pub fn state(&self) -> std::cell::RefMut<'_, InitState> {
        self.0.borrow_mut()
    }
}

impl PathInit for MockInit {
    type Error = Infallible;

    fn hold_reset(&mut self, hold: bool) -> Result<(), Infallible> {
        let mut s = self.0.borrow_mut();
        if hold {
            s.holds += 1;
            s.countdown = s.latency;
        }
        s.held = hold;
        Ok(())
    }

    fn pll_lock(&mut self, locked: bool) -> Result<(), Infallible> {
        self.0.borrow_mut().locked = locked;
        Ok(())
    }

    fn done(&mut self) -> Result<bool, Infallible> {
        let mut s = self.0.borrow_mut();
        if s.force_done {
            return Ok(true);
        }
        if s.held || s.stall || !s.locked {
            return Ok(false);
        }
        if s.countdown > 0 {
            s.countdown -= 1;
            return Ok(false);
        }
        Ok(true)
    }
}

impl RxPathInit for MockInit {
    fn restart(&mut self) -> Result<(), Infallible> {
        let mut s = self.0.borrow_mut();
        s.restarts += 1;
        s.countdown = s.latency;
        Ok(())
    }
}


/// Initializer in fabric behind a `PinInit`: done drops while its reset
/// is high on an edge and rises `latency` edges after the release.
pub struct FabricInit {
    pub reset: MockPin,
    pub done: MockPin,
    latency: u32,
    countdown: u32,
    in_reset: bool,
    /// Reset assertions seen on an edge
    pub resets: u32,
}

impl FabricInit {
    pub fn new(latency: u32) -> Self {
        FabricInit {
            reset: MockPin::new(false),
            done: MockPin::new(false),
            latency,
            countdown: 0,
            in_reset: false,
            resets: 0,
        }
    }

    pub fn pin_init(&self) -> PinInit<MockPin, MockPin> {
        PinInit::new(self.reset.clone(), self.done.clone())
    }

    /// One edge of the fabric clock
    pub fn edge(&mut self) {
        if self.reset.level() {
            if !self.in_reset {
                self.resets += 1;
            }
            self.in_reset = true;
            self.done.set(false);
            self.countdown = self.latency;
        } else {
            self.in_reset = false;
            if self.countdown > 0 {
                self.countdown -= 1;
                if self.countdown == 0 {
                    self.done.set(true);
                }
            }
        }
    }
}


pub const PERIOD: u32 = 16;

/// Properly aligned word: comma followed by a data character
pub const ALIGNED: u32 = COMMA as u32 | (0b1010101010 << CHAR_WIDTH);

/// Word without any comma, valid disparity
pub const GARBAGE: u32 = 0b1010101010 | (0b1010101010 << CHAR_WIDTH);

pub type TestLink = Link<MockPin, MockPin, MockInit, MockInit>;

pub type FabricLink = Link<MockPin, MockPin, MockInit, PinInit<MockPin, MockPin>>;

/// Control, transmit and receive edges per step
pub type Rates = (u32, u32, u32);

/// A link plus handles on everything around it
pub struct Bench {
    pub link: TestLink,
    pub pll_reset: MockPin,
    pub pll_lock: MockPin,
    pub tx: MockInit,
    pub rx: MockInit,
    pub word: u32,
    pub rates: Rates,
    pub trace: Vec<LinkState>,
}

impl Bench {
    pub fn options() -> LinkOptions {
        LinkOptions::new(125e6, 2.5e9).check_period(CheckPeriod::Ticks(PERIOD))
    }

    pub fn new(options: LinkOptions) -> Self {
        let pll_reset = MockPin::new(false);
        let pll_lock = MockPin::new(false);
        let tx = MockInit::new(5);
        let rx = MockInit::new(7);
        let link = Link::new(options, pll_reset.clone(), pll_lock.clone(), tx.clone(), rx.clone())
            .unwrap();
        Bench { link, pll_reset, pll_lock, tx, rx, word: ALIGNED, rates: (1, 1, 1), trace: Vec::new() }
    }

    /// One step at `self.rates`
    pub fn step(&mut self) {
        self.step_rates(self.rates);
    }

    /// Spreads each domain's edges evenly over the step. Within a slot
    /// the domains tick in control, transmit, receive order. The trace
    /// is recorded after every control edge.
    pub fn step_rates(&mut self, (control, transmit, receive): Rates) {
        let slots = control.max(transmit).max(receive);
        let due = |rate: u32, slot: u32| (slot + 1) * rate / slots > slot * rate / slots;
        for slot in 0..slots {
            if due(control, slot) {
                self.link.tick_control().unwrap();
                let state = self.link.state();
                if self.trace.last() != Some(&state) {
                    self.trace.push(state);
                }
            }
            if due(transmit, slot) {
                self.link.tick_transmit().unwrap();
            }
            if due(receive, slot) {
                self.link.tick_receive(self.word);
            }
        }
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Steps until `state` is reached, returns the number of steps taken
    pub fn run_until(&mut self, state: LinkState, max: usize) -> Option<usize> {
        for i in 0..max {
            if self.link.state() == state {
                return Some(i);
            }
            self.step();
        }
        None
    }

    /// Trace entries recorded after `from`
    pub fn trace_since(&self, from: usize) -> &[LinkState] {
        &self.trace[from..]
    }
}
