//! Clock domain crossing
//!
//! Each primitive keeps both of its sides in one struct. Methods named
//! `clock`/`dest_clock` must only be called on destination domain edges,
//! `send`/`source_clock`/`request` only on source domain edges.


/// Two flip-flop level synchronizer for a single bit.
///
/// The output follows the input two destination clock edges later.
/// Multi-bit values must go through `BusSynchronizer` instead.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MultiReg {
    stage1: bool,
    stage2: bool,
}

impl MultiReg {
    pub fn new(init: bool) -> Self {
        MultiReg { stage1: init, stage2: init }
    }

    /// Destination clock edge. Returns the synchronized level.
    #[inline]
    pub fn clock(self: &mut Self, input: bool) -> bool {
        self.stage2 = self.stage1;
        self.stage1 = input;
        self.stage2
    }

    /// Synchronized level as of the last destination edge
    #[inline]
    pub fn get(self: &Self) -> bool {
        self.stage2
    }

    /// Destination domain reset
    pub fn reset(self: &mut Self, value: bool) {
        self.stage1 = value;
        self.stage2 = value;
    }
}


/// Carries single-cycle pulses between domains.
///
/// A pulse toggles a source register; the toggle is synchronized and
/// edge-detected on the destination side. Pulses closer together than
/// the synchronizer latency may merge.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PulseSynchronizer {
    toggle_i: bool,
    sync: MultiReg,
    toggle_o: bool,
}

impl PulseSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source clock edge
    #[inline]
    pub fn send(self: &mut Self, pulse: bool) {
        if pulse {
            self.toggle_i = !self.toggle_i;
        }
    }

    /// Destination clock edge. True for exactly one edge per source pulse.
    #[inline]
    pub fn clock(self: &mut Self) -> bool {
        let toggle = self.sync.clock(self.toggle_i);
        let pulse = toggle != self.toggle_o;
        self.toggle_o = toggle;
        pulse
    }
}


/// Request/acknowledge toggle handshake.
///
/// The source raises a request with `request`, the destination sees it
/// once on `dest_clock` and acknowledges on the same edge, and the
/// source observes the acknowledge through its own synchronizer. A new
/// request is only accepted once the previous one has been acknowledged.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Handshake {
    req: bool,
    req_sync: MultiReg,
    ack: bool,
    ack_sync: MultiReg,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no request is in flight (source view)
    #[inline]
    pub fn is_idle(self: &Self) -> bool {
        self.ack_sync.get() == self.req
    }

    /// Raise a request. Returns false while the previous one is in flight.
    pub fn request(self: &mut Self) -> bool {
        if self.is_idle() {
            self.req = !self.req;
            true
        } else {
            false
        }
    }

    /// Source clock edge
    #[inline]
    pub fn source_clock(self: &mut Self) {
        self.ack_sync.clock(self.ack);
    }

    /// Destination clock edge. True on the edge a new request arrives.
    #[inline]
    pub fn dest_clock(self: &mut Self) -> bool {
        let req = self.req_sync.clock(self.req);
        if req != self.ack {
            self.ack = req;
            true
        } else {
            false
        }
    }
}


/// Multi-bit value crossing over a `Handshake`.
///
/// The source latches a value whenever the handshake is idle and holds it
/// stable until the destination has taken it, so the destination never
/// observes a torn value.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BusSynchronizer<T> {
    handshake: Handshake,
    latched: T,
    out: T,
}

impl<T: Copy> BusSynchronizer<T> {
    pub fn new(init: T) -> Self {
        BusSynchronizer { handshake: Handshake::new(), latched: init, out: init }
    }

    /// Source clock edge with the current source value
    pub fn source_clock(self: &mut Self, value: T) {
        self.handshake.source_clock();
        if self.handshake.is_idle() {
            self.latched = value;
            self.handshake.request();
        }
    }

    /// Destination clock edge. Returns the latest transferred value.
    pub fn dest_clock(self: &mut Self) -> T {
        if self.handshake.dest_clock() {
            self.out = self.latched;
        }
        self.out
    }

    /// Latest transferred value (destination view)
    #[inline]
    pub fn get(self: &Self) -> T {
        self.out
    }
}
