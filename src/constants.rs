//! Constants

/// Minimum PLL VCO frequency, Hz
pub const VCO_FREQ_MIN: f64 = 1.6e9;

/// Maximum PLL VCO frequency, Hz
pub const VCO_FREQ_MAX: f64 = 3.3e9;

/// Line rates at or above this are out of reach of the GTP family, b/s
pub const LINE_RATE_MAX: f64 = 6.6e9;

/// Feedback divider N1 (FBDIV_45), in search order
pub const N1_VALUES: [u32; 2] = [4, 5];

/// Feedback divider N2 (FBDIV), in search order
pub const N2_VALUES: [u32; 5] = [1, 2, 3, 4, 5];

/// Reference clock divider M (REFCLK_DIV), in search order
pub const M_VALUES: [u32; 2] = [1, 2];

/// Output divider D (TXOUT_DIV / RXOUT_DIV), in search order
pub const D_VALUES: [u32; 4] = [1, 2, 4, 8];

/// Relative tolerance when matching a derived line rate to the requested one
pub const LINE_RATE_TOLERANCE: f64 = 1e-9;

/// Parallel datapath width, bits per word clock cycle
pub const DATA_WIDTH: u32 = 20;

/// Width of one encoded character
pub const CHAR_WIDTH: u32 = 10;

/// Mask covering one encoded character
pub const CHAR_MASK: u32 = (1 << CHAR_WIDTH) - 1;

/// K28.5 comma, negative running disparity
pub const COMMA: u16 = 0b0101111100;

/// Default alignment check period, seconds
pub const CHECK_PERIOD: f64 = 10e-3;

/// Default number of good checks required after the first comma sighting
pub const GRACE_CHECKS: u32 = 1;

/// Control domain cycles the PLL reset is held for after `start`
pub const PLL_RESET_CYCLES: u32 = 1;

/// Initializer domain edges a pin-driven restart keeps the reset asserted
pub const INIT_RESTART_EDGES: u32 = 1;
