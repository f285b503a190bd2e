//! GPIO / peripheral pin assignments for the ESS controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Per-line arrays are indexed the same way as the
//! matching domain enum (`FaultLine::index`, `EnableSignal`, `Led`,
//! `VoltageChannel`).

// ---------------------------------------------------------------------------
// Voltage sense (ADC1, 1:5 resistive dividers)
// ---------------------------------------------------------------------------

/// Load bus: ADC1 channel 0 (GPIO 1).
pub const LOAD_V_ADC_CH: u32 = 0;
/// Charger output: ADC1 channel 3 (GPIO 4).
pub const CHARGE_V_ADC_CH: u32 = 3;
/// Bank A: ADC1 channel 1 (GPIO 2).
pub const BANK_A_V_ADC_CH: u32 = 1;
/// Bank B: ADC1 channel 2 (GPIO 3).
pub const BANK_B_V_ADC_CH: u32 = 2;

/// Indexed by `VoltageChannel`: Load, Charge, BankA, BankB.
pub const VOLTAGE_ADC_CHANNELS: [u32; 4] = [
    LOAD_V_ADC_CH,
    CHARGE_V_ADC_CH,
    BANK_A_V_ADC_CH,
    BANK_B_V_ADC_CH,
];

// ---------------------------------------------------------------------------
// Fault inputs (active LOW, external pull-ups, falling-edge interrupt)
// ---------------------------------------------------------------------------

pub const FAULT_BLOCK_200A_GPIO: i32 = 5;
pub const FAULT_BLOCK_100A_GPIO: i32 = 6;
pub const FAULT_CHARGE_GPIO: i32 = 7;
pub const FAULT_FAST_CHARGE_GPIO: i32 = 8;

/// Indexed by `FaultLine::index()`.
pub const FAULT_GPIOS: [i32; 4] = [
    FAULT_BLOCK_200A_GPIO,
    FAULT_BLOCK_100A_GPIO,
    FAULT_CHARGE_GPIO,
    FAULT_FAST_CHARGE_GPIO,
];

// ---------------------------------------------------------------------------
// Enable outputs (active HIGH)
// ---------------------------------------------------------------------------

pub const EN_FAST_CHARGE_GPIO: i32 = 11;
pub const EN_CHARGE_GPIO: i32 = 12;
pub const EN_BLOCK_100A_GPIO: i32 = 13;
pub const EN_BLOCK_200A_GPIO: i32 = 14;

/// Indexed by `EnableSignal` (host `E` command index).
pub const ENABLE_GPIOS: [i32; 4] = [
    EN_FAST_CHARGE_GPIO,
    EN_CHARGE_GPIO,
    EN_BLOCK_100A_GPIO,
    EN_BLOCK_200A_GPIO,
];

// ---------------------------------------------------------------------------
// Indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

/// Indexed by `Led`: 0 %, 50 %, 100 %, Charging, Check Charger, Warning.
pub const LED_GPIOS: [i32; 6] = [15, 16, 17, 18, 21, 38];

// ---------------------------------------------------------------------------
// Bistable latching relay (dual-coil driver)
// ---------------------------------------------------------------------------

/// Set coil.
pub const LATCH_IN1_GPIO: i32 = 39;
/// Reset coil.
pub const LATCH_IN2_GPIO: i32 = 40;

// ---------------------------------------------------------------------------
// Host link
// ---------------------------------------------------------------------------

/// USB-Serial-JTAG RX ring size handed to the driver.
pub const USB_RX_BUFFER_SIZE: u32 = 256;
/// USB-Serial-JTAG TX ring size handed to the driver.
pub const USB_TX_BUFFER_SIZE: u32 = 256;
