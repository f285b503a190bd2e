//! Indicator LED policy and the fatal-error blink pattern.

use crate::app::ports::ActuatorPort;
use crate::battery::BatterySnapshot;
use crate::config::IndicatorPolicy;
use crate::fault::FaultState;

use super::mode::{ChargeMode, Led};

/// Gauge thresholds (percent) for [`IndicatorPolicy::Automatic`].
const GAUGE_HALF: u8 = 25;
const GAUGE_FULL: u8 = 75;

/// Half-period of the fatal-error blink.
pub const ERROR_BLINK_PERIOD_MS: u32 = 100;

/// Final LED levels for one tick.
///
/// Host-set states always show.  The warning LED additionally follows the
/// low-battery flag when `low_battery_warning` is set; the automatic policy
/// ORs in the gauge, charging and charger-fault indicators.
pub fn led_outputs(
    policy: IndicatorPolicy,
    manual: [bool; 6],
    battery: Option<&BatterySnapshot>,
    faults: FaultState,
    charge_mode: ChargeMode,
    low_battery_warning: bool,
) -> [bool; 6] {
    let mut leds = manual;
    let low = battery.is_some_and(|b| b.low_battery);

    if low_battery_warning && low {
        leds[Led::Warning as usize] = true;
    }

    if policy == IndicatorPolicy::Automatic {
        if let Some(b) = battery {
            let gauge = match b.battery_level {
                l if l < GAUGE_HALF => Led::Level0,
                l if l < GAUGE_FULL => Led::Level50,
                _ => Led::Level100,
            };
            leds[gauge as usize] = true;
        }
        if charge_mode != ChargeMode::Off {
            leds[Led::Charging as usize] = true;
        }
        if faults.intersects(FaultState::CHARGE | FaultState::FAST_CHARGE) {
            leds[Led::CheckCharger as usize] = true;
        }
        if low {
            leds[Led::Warning as usize] = true;
        }
    }

    leds
}

/// LED levels for blink step `step` of the fatal-error pattern: all six
/// LEDs toggle together, on during even steps.
pub const fn error_blink_frame(step: u32) -> [bool; 6] {
    [step % 2 == 0; 6]
}

/// Fail-stopped board: every enable, LED and coil driven low on entry,
/// after which [`FailStop::blink`] steps the error pattern.  Nothing else
/// is driven while this is active.
pub struct FailStop {
    step: u32,
}

impl FailStop {
    pub fn enter(hw: &mut impl ActuatorPort) -> Self {
        hw.all_off();
        Self { step: 0 }
    }

    /// Show the next blink frame.  Call every [`ERROR_BLINK_PERIOD_MS`].
    pub fn blink(&mut self, hw: &mut impl ActuatorPort) {
        for (led, on) in Led::ALL.into_iter().zip(error_blink_frame(self.step)) {
            hw.set_led(led, on);
        }
        self.step = self.step.wrapping_add(1);
    }
}
