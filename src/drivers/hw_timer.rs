//! 1 kHz hardware tick using ESP-IDF's esp_timer API.
//!
//! The callback runs in the esp_timer task (not ISR) and only bumps the
//! shared [`TickCounter`].  On simulation targets nothing is started; tests
//! advance the counter by hand.

use crate::drivers::hw_init::HwInitError;
use crate::scheduler::TickCounter;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Tick period.
pub const TICK_PERIOD_US: u64 = 1_000;

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static TickCounter` passed to start_tick_timer().
    let ticks = unsafe { &*(arg as *const TickCounter) };
    ticks.increment();
}

/// Start the periodic tick timer feeding `ticks`.
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(ticks: &'static TickCounter) -> Result<(), HwInitError> {
    // SAFETY: TICK_TIMER is written here once at boot from the main task,
    // before the callback can fire.  The callback only touches an atomic.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: ticks as *const TickCounter as *mut core::ffi::c_void,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"tick\0".as_ptr() as *const _,
            skip_unhandled_events: true,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }
        let ret = esp_timer_start_periodic(TICK_TIMER, TICK_PERIOD_US);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerFailed(ret));
        }
    }
    info!("hw_timer: tick@1kHz started");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(_ticks: &'static TickCounter) -> Result<(), HwInitError> {
    log::info!("hw_timer(sim): tick timer not started (advance manually)");
    Ok(())
}
