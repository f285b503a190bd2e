//! Blocking delay provider for drivers that need one.
//!
//! On ESP-IDF: `esp_idf_hal::delay::FreeRtos` (yields to the scheduler).
//! On host/test: `std::thread::sleep`, so blocking behaviour is preserved.

#[cfg(target_os = "espidf")]
pub type PlatformDelay = esp_idf_hal::delay::FreeRtos;

#[cfg(not(target_os = "espidf"))]
pub type PlatformDelay = StdDelay;

/// Host stand-in for the FreeRTOS delay.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

/// Construct the platform delay.
pub fn platform_delay() -> PlatformDelay {
    #[cfg(target_os = "espidf")]
    {
        esp_idf_hal::delay::FreeRtos
    }

    #[cfg(not(target_os = "espidf"))]
    {
        StdDelay
    }
}
