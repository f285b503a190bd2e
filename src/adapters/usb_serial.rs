//! USB-Serial-JTAG transport (native USB CDC on the ESP32-S3).
//!
//! Implements [`Transport`] over the IDF `usb_serial_jtag` driver.  Reads
//! never block; one read returns whatever the driver has buffered, which
//! the engine treats as a single command frame.  Writes wait at most
//! [`WRITE_TIMEOUT_TICKS`] for room in the TX ring and may return short.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the driver is installed in [`UsbSerialTransport::new`].
//! On host/test: in-memory queues, fed with [`UsbSerialTransport::sim_inject`]
//! and drained with [`UsbSerialTransport::sim_take_output`].

use crate::error::{Error, Result};
use crate::rpc::transport::Transport;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

/// RTOS ticks a write may wait for TX ring space.
#[cfg(target_os = "espidf")]
pub const WRITE_TIMEOUT_TICKS: TickType_t = 2;

pub struct UsbSerialTransport {
    #[cfg(not(target_os = "espidf"))]
    rx: VecDeque<Vec<u8>>,
    #[cfg(not(target_os = "espidf"))]
    tx: Vec<u8>,
}

impl UsbSerialTransport {
    /// Install the USB-Serial-JTAG driver.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self> {
        let mut cfg = usb_serial_jtag_driver_config_t {
            tx_buffer_size: crate::pins::USB_TX_BUFFER_SIZE,
            rx_buffer_size: crate::pins::USB_RX_BUFFER_SIZE,
        };
        // SAFETY: called once from main() before the loop starts.
        let ret = unsafe { usb_serial_jtag_driver_install(&mut cfg) };
        if ret != ESP_OK as i32 {
            log::error!("usb_serial: driver install failed (rc={})", ret);
            return Err(Error::Transport("usb_serial_jtag_driver_install failed"));
        }
        log::info!("usb_serial: driver installed");
        Ok(Self {})
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self> {
        log::info!("usb_serial(sim): in-memory link");
        Ok(Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
        })
    }

    /// Queue one chunk as if the host had sent it.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_inject(&mut self, bytes: &[u8]) {
        self.rx.push_back(bytes.to_vec());
    }

    /// Everything written since the last call.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl Transport for UsbSerialTransport {
    type Error = Error;

    #[cfg(target_os = "espidf")]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        // SAFETY: buf is valid for buf.len() bytes; zero timeout.
        let n = unsafe { usb_serial_jtag_read_bytes(buf.as_mut_ptr().cast(), buf.len() as u32, 0) };
        if n < 0 {
            return Err(Error::Transport("usb_serial_jtag_read_bytes failed"));
        }
        Ok(n as usize)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(chunk) = self.rx.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        Ok(n)
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        // SAFETY: data is valid for data.len() bytes.
        let n = unsafe {
            usb_serial_jtag_write_bytes(data.as_ptr().cast(), data.len(), WRITE_TIMEOUT_TICKS)
        };
        if n < 0 {
            return Err(Error::Transport("usb_serial_jtag_write_bytes failed"));
        }
        Ok(n as usize)
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
