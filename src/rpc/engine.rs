//! Command engine: moves host frames between the transport, the
//! single-slot mailbox, and the [`AppService`].
//!
//! Two halves, both driven from the main loop:
//!
//! 1. **Receive** ([`RpcEngine::poll_receive`]): one transport read is one
//!    frame; it is posted to the mailbox, replacing any undrained frame.
//! 2. **Dispatch** ([`RpcEngine::poll`]): takes the pending frame, parses
//!    it, and applies it.  Malformed frames are dropped; an `ERROR:` reply
//!    is sent only when `report_rejected_commands` is configured.
//!
//! Status frames (periodic or requested) go out via [`RpcEngine::send_status`].

use log::{debug, warn};

use crate::app::commands::{Command, CommandFrame, MAX_FRAME_LEN};
use crate::app::events::{AppEvent, StatusReport};
use crate::app::ports::{ActuatorPort, EventSink, SensorPort};
use crate::app::service::AppService;
use crate::config::SystemConfig;

use super::codec::{encode_error, encode_status};
use super::mailbox::CommandMailbox;
use super::transport::Transport;

/// Receive buffer; a read that fills it is an oversized chunk.
const RX_BUF_LEN: usize = MAX_FRAME_LEN + 1;

/// Consecutive zero-byte writes tolerated before an outgoing frame is
/// abandoned.  Each one is bounded by the transport's own write timeout.
pub const MAX_WRITE_STALLS: u32 = 8;

/// Transport-owning command engine.
pub struct RpcEngine<'a, T: Transport> {
    transport: T,
    mailbox: &'a CommandMailbox,
    report_rejections: bool,
    rx_buf: [u8; RX_BUF_LEN],
}

impl<'a, T: Transport> RpcEngine<'a, T> {
    pub fn new(transport: T, mailbox: &'a CommandMailbox, config: &SystemConfig) -> Self {
        Self {
            transport,
            mailbox,
            report_rejections: config.report_rejected_commands,
            rx_buf: [0; RX_BUF_LEN],
        }
    }

    /// Pull one chunk from the transport into the mailbox.
    /// Returns `true` if a frame was posted.
    pub fn poll_receive(&mut self) -> bool {
        let n = match self.transport.read(&mut self.rx_buf) {
            Ok(0) => return false,
            Ok(n) => n,
            Err(e) => {
                warn!("RPC: transport read failed: {:?}", e);
                return false;
            }
        };
        match CommandFrame::from_bytes(&self.rx_buf[..n]) {
            Some(frame) => {
                self.mailbox.post(frame);
                true
            }
            None => {
                debug!("RPC: dropped {}-byte chunk", n);
                false
            }
        }
    }

    /// Drain and dispatch the pending frame, if any.
    /// Returns `true` if a frame was consumed (applied or rejected).
    pub fn poll(
        &mut self,
        app: &mut AppService<'_>,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> bool {
        let Some(frame) = self.mailbox.take() else {
            return false;
        };

        match Command::parse(&frame) {
            Ok(cmd) => {
                if let Some(report) = app.handle_command(cmd, hw, sink) {
                    self.send_status(&report);
                }
            }
            Err(reason) => {
                debug!("RPC: frame rejected: {}", reason);
                sink.emit(&AppEvent::CommandRejected(reason));
                if self.report_rejections {
                    self.send_error(reason.message());
                }
            }
        }
        true
    }

    pub fn send_status(&mut self, report: &StatusReport) {
        let line = encode_status(report);
        self.send(line.as_bytes());
    }

    pub fn send_error(&mut self, message: &str) {
        let line = encode_error(message);
        self.send(line.as_bytes());
    }

    /// Borrow the underlying transport (test inspection, reconfiguration).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Write a whole frame, resuming after short writes.  A link that
    /// accepts nothing for [`MAX_WRITE_STALLS`] attempts in a row loses the
    /// rest of the frame.
    fn send(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        let mut stalls = 0;
        while !rest.is_empty() {
            match self.transport.write(rest) {
                Ok(0) => {
                    stalls += 1;
                    if stalls >= MAX_WRITE_STALLS {
                        warn!("RPC: link stalled, dropped {} of {} bytes", rest.len(), bytes.len());
                        return;
                    }
                }
                Ok(n) => {
                    rest = &rest[n.min(rest.len())..];
                    stalls = 0;
                }
                Err(e) => {
                    warn!("RPC: transport write failed: {:?}", e);
                    return;
                }
            }
        }
        if let Err(e) = self.transport.flush() {
            warn!("RPC: transport flush failed: {:?}", e);
        }
    }
}
