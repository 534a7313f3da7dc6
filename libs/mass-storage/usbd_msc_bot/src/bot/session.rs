// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use log::warn;
use packing::{Packed, PackedSize};

use super::{
    CommandBlockWrapper, CommandStatus, CommandStatusWrapper, Direction, CSW_SIGNATURE,
};
use crate::{
    logging::*,
    AdditionalSenseCode, BulkEndpoint, CommandSetHandler, Continuation, EndpointDriver,
    EndpointError, SenseData, SenseFifo, SenseKey, Transfer,
};

/// Staging buffer size; one transfer chunk never exceeds this.
pub const MEDIA_PACKET_BYTES: usize = 512;

const REQ_GET_MAX_LUN: u8 = 0xFE;
const REQ_BOT_RESET: u8 = 0xFF;

/// Position in the BOT command cycle.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum BotState {
    /// OUT endpoint armed for a 31-byte CBW
    Idle,
    /// Consuming a host-to-device data stage chunk by chunk
    DataOut,
    /// Producing a device-to-host data stage, more chunks to come
    DataIn,
    /// The chunk in flight is the last of the data stage
    LastDataIn,
    /// Single staged response in flight (the burst case)
    SendData,
    /// Command moves no data; failures answer with a CSW directly
    NoData,
}

/// Error-mode flag, orthogonal to [`BotState`], gating the abort and
/// clear-feature transitions.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum BotStatus {
    Normal,
    /// A BOT_RESET was received; halts clear without finalizing the
    /// discarded command
    Recovery,
    /// The last CBW was malformed
    Error,
}

/// A class-specific request seen on the control endpoint, as decoded by the
/// enumeration glue.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ClassRequest {
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

/// What the glue should answer on the control endpoint.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum SetupReply {
    /// One-byte GET_MAX_LUN response
    MaxLun(u8),
    /// Status stage only
    Ack,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum RequestError {
    /// Not a request this class handles, or a malformed variant of one;
    /// the glue should stall EP0
    Unsupported,
    Endpoint(EndpointError),
}

impl From<EndpointError> for RequestError {
    fn from(e: EndpointError) -> RequestError {
        RequestError::Endpoint(e)
    }
}

/// One Bulk-Only Transport session: the per-interface state machine of the
/// USB MSC BOT 1.0 command/data/status cycle.
///
/// Owned by the class-driver instance for its MSC interface and driven from
/// endpoint-completion callbacks; it never blocks and accepts exactly one
/// command at a time. The OUT endpoint is re-armed for the next CBW only
/// once the current command's CSW has been handed to the driver.
pub struct BotSession {
    state: BotState,
    status: BotStatus,

    /// The CBW being serviced. Stale while `Idle`.
    cbw: CommandBlockWrapper,

    /// Status wrapper under construction; `tag` and `data_residue` are
    /// maintained from CBW acceptance onwards
    csw: CommandStatusWrapper,

    /// Data staged for the current chunk, both directions
    data: [u8; MEDIA_PACKET_BYTES],
    data_len: usize,

    /// Pending CHECK CONDITION reports for REQUEST SENSE
    sense: SenseFifo,
}

impl BotSession {
    pub fn new() -> Self {
        Self {
            state: BotState::Idle,
            status: BotStatus::Normal,
            cbw: Default::default(),
            csw: Default::default(),
            data: [0; MEDIA_PACKET_BYTES],
            data_len: 0,
            sense: SenseFifo::new(),
        }
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn status(&self) -> BotStatus {
        self.status
    }

    /// The USB configuration bound this interface: open and drain both
    /// endpoints, let the command set bring its units up, then wait for
    /// the first CBW.
    pub fn activate<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &mut H,
    ) -> Result<(), EndpointError> {
        self.change_state(BotState::Idle);
        self.status = BotStatus::Normal;
        self.data_len = 0;
        self.sense.clear();
        handler.activate();

        ep.open(BulkEndpoint::Out)?;
        ep.open(BulkEndpoint::In)?;
        ep.flush(BulkEndpoint::Out)?;
        ep.flush(BulkEndpoint::In)?;
        ep.prepare_receive(BulkEndpoint::Out, CommandBlockWrapper::BYTES)
    }

    /// The interface deconfigured (bus reset or SET_CONFIGURATION away).
    pub fn deactivate<E: EndpointDriver>(&mut self, ep: &mut E) -> Result<(), EndpointError> {
        self.change_state(BotState::Idle);
        ep.close(BulkEndpoint::In)?;
        ep.close(BulkEndpoint::Out)
    }

    /// Class-specific BOT_RESET: discard any in-progress command without a
    /// CSW and wait for a fresh CBW. The storage stack is not touched.
    pub fn reset<E: EndpointDriver>(&mut self, ep: &mut E) -> Result<(), EndpointError> {
        trace_usb_control!("USB_CONTROL> bulk-only mass storage reset");
        self.change_state(BotState::Idle);
        self.status = BotStatus::Recovery;
        self.data_len = 0;
        ep.prepare_receive(BulkEndpoint::Out, CommandBlockWrapper::BYTES)
    }

    /// Class-specific control requests: GET_MAX_LUN and BOT_RESET.
    /// Anything else, including malformed variants of the two, is rejected
    /// for the glue to stall EP0.
    pub fn on_setup_request<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &H,
        req: &ClassRequest,
    ) -> Result<SetupReply, RequestError> {
        match req.request {
            REQ_GET_MAX_LUN if req.value == 0 && req.length == 1 => {
                trace_usb_control!("USB_CONTROL> get max lun: {}", handler.max_lun());
                Ok(SetupReply::MaxLun(handler.max_lun()))
            }
            REQ_BOT_RESET if req.value == 0 && req.length == 0 => {
                self.reset(ep)?;
                Ok(SetupReply::Ack)
            }
            _ => Err(RequestError::Unsupported),
        }
    }

    /// Bulk-OUT completion: `packet` holds the received bytes. A CBW while
    /// `Idle`, a data-stage chunk while `DataOut`; anything else is noise
    /// from an endpoint drained during recovery and is dropped.
    pub fn on_bulk_out_complete<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &mut H,
        packet: &[u8],
    ) -> Result<(), EndpointError> {
        match self.state {
            BotState::Idle => self.decode_cbw(ep, handler, packet),
            BotState::DataOut => self.continue_data_out(ep, handler, packet),
            _ => Ok(()),
        }
    }

    /// Bulk-IN completion: the previously queued transmit (data chunk or
    /// CSW) went out on the wire.
    pub fn on_bulk_in_complete<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &mut H,
    ) -> Result<(), EndpointError> {
        match self.state {
            BotState::DataIn => self.continue_data_in(ep, handler),
            BotState::SendData | BotState::LastDataIn => {
                self.send_csw(ep, CommandStatus::Passed)
            }
            // CSW transmit completions land here while Idle
            _ => Ok(()),
        }
    }

    /// The host cleared ENDPOINT_HALT on one of the bulk endpoints.
    pub fn on_clear_feature<E: EndpointDriver>(
        &mut self,
        ep: &mut E,
        halted: BulkEndpoint,
    ) -> Result<(), EndpointError> {
        trace_usb_control!("USB_CONTROL> clear feature on {:?}, status {:?}", halted, self.status);
        ep.flush(halted)?;
        ep.open(halted)?;

        if self.status == BotStatus::Error {
            // Bad-CBW handling stalls IN until the host has cleared both
            // halts; only then does the machine leave error mode
            ep.stall(BulkEndpoint::In)?;
            self.status = BotStatus::Normal;
        } else if halted == BulkEndpoint::In && self.status != BotStatus::Recovery {
            // Finalizes a command that failed mid-data-stage
            self.send_csw(ep, CommandStatus::Failed)?;
        }
        Ok(())
    }

    fn change_state(&mut self, new_state: BotState) {
        trace_bot_states!("STATE> {:?} -> {:?}", self.state, new_state);
        self.state = new_state;
    }

    fn decode_cbw<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &mut H,
        packet: &[u8],
    ) -> Result<(), EndpointError> {
        self.data_len = 0;

        if packet.len() != CommandBlockWrapper::BYTES {
            warn!("CBW rejected: {} bytes on the wire", packet.len());
            return self.reject_cbw(ep);
        }

        let cbw = match CommandBlockWrapper::unpack(packet) {
            Ok(cbw) => cbw,
            Err(_) => return self.reject_cbw(ep),
        };

        // Tag and residue are prepared before validation so a command that
        // fails later still gets a correctly paired CSW
        self.csw.tag = cbw.tag;
        self.csw.data_residue = cbw.data_transfer_length;
        self.cbw = cbw;
        trace_bot_headers!("HEADER> CommandBlockWrapper: {:X?}", self.cbw);

        if let Err(e) = self.cbw.validate(handler.max_lun()) {
            warn!("CBW rejected: {:?}", e);
            return self.reject_cbw(ep);
        }

        let mut next = Continuation::Complete;
        let outcome = handler.start(
            self.cbw.lun,
            self.cbw.command_block(),
            &mut Transfer::new(
                &mut self.data,
                &mut self.data_len,
                &mut self.sense,
                &mut next,
                self.cbw.data_transfer_length,
                Direction::from_flags(self.cbw.flags),
            ),
        );
        self.apply_continuation(next);

        if outcome.is_err() {
            if self.state == BotState::NoData {
                // Host declared no data stage; fail straight to the CSW
                return self.send_csw(ep, CommandStatus::Failed);
            }
            return self.abort(ep);
        }

        match self.state {
            BotState::DataIn | BotState::LastDataIn => self.send_staged(ep),
            BotState::DataOut => ep.prepare_receive(BulkEndpoint::Out, self.data_len),
            _ => {
                // Burst case: the handler finished in one call
                if self.data_len > 0 {
                    self.change_state(BotState::SendData);
                    self.send_staged(ep)
                } else {
                    self.send_csw(ep, CommandStatus::Passed)
                }
            }
        }
    }

    /// Malformed wrapper: queue sense, enter error mode and stall the pair.
    fn reject_cbw<E: EndpointDriver>(&mut self, ep: &mut E) -> Result<(), EndpointError> {
        self.sense.push(SenseData::new(
            SenseKey::IllegalRequest,
            AdditionalSenseCode::InvalidFieldInCdb,
        ));
        self.status = BotStatus::Error;
        self.abort(ep)
    }

    fn continue_data_in<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &mut H,
    ) -> Result<(), EndpointError> {
        let mut next = Continuation::Complete;
        let outcome = handler.data_in(
            self.cbw.lun,
            self.cbw.command_block(),
            &mut Transfer::new(
                &mut self.data,
                &mut self.data_len,
                &mut self.sense,
                &mut next,
                self.cbw.data_transfer_length,
                Direction::from_flags(self.cbw.flags),
            ),
        );
        if outcome.is_err() {
            return self.send_csw(ep, CommandStatus::Failed);
        }

        if next != Continuation::MoreDataIn {
            self.change_state(BotState::LastDataIn);
        }
        self.send_staged(ep)
    }

    fn continue_data_out<E: EndpointDriver, H: CommandSetHandler>(
        &mut self,
        ep: &mut E,
        handler: &mut H,
        packet: &[u8],
    ) -> Result<(), EndpointError> {
        let len = packet.len().min(self.data.len());
        self.data[..len].copy_from_slice(&packet[..len]);
        self.data_len = len;
        self.csw.data_residue = self.csw.data_residue.saturating_sub(len as u32);
        trace_bot_bytes!("BYTES> received {} bytes, residue {}", len, self.csw.data_residue);

        let mut next = Continuation::Complete;
        let outcome = handler.data_out(
            self.cbw.lun,
            self.cbw.command_block(),
            &mut Transfer::new(
                &mut self.data,
                &mut self.data_len,
                &mut self.sense,
                &mut next,
                self.cbw.data_transfer_length,
                Direction::from_flags(self.cbw.flags),
            ),
        );
        match outcome {
            Err(_) => self.send_csw(ep, CommandStatus::Failed),
            Ok(()) => {
                if next == Continuation::DataOut {
                    ep.prepare_receive(BulkEndpoint::Out, self.data_len)
                } else {
                    self.send_csw(ep, CommandStatus::Passed)
                }
            }
        }
    }

    fn apply_continuation(&mut self, next: Continuation) {
        match next {
            Continuation::MoreDataIn => self.change_state(BotState::DataIn),
            Continuation::LastDataIn => self.change_state(BotState::LastDataIn),
            Continuation::DataOut => self.change_state(BotState::DataOut),
            Continuation::NoData => self.change_state(BotState::NoData),
            Continuation::Complete => {}
        }
    }

    /// Transmit the staged chunk, clamped to what the host declared it
    /// would accept, and account for it in the residue.
    fn send_staged<E: EndpointDriver>(&mut self, ep: &mut E) -> Result<(), EndpointError> {
        let len = self.data_len.min(self.csw.data_residue as usize);
        self.csw.data_residue -= len as u32;
        trace_bot_bytes!("BYTES> sending {} bytes, residue {}", len, self.csw.data_residue);
        ep.transmit(BulkEndpoint::In, &self.data[..len])
    }

    /// Close out the command cycle: 13 bytes of status on IN, then re-arm
    /// OUT for the next CBW.
    fn send_csw<E: EndpointDriver>(
        &mut self,
        ep: &mut E,
        status: CommandStatus,
    ) -> Result<(), EndpointError> {
        self.csw.signature = CSW_SIGNATURE;
        self.csw.status = status;
        trace_bot_headers!("HEADER> CommandStatusWrapper: {:X?}", self.csw);

        let mut raw = [0u8; CommandStatusWrapper::BYTES];
        // Infallible: the buffer is exactly CommandStatusWrapper::BYTES
        let packed = self.csw.pack(&mut raw);
        debug_assert!(packed.is_ok());

        self.change_state(BotState::Idle);
        ep.transmit(BulkEndpoint::In, &raw)?;
        ep.prepare_receive(BulkEndpoint::Out, CommandBlockWrapper::BYTES)
    }

    /// Stall out of the current command. While `status == Error` (bad CBW)
    /// both endpoints halt and OUT is left armed so a fresh CBW is
    /// accepted once the host clears it; a mid-command failure stalls OUT
    /// only when the host had declared data to send, and always stalls IN.
    fn abort<E: EndpointDriver>(&mut self, ep: &mut E) -> Result<(), EndpointError> {
        trace_bot_states!("STATE> abort in {:?}/{:?}", self.state, self.status);
        match self.status {
            BotStatus::Normal => {
                if self.cbw.direction() == Direction::HostToDevice
                    && self.cbw.data_transfer_length != 0
                {
                    ep.stall(BulkEndpoint::Out)?;
                }
            }
            BotStatus::Error => ep.stall(BulkEndpoint::Out)?,
            BotStatus::Recovery => {}
        }
        ep.stall(BulkEndpoint::In)?;
        if self.status == BotStatus::Error {
            ep.prepare_receive(BulkEndpoint::Out, CommandBlockWrapper::BYTES)?;
        }
        Ok(())
    }
}

impl Default for BotSession {
    fn default() -> Self {
        Self::new()
    }
}
