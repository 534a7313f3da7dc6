use crate::{
    bot::Direction,
    sense::{AdditionalSenseCode, SenseData, SenseFifo, SenseKey},
};

/// Opaque failure marker returned by a [`CommandSetHandler`].
///
/// The handler is expected to have queued sense data describing the failure
/// before returning this; the session only needs the pass/fail outcome to
/// pick the abort or CSW-FAILED transition.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct CommandFailed;

/// What the session should do once the current handler call returns.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Continuation {
    /// The command is fully handled in this call: transmit whatever was
    /// staged (possibly nothing) and send the CSW. The "burst" case.
    Complete,
    /// A chunk is staged and more device-to-host chunks will follow.
    MoreDataIn,
    /// The staged chunk is the last of the device-to-host data stage.
    LastDataIn,
    /// Expect host-to-device data; the staged length is the receive size.
    DataOut,
    /// The command moves no data; on failure the CSW is sent directly
    /// instead of stalling the data stage.
    NoData,
}

/// Borrowed view of the session's staging state, handed to the command-set
/// handler for the duration of one dispatch call.
///
/// Staged data is clamped against the CBW's declared transfer length by the
/// session, not here, so a handler can stage a full response page and let
/// the transport cut it down to what the host asked for.
pub struct Transfer<'a> {
    data: &'a mut [u8],
    data_len: &'a mut usize,
    sense: &'a mut SenseFifo,
    next: &'a mut Continuation,
    data_transfer_length: u32,
    direction: Direction,
}

impl<'a> Transfer<'a> {
    pub(crate) fn new(
        data: &'a mut [u8],
        data_len: &'a mut usize,
        sense: &'a mut SenseFifo,
        next: &'a mut Continuation,
        data_transfer_length: u32,
        direction: Direction,
    ) -> Self {
        Self { data, data_len, sense, next, data_transfer_length, direction }
    }

    /// Total data-stage bytes the host declared in the CBW.
    pub fn data_transfer_length(&self) -> u32 {
        self.data_transfer_length
    }

    /// Data-stage direction the host declared in the CBW.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Capacity of the staging buffer.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Stage `src` for transmission to the host, replacing anything staged
    /// earlier in this command. Returns the number of bytes staged (clamped
    /// to the buffer capacity).
    pub fn stage(&mut self, src: &[u8]) -> usize {
        let len = src.len().min(self.data.len());
        self.data[..len].copy_from_slice(&src[..len]);
        *self.data_len = len;
        len
    }

    /// Claim `len` bytes of the staging buffer to fill in place, for block
    /// reads that want to avoid an intermediate copy. Panics if `len`
    /// exceeds [`Self::capacity`], which a command-set handler must bound
    /// against its block size up front.
    pub fn stage_buffer(&mut self, len: usize) -> &mut [u8] {
        *self.data_len = len;
        &mut self.data[..len]
    }

    /// Bytes of host data received into the staging buffer for this call.
    pub fn received(&self) -> &[u8] {
        &self.data[..*self.data_len]
    }

    /// Queue sense data for a later REQUEST SENSE.
    pub fn sense(&mut self, key: SenseKey, code: AdditionalSenseCode) {
        self.sense.push(SenseData::new(key, code));
    }

    /// Take the oldest pending sense entry, for REQUEST SENSE handlers.
    pub fn pop_sense(&mut self) -> Option<SenseData> {
        self.sense.pop()
    }

    /// More device-to-host chunks follow the one staged in this call.
    pub fn more_data_in(&mut self) {
        *self.next = Continuation::MoreDataIn;
    }

    /// The chunk staged in this call ends the device-to-host data stage.
    pub fn last_data_in(&mut self) {
        *self.next = Continuation::LastDataIn;
    }

    /// Arm the OUT endpoint for `len` bytes of host data.
    pub fn expect_data_out(&mut self, len: usize) {
        *self.data_len = len.min(self.data.len());
        *self.next = Continuation::DataOut;
    }

    /// Mark the command as moving no data, so a failure is answered with a
    /// CSW instead of a stalled data stage.
    pub fn no_data_phase(&mut self) {
        *self.next = Continuation::NoData;
    }
}

/// A command set (SCSI transparent, UFI, ...) plugged into the transport.
///
/// `start` is invoked once per accepted CBW. For multi-chunk data stages the
/// handler requests continuations through [`Transfer`] and is re-invoked
/// with the same `(lun, cb)` on every bulk endpoint completion: `data_in`
/// must stage the next chunk, `data_out` consumes the chunk just received.
pub trait CommandSetHandler {
    /// Highest LUN the command set serves; reported via GET_MAX_LUN and
    /// used to bound-check incoming CBWs.
    fn max_lun(&self) -> u8;

    /// The USB configuration (re)activated the interface.
    fn activate(&mut self) {}

    fn start(&mut self, lun: u8, cb: &[u8], xfer: &mut Transfer<'_>)
        -> Result<(), CommandFailed>;

    fn data_in(&mut self, lun: u8, cb: &[u8], xfer: &mut Transfer<'_>)
        -> Result<(), CommandFailed>;

    fn data_out(&mut self, lun: u8, cb: &[u8], xfer: &mut Transfer<'_>)
        -> Result<(), CommandFailed>;
}
