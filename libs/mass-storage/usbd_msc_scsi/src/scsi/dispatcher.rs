// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use log::info;
use packing::{Packed, PackedSize};

use usbd_msc_bot::{
    AdditionalSenseCode, CommandFailed, CommandSetHandler, Direction, SenseKey, Transfer,
};

use crate::{
    logging::*,
    scsi::{
        commands::*,
        responses::*,
        Error,
    },
    storage::{Capacity, StorageDriver, StorageError},
};

/// SCSI transparent command set dispatcher.
///
/// Implements [`CommandSetHandler`] over a [`StorageDriver`]. Medium access
/// commands move one block per transport chunk: READ stages a block on every
/// `data_in` continuation, WRITE consumes one on every `data_out`. The
/// cursor for the active command lives here (`lba`..`lba_end`); everything
/// else is stateless per call.
pub struct Scsi<S: StorageDriver> {
    storage: S,
    inquiry_response: InquiryResponse,

    /// Next block of the active READ/WRITE, inclusive end
    lba: u32,
    lba_end: u32,
    block_size: u32,
}

impl<S: StorageDriver> Scsi<S> {
    /// Creates the dispatcher for `storage`.
    ///
    /// `vendor_identification` (up to 8 ASCII bytes),
    /// `product_identification` (up to 16) and `product_revision_level`
    /// (up to 4) fill the INQUIRY response; longer values panic.
    pub fn new<V: AsRef<[u8]>, P: AsRef<[u8]>, R: AsRef<[u8]>>(
        storage: S,
        vendor_identification: V,
        product_identification: P,
        product_revision_level: R,
    ) -> Self {
        let mut inquiry_response = InquiryResponse::default();
        inquiry_response.set_vendor_identification(vendor_identification);
        inquiry_response.set_product_identification(product_identification);
        inquiry_response.set_product_revision_level(product_revision_level);

        Self {
            storage,
            inquiry_response,
            lba: 0,
            lba_end: 0,
            block_size: 0,
        }
    }

    /// Grants access to the storage driver for housekeeping etc.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn handle_start(
        &mut self,
        lun: u8,
        cb: &[u8],
        xfer: &mut Transfer<'_>,
    ) -> Result<(), Error> {
        let command = Command::extract(cb)?;
        trace_scsi_command!("COMMAND> lun {} {:?}", lun, command);

        match command {
            Command::Inquiry(inq) => self.inquiry(inq, xfer),

            Command::TestUnitReady(_) => {
                xfer.no_data_phase();
                if xfer.data_transfer_length() != 0 {
                    return Err(Error::PhaseError);
                }
                if !self.storage.is_ready(lun) {
                    return Err(Error::NotReady);
                }
                Ok(())
            }

            Command::RequestSense(rs) => {
                let resp = RequestSenseResponse::from_sense(xfer.pop_sense());
                let mut raw = [0u8; RequestSenseResponse::BYTES];
                resp.pack(&mut raw)?;
                let len = (rs.allocation_length as usize).min(raw.len());
                xfer.stage(&raw[..len]);
                Ok(())
            }

            Command::ReadCapacity(_) => {
                let cap = self.storage.capacity(lun)?;
                let resp = ReadCapacity10Response {
                    max_lba: cap.block_count.saturating_sub(1),
                    block_size: cap.block_size,
                };
                let mut raw = [0u8; ReadCapacity10Response::BYTES];
                resp.pack(&mut raw)?;
                xfer.stage(&raw);
                Ok(())
            }

            Command::ReadFormatCapacities(rfc) => {
                let cap = self.storage.capacity(lun)?;
                let resp = ReadFormatCapacitiesResponse {
                    capacity_list_length: 8,
                    number_of_blocks: cap.block_count,
                    // 2, formatted media
                    descriptor_code: 2,
                    block_length: cap.block_size,
                };
                let mut raw = [0u8; ReadFormatCapacitiesResponse::BYTES];
                resp.pack(&mut raw)?;
                let len = (rfc.allocation_length as usize).min(raw.len());
                xfer.stage(&raw[..len]);
                Ok(())
            }

            Command::ModeSense(m) => self.mode_sense(lun, m, xfer),

            // Accepted as no-ops on fixed flash media
            Command::PreventAllowMediumRemoval(_)
            | Command::StartStopUnit(_)
            | Command::SynchronizeCache(_) => {
                xfer.no_data_phase();
                Ok(())
            }

            Command::Verify(v) => {
                xfer.no_data_phase();
                if v.byte_check != 0 {
                    return Err(Error::InvalidField);
                }
                if !self.storage.is_ready(lun) {
                    return Err(Error::NotReady);
                }
                self.check_range(lun, v.lba, v.verification_length as u32)?;
                Ok(())
            }

            Command::Read(r) => self.start_read(lun, r, xfer),
            Command::Write(w) => self.start_write(lun, w, xfer),
        }
    }

    fn inquiry(&mut self, inq: InquiryCommand, xfer: &mut Transfer<'_>) -> Result<(), Error> {
        if inq.enable_vital_product_data {
            if inq.page_code != 0x00 {
                return Err(Error::InvalidField);
            }
            // Supported VPD pages: only page 0x00 itself
            let page = [0x00, 0x00, 0x00, 0x01, 0x00];
            let len = (inq.allocation_length as usize).min(page.len());
            xfer.stage(&page[..len]);
            return Ok(());
        }

        if inq.page_code != 0 {
            return Err(Error::InvalidField);
        }
        let mut raw = [0u8; InquiryResponse::BYTES];
        self.inquiry_response.pack(&mut raw)?;
        let len = (inq.allocation_length as usize).min(raw.len());
        xfer.stage(&raw[..len]);
        Ok(())
    }

    fn mode_sense(
        &mut self,
        lun: u8,
        m: ModeSenseXCommand,
        xfer: &mut Transfer<'_>,
    ) -> Result<(), Error> {
        let write_protect = self.storage.is_write_protected(lun);
        match m.command_length {
            CommandLength::C6 => {
                let mut header = ModeParameterHeader6::default();
                header.device_specific_parameter.write_protect = write_protect;
                let mut raw = [0u8; ModeParameterHeader6::BYTES];
                header.pack(&mut raw)?;
                xfer.stage(&raw);
            }
            CommandLength::C10 => {
                let mut header = ModeParameterHeader10::default();
                header.device_specific_parameter.write_protect = write_protect;
                let mut raw = [0u8; ModeParameterHeader10::BYTES];
                header.pack(&mut raw)?;
                xfer.stage(&raw);
            }
        }
        Ok(())
    }

    fn start_read(
        &mut self,
        lun: u8,
        r: Read10Command,
        xfer: &mut Transfer<'_>,
    ) -> Result<(), Error> {
        if r.transfer_length == 0 {
            xfer.no_data_phase();
            return Ok(());
        }
        if xfer.direction() != Direction::DeviceToHost {
            return Err(Error::PhaseError);
        }
        if !self.storage.is_ready(lun) {
            return Err(Error::NotReady);
        }
        let cap = self.check_range(lun, r.lba, r.transfer_length as u32)?;
        self.set_cursor(cap, r.lba, r.transfer_length, xfer)?;
        self.stage_block(lun, xfer)
    }

    fn start_write(
        &mut self,
        lun: u8,
        w: Write10Command,
        xfer: &mut Transfer<'_>,
    ) -> Result<(), Error> {
        if w.transfer_length == 0 {
            xfer.no_data_phase();
            return Ok(());
        }
        if xfer.direction() != Direction::HostToDevice {
            return Err(Error::PhaseError);
        }
        if !self.storage.is_ready(lun) {
            return Err(Error::NotReady);
        }
        if self.storage.is_write_protected(lun) {
            return Err(Error::WriteProtected);
        }
        let cap = self.check_range(lun, w.lba, w.transfer_length as u32)?;
        self.set_cursor(cap, w.lba, w.transfer_length, xfer)?;
        xfer.expect_data_out(self.block_size as usize);
        Ok(())
    }

    fn set_cursor(
        &mut self,
        cap: Capacity,
        lba: u32,
        transfer_length: u16,
        xfer: &Transfer<'_>,
    ) -> Result<(), Error> {
        // One block must fit in the transport's staging buffer
        if cap.block_size == 0 || cap.block_size as usize > xfer.capacity() {
            return Err(Error::Storage(StorageError::HardwareError));
        }
        self.block_size = cap.block_size;
        self.lba = lba;
        self.lba_end = lba + transfer_length as u32 - 1;
        Ok(())
    }

    /// Stage the block at the cursor and pick the continuation.
    fn stage_block(&mut self, lun: u8, xfer: &mut Transfer<'_>) -> Result<(), Error> {
        trace_scsi_fs!("FS> read lba {:#x} end {:#x}", self.lba, self.lba_end);
        let block = xfer.stage_buffer(self.block_size as usize);
        self.storage.read(lun, self.lba, block)?;

        if self.lba == self.lba_end {
            xfer.last_data_in();
        } else {
            self.lba += 1;
            xfer.more_data_in();
        }
        Ok(())
    }

    /// Write the received chunk at the cursor and re-arm for the next one.
    fn consume_block(&mut self, lun: u8, xfer: &mut Transfer<'_>) -> Result<(), Error> {
        let block = xfer.received();
        if block.len() != self.block_size as usize {
            return Err(Error::PhaseError);
        }
        trace_scsi_fs!("FS> write lba {:#x} end {:#x}", self.lba, self.lba_end);
        self.storage.write(lun, self.lba, block)?;

        if self.lba < self.lba_end {
            self.lba += 1;
            xfer.expect_data_out(self.block_size as usize);
        }
        Ok(())
    }

    fn check_range(&self, lun: u8, lba: u32, blocks: u32) -> Result<Capacity, Error> {
        let cap = self.storage.capacity(lun)?;
        let end = lba.checked_add(blocks).ok_or(Error::AddressOutOfRange)?;
        if end > cap.block_count {
            return Err(Error::AddressOutOfRange);
        }
        Ok(cap)
    }

    /// Queue sense for `e` and hand the pass/fail outcome to the transport.
    /// A command the host declared no data stage for fails straight to its
    /// CSW instead of a stalled data stage.
    fn fail(&mut self, e: Error, xfer: &mut Transfer<'_>) -> CommandFailed {
        let (key, code) = map_error_to_sense(&e);
        info!("SENSE> {:?}: {:?}, asc {:#04x}", e, key, code.asc());
        xfer.sense(key, code);
        if xfer.data_transfer_length() == 0 {
            xfer.no_data_phase();
        }
        CommandFailed
    }
}

impl<S: StorageDriver> CommandSetHandler for Scsi<S> {
    fn max_lun(&self) -> u8 {
        self.storage.max_lun()
    }

    fn activate(&mut self) {
        for lun in 0..=self.storage.max_lun() {
            self.storage.init(lun);
        }
    }

    fn start(
        &mut self,
        lun: u8,
        cb: &[u8],
        xfer: &mut Transfer<'_>,
    ) -> Result<(), CommandFailed> {
        self.handle_start(lun, cb, xfer).map_err(|e| self.fail(e, xfer))
    }

    fn data_in(
        &mut self,
        lun: u8,
        _cb: &[u8],
        xfer: &mut Transfer<'_>,
    ) -> Result<(), CommandFailed> {
        self.stage_block(lun, xfer).map_err(|e| self.fail(e, xfer))
    }

    fn data_out(
        &mut self,
        lun: u8,
        _cb: &[u8],
        xfer: &mut Transfer<'_>,
    ) -> Result<(), CommandFailed> {
        self.consume_block(lun, xfer).map_err(|e| self.fail(e, xfer))
    }
}

fn map_error_to_sense(err: &Error) -> (SenseKey, AdditionalSenseCode) {
    match err {
        Error::UnhandledOpCode => (
            SenseKey::IllegalRequest,
            AdditionalSenseCode::InvalidCommandOperationCode,
        ),
        Error::InsufficientCommandBytes | Error::PhaseError | Error::InvalidField => (
            SenseKey::IllegalRequest,
            AdditionalSenseCode::InvalidFieldInCdb,
        ),
        Error::AddressOutOfRange => (
            SenseKey::IllegalRequest,
            AdditionalSenseCode::LogicalBlockAddressOutOfRange,
        ),
        Error::NotReady => (SenseKey::NotReady, AdditionalSenseCode::MediumNotPresent),
        Error::WriteProtected => (SenseKey::DataProtect, AdditionalSenseCode::WriteProtected),
        Error::Packing(_) => (
            SenseKey::IllegalRequest,
            AdditionalSenseCode::InvalidFieldInCdb,
        ),
        Error::Storage(e) => match e {
            StorageError::NotReady => {
                (SenseKey::NotReady, AdditionalSenseCode::MediumNotPresent)
            }
            StorageError::ReadError => {
                (SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError)
            }
            StorageError::WriteError => {
                (SenseKey::MediumError, AdditionalSenseCode::WriteError)
            }
            StorageError::HardwareError => (
                SenseKey::HardwareError,
                AdditionalSenseCode::NoAdditionalSenseInformation,
            ),
        },
    }
}
