//! End-to-end command scenarios: a real `BotSession` driving the `Scsi`
//! dispatcher over a mock endpoint driver, backed by a RAM disk.

use usbd_msc_bot::{
    BotSession, BotState, BulkEndpoint, EndpointDriver, EndpointError, CBW_SIGNATURE,
    CSW_SIGNATURE,
};
use usbd_msc_scsi::{Capacity, Scsi, StorageDriver, StorageError};

const BLOCK_SIZE: usize = 512;
const BLOCK_COUNT: u32 = 8;

struct RamDisk {
    blocks: Vec<u8>,
    ready: bool,
    write_protected: bool,
    initialized: Vec<u8>,
}

impl RamDisk {
    fn new() -> Self {
        Self {
            blocks: vec![0; BLOCK_SIZE * BLOCK_COUNT as usize],
            ready: true,
            write_protected: false,
            initialized: Vec::new(),
        }
    }

    fn block(&self, lba: u32) -> &[u8] {
        let start = lba as usize * BLOCK_SIZE;
        &self.blocks[start..start + BLOCK_SIZE]
    }

    fn block_mut(&mut self, lba: u32) -> &mut [u8] {
        let start = lba as usize * BLOCK_SIZE;
        &mut self.blocks[start..start + BLOCK_SIZE]
    }
}

impl StorageDriver for RamDisk {
    fn init(&mut self, lun: u8) {
        self.initialized.push(lun);
    }

    fn capacity(&self, _lun: u8) -> Result<Capacity, StorageError> {
        Ok(Capacity {
            block_count: BLOCK_COUNT,
            block_size: BLOCK_SIZE as u32,
        })
    }

    fn is_ready(&self, _lun: u8) -> bool {
        self.ready
    }

    fn is_write_protected(&self, _lun: u8) -> bool {
        self.write_protected
    }

    fn read(&self, _lun: u8, lba: u32, block: &mut [u8]) -> Result<(), StorageError> {
        block.copy_from_slice(self.block(lba));
        Ok(())
    }

    fn write(&mut self, _lun: u8, lba: u32, block: &[u8]) -> Result<(), StorageError> {
        self.block_mut(lba).copy_from_slice(block);
        Ok(())
    }
}

#[derive(Default)]
struct MockEp {
    transmitted: Vec<Vec<u8>>,
    stalled: Vec<BulkEndpoint>,
    prepared: Vec<usize>,
}

impl EndpointDriver for MockEp {
    fn open(&mut self, _ep: BulkEndpoint) -> Result<(), EndpointError> {
        Ok(())
    }
    fn close(&mut self, _ep: BulkEndpoint) -> Result<(), EndpointError> {
        Ok(())
    }
    fn flush(&mut self, _ep: BulkEndpoint) -> Result<(), EndpointError> {
        Ok(())
    }
    fn stall(&mut self, ep: BulkEndpoint) -> Result<(), EndpointError> {
        self.stalled.push(ep);
        Ok(())
    }
    fn transmit(&mut self, ep: BulkEndpoint, data: &[u8]) -> Result<(), EndpointError> {
        assert_eq!(ep, BulkEndpoint::In);
        self.transmitted.push(data.to_vec());
        Ok(())
    }
    fn prepare_receive(&mut self, ep: BulkEndpoint, len: usize) -> Result<(), EndpointError> {
        assert_eq!(ep, BulkEndpoint::Out);
        self.prepared.push(len);
        Ok(())
    }
}

struct Rig {
    session: BotSession,
    ep: MockEp,
    scsi: Scsi<RamDisk>,
    tag: u32,
}

impl Rig {
    fn new() -> Self {
        Self::with_disk(RamDisk::new())
    }

    fn with_disk(disk: RamDisk) -> Self {
        let mut session = BotSession::new();
        let mut ep = MockEp::default();
        let mut scsi = Scsi::new(disk, "VENDOR", "PRODUCT", "1.0");
        session.activate(&mut ep, &mut scsi).unwrap();
        Rig {
            session,
            ep,
            scsi,
            tag: 0,
        }
    }

    fn send_cbw(&mut self, data_transfer_length: u32, flags: u8, cb: &[u8]) {
        self.tag += 1;
        let mut raw = vec![0u8; 31];
        raw[0..4].copy_from_slice(&CBW_SIGNATURE.to_le_bytes());
        raw[4..8].copy_from_slice(&self.tag.to_le_bytes());
        raw[8..12].copy_from_slice(&data_transfer_length.to_le_bytes());
        raw[12] = flags;
        raw[14] = cb.len() as u8;
        raw[15..15 + cb.len()].copy_from_slice(cb);
        self.session
            .on_bulk_out_complete(&mut self.ep, &mut self.scsi, &raw)
            .unwrap();
    }

    fn in_complete(&mut self) {
        self.session
            .on_bulk_in_complete(&mut self.ep, &mut self.scsi)
            .unwrap();
    }

    fn send_data(&mut self, data: &[u8]) {
        self.session
            .on_bulk_out_complete(&mut self.ep, &mut self.scsi, data)
            .unwrap();
    }

    /// Collect every IN transfer since the last call; the final one must be
    /// a CSW, which is parsed into (tag, residue, status).
    fn drain(&mut self) -> (Vec<Vec<u8>>, (u32, u32, u8)) {
        let mut frames = std::mem::take(&mut self.ep.transmitted);
        let csw = frames.pop().expect("no CSW transmitted");
        assert_eq!(csw.len(), 13);
        assert_eq!(&csw[0..4], &CSW_SIGNATURE.to_le_bytes());
        let tag = u32::from_le_bytes(csw[4..8].try_into().unwrap());
        let residue = u32::from_le_bytes(csw[8..12].try_into().unwrap());
        (frames, (tag, residue, csw[12]))
    }

    /// Run READ(10) for `blocks` starting at `lba`, driving completions,
    /// and return the data plus the CSW status fields.
    fn read10(&mut self, lba: u32, blocks: u16) -> (Vec<u8>, (u32, u32, u8)) {
        let mut cb = [0u8; 10];
        cb[0] = 0x28;
        cb[2..6].copy_from_slice(&lba.to_be_bytes());
        cb[7..9].copy_from_slice(&blocks.to_be_bytes());
        self.send_cbw(blocks as u32 * BLOCK_SIZE as u32, 0x80, &cb);
        while self.session.state() != BotState::Idle {
            self.in_complete();
        }
        let (frames, csw) = self.drain();
        (frames.concat(), csw)
    }

    fn request_sense(&mut self) -> Vec<u8> {
        self.send_cbw(18, 0x80, &[0x03, 0, 0, 0, 18, 0]);
        self.in_complete();
        let (mut frames, (_, _, status)) = self.drain();
        assert_eq!(status, 0);
        frames.remove(0)
    }
}

#[test]
fn test_inquiry_reports_identification() {
    let mut rig = Rig::new();

    rig.send_cbw(36, 0x80, &[0x12, 0, 0, 0, 36, 0]);
    rig.in_complete();
    let (frames, (tag, residue, status)) = rig.drain();

    assert_eq!((tag, residue, status), (1, 0, 0));
    let data = &frames[0];
    assert_eq!(data.len(), 36);
    assert_eq!(data[0], 0x00); // direct access device
    assert_eq!(data[1], 0x80); // removable
    assert_eq!(data[4], 31);
    assert_eq!(&data[8..16], b"VENDOR  ");
    assert_eq!(&data[16..32], b"PRODUCT         ");
    assert_eq!(&data[32..36], b"1.0 ");
}

#[test]
fn test_inquiry_allocation_length_clamps_response() {
    let mut rig = Rig::new();

    rig.send_cbw(5, 0x80, &[0x12, 0, 0, 0, 5, 0]);
    rig.in_complete();
    let (frames, (_, residue, status)) = rig.drain();
    assert_eq!(frames[0].len(), 5);
    assert_eq!((residue, status), (0, 0));
}

#[test]
fn test_read_capacity() {
    let mut rig = Rig::new();

    rig.send_cbw(8, 0x80, &[0x25, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    rig.in_complete();
    let (frames, (_, residue, status)) = rig.drain();

    assert_eq!((residue, status), (0, 0));
    assert_eq!(frames[0], vec![0, 0, 0, 7, 0, 0, 2, 0]);
}

#[test]
fn test_read_multiple_blocks() {
    let mut disk = RamDisk::new();
    for lba in 0..BLOCK_COUNT {
        disk.block_mut(lba).fill(lba as u8 + 1);
    }
    let mut rig = Rig::with_disk(disk);

    let (data, (_, residue, status)) = rig.read10(2, 3);
    assert_eq!((residue, status), (0, 0));
    assert_eq!(data.len(), 3 * BLOCK_SIZE);
    assert!(data[..BLOCK_SIZE].iter().all(|&b| b == 3));
    assert!(data[BLOCK_SIZE..2 * BLOCK_SIZE].iter().all(|&b| b == 4));
    assert!(data[2 * BLOCK_SIZE..].iter().all(|&b| b == 5));
}

#[test]
fn test_write_then_read_back() {
    let mut rig = Rig::new();

    let mut cb = [0u8; 10];
    cb[0] = 0x2A;
    cb[2..6].copy_from_slice(&1u32.to_be_bytes());
    cb[7..9].copy_from_slice(&2u16.to_be_bytes());
    rig.send_cbw(2 * BLOCK_SIZE as u32, 0x00, &cb);
    assert_eq!(rig.session.state(), BotState::DataOut);

    rig.send_data(&vec![0x11; BLOCK_SIZE]);
    rig.send_data(&vec![0x22; BLOCK_SIZE]);
    let (frames, (_, residue, status)) = rig.drain();
    assert!(frames.is_empty());
    assert_eq!((residue, status), (0, 0));

    let (data, _) = rig.read10(1, 2);
    assert!(data[..BLOCK_SIZE].iter().all(|&b| b == 0x11));
    assert!(data[BLOCK_SIZE..].iter().all(|&b| b == 0x22));
}

#[test]
fn test_read_out_of_range_fails_with_sense() {
    let mut rig = Rig::new();

    let mut cb = [0u8; 10];
    cb[0] = 0x28;
    cb[2..6].copy_from_slice(&7u32.to_be_bytes());
    cb[7..9].copy_from_slice(&2u16.to_be_bytes());
    rig.send_cbw(2 * BLOCK_SIZE as u32, 0x80, &cb);

    // Data-in abort: IN stalled, CSW FAILED once the host clears it
    assert_eq!(rig.ep.stalled, vec![BulkEndpoint::In]);
    rig.session
        .on_clear_feature(&mut rig.ep, BulkEndpoint::In)
        .unwrap();
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 1);

    let sense = rig.request_sense();
    assert_eq!(sense[2], 0x05); // ILLEGAL REQUEST
    assert_eq!(sense[12], 0x21); // LBA OUT OF RANGE
}

#[test]
fn test_write_protected_unit_rejects_write() {
    let mut disk = RamDisk::new();
    disk.write_protected = true;
    let mut rig = Rig::with_disk(disk);

    let mut cb = [0u8; 10];
    cb[0] = 0x2A;
    cb[7..9].copy_from_slice(&1u16.to_be_bytes());
    rig.send_cbw(BLOCK_SIZE as u32, 0x00, &cb);

    // Host-to-device abort stalls both endpoints
    assert_eq!(rig.ep.stalled, vec![BulkEndpoint::Out, BulkEndpoint::In]);
    rig.session
        .on_clear_feature(&mut rig.ep, BulkEndpoint::In)
        .unwrap();
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 1);

    let sense = rig.request_sense();
    assert_eq!(sense[2], 0x07); // DATA PROTECT
    assert_eq!(sense[12], 0x27); // WRITE PROTECTED
}

#[test]
fn test_test_unit_ready_not_ready_fails_to_csw() {
    let mut disk = RamDisk::new();
    disk.ready = false;
    let mut rig = Rig::with_disk(disk);

    rig.send_cbw(0, 0x00, &[0x00, 0, 0, 0, 0, 0]);
    // No data stage was declared, so the failure answers with a CSW
    // directly instead of stalling
    assert!(rig.ep.stalled.is_empty());
    let (frames, (_, _, status)) = rig.drain();
    assert!(frames.is_empty());
    assert_eq!(status, 1);

    let sense = rig.request_sense();
    assert_eq!(sense[2], 0x02); // NOT READY
    assert_eq!(sense[12], 0x3A); // MEDIUM NOT PRESENT
}

#[test]
fn test_test_unit_ready_passes_when_ready() {
    let mut rig = Rig::new();

    rig.send_cbw(0, 0x00, &[0x00, 0, 0, 0, 0, 0]);
    let (frames, (tag, residue, status)) = rig.drain();
    assert!(frames.is_empty());
    assert_eq!((tag, residue, status), (1, 0, 0));
}

#[test]
fn test_unknown_op_code_fails_with_invalid_command_sense() {
    let mut rig = Rig::new();

    rig.send_cbw(0, 0x00, &[0xC1, 0, 0, 0, 0, 0]);
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 1);

    let sense = rig.request_sense();
    assert_eq!(sense[2], 0x05); // ILLEGAL REQUEST
    assert_eq!(sense[12], 0x20); // INVALID COMMAND OPERATION CODE
}

#[test]
fn test_request_sense_drains_to_no_sense() {
    let mut rig = Rig::new();

    rig.send_cbw(0, 0x00, &[0xC1, 0, 0, 0, 0, 0]);
    let _ = rig.drain();

    let sense = rig.request_sense();
    assert_eq!(sense[2], 0x05);

    // The queued condition was consumed; a second request reports NO SENSE
    let sense = rig.request_sense();
    assert_eq!(sense[2], 0x00);
    assert_eq!(sense[12], 0x00);
}

#[test]
fn test_mode_sense6_reports_write_protect() {
    let mut disk = RamDisk::new();
    disk.write_protected = true;
    let mut rig = Rig::with_disk(disk);

    rig.send_cbw(4, 0x80, &[0x1A, 0, 0x3F, 0, 4, 0]);
    rig.in_complete();
    let (frames, (_, _, status)) = rig.drain();
    assert_eq!(status, 0);
    assert_eq!(frames[0], vec![3, 0, 0x80, 0]);
}

#[test]
fn test_mode_sense10_header() {
    let mut rig = Rig::new();

    let mut cb = [0u8; 10];
    cb[0] = 0x5A;
    cb[2] = 0x3F;
    cb[8] = 8;
    rig.send_cbw(8, 0x80, &cb);
    rig.in_complete();
    let (frames, (_, _, status)) = rig.drain();
    assert_eq!(status, 0);
    assert_eq!(frames[0], vec![0, 6, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_read_format_capacities() {
    let mut rig = Rig::new();

    let mut cb = [0u8; 10];
    cb[0] = 0x23;
    cb[8] = 12;
    rig.send_cbw(12, 0x80, &cb);
    rig.in_complete();
    let (frames, (_, residue, status)) = rig.drain();
    assert_eq!((residue, status), (0, 0));

    let data = &frames[0];
    assert_eq!(data[3], 8); // one descriptor
    assert_eq!(&data[4..8], &BLOCK_COUNT.to_be_bytes());
    assert_eq!(data[8], 2); // formatted media
    assert_eq!(&data[9..12], &[0, 2, 0]); // 512 in three bytes
}

#[test]
fn test_no_op_housekeeping_commands_pass() {
    let mut rig = Rig::new();

    // PREVENT ALLOW MEDIUM REMOVAL
    rig.send_cbw(0, 0x00, &[0x1E, 0, 0, 0, 1, 0]);
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 0);

    // START STOP UNIT
    rig.send_cbw(0, 0x00, &[0x1B, 0, 0, 0, 1, 0]);
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 0);

    // SYNCHRONIZE CACHE (10)
    rig.send_cbw(0, 0x00, &[0x35, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 0);
}

#[test]
fn test_verify_checks_range() {
    let mut rig = Rig::new();

    let mut cb = [0u8; 10];
    cb[0] = 0x2F;
    cb[7..9].copy_from_slice(&4u16.to_be_bytes());
    rig.send_cbw(0, 0x00, &cb);
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 0);

    // Past the end of the unit
    cb[2..6].copy_from_slice(&6u32.to_be_bytes());
    rig.send_cbw(0, 0x00, &cb);
    let (_, (_, _, status)) = rig.drain();
    assert_eq!(status, 1);

    let sense = rig.request_sense();
    assert_eq!(sense[12], 0x21);
}

#[test]
fn test_activate_initializes_every_lun() {
    let mut rig = Rig::new();
    assert_eq!(rig.scsi.storage_mut().initialized, vec![0]);
}
