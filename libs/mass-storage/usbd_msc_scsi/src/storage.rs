/// Errors a [`StorageDriver`] may report. The dispatcher translates these
/// into sense data; implementations never talk to the host directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The unit cannot service medium access commands right now
    NotReady,

    /// The medium gave up a block it could not read back correctly
    ReadError,

    /// Error during writing; most likely the value read back after the
    /// write was wrong
    WriteError,

    /// The underlying hardware did not behave as expected, unrecoverable
    HardwareError,
}

/// Size and granularity of a logical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    /// Number of addressable blocks; the highest valid LBA is one less
    pub block_count: u32,
    /// Bytes per block. Must not exceed the transport's staging buffer.
    pub block_size: u32,
}

/// Block-granular backing storage behind the SCSI dispatcher.
///
/// One driver may serve several logical units; every call names the unit it
/// addresses. LBA bounds are validated by the dispatcher against
/// [`capacity`](Self::capacity) before `read`/`write` are called, so
/// implementations only need to move whole blocks.
pub trait StorageDriver {
    /// Highest logical unit number served, zero for a single-unit device.
    fn max_lun(&self) -> u8 {
        0
    }

    /// Bring a unit up; called once per unit when the USB configuration
    /// activates the interface.
    fn init(&mut self, _lun: u8) {}

    fn capacity(&self, lun: u8) -> Result<Capacity, StorageError>;

    /// Whether the unit can service medium access commands right now.
    fn is_ready(&self, lun: u8) -> bool;

    fn is_write_protected(&self, _lun: u8) -> bool {
        false
    }

    /// Read the block at `lba` into `block`, which is exactly one block
    /// long.
    fn read(&self, lun: u8, lba: u32, block: &mut [u8]) -> Result<(), StorageError>;

    /// Write `block`, exactly one block long, to the block at `lba`.
    fn write(&mut self, lun: u8, lba: u32, block: &[u8]) -> Result<(), StorageError>;
}
