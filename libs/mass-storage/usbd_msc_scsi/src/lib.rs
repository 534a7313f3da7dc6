//! SCSI transparent command set for USB mass storage, plugged into the
//! bulk-only transport as its [`CommandSetHandler`].
//!
//! The dispatcher ([`Scsi`]) parses command blocks into typed CDB structs,
//! runs them against a [`StorageDriver`] and reports failures as sense data
//! through the transport's sense queue. Block reads and writes move one
//! block per transport chunk.
//!
//! [`CommandSetHandler`]: usbd_msc_bot::CommandSetHandler

#![no_std]

mod scsi;
pub use scsi::*;

mod storage;
pub use storage::*;

mod logging {
    pub use log::debug as trace_scsi_command;
    pub use log::debug as trace_scsi_fs;
}
