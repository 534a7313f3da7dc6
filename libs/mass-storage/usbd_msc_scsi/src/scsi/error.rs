// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Error as PackingError;

use crate::storage::StorageError;

/// Command-level failures. Every variant maps onto a sense key/code pair in
/// one place, the dispatcher's `map_error_to_sense`.
#[derive(Debug)]
pub enum Error {
    /// The op code is not one this command set implements
    UnhandledOpCode,
    /// The identified op code requires a longer command block than was sent
    InsufficientCommandBytes,
    /// The CBW's data stage contradicts what the command requires
    PhaseError,
    /// A CDB field holds a value this implementation rejects
    InvalidField,
    /// LBA range falls outside the unit's capacity
    AddressOutOfRange,
    /// The unit cannot service medium access commands right now
    NotReady,
    /// Write or verify-with-write to a protected unit
    WriteProtected,
    Packing(PackingError),
    Storage(StorageError),
}

impl From<PackingError> for Error {
    fn from(e: PackingError) -> Error {
        Error::Packing(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Error {
        Error::Storage(e)
    }
}
