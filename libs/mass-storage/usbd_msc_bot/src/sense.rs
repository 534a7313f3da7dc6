// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

use packing::Packed;

/// Entries the ring keeps before overwriting the oldest.
pub const SENSE_LIST_DEPTH: usize = 4;

/// SCSI sense keys, SPC-3 subset used by this transport and the command
/// sets built on it.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Packed)]
pub enum SenseKey {
    /// Nothing to report; also what an empty sense list answers
    NoSense = 0x0,
    /// The logical unit is not accessible
    NotReady = 0x2,
    /// Non-recovered error caused by the medium or recorded data
    MediumError = 0x3,
    /// Non-recoverable hardware failure
    HardwareError = 0x4,
    /// Illegal parameter in the CDB, bad LUN, or an unsupported command
    IllegalRequest = 0x5,
    /// Unit attention condition (medium change, reset)
    UnitAttention = 0x6,
    /// Read or write attempted on a protected block
    DataProtect = 0x7,
    /// The device server aborted the command
    AbortedCommand = 0xB,
}

impl Default for SenseKey {
    fn default() -> Self { SenseKey::NoSense }
}

/// Additional sense code + qualifier pairs used here. Many more exist in
/// SPC-3 but hosts mostly surface these for debugging.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum AdditionalSenseCode {
    /// ASC 0x00, ASCQ 0x00
    NoAdditionalSenseInformation,
    /// ASC 0x11, ASCQ 0x00
    UnrecoveredReadError,
    /// ASC 0x20, ASCQ 0x00
    InvalidCommandOperationCode,
    /// ASC 0x21, ASCQ 0x00
    LogicalBlockAddressOutOfRange,
    /// ASC 0x24, ASCQ 0x00
    InvalidFieldInCdb,
    /// ASC 0x27, ASCQ 0x00
    WriteProtected,
    /// ASC 0x3A, ASCQ 0x00
    MediumNotPresent,
    /// ASC 0x0C, ASCQ 0x00
    WriteError,
}

impl AdditionalSenseCode {
    pub fn asc(&self) -> u8 {
        match self {
            AdditionalSenseCode::NoAdditionalSenseInformation => 0x00,
            AdditionalSenseCode::UnrecoveredReadError => 0x11,
            AdditionalSenseCode::InvalidCommandOperationCode => 0x20,
            AdditionalSenseCode::LogicalBlockAddressOutOfRange => 0x21,
            AdditionalSenseCode::InvalidFieldInCdb => 0x24,
            AdditionalSenseCode::WriteProtected => 0x27,
            AdditionalSenseCode::MediumNotPresent => 0x3A,
            AdditionalSenseCode::WriteError => 0x0C,
        }
    }

    pub fn ascq(&self) -> u8 {
        0x00
    }
}

impl Default for AdditionalSenseCode {
    fn default() -> Self { AdditionalSenseCode::NoAdditionalSenseInformation }
}

/// One queued CHECK CONDITION, reported to the host via REQUEST SENSE.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct SenseData {
    pub key: SenseKey,
    pub code: AdditionalSenseCode,
}

impl SenseData {
    pub fn new(key: SenseKey, code: AdditionalSenseCode) -> Self {
        Self { key, code }
    }
}

/// Fixed-depth FIFO of pending sense data.
///
/// Pushing onto a full ring drops the oldest entry; the transport prefers
/// reporting the newest failure over remembering every intermediate one.
#[derive(Clone, Copy, Debug)]
pub struct SenseFifo {
    entries: [SenseData; SENSE_LIST_DEPTH],
    head: usize,
    len: usize,
}

impl SenseFifo {
    pub const fn new() -> Self {
        Self {
            entries: [SenseData {
                key: SenseKey::NoSense,
                code: AdditionalSenseCode::NoAdditionalSenseInformation,
            }; SENSE_LIST_DEPTH],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, sense: SenseData) {
        let tail = (self.head + self.len) % SENSE_LIST_DEPTH;
        self.entries[tail] = sense;
        if self.len == SENSE_LIST_DEPTH {
            // Full: the slot we just wrote was the oldest entry
            self.head = (self.head + 1) % SENSE_LIST_DEPTH;
        } else {
            self.len += 1;
        }
    }

    pub fn pop(&mut self) -> Option<SenseData> {
        if self.len == 0 {
            return None;
        }
        let sense = self.entries[self.head];
        self.head = (self.head + 1) % SENSE_LIST_DEPTH;
        self.len -= 1;
        Some(sense)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl Default for SenseFifo {
    fn default() -> Self { Self::new() }
}

#[test]
fn test_sense_fifo_order() {
    let mut fifo = SenseFifo::new();
    assert_eq!(fifo.pop(), None);

    fifo.push(SenseData::new(SenseKey::NotReady, AdditionalSenseCode::MediumNotPresent));
    fifo.push(SenseData::new(SenseKey::IllegalRequest, AdditionalSenseCode::InvalidFieldInCdb));
    assert_eq!(fifo.len(), 2);

    assert_eq!(fifo.pop().unwrap().key, SenseKey::NotReady);
    assert_eq!(fifo.pop().unwrap().key, SenseKey::IllegalRequest);
    assert_eq!(fifo.pop(), None);
}

#[test]
fn test_sense_fifo_overwrites_oldest_when_full() {
    let mut fifo = SenseFifo::new();
    let codes = [
        AdditionalSenseCode::UnrecoveredReadError,
        AdditionalSenseCode::WriteError,
        AdditionalSenseCode::MediumNotPresent,
        AdditionalSenseCode::WriteProtected,
        AdditionalSenseCode::LogicalBlockAddressOutOfRange,
    ];
    for code in codes {
        fifo.push(SenseData::new(SenseKey::IllegalRequest, code));
    }
    assert_eq!(fifo.len(), SENSE_LIST_DEPTH);

    // First push was lost; the remaining four drain in order
    assert_eq!(fifo.pop().unwrap().code, AdditionalSenseCode::WriteError);
    assert_eq!(fifo.pop().unwrap().code, AdditionalSenseCode::MediumNotPresent);
    assert_eq!(fifo.pop().unwrap().code, AdditionalSenseCode::WriteProtected);
    assert_eq!(fifo.pop().unwrap().code, AdditionalSenseCode::LogicalBlockAddressOutOfRange);
    assert!(fifo.is_empty());
}
