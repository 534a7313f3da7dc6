//! USB Mass Storage Class Bulk-Only Transport (BOT), as a freestanding
//! protocol state machine.
//!
//! The session ([`BotSession`]) is driven entirely by callbacks from the USB
//! peripheral glue (`on_setup_request`, `on_bulk_out_complete`,
//! `on_bulk_in_complete`, `on_clear_feature`) and talks to the hardware only
//! through the [`EndpointDriver`] trait. The command set behind the transport
//! (SCSI, typically) plugs in through [`CommandSetHandler`].
//!
//! One session exists per configured MSC interface; nothing in here is
//! global, so composite devices can run several transports side by side.

#![no_std]

mod bot;
pub use bot::*;

mod endpoint;
pub use endpoint::*;

mod handler;
pub use handler::*;

mod sense;
pub use sense::*;

mod logging {
    pub use log::debug as trace_bot_headers;
    pub use log::debug as trace_bot_states;
    pub use log::debug as trace_usb_control;
    pub use log::trace as trace_bot_bytes;
}
