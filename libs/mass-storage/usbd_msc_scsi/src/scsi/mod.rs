mod commands;
pub use commands::*;

mod responses;
pub use responses::*;

mod enums;
pub use enums::*;

mod error;
pub use error::*;

mod dispatcher;
pub use dispatcher::*;

mod packing;
pub use self::packing::*;
