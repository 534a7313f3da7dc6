mod direction;
pub use direction::*;

mod command_block_wrapper;
pub use command_block_wrapper::*;

mod command_status_wrapper;
pub use command_status_wrapper::*;

mod session;
pub use session::*;
