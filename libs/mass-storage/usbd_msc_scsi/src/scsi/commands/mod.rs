// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

mod command;
pub use command::*;

mod control;
pub use control::*;

mod inquiry;
pub use inquiry::*;

mod mode_sense;
pub use mode_sense::*;

mod prevent_allow_medium_removal;
pub use prevent_allow_medium_removal::*;

mod read;
pub use read::*;

mod read_capacity;
pub use read_capacity::*;

mod read_format_capacities;
pub use read_format_capacities::*;

mod request_sense;
pub use request_sense::*;

mod start_stop_unit;
pub use start_stop_unit::*;

mod synchronize_cache;
pub use synchronize_cache::*;

mod test_unit_ready;
pub use test_unit_ready::*;

mod verify;
pub use verify::*;

mod write;
pub use write::*;
