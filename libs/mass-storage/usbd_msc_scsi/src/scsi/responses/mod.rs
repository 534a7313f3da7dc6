// Adapted from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>, Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-License-Identifier: Apache-2.0

mod inquiry;
pub use inquiry::*;

mod mode_parameter;
pub use mode_parameter::*;

mod read_capacity;
pub use read_capacity::*;

mod read_format_capacities;
pub use read_format_capacities::*;

mod request_sense;
pub use request_sense::*;
