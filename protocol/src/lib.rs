#![recursion_limit = "300"]
#[macro_use]
pub mod macros;

pub mod format;
pub mod item;
pub mod nbt;
pub mod protocol;
pub mod types;

use galena_shared as shared;
