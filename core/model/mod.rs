mod config;
mod config_values;
mod item;
mod item_kind;
mod label;
mod output_file;
mod pool;
mod rust_values;
mod target;
mod toolchain;

pub use config::*;
pub use config_values::*;
pub use item::*;
pub use item_kind::*;
pub use label::*;
pub use output_file::*;
pub use pool::*;
pub use rust_values::*;
pub use target::*;
pub use toolchain::*;
