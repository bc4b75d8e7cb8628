mod atomic;
mod builder;
mod interface;
mod layout;
mod lock;
mod status;

pub use atomic::*;
pub use builder::*;
pub use interface::*;
pub use lock::*;
pub use status::*;
