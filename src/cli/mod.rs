pub mod dump;
pub mod info;
pub mod read;
pub mod write;

pub use dump::*;
pub use info::*;
pub use read::*;
pub use write::*;
