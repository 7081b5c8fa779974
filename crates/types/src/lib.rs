pub mod cost;
pub mod entry;
pub mod notification;
pub mod receipt;
pub mod word;
pub mod zone;


pub use cost::*;
pub use entry::*;
pub use notification::*;
pub use receipt::*;
pub use word::*;
pub use zone::*;
