pub mod data;
pub mod io;


pub use data::{BindingEntry, Config, MappingEntry};
pub use io::ConfigError;
