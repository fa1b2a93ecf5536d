#[allow(clippy::module_inception)]
mod memory;
pub use memory::*;

mod simple_memory;
pub use simple_memory::*;
