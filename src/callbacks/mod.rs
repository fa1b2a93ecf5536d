mod handler;
pub use handler::*;

mod manager;
pub use manager::*;

mod log_handler;
pub use log_handler::*;
