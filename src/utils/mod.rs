pub mod logging;
pub mod timeout;

pub use timeout::with_timeout;
