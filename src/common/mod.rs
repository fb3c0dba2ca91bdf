// Shared utilities used by every layer of the daemon.
// Logger must be first for macro availability
#[macro_use]
pub mod logger;

pub mod constants;
pub mod utils;
