//! Time handling for the controller and ticker.

pub mod source;
