// Utility functions

pub mod listener;
pub mod logger;

pub use listener::*;
pub use logger::*;
