//! User interface components.

mod console;

pub use console::*;
