//! Standard library built-ins.
//!
//! Members of list and string values, the `console` object and the timing
//! functions installed into every script.

pub mod array;
pub mod console;
pub mod string;
pub mod timing;
