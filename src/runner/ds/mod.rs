pub mod bindings;
pub mod error;
pub mod function;
pub mod heap;
pub mod object;
pub mod scope;
pub mod value;
