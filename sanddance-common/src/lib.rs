#[macro_use]
extern crate lazy_static;

pub mod error;
pub mod escape;
