//! Command implementations.

mod dev;
mod prebundle;

pub use dev::execute as dev_execute;
pub use prebundle::execute as prebundle_execute;
