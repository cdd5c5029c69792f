//! Domain layer - Pure business logic, no I/O.

pub mod conversation;
pub mod foundation;
pub mod quote;
