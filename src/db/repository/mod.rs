//! Repository layer for database operations.

pub mod application;
pub mod clone;
pub mod funds;
pub mod pages;
pub mod rounds;
