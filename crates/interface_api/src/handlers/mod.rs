//! Request handlers

pub mod fees;
pub mod health;
