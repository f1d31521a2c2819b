//! Request and response types

pub mod fees;
