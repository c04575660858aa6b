//! Request-layer adapters: CSV input and reports, and random request failure.

pub mod csv;
pub mod fault;
