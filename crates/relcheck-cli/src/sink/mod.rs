//! Report sinks: render a collated [`relcheck_core::SummaryReport`].

pub mod json;
pub mod xlsx;
