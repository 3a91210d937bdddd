//! Live progress while a panel runs

pub mod reporter;
