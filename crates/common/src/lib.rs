// roomwatch-common: shared types and utilities for the roomwatch workspace

pub mod alert;
pub mod clock;
pub mod entity;
pub mod presence;
