//! Data Transfer Objects sent to the machine

pub mod job;
