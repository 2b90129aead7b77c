// src/services/mod.rs
pub mod bands;
pub mod batch;
pub mod calculations;
pub mod cascade;
pub mod comparison;
pub mod projection;
pub mod scenario;
pub mod schedule;
