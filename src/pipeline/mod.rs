// src/pipeline/mod.rs

pub mod cleaners;
pub mod filters;
pub mod preparation;
pub mod readers;
pub mod token;
pub mod writers;
