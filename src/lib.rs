pub mod adb;
pub mod capture;
pub mod cli;
pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod flags;
pub mod progress;
pub mod signal;

#[cfg(test)]
pub mod testing;
