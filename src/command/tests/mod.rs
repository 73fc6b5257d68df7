//! Test modules for the command system

pub mod runner;
