//! Test modules for the scanner system
