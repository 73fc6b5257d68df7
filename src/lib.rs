pub mod app;
pub mod command;
pub mod core;
pub mod repository;
pub mod scanner;

#[cfg(test)]
mod test_utils;
