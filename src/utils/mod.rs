pub mod config;
pub mod errors;
pub mod logging;
pub mod paths;

#[cfg(test)]
pub mod test_utils;
