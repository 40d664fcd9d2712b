pub mod lcov;

pub use lcov::{parse, parse_reader};
