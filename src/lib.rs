//! Rank source files by how much testing them would pay off, using the
//! per-file summary counters of an LCOV report.
//!
//! ```
//! use covrank::{parsers::lcov, score, model::Weights};
//!
//! let tallies = lcov::parse("SF:src/a.ts\nLF:100\nLH:40\nend_of_record\n");
//! let result = score::analyze(&tallies, &Weights::default(), 0, None);
//! assert_eq!(result.files[0].path, "src/a.ts");
//! ```

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parsers;
pub mod report;
pub mod score;
pub mod server;
