//! Tool server over stdio.
//!
//! Speaks JSON-RPC 2.0, one message per line, in the shape used by Model
//! Context Protocol clients (`initialize`, `tools/list`, `tools/call`).
//! Every tool takes an explicit `project_dir`; the server's own working
//! directory is never consulted.
//!
//! ```bash
//! covrank serve
//! ```
//!
//! Tools:
//! - `rank_files` - files ranked by testing priority
//! - `project_summary` - overall coverage for a project
//! - `file_details` - one file's score and rank
//! - `estimate_impact` - overall coverage if some files were fully covered

mod handlers;
mod rpc;
mod tools;

pub use rpc::{run_server, ToolServer};
