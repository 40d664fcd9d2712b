/// Parser for the LCOV `.info` format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Only the per-file summary records are modelled:
///   SF:<path to source file>
///   FNF:<number of functions found>
///   FNH:<number of functions hit>
///   BRF:<branches found>
///   BRH:<branches hit>
///   LF:<lines found>
///   LH:<lines hit>
///   end_of_record
///
/// Everything else (TN, FN, FNDA, DA, BRDA, ...) is skipped. The parser never
/// fails on content: bad counters become 0 and a record that is never closed
/// by `end_of_record` is dropped.
use std::io::BufRead;

use tracing::{debug, trace};

use crate::error::Result;
use crate::model::FileTally;

const SOURCE_FILE: &str = "SF:";
const END_OF_RECORD: &str = "end_of_record";

/// Which counter field a summary line feeds.
#[derive(Debug, Clone, Copy)]
enum Counter {
    LinesFound,
    LinesHit,
    FunctionsFound,
    FunctionsHit,
    BranchesFound,
    BranchesHit,
}

const COUNTERS: [(&str, Counter); 6] = [
    ("LF:", Counter::LinesFound),
    ("LH:", Counter::LinesHit),
    ("FNF:", Counter::FunctionsFound),
    ("FNH:", Counter::FunctionsHit),
    ("BRF:", Counter::BranchesFound),
    ("BRH:", Counter::BranchesHit),
];

impl Counter {
    fn slot(self, tally: &mut FileTally) -> &mut i64 {
        match self {
            Counter::LinesFound => &mut tally.lines_found,
            Counter::LinesHit => &mut tally.lines_hit,
            Counter::FunctionsFound => &mut tally.functions_found,
            Counter::FunctionsHit => &mut tally.functions_hit,
            Counter::BranchesFound => &mut tally.branches_found,
            Counter::BranchesHit => &mut tally.branches_hit,
        }
    }
}

/// Two-state record machine: `current` is `None` outside a record.
#[derive(Debug, Default)]
struct RecordState {
    current: Option<FileTally>,
}

impl RecordState {
    /// Feed one raw line; returns a tally when a record is closed.
    fn feed(&mut self, raw_line: &str) -> Option<FileTally> {
        let line = raw_line.trim();
        if line.is_empty() {
            return None;
        }

        if line == END_OF_RECORD {
            return self.current.take();
        }

        if let Some(path) = line.strip_prefix(SOURCE_FILE) {
            if let Some(dropped) = self.current.replace(FileTally::new(path.to_string())) {
                debug!(path = %dropped.path, "discarding LCOV record without end_of_record");
            }
            return None;
        }

        let file = self.current.as_mut()?;
        for (prefix, counter) in COUNTERS {
            if let Some(value) = line.strip_prefix(prefix) {
                *counter.slot(file) = parse_count(value);
                break;
            }
        }
        None
    }

    fn finish(self) {
        if let Some(dropped) = self.current {
            debug!(path = %dropped.path, "discarding unterminated LCOV record at end of input");
        }
    }
}

/// Lenient integer parse: optional sign followed by leading digits.
/// Anything after the digits is ignored; no digits at all yields 0.
/// Values too large for `i64` saturate.
#[must_use]
pub fn parse_count(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let mut total: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        total = total.saturating_mul(10).saturating_add(digit);
    }
    if negative {
        -total
    } else {
        total
    }
}

/// Parse LCOV text into one tally per complete record, in input order.
#[must_use]
pub fn parse(input: &str) -> Vec<FileTally> {
    let mut state = RecordState::default();
    let files: Vec<FileTally> = input.lines().filter_map(|line| state.feed(line)).collect();
    state.finish();
    trace!(records = files.len(), "parsed LCOV text");
    files
}

/// Streaming variant: calls `emit` once per `end_of_record`.
/// Reads line-by-line so the full input need not be in memory at once.
/// Invalid UTF-8 is replaced rather than rejected; only I/O errors and
/// errors returned by `emit` are propagated.
pub fn parse_reader(
    reader: &mut dyn BufRead,
    emit: &mut dyn FnMut(FileTally) -> Result<()>,
) -> Result<()> {
    let mut state = RecordState::default();
    let mut raw_line = Vec::new();
    loop {
        raw_line.clear();
        let n = reader.read_until(b'\n', &mut raw_line)?;
        if n == 0 {
            break; // EOF
        }

        let line = String::from_utf8_lossy(&raw_line);
        if let Some(file) = state.feed(&line) {
            emit(file)?;
        }
    }
    state.finish();
    Ok(())
}
