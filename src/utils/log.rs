// File: log.rs
// Author: Hyunbin Kim (khb7840@gmail.com)

// Colored string for log
pub const INFO: &str = "\x1b[1;32m[INFO]\x1b[0m";
pub const FAIL: &str = "\x1b[1;31m[FAIL]\x1b[0m";
pub const WARN: &str = "\x1b[1;33m[WARN]\x1b[0m";
pub const DONE: &str = "\x1b[1;34m[DONE]\x1b[0m";
pub const DBUG: &str = "\x1b[1;36m[DBUG]\x1b[0m";

pub fn log_msg(prefix: &str, msg: &str) -> String { format!("{} {}", prefix, msg) }
pub fn print_log_msg(prefix: &str, msg: &str) { eprintln!("{}", log_msg(prefix, msg)); }

/// Gates messages by the `verbose` and `debug` switches. Warnings are always printed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Verbosity {
    pub verbose: bool,
    pub debug: bool,
}

impl Verbosity {
    pub fn new(verbose: bool, debug: bool) -> Self {
        // debug output implies verbose output
        Verbosity { verbose: verbose || debug, debug }
    }
    pub fn info(&self, msg: &str) {
        if self.verbose { print_log_msg(INFO, msg); }
    }
    pub fn done(&self, msg: &str) {
        if self.verbose { print_log_msg(DONE, msg); }
    }
    pub fn debug(&self, msg: &str) {
        if self.debug { print_log_msg(DBUG, msg); }
    }
    pub fn warn(&self, msg: &str) {
        print_log_msg(WARN, msg);
    }
}
