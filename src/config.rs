//! Environment configuration.
//!
//! | Variable               | Effect                                      |
//! |------------------------|---------------------------------------------|
//! | `CRT_TERM_DEBUG_MOUSE` | `1` starts the shell with mouse debugging on |
//! | `CRT_TERM_WRITE_LOG`   | file receiving every raw terminal write     |
//! | `CRT_TERM_LOG_FILE`    | file receiving log records                  |
//! | `CRT_TERM_LOG`         | `env_logger` filter, `info` when unset      |

use std::env;

const DEBUG_MOUSE: &str = "CRT_TERM_DEBUG_MOUSE";
const WRITE_LOG: &str = "CRT_TERM_WRITE_LOG";
const LOG_FILE: &str = "CRT_TERM_LOG_FILE";
const LOG_FILTER: &str = "CRT_TERM_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub debug_mouse: bool,
    pub write_log: Option<String>,
    pub log_file: Option<String>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            debug_mouse: value(DEBUG_MOUSE).as_deref() == Some("1"),
            write_log: value(WRITE_LOG),
            log_file: value(LOG_FILE),
            log_filter: value(LOG_FILTER),
        }
    }
}
