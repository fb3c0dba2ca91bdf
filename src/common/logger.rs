//! Structured logging with box-drawing output.
//!
//! Every line the daemon prints goes through [`emit`], which applies one of the
//! line styles below and writes to stdout. Output can be silenced entirely
//! (tests) and debug lines are only printed when debug mode is switched on
//! from the configuration.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Logging switches shared by all threads.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: opens a new conceptual block (period change,
///   startup phase, reload). Prints an empty `┃` spacer, then `┣ message`.
/// - **`log_decorated!`**: a line inside the current block, `┣ message`.
/// - **`log_indented!`**: detail belonging to the previous line, `┃   message`.
/// - **`log_pipe!`**: a bare `┃` spacer, used before a semantic level message
///   that starts its own block.
/// - **`log_version!`** / **`log_end!`**: the startup header and the final
///   `╹` marker, each printed once.
/// - **`log_info!`**, **`log_warning!`**, **`log_error!`**, **`log_critical!`**,
///   **`log_debug!`**: `┣[LEVEL] message` lines. `log_debug!` is dropped unless
///   [`Log::set_debug`] enabled it.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }
}

/// Line style selected by each macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    BlockStart,
    Decorated,
    Indented,
    Pipe,
    Version,
    End,
    Info,
    Warning,
    Error,
    Critical,
    Debug,
}

impl Style {
    fn render(self, message: &str) -> String {
        match self {
            Style::BlockStart => format!("┃\n┣ {message}\n"),
            Style::Decorated => format!("┣ {message}\n"),
            Style::Indented => format!("┃   {message}\n"),
            Style::Pipe => "┃\n".to_string(),
            Style::Version => format!("┏ lullaby v{} ━━╸\n", env!("CARGO_PKG_VERSION")),
            Style::End => "╹\n".to_string(),
            Style::Info => format!("┣[\x1b[32mINFO\x1b[0m] {message}\n"),
            Style::Warning => format!("┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
            Style::Error => format!("┣[\x1b[31mERROR\x1b[0m] {message}\n"),
            Style::Critical => format!("┣[\x1b[31mCRITICAL\x1b[0m] {message}\n"),
            Style::Debug => format!("┣[\x1b[36mDEBUG\x1b[0m] {message}\n"),
        }
    }
}

/// Format and write one log line. Used by the logging macros.
pub fn emit(style: Style, args: fmt::Arguments<'_>) {
    if !Log::is_enabled() || (style == Style::Debug && !Log::is_debug()) {
        return;
    }
    let text = style.render(&args.to_string());

    // A single locked write keeps lines from concurrent threads intact.
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = handle.write_all(text.as_bytes());
    let _ = handle.flush();
}

// # Logging Macros

/// Start a new block of related log lines.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::BlockStart, format_args!($($arg)*))
    };
}

/// Log a line that belongs to the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Decorated, format_args!($($arg)*))
    };
}

/// Log a detail line indented under the previous one.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Indented, format_args!($($arg)*))
    };
}

/// Log an empty spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::common::logger::emit($crate::common::logger::Style::Pipe, format_args!(""))
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::common::logger::emit($crate::common::logger::Style::Version, format_args!(""))
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::common::logger::emit($crate::common::logger::Style::End, format_args!(""))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Warning, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Critical, format_args!($($arg)*))
    };
}

/// Log a debug line; printed only in debug mode.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::common::logger::emit($crate::common::logger::Style::Debug, format_args!($($arg)*))
    };
}
