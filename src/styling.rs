//! Styling for terminal messages.
//!
//! This module uses the anstyle ecosystem:
//! - anstream for auto-detecting color support
//! - anstyle for composable styling
//! - color-print for message markup

use anstyle::Style;
use color_print::cformat;

// ============================================================================
// Re-exports from anstream (auto-detecting output)
// ============================================================================

/// Auto-detecting println that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::println;

/// Auto-detecting print that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::print;

/// Auto-detecting eprintln that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::eprintln;

// ============================================================================
// Semantic Style Constants
// ============================================================================

/// Hint style (dimmed) - use as `{HINT}text{HINT:#}`
pub const HINT: Style = Style::new().dimmed();

// ============================================================================
// Message Emojis
// ============================================================================

pub const ERROR_EMOJI: &str = "❌";

pub const WARNING_EMOJI: &str = "🟡";

pub const HINT_EMOJI: &str = "💡";

pub const SUCCESS_EMOJI: &str = "✅";

// ============================================================================
// Message formatting
// ============================================================================

pub fn error_message(message: impl AsRef<str>) -> String {
    cformat!("{ERROR_EMOJI} <red>{}</>", message.as_ref())
}

pub fn warning_message(message: impl AsRef<str>) -> String {
    cformat!("{WARNING_EMOJI} <yellow>{}</>", message.as_ref())
}

pub fn hint_message(message: impl AsRef<str>) -> String {
    cformat!("{HINT_EMOJI} <dim>{}</>", message.as_ref())
}

pub fn success_message(message: impl AsRef<str>) -> String {
    cformat!("{SUCCESS_EMOJI} <green>{}</>", message.as_ref())
}

/// Render an error chain: the top-level message, then each cause on its own line.
pub fn format_error_chain(err: &anyhow::Error) -> String {
    let mut out = error_message(err.to_string());
    for cause in err.chain().skip(1) {
        out.push('\n');
        out.push_str(&cformat!("   <dim>caused by:</> {}", cause));
    }
    out
}
