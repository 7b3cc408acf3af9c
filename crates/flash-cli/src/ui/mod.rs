//! Terminal output helpers.
//!
//! Status lines go to stderr so stdout stays clean for piping.
//!
//! ```no_run
//! use flash_cli::ui;
//!
//! ui::init_colors();
//! ui::success("Dev server running");
//! ui::error("Failed to bind port");
//! ```

mod messages;

pub use messages::{debug, error, info, success, update, warning};

/// Check if color output should be enabled.
///
/// `NO_COLOR` beats `FORCE_COLOR`; without either, color follows whether
/// stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Apply the color decision to `owo-colors` for the whole process.
pub fn init_colors() {
    owo_colors::set_override(should_use_color());
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_should_use_color_no_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::remove_var("FORCE_COLOR");
        }
        assert!(!should_use_color());
        unsafe { std::env::remove_var("NO_COLOR") };
    }

    #[test]
    #[serial]
    fn test_should_use_color_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_color());
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }

    #[test]
    #[serial]
    fn test_should_use_color_no_color_overrides_force() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
