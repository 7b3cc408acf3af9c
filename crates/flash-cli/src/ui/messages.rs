//! Status message functions for terminal output.

use owo_colors::{OwoColorize, Stream::Stderr};

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".if_supports_color(Stderr, |s| s.green().bold().to_string()), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".if_supports_color(Stderr, |s| s.blue().bold().to_string()), message);
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "⚠".if_supports_color(Stderr, |s| s.yellow().bold().to_string()),
        message.if_supports_color(Stderr, |s| s.yellow())
    );
}

pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stderr, |s| s.red().bold().to_string()),
        message.if_supports_color(Stderr, |s| s.red())
    );
}

/// Print a dimmed line, only when `RUST_LOG` is set.
pub fn debug(message: &str) {
    if std::env::var("RUST_LOG").is_ok() {
        eprintln!(
            "{} {}",
            "◆".if_supports_color(Stderr, |s| s.dimmed()),
            message.if_supports_color(Stderr, |s| s.dimmed())
        );
    }
}

/// Print one update notification line (`↻ src/app.tsx (2 clients)`).
pub fn update(file: &str, clients: usize) {
    let suffix = match clients {
        1 => "(1 client)".to_string(),
        n => format!("({} clients)", n),
    };
    eprintln!(
        "{} {} {}",
        "↻".if_supports_color(Stderr, |s| s.cyan().bold().to_string()),
        file,
        suffix.if_supports_color(Stderr, |s| s.dimmed())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        success("Success message");
        info("Info message");
        warning("Warning message");
        error("Error message");
        debug("Debug message");
        update("src/app.tsx", 0);
        update("src/app.tsx", 1);
    }
}
