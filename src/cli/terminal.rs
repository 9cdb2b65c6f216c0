//! Colors and width of the terminal the listing is printed to.

use owo_colors::{OwoColorize, colors::css};

/// True when stdout accepts ANSI colors.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Width of the attached terminal in columns, or `None` when stdout is not a tty.
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// True when the full car listing would wrap (under 80 columns).
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 80)
}

/// Status colors for messages printed to the user.
///
/// Plain text is returned when the terminal has no color support.
pub trait Colorize {
    /// Green, for a completed rental, return, add or delete.
    fn success(&self) -> String;
    /// Orange, for refused or empty operations.
    fn warning(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_messages_keep_their_text() {
        assert!("Car rented successfully!".success().contains("Car rented successfully!"));
        assert!(String::from("No cars").warning().contains("No cars"));
    }
}
