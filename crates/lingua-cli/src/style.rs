//! Raw ANSI escape codes for coloring diagnostic output.
//!
//! No color-handling crate is pulled in for this; a handful of escape
//! sequences is all `lingua-cli` needs, and every color is reset
//! immediately after the colored span.

pub struct Style;

impl Style {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const RED: &'static str = "\x1b[31m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const CYAN: &'static str = "\x1b[36m";

    pub fn red(s: &str) -> String {
        format!("{}{s}{}", Self::RED, Self::RESET)
    }

    pub fn yellow(s: &str) -> String {
        format!("{}{s}{}", Self::YELLOW, Self::RESET)
    }

    pub fn cyan(s: &str) -> String {
        format!("{}{s}{}", Self::CYAN, Self::RESET)
    }

    pub fn bold_red(s: &str) -> String {
        format!("{}{}{s}{}", Self::BOLD, Self::RED, Self::RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_wraps_and_resets() {
        let s = Style::red("boom");
        assert!(s.starts_with(Style::RED));
        assert!(s.ends_with(Style::RESET));
    }

    #[test]
    fn bold_red_combines_both_codes() {
        let s = Style::bold_red("fatal");
        assert!(s.contains(Style::BOLD));
        assert!(s.contains(Style::RED));
    }
}
