use clap::builder::styling::{AnsiColor, Effects, Style, Styles};
use std::{fmt::Write, sync::LazyLock};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Whether stdout is an ANSI-capable interactive terminal.
static IS_ANSI_TERMINAL: LazyLock<bool> =
    LazyLock::new(monoutils::term::is_ansi_interactive_terminal);

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Applies the styles of [`styles`] to text printed by the binary.
pub trait AnsiStyles {
    /// Apply header style to text
    fn header(&self) -> String;

    /// Apply literal style to text
    fn literal(&self) -> String;

    /// Apply placeholder style to text
    fn placeholder(&self) -> String;

    /// Apply valid style to text
    fn valid(&self) -> String;
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the styles of the CLI help and output.
pub fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Green.on_default() | Effects::BOLD)
        .invalid(AnsiColor::Red.on_default() | Effects::BOLD)
}

fn apply_style(text: &str, style: &Style, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }

    let mut styled = String::with_capacity(text.len() + 20);
    let _ = write!(styled, "{}", style);
    styled.push_str(text);
    let _ = write!(styled, "{}", style.render_reset());
    styled
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl AnsiStyles for str {
    fn header(&self) -> String {
        apply_style(self, styles().get_header(), *IS_ANSI_TERMINAL)
    }

    fn literal(&self) -> String {
        apply_style(self, styles().get_literal(), *IS_ANSI_TERMINAL)
    }

    fn placeholder(&self) -> String {
        apply_style(self, styles().get_placeholder(), *IS_ANSI_TERMINAL)
    }

    fn valid(&self) -> String {
        apply_style(self, styles().get_valid(), *IS_ANSI_TERMINAL)
    }
}

impl AnsiStyles for String {
    fn header(&self) -> String {
        self.as_str().header()
    }

    fn literal(&self) -> String {
        self.as_str().literal()
    }

    fn placeholder(&self) -> String {
        self.as_str().placeholder()
    }

    fn valid(&self) -> String {
        self.as_str().valid()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_style_disabled_returns_text() {
        assert_eq!(apply_style("test", styles().get_header(), false), "test");
        assert_eq!(apply_style("", styles().get_error(), false), "");
    }

    #[test]
    fn test_apply_style_enabled_wraps_text() {
        let header = apply_style("test", styles().get_header(), true);
        assert!(header.contains("\x1b[1m"));
        assert!(header.contains("\x1b[33m"));
        assert!(header.contains("test"));
        assert!(header.ends_with("\x1b[0m"));

        let placeholder = apply_style("test", styles().get_placeholder(), true);
        assert!(placeholder.contains("\x1b[32m"));
        assert!(!placeholder.contains("\x1b[1m"));

        let error = apply_style("测试", styles().get_error(), true);
        assert!(error.starts_with("\x1b["));
        assert!(error.contains("测试"));
        assert!(error.contains("\x1b[31m"));
    }
}
