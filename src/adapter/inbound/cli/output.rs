//! Terminal output for the diagnostic commands.
//!
//! Plain colored lines on stdout, errors on stderr. Colors are dropped
//! automatically when the stream is not a terminal.

use std::fmt::Display;

use owo_colors::{OwoColorize, Stream};

/// Print the application header with name and version.
pub fn header(version: &str) {
    println!(
        "{} {}",
        "tierwatch".if_supports_color(Stream::Stdout, |s| s.bold()),
        version.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
    println!();
}

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |s| s.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!(
        "  {:<12} {}",
        label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |s| s.green()),
        message
    );
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!(
        "  {} {}",
        "⚠".if_supports_color(Stream::Stdout, |s| s.yellow()),
        message
    );
}

/// Print an error line.
pub fn error(message: &str) {
    eprintln!(
        "  {} {}",
        "×".if_supports_color(Stream::Stderr, |s| s.red()),
        message
    );
}

/// Print an action in progress ("Connecting to...").
pub fn action(verb: &str, target: &str) {
    println!(
        "  {} {}...",
        verb.if_supports_color(Stream::Stdout, |s| s.cyan()),
        target
    );
}
