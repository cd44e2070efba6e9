pub mod assoc;
pub mod disk;
pub mod firewall;
pub mod resource;
pub mod spec;
pub mod subnet;

use colored::Colorize;
use serde::Serialize;

/// Pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable status line on stderr
pub fn done(message: impl std::fmt::Display) {
    eprintln!("{} {}", "✓".green(), message);
}
