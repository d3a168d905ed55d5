use colored::Colorize;
use unicode_width::UnicodeWidthStr;

/// Format an id truncated for display
pub fn format_id(id: &str) -> String {
    if id.chars().count() <= 14 {
        id.to_string()
    } else {
        let head: String = id.chars().take(6).collect();
        let tail: String = id.chars().rev().take(6).collect::<Vec<_>>().into_iter().rev().collect();
        format!("{}...{}", head, tail)
    }
}

/// Format timestamp in human-readable format
pub fn format_timestamp(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Colored yes/no badge
pub fn format_flag(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Prompt user for yes/no confirmation
pub fn confirm_action(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes" | "o" | "oui")
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Print a table row with columns
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    println!("{}", format_table_row(columns, widths));
}

/// Pad columns by display width so accented labels line up.
pub fn format_table_row(columns: &[&str], widths: &[usize]) -> String {
    let mut row = String::new();
    for (col, width) in columns.iter().zip(widths) {
        row.push_str(col);
        let used = UnicodeWidthStr::width(*col);
        row.push_str(&" ".repeat(width.saturating_sub(used) + 2));
    }
    row.trim_end().to_string()
}
