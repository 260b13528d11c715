//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks, healthy states
//! - Red: errors, failed deployments
//! - Yellow: warnings, pending approvals
//! - Cyan: identifiers, commands, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use std::fmt::Display;

use console::style;

const RULE_WIDTH: usize = 64;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ deployment approved`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("✓").green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
///
/// Example: `✗ no deployment found`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
///
/// Example: `⚠ serving fallback data`
pub fn warn(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("⚠").yellow(), msg);
    } else {
        println!("⚠ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ run opsdeck init`
pub fn hint(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        println!("→ {}", msg);
    }
}

/// Print a bold section header.
pub fn header(title: &str) {
    if colors_enabled() {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  accounts:  2`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!(
            "  {}  {}",
            style(label).dim(),
            style(value.to_string()).bold()
        );
    } else {
        println!("  {}  {}", label, value);
    }
}

/// Print a list item with bullet.
///
/// Example: `  • sandbox`
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a horizontal rule separator.
pub fn rule() {
    if colors_enabled() {
        println!("{}", style("─".repeat(RULE_WIDTH)).dim());
    } else {
        println!("{}", "─".repeat(RULE_WIDTH));
    }
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    if colors_enabled() {
        println!("{}", style(msg).dim());
    } else {
        println!("{}", msg);
    }
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}

/// Render rows as a fixed-width table with a dimmed header row.
///
/// Column widths fit the widest cell; no wrapping, terminals scroll.
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(console::measure_text_width(cell));
            }
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    if colors_enabled() {
        println!("  {}", style(header_line).dim());
    } else {
        println!("  {}", header_line);
    }

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = widths
                    .get(i)
                    .map(|w| w.saturating_sub(console::measure_text_width(cell)))
                    .unwrap_or(0);
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", line.trim_end());
    }
}

/// Color a deployment status string by its meaning.
pub fn status_cell(status: &str) -> String {
    if !colors_enabled() {
        return status.to_string();
    }
    match status {
        "success" => style(status).green().to_string(),
        "failed" => style(status).red().to_string(),
        "pending_approval" => style(status).yellow().to_string(),
        "running" => style(status).cyan().to_string(),
        _ => status.to_string(),
    }
}
