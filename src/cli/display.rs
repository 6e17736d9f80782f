// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal rendering for the `inspect` subcommand.
//!
//! Box-drawing output with per-section size bars, sized for an 80-column
//! terminal. Pure formatting; all parsing happens in the caller.

/// Inner content width of the boxes.
const W: usize = 68;

/// One blob section for display.
pub struct SectionInfo {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate a path to fit in the given width
pub fn truncate_path(path: &str, max_len: usize) -> String {
    if path.len() <= max_len {
        path.to_string()
    } else {
        format!("...{}", &path[path.len() - max_len + 3..])
    }
}

/// Print the file banner.
pub fn print_banner(path: &str, total_size: usize, version: u8, current_version: u8) {
    println!();
    println!("╔{}╗", "═".repeat(W));
    println!("║{:^w$}║", "BLOCKTRIE FILE INSPECTOR", w = W);
    println!("╠{}╣", "═".repeat(W));
    println!("║  File:     {:<55} ║", truncate_path(path, 55));
    println!("║  Size:     {:<55} ║", format_size(total_size));
    println!(
        "║  Version:  {:<55} ║",
        format!("{} (current: {})", version, current_version)
    );
    println!("╚{}╝", "═".repeat(W));
    println!();
}

/// Print one "key: value" metadata line inside the metadata box.
pub fn print_metadata(rows: &[(&str, String)]) {
    println!("┌─ METADATA {}┐", "─".repeat(W - 12));
    for (key, value) in rows {
        println!("│  {:<16} {:<47}  │", format!("{}:", key), value);
    }
    println!("└{}┘", "─".repeat(W));
    println!();
}

/// Print the structure diagram with size bars and the offset table.
pub fn print_sections(sections: &[SectionInfo], total_size: usize) {
    const BAR_WIDTH: usize = 30;
    let max_size = sections.iter().map(|s| s.size).max().unwrap_or(1);

    println!("┌─ BINARY STRUCTURE {}┐", "─".repeat(W - 20));
    println!("│{:>w$}│", "", w = W);
    for section in sections {
        let pct = (section.size as f64 / total_size as f64) * 100.0;
        let bar_len = if max_size > 0 && section.size > 0 {
            ((section.size as f64 / max_size as f64 * BAR_WIDTH as f64) as usize).max(1)
        } else {
            0
        };
        println!(
            "│  {:<11} │{}{}│ {:>8} {:>6.1}%  │",
            section.name,
            "█".repeat(bar_len),
            "░".repeat(BAR_WIDTH - bar_len),
            format_size(section.size),
            pct
        );
    }
    println!("│{:>w$}│", "", w = W);
    println!("├─ OFFSETS {}┤", "─".repeat(W - 11));
    println!(
        "│  {:<11} {:>10}  {:>10}  {:>10}{:>w$}│",
        "SECTION",
        "OFFSET",
        "LENGTH",
        "END",
        "",
        w = W - 49
    );
    for section in sections {
        println!(
            "│  {:<11} {:>10}  {:>10}  {:>10}{:>w$}│",
            section.name,
            format!("0x{:06X}", section.offset),
            format_size(section.size),
            format!("0x{:06X}", section.offset + section.size),
            "",
            w = W - 49
        );
    }
    println!("└{}┘", "─".repeat(W));
    println!();
}
