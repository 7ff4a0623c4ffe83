//! Plain-text rendering of the directory and dialog view models.

use std::fmt::Write as _;

use client_core::view::{DirectoryView, FormView, TableBody};

const HEADERS: [&str; 3] = ["First Name", "Last Name", "Email"];
const LOADING_TEXT: &str = "Loading customers...";

pub fn directory(view: &DirectoryView) -> String {
    let mut out = String::new();
    if let Some(banner) = &view.error_banner {
        let _ = writeln!(out, "! {banner}");
    }
    match &view.body {
        TableBody::Loading => {
            let _ = writeln!(out, "{LOADING_TEXT}");
        }
        TableBody::Placeholder(text) => {
            let _ = writeln!(out, "{}", row_line(&HEADERS, &header_widths()));
            let _ = writeln!(out, "{text}");
        }
        TableBody::Rows(rows) => {
            let cells: Vec<[&str; 3]> = rows
                .iter()
                .map(|row| [&*row.first_name, &*row.last_name, &*row.email])
                .collect();
            let mut widths = header_widths();
            for row in &cells {
                for (width, cell) in widths.iter_mut().zip(row) {
                    *width = (*width).max(cell.chars().count());
                }
            }
            let _ = writeln!(out, "{}", row_line(&HEADERS, &widths));
            for row in &cells {
                let _ = writeln!(out, "{}", row_line(row, &widths));
            }
        }
    }
    out
}

pub fn form(view: &FormView) -> String {
    let mut out = String::new();
    if !view.visible {
        return out;
    }
    let _ = writeln!(out, "{}", view.title);
    for field in &view.fields {
        let marker = if field.required { "*" } else { "" };
        let _ = writeln!(out, "  {}{marker}: {}", field.label, field.value);
    }
    if let Some(banner) = &view.error_banner {
        let _ = writeln!(out, "  ! {banner}");
    }
    let _ = writeln!(
        out,
        "[{}{}] [Cancel{}]",
        view.submit_label,
        if view.submit_enabled { "" } else { " (disabled)" },
        if view.cancel_enabled { "" } else { " (disabled)" },
    );
    out
}

fn header_widths() -> [usize; 3] {
    HEADERS.map(|h| h.chars().count())
}

fn row_line(cells: &[&str; 3], widths: &[usize; 3]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
