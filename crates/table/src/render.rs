//! Plain-text rendering for terminals.

use crate::column::Align;
use crate::table::TableView;

const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";

/// Draw `view` as an aligned plain-text table with an optional footer.
pub fn render_text(view: &TableView) -> String {
    let widths: Vec<usize> = view
        .header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            h.width.unwrap_or_else(|| {
                view.rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.text.chars().count())
                    .chain(std::iter::once(h.label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
        })
        .collect();

    let mut out = String::new();

    if let Some(search) = &view.search {
        out.push_str(&format!("Search: {search}\n"));
    }
    if let Some((label, shown)) = &view.filter {
        out.push_str(&format!("{label}: {shown}\n"));
    }

    let mut header: Vec<String> = Vec::with_capacity(widths.len() + 1);
    if view.selectable {
        header.push(if view.all_selected { CHECKED } else { UNCHECKED }.to_string());
    }
    header.extend(
        view.header
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(&h.label, *w, h.align)),
    );
    push_line(&mut out, &header);

    let rule_width = header.iter().map(|c| c.chars().count()).sum::<usize>()
        + 2 * header.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');

    for row in &view.rows {
        let mut line: Vec<String> = Vec::with_capacity(widths.len() + 1);
        if view.selectable {
            line.push(if row.selected { CHECKED } else { UNCHECKED }.to_string());
        }
        line.extend(
            row.cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| pad(&c.text, *w, c.align)),
        );
        push_line(&mut out, &line);
    }

    if let Some(p) = &view.pagination {
        out.push_str(&format!(
            "Showing {}-{} of {} | Page {} of {}\n",
            p.first_row, p.last_row, p.total_results, p.current_page, p.total_pages
        ));
    }

    out
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push_str(cells.join("  ").trim_end());
    out.push('\n');
}

/// Fit `text` into `width` columns, truncating with `…` when too long.
fn pad(text: &str, width: usize, align: Align) -> String {
    let len = text.chars().count();
    let text = if len > width && width > 0 {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    };

    let fill = width.saturating_sub(text.chars().count());
    match align {
        Align::Left => format!("{text}{}", " ".repeat(fill)),
        Align::Right => format!("{}{text}", " ".repeat(fill)),
        Align::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}
