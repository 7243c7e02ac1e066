//! Plain-text report rendering. Reads results only; nothing flows back into the pipeline.

use colored::Colorize;

use crate::aggregate::{GroupTotals, VolumeSummary};
use crate::utils::config::{MILLION, NAME_DISPLAY_MAX};
use crate::utils::logger::Colors;
use crate::{VaultFailure, VaultRef, VaultVolumeRecord, VaultVolumeSample};

/// Bordered text table with optional title and caption.
#[derive(Default)]
pub struct Table {
    title: Option<String>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    caption: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_header(mut self, fields: &[&str]) -> Self {
        self.header = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_row(mut self, fields: Vec<String>) -> Self {
        self.rows.push(fields);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    fn widths(&self) -> Vec<usize> {
        let cols = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0; cols];
        for row in std::iter::once(&self.header).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let border = {
            let mut s = String::from("+");
            for w in &widths {
                s.push_str(&"-".repeat(w + 2));
                s.push('+');
            }
            s
        };
        let line = |cells: &[String]| {
            let mut s = String::from("|");
            for (i, w) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                s.push_str(&format!(" {:<w$} |", cell, w = w));
            }
            s
        };

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("{}\n", Colors::colorize(Colors::HEADING, title).bold()));
        }
        out.push_str(&border);
        out.push('\n');
        if !self.header.is_empty() {
            out.push_str(&line(&self.header));
            out.push('\n');
            out.push_str(&border);
            out.push('\n');
        }
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        if !self.rows.is_empty() {
            out.push_str(&border);
            out.push('\n');
        }
        if let Some(caption) = &self.caption {
            out.push_str(&format!("  {}\n", caption.dimmed()));
        }
        out
    }
}

/// USD figure in millions, three decimals.
pub fn millions(v: f64) -> String {
    format!("{:.3}", v / MILLION)
}

/// Long names become `first8....last8`.
pub fn abbreviate_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= NAME_DISPLAY_MAX {
        return name.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{head}....{tail}")
}

fn kind(is_priority: bool, other: &str) -> String {
    let s = if is_priority { "HLP" } else { other };
    s.to_string()
}

/// Every record with its perp figures, in the given order.
pub fn format_listing(records: &[VaultVolumeRecord]) -> String {
    let mut t = Table::new()
        .with_title("Vault Volumes")
        .with_header(&["Address", "Type", "TVL", "Day", "Week", "Month", "All Time"]);
    for r in records {
        let p = &r.volume.perp;
        t = t.with_row(vec![
            r.address.clone(),
            kind(r.is_priority, "Norm"),
            millions(r.tvl),
            millions(p.day),
            millions(p.week),
            millions(p.month),
            millions(p.all_time),
        ]);
    }
    t.with_caption("Values are in $M").render()
}

fn group_table(title: &str, caption: &str, g: &GroupTotals) -> String {
    Table::new()
        .with_title(title)
        .with_header(&["Metric", "Day", "Week", "Month", "All Time", "TVL"])
        .with_row(vec![
            format!("Total ({} vaults)", g.count),
            millions(g.perp.day),
            millions(g.perp.week),
            millions(g.perp.month),
            millions(g.perp.all_time),
            millions(g.tvl),
        ])
        .with_caption(caption)
        .render()
}

/// Per-group perp totals and the top vaults by TVL.
pub fn format_summary(summary: &VolumeSummary) -> String {
    let mut out = String::from("=== VAULT VOLUME SUMMARY ===\n\n");
    out.push_str(&group_table(
        "HLP Vaults Summary",
        "HLP Volume Summary (Values are in $M)",
        &summary.priority,
    ));
    out.push('\n');
    out.push_str(&group_table(
        "Non-HLP Vaults Summary",
        "Non-HLP Volume Summary (Values are in $M)",
        &summary.other,
    ));
    out.push('\n');

    let mut top = Table::new()
        .with_title(format!("Top {} Vaults by TVL", summary.top_by_tvl.len()))
        .with_header(&[
            "Rank", "Address", "Type", "TVL", "Day", "Week", "Month", "All Time",
        ]);
    for (i, r) in summary.top_by_tvl.iter().enumerate() {
        let s = &r.volume.spot;
        top = top.with_row(vec![
            format!("#{}", i + 1),
            r.address.clone(),
            kind(r.is_priority, "Vault"),
            millions(r.tvl),
            millions(s.day),
            millions(s.week),
            millions(s.month),
            millions(s.all_time),
        ]);
    }
    out.push_str(&top.with_caption("Values are in $M").render());
    out
}

/// One vault's spot and perp figures, in USD.
pub fn format_single(name: &str, sample: &VaultVolumeSample) -> String {
    let row = |period: &str, spot: f64, perp: f64| {
        vec![period.to_string(), format!("{spot:.2}"), format!("{perp:.2}")]
    };
    let (s, p) = (&sample.spot, &sample.perp);
    Table::new()
        .with_title(format!("Vault Volume: {name}"))
        .with_header(&["Period", "Volume", "Perp Volume"])
        .with_row(row("Day", s.day, p.day))
        .with_row(row("Week", s.week, p.week))
        .with_row(row("Month", s.month, p.month))
        .with_row(row("All Time", s.all_time, p.all_time))
        .render()
}

/// Catalog listing, at most `count` rows.
pub fn format_vaults(vaults: &[VaultRef], count: usize) -> String {
    let mut t = Table::new()
        .with_title("Open Vaults (HLP First)")
        .with_header(&["Name", "Address", "TVL", "Type"]);
    for v in vaults.iter().take(count) {
        t = t.with_row(vec![
            abbreviate_name(&v.name),
            v.address.clone(),
            format!("{:.2}", v.tvl),
            kind(v.is_priority, "Norm"),
        ]);
    }
    t.render()
}

/// Failed vaults and why. Empty string when nothing failed.
pub fn format_failures(failures: &[VaultFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let mut t = Table::new()
        .with_title(format!("Failed Vaults ({})", failures.len()))
        .with_header(&["Address", "Reason"]);
    for f in failures {
        t = t.with_row(vec![f.address.clone(), f.error.to_string()]);
    }
    t.render()
}
