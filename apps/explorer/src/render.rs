//! Plain-text rendering of the controller's view models.

use std::fmt::Write as _;

use client_core::{
    view::{ColorSwatch, DownloadLink},
    ResultsTable, RowAction, SelectionSummary, StatusView, TableBody,
};

pub fn results_table(table: &ResultsTable) -> String {
    let mut out = String::new();
    match &table.body {
        TableBody::NoResults(message) => {
            let _ = writeln!(out, "  {message}");
        }
        TableBody::Rows(rows) => {
            if let Some(caption) = &table.caption {
                let _ = writeln!(out, "{caption}");
            }
            let header_box = if table.select_all_checked { "[x]" } else { "[ ]" };
            let _ = writeln!(
                out,
                "{header_box} {:<6} {:<48} {:>6} {:<24} {:<12} {}",
                "ID", "Title", "Res.", "Method", "Released", "Organism"
            );
            for row in rows {
                let checkbox = if row.selected { "[x]" } else { "[ ]" };
                let _ = writeln!(
                    out,
                    "{checkbox} {:<6} {:<48} {:>6} {:<24} {:<12} {}",
                    row.identifier,
                    truncate(&row.title, 48),
                    row.resolution,
                    truncate(&row.experimental_method, 24),
                    row.release_date,
                    row.organism
                );
                let actions: Vec<String> = row.actions.iter().map(row_action).collect();
                let _ = writeln!(out, "      {} | {}", row.record_link, actions.join(" | "));
            }
        }
    }
    out
}

fn row_action(action: &RowAction) -> String {
    match action {
        RowAction::DownloadRaw { href } => format!("raw: {href}"),
        RowAction::CannedScript { href } => format!("script: {href}"),
        RowAction::OpenInTool { identifier } => format!("open: pdb-explorer open {identifier}"),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

pub fn selection_summary(summary: &SelectionSummary) -> Option<String> {
    match summary {
        SelectionSummary::Hidden => None,
        SelectionSummary::NeedsMore(id) => Some(format!(
            "1 structure selected ({id}). Select at least one more to align."
        )),
        SelectionSummary::Ready(ids) => {
            let joined: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            Some(format!(
                "{} structures selected: {}",
                ids.len(),
                joined.join(", ")
            ))
        }
    }
}

fn link(out: &mut String, download: &DownloadLink) {
    let _ = writeln!(out, "  {} -> {}", download.label, download.href);
}

fn colors(out: &mut String, swatches: &Option<Vec<ColorSwatch>>) {
    if let Some(swatches) = swatches {
        let _ = writeln!(out, "  Colors:");
        for swatch in swatches {
            let _ = writeln!(out, "    {:<6} {}", swatch.identifier, swatch.color);
        }
    }
}

fn steps(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "  {title}");
    for (n, item) in items.iter().enumerate() {
        let _ = writeln!(out, "    {}. {item}", n + 1);
    }
}

fn selected_line(out: &mut String, count: usize, selected: &[shared::domain::Identifier]) {
    let joined: Vec<&str> = selected.iter().map(|id| id.as_str()).collect();
    let _ = writeln!(out, "  {count} structures: {}", joined.join(", "));
}

pub fn status(view: &StatusView) -> String {
    let mut out = String::new();
    match view {
        StatusView::Empty => {}
        StatusView::Progress { headline, detail } => {
            let _ = writeln!(out, "… {headline}\n  {detail}");
        }
        StatusView::Info(message) => {
            let _ = writeln!(out, "✓ {message}");
        }
        StatusView::Rejected(message) => {
            let _ = writeln!(out, "⚠ {message}");
        }
        StatusView::ApplicationError(message) => {
            let _ = writeln!(out, "✗ Error: {message}");
        }
        StatusView::TransportError(message) => {
            let _ = writeln!(out, "✗ Connection error: {message}");
        }
        StatusView::Session(session) => {
            let _ = writeln!(out, "✓ Alignment session created");
            selected_line(&mut out, session.pdb_count, &session.selected);
            if let Some(reference) = &session.reference {
                let _ = writeln!(out, "  Reference: {reference}");
            }
            if let Some(scores) = &session.alignment {
                let _ = writeln!(out, "  Alignment (RMSD):");
                for score in scores {
                    let _ = writeln!(
                        out,
                        "    {} vs {}: {:.3} Å ({} atoms)",
                        score.structure, score.reference, score.rmsd, score.atom_count
                    );
                }
            }
            colors(&mut out, &session.colors);
            steps(&mut out, "Opening the session:", &session.open_steps);
            link(&mut out, &session.download);
        }
        StatusView::ScriptExport(export) => {
            let _ = writeln!(out, "✓ Alignment script generated");
            selected_line(&mut out, export.pdb_count, &export.selected);
            let _ = writeln!(
                out,
                "  Reference: {} (the others are aligned onto it)",
                export.reference
            );
            steps(&mut out, "Running the script:", &export.run_steps);
            let _ = writeln!(out, "  Or paste these commands into the tool console:");
            for line in export.manual_commands.lines() {
                let _ = writeln!(out, "    {line}");
            }
            link(&mut out, &export.download);
        }
        StatusView::Launched(launched) => {
            let _ = writeln!(out, "✓ Visualization tool launched");
            selected_line(&mut out, launched.pdb_count, &launched.selected);
            if let Some(reference) = &launched.reference {
                let _ = writeln!(out, "  Reference: {reference}");
            }
            colors(&mut out, &launched.colors);
            for highlight in &launched.highlights {
                let _ = writeln!(out, "  - {highlight}");
            }
        }
        StatusView::LaunchFallback(fallback) => {
            let _ = writeln!(out, "⚠ {}", fallback.notice);
            selected_line(&mut out, fallback.pdb_count, &fallback.selected);
            steps(&mut out, "Open the script manually:", &fallback.run_steps);
            let _ = writeln!(out, "  Note: {}", fallback.hint);
            link(&mut out, &fallback.download);
        }
        StatusView::ExportReady { download_url } => {
            let _ = writeln!(out, "✓ Export ready: {download_url}");
        }
        StatusView::OpenFallback { message, download } => {
            let _ = writeln!(out, "⚠ Could not open the tool: {message}");
            link(&mut out, download);
        }
    }
    out
}
