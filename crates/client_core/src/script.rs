//! Manual-copy command script for the visualization tool.

use std::fmt::Write as _;

use shared::domain::Identifier;

pub const PALETTE: [&str; 8] = [
    "cyan", "magenta", "yellow", "salmon", "lime", "orange", "purple", "marine",
];

const VIEW_SETUP: &str = "center\nzoom\nset cartoon_fancy_helices, 1\nset cartoon_fancy_sheets, 1\nbg_color white";

/// Color for the structure at `position` in the input order; wraps after the
/// last palette entry.
pub fn palette_color(position: usize) -> &'static str {
    PALETTE[position % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptGenerator;

impl ScriptGenerator {
    /// Builds the script for `ids` in order. Every id is fetched and colored;
    /// every id except `reference` is aligned onto it.
    pub fn generate(&self, ids: &[Identifier], reference: &Identifier) -> String {
        let mut script = String::from("# Load structures\n");
        for id in ids {
            let _ = writeln!(script, "fetch {id}");
        }

        script.push_str("\n# Show and color\n");
        for (position, id) in ids.iter().enumerate() {
            let _ = writeln!(script, "show cartoon, {id}");
            let _ = writeln!(script, "color {}, {id}", palette_color(position));
        }

        let _ = writeln!(script, "\n# Align onto {reference}");
        for id in ids.iter().filter(|id| *id != reference) {
            let _ = writeln!(script, "align {id}, {reference}");
        }

        script.push_str("\n# View setup\n");
        script.push_str(VIEW_SETUP);
        script
    }
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
