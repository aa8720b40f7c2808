//! Heatmap command for rendering a year of daily focus intensity.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use ft_core::{YearHeatmap, year_heatmap};
use ft_db::Database;

const WEEKDAY_ROWS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

pub fn run<W: Write>(writer: &mut W, db: &Database, year: i32, json: bool) -> Result<()> {
    let sessions = db.list_sessions()?;
    let heatmap = year_heatmap(&sessions, year);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&heatmap)?)?;
    } else {
        write!(writer, "{}", format_heatmap(year, &heatmap))?;
    }
    Ok(())
}

/// Formats the heatmap as a weekday-by-column glyph grid.
pub fn format_heatmap(year: i32, heatmap: &YearHeatmap) -> String {
    // grid[weekday][column], None for spacer columns and missing days.
    let mut grid = vec![vec![None; heatmap.columns]; 7];
    for cell in &heatmap.cells {
        grid[usize::from(cell.weekday)][cell.column] = Some(cell.level);
    }

    let mut output = String::new();
    let _ = writeln!(output, "Focus heatmap {year}");
    for (weekday, row) in grid.iter().enumerate() {
        let cells: String = row
            .iter()
            .map(|slot| slot.map_or(' ', |level| LEVEL_GLYPHS[usize::from(level.min(4))]))
            .collect();
        let _ = writeln!(output, "{} {cells}", WEEKDAY_ROWS[weekday]);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "· 0-2h  ░ 2-4h  ▒ 4-6h  ▓ 6-8h  █ 8h+");
    output
}
