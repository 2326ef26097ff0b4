//! CSV export of training metrics
//!
//! Two files come out of a run:
//! - windows: `episode,x_win_rate,o_win_rate,draw_rate,epsilon`, one row per
//!   evaluation window
//! - draw games: `episode,draw`, one row per episode (0-based)

use std::{io::Write, path::Path};

use serde::Serialize;

use crate::{
    Result,
    error::Error,
    pipeline::{TrainingReport, WindowStats},
};

const WINDOW_HEADER: [&str; 5] = ["episode", "x_win_rate", "o_win_rate", "draw_rate", "epsilon"];
const DRAW_GAME_HEADER: [&str; 2] = ["episode", "draw"];

/// A single row of the draw-games export
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawGameRecord {
    pub episode: usize,
    pub draw: bool,
}

/// Exporter for training metric CSV files
pub struct MetricsCsvExporter;

impl MetricsCsvExporter {
    /// Write window statistics to any writer
    ///
    /// The header row is written even when there are no windows.
    pub fn write_windows<W: Write>(writer: W, windows: &[WindowStats]) -> Result<()> {
        let mut csv = headerless_writer(writer);
        csv.write_record(WINDOW_HEADER)?;
        for window in windows {
            csv.serialize(window)?;
        }
        csv.flush().map_err(|source| Error::Io {
            operation: "flush window CSV".to_string(),
            source,
        })?;
        Ok(())
    }

    /// Write the per-episode draw flags to any writer
    pub fn write_draw_games<W: Write>(writer: W, draw_games: &[bool]) -> Result<()> {
        let mut csv = headerless_writer(writer);
        csv.write_record(DRAW_GAME_HEADER)?;
        for (episode, &draw) in draw_games.iter().enumerate() {
            csv.serialize(DrawGameRecord { episode, draw })?;
        }
        csv.flush().map_err(|source| Error::Io {
            operation: "flush draw game CSV".to_string(),
            source,
        })?;
        Ok(())
    }

    /// Write the report's windows to `path`
    pub fn export_windows(report: &TrainingReport, path: &Path) -> Result<()> {
        let file = create(path)?;
        Self::write_windows(file, &report.windows)?;
        log::info!("wrote {} windows to {}", report.windows.len(), path.display());
        Ok(())
    }

    /// Write the report's draw flags to `path`
    pub fn export_draw_games(report: &TrainingReport, path: &Path) -> Result<()> {
        let file = create(path)?;
        Self::write_draw_games(file, &report.draw_games)?;
        log::info!(
            "wrote {} draw flags to {}",
            report.draw_games.len(),
            path.display()
        );
        Ok(())
    }
}

// Headers are written explicitly so empty exports still carry them
fn headerless_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer)
}

fn create(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path).map_err(|source| Error::Io {
        operation: format!("create file {path:?}"),
        source,
    })
}
