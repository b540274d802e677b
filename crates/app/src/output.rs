use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use cruise::SimulationTrace;

use crate::cli::OutputFormat;

/// Writes `trace` to `path`, or stdout when no path is given.
pub fn write_trace(trace: &SimulationTrace, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_to(trace, format, BufWriter::new(file))?;
            log::info!("trace written to {}", path.display());
        }
        None => write_to(trace, format, io::stdout().lock())?,
    }
    Ok(())
}

fn write_to<W: Write>(trace: &SimulationTrace, format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            for row in trace.rows() {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, trace)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}
