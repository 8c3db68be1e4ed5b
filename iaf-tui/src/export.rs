// CSV trace export: one row per step, columns step,I,V,S.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use iaf_hw::TraceRow;

use crate::backend::SimBackend;

const HEADER: [&str; 4] = ["step", "I", "V", "S"];

#[derive(Serialize)]
struct CsvRow {
    step: u64,
    current: f32,
    v: f32,
    spike: u8,
}

impl From<&TraceRow> for CsvRow {
    fn from(r: &TraceRow) -> Self {
        Self {
            step: r.step,
            current: r.current,
            v: r.v,
            spike: r.spiked as u8,
        }
    }
}

/// Row-at-a-time writer; the header goes out on creation, even for empty traces.
pub struct TraceWriter<W: Write> {
    wtr: csv::Writer<W>,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(HEADER)?;
        Ok(Self { wtr })
    }

    pub fn write(&mut self, row: &TraceRow) -> Result<()> {
        self.wtr.serialize(CsvRow::from(row))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}

impl TraceWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        Self::new(file)
    }
}

pub fn write_trace<W: Write>(writer: W, rows: &[TraceRow]) -> Result<()> {
    let mut out = TraceWriter::new(writer)?;
    for row in rows {
        out.write(row)?;
    }
    out.finish()
}

pub fn write_trace_file(path: &Path, rows: &[TraceRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_trace(file, rows).with_context(|| format!("failed to write {}", path.display()))
}

/// Step `sim` `steps` times, writing each row as it arrives. Nothing is buffered.
pub fn stream_run<S, W>(
    sim: &mut S,
    steps: u64,
    mut out: Option<&mut TraceWriter<W>>,
) -> Result<()>
where
    S: SimBackend + ?Sized,
    W: Write,
{
    for _ in 0..steps {
        let row = sim.step()?;
        if let Some(out) = out.as_mut() {
            out.write(&row)?;
        }
    }
    Ok(())
}
