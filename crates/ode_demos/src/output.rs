use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Writes observations as text lines `t  y0 y1 ...`.
pub struct TrajectoryWriter<W: Write> {
    out: W,
    lines: usize,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn record(&mut self, t: f64, values: &[f64]) -> Result<()> {
        write!(self.out, "{t} ")?;
        for value in values {
            write!(self.out, " {value}")?;
        }
        writeln!(self.out)?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
