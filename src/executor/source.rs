//! Line-oriented row sources backing table scans
//!
//! A row source yields the raw text lines of one table and can be rewound to
//! its first line. `FileRowSource` reads a CSV file from disk;
//! `MemoryRowSource` serves lines held in memory.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Rewindable sequence of text lines
pub trait RowSource {
    /// Returns the next line without its terminator, or `None` at the end
    fn next_line(&mut self) -> io::Result<Option<String>>;

    /// Repositions the source at its first line
    fn rewind(&mut self) -> io::Result<()>;
}

/// Buffered reader over a table's CSV file.
///
/// Rewinding drops the current handle and reopens the file, discarding any
/// partially-read state.
pub struct FileRowSource {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FileRowSource {
    /// Opens the file at `path`
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for FileRowSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn rewind(&mut self) -> io::Result<()> {
        let file = File::open(&self.path)?;
        self.reader = BufReader::new(file);
        Ok(())
    }
}

/// In-memory row source
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    lines: Vec<String>,
    cursor: usize,
}

impl MemoryRowSource {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines, cursor: 0 }
    }

    /// Builds a source from rows of values, rendered as CSV lines
    pub fn from_rows(rows: &[&[i32]]) -> Self {
        let lines = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        Self::new(lines)
    }
}

impl RowSource for MemoryRowSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let line = self.lines.get(self.cursor).cloned();
        if line.is_some() {
            self.cursor += 1;
        }
        Ok(line)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.cursor = 0;
        Ok(())
    }
}
