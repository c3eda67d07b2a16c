use crate::error::JobError;
use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::Path,
};

/// The input must be an existing regular file we can open for reading.
pub fn validate_input(path: &Path) -> Result<(), JobError> {
    let invalid = |reason: String| JobError::InvalidInput {
        path: path.to_path_buf(),
        reason,
    };
    let meta = path.metadata().map_err(|e| invalid(e.to_string()))?;
    if !meta.is_file() {
        return Err(invalid("not a regular file".into()));
    }
    File::open(path).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

/// Calls `on_record` for every `\r`- or `\n`-terminated record of the stream
/// (ffmpeg redraws its status line with bare carriage returns).
pub fn for_each_record<R, F>(reader: R, mut on_record: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();

    loop {
        let chunk = match reader.fill_buf() {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if chunk.is_empty() {
            break;
        }

        let len = chunk.len();
        for &byte in chunk {
            if byte == b'\r' || byte == b'\n' {
                if !buffer.is_empty() {
                    on_record(&String::from_utf8_lossy(&buffer));
                    buffer.clear();
                }
            } else {
                buffer.push(byte);
            }
        }
        reader.consume(len);
    }

    if !buffer.is_empty() {
        on_record(&String::from_utf8_lossy(&buffer));
    }
    Ok(())
}

/// The last `cap` non-blank diagnostic lines.
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    cap: usize,
}

impl DiagnosticTail {
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.cap == 0 {
            return;
        }
        if self.lines.len() == self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.into()
    }
}
