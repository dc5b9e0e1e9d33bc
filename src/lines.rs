use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::BlifError;

/// One logical line of the input
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    /// 1-based line in the file this logical line starts on
    raw: usize,
}

/// Where the unsplit text lives
#[derive(Debug)]
enum Source {
    Mapped(Mmap),
    Text(String),
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Mapped(map) => &map[..],
            Source::Text(text) => text.as_bytes(),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Text(String::new())
    }
}

/// The text of a netlist file split into an indexed line table.
///
/// Line indices are 1-based. Index 0 is a sentinel that is never yielded by
/// [`LineBuf::iter`], so a line number of 0 can stand for "no line".
#[derive(Debug, Default)]
pub struct LineBuf {
    source: Source,
    lines: Vec<Line>,
}

impl LineBuf {
    /// Map a file for reading. Lines are made from the mapping by [`LineBuf::make_lines`].
    pub fn read(path: impl AsRef<Path>) -> Result<Self, BlifError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BlifError::FileNotFound(path.to_owned()));
        }
        let not_accessible = |msg: String| BlifError::FileNotAccessible(path.to_owned(), msg);

        let file = File::open(path).map_err(|e| not_accessible(e.to_string()))?;
        let meta = file.metadata().map_err(|e| not_accessible(e.to_string()))?;
        if !meta.is_file() {
            return Err(not_accessible("not a regular file".to_owned()));
        }
        if meta.len() == 0 {
            return Err(BlifError::FileEmpty(path.to_owned()));
        }

        // SAFETY: lines are copied out of the mapping by `make_lines`.
        // Modifying the file while it is mapped is not supported.
        let mapped =
            unsafe { Mmap::map(&file) }.map_err(|e| not_accessible(format!("mmap failed: {e}")))?;
        log::debug!("mapped {} bytes from {}", mapped.len(), path.display());

        Ok(Self {
            source: Source::Mapped(mapped),
            lines: vec![],
        })
    }

    /// Wrap in-memory text. No lines exist until [`LineBuf::make_lines`] is called.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Source::Text(source.into()),
            lines: vec![],
        }
    }

    /// Split the buffered text into the line table.
    ///
    /// Returns false if no line is left.
    pub fn make_lines(&mut self, skip_blank: bool, trim_trailing_ws: bool) -> bool {
        let mut lines = vec![Line {
            text: String::new(),
            raw: 0,
        }];
        let mut physical = self.source.bytes().split(|b| *b == b'\n').peekable();
        let mut raw = 0;
        while let Some(bytes) = physical.next() {
            raw += 1;
            if physical.peek().is_none() && bytes.is_empty() {
                // text ended with a newline
                break;
            }
            let decoded = String::from_utf8_lossy(bytes);
            let text = decoded.strip_suffix('\r').unwrap_or(&*decoded);
            let text = if trim_trailing_ws {
                text.trim_end()
            } else {
                text
            };
            if skip_blank && text.trim().is_empty() {
                continue;
            }
            lines.push(Line {
                text: text.to_owned(),
                raw,
            });
        }
        self.lines = lines;
        log::debug!("made {} lines", self.len());
        self.len() > 0
    }

    /// Join every line ending in `\` with the line after it.
    ///
    /// The absorbed lines are left blank so indices of later lines do not move.
    /// Returns the number of joins performed.
    pub fn escape_nl(&mut self) -> usize {
        let mut joins = 0;
        let mut i = 1;
        while i < self.lines.len() {
            let mut next = i + 1;
            while let Some(keep) = continuation_prefix(&self.lines[i].text) {
                self.lines[i].text.truncate(keep);
                if next >= self.lines.len() {
                    break;
                }
                let absorbed = std::mem::take(&mut self.lines[next].text);
                let line = &mut self.lines[i].text;
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(absorbed.trim_start());
                next += 1;
                joins += 1;
            }
            i = next;
        }
        if joins > 0 {
            log::debug!("joined {joins} continuation lines");
        }
        joins
    }

    /// Number of lines, sentinel excluded
    pub fn len(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        if idx == 0 {
            return None;
        }
        self.lines.get(idx).map(|l| l.text.as_str())
    }

    /// Physical file line a logical line starts on
    pub fn raw_line(&self, idx: usize) -> Option<usize> {
        if idx == 0 {
            return None;
        }
        self.lines.get(idx).map(|l| l.raw)
    }

    /// Iterate over `(index, text)` of all lines
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, l)| (idx, l.text.as_str()))
    }
}

/// Length of `text` without a trailing continuation marker, if it has one
fn continuation_prefix(text: &str) -> Option<usize> {
    text.trim_end()
        .strip_suffix('\\')
        .map(|rest| rest.trim_end().len())
}
