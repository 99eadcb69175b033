//! Lazy line sources for recorded event streams.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A finite, forward-only source of event lines. Restart by reopening.
pub trait EventStream {
    /// Returns the next line, or `None` at end of stream.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Any in-memory iterator of lines doubles as a stream; tests and demo
/// recordings use this.
impl<I> EventStream for I
where
    I: Iterator<Item = String>,
{
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.next())
    }
}

/// Event stream backed by a file on disk, one event per line, read lazily.
pub struct FileEventStream {
    reader: BufReader<File>,
}

impl FileEventStream {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
        })
    }
}

impl EventStream for FileEventStream {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_stream_yields_lines_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "note_on note=60 velocity=90 time=0").unwrap();
        writeln!(file, "note_off note=60 velocity=0 time=0.5").unwrap();
        file.flush().unwrap();

        let mut stream = FileEventStream::open(file.path()).unwrap();
        let first = stream.next_line().unwrap().unwrap();
        assert!(first.starts_with("note_on"));
        let second = stream.next_line().unwrap().unwrap();
        assert!(second.starts_with("note_off"));
        assert!(stream.next_line().unwrap().is_none());
        // Exhausted streams stay exhausted.
        assert!(stream.next_line().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_an_open_error() {
        assert!(FileEventStream::open("/nonexistent/events.txt").is_err());
    }

    #[test]
    fn test_iterator_streams() {
        let mut stream = vec!["a".to_string(), "b".to_string()].into_iter();
        assert_eq!(stream.next_line().unwrap().as_deref(), Some("a"));
        assert_eq!(stream.next_line().unwrap().as_deref(), Some("b"));
        assert_eq!(stream.next_line().unwrap(), None);
    }
}
