//! Streaming TSV reader that yields fixed-size chunks of records.
//!
//! The first non-blank line is the header. Every following row is zipped
//! against it into a field-name to value map; the zip stops at whichever of
//! the two is shorter. Values stay strings exactly as read. Tabs always
//! split: quoting is not interpreted.

use std::num::NonZeroUsize;

use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// One row keyed by header field names. This is the wire shape of a record
/// inside a bulk submit.
pub type Record = Map<String, Value>;

/// Reads a TSV source lazily, one chunk at a time.
pub struct TsvChunkReader<R> {
    lines: Lines<R>,
    header: Vec<String>,
    chunk_size: NonZeroUsize,
}

impl<R: AsyncBufRead + Unpin> TsvChunkReader<R> {
    /// Read the header row and prepare to stream chunks.
    ///
    /// Returns `Ok(None)` when the source holds no header at all.
    pub async fn new(reader: R, chunk_size: NonZeroUsize) -> std::io::Result<Option<Self>> {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let header = split_fields(&line).map(str::to_owned).collect();
            return Ok(Some(Self {
                lines,
                header,
                chunk_size,
            }));
        }
        Ok(None)
    }

    /// Field names from the header row, in column order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Read up to `chunk_size` rows. Returns `Ok(None)` once the source is
    /// exhausted; a returned chunk is never empty.
    pub async fn next_chunk(&mut self) -> std::io::Result<Option<Vec<Record>>> {
        let mut chunk = Vec::with_capacity(self.chunk_size.get().min(4096));
        while chunk.len() < self.chunk_size.get() {
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            chunk.push(self.zip_row(&line));
        }
        Ok((!chunk.is_empty()).then_some(chunk))
    }

    fn zip_row(&self, line: &str) -> Record {
        self.header
            .iter()
            .zip(split_fields(line))
            .map(|(key, value)| (key.clone(), Value::String(value.to_owned())))
            .collect()
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.strip_suffix('\r').unwrap_or(line).split('\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    async fn read_all(input: &str, chunk_size: usize) -> Vec<Vec<Record>> {
        let mut reader = TsvChunkReader::new(input.as_bytes(), size(chunk_size))
            .await
            .unwrap()
            .unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = reader.next_chunk().await.unwrap() {
            chunks.push(chunk);
        }
        chunks
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn header_defines_field_names() {
        let reader = TsvChunkReader::new("a\tb\tc\n1\t2\t3\n".as_bytes(), size(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reader.header(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn rows_are_zipped_against_header() {
        let chunks = read_all("a\tb\tc\n1\t2\t3\n4\t5\t6\n", 10).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0][0], record(json!({"a": "1", "b": "2", "c": "3"})));
        assert_eq!(chunks[0][1], record(json!({"a": "4", "b": "5", "c": "6"})));
    }

    #[tokio::test]
    async fn rows_are_split_into_fixed_size_chunks() {
        let input = "n\n1\n2\n3\n4\n5\n";
        let sizes: Vec<_> = read_all(input, 2).await.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn exact_multiple_has_no_empty_trailing_chunk() {
        let sizes: Vec<_> = read_all("n\n1\n2\n3\n4\n", 2).await.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2]);
    }

    #[tokio::test]
    async fn zip_stops_at_shorter_side() {
        let chunks = read_all("a\tb\tc\n1\t2\n7\t8\t9\t10\n", 10).await;
        assert_eq!(chunks[0][0], record(json!({"a": "1", "b": "2"})));
        assert_eq!(chunks[0][1], record(json!({"a": "7", "b": "8", "c": "9"})));
    }

    #[tokio::test]
    async fn crlf_and_blank_lines_are_tolerated() {
        let chunks = read_all("\r\na\tb\r\n1\t2\r\n\r\n3\t4\r\n", 10).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[0][1], record(json!({"a": "3", "b": "4"})));
    }

    #[tokio::test]
    async fn empty_values_are_kept() {
        let chunks = read_all("a\tb\n\t2\n", 10).await;
        assert_eq!(chunks[0][0], record(json!({"a": "", "b": "2"})));
    }

    #[tokio::test]
    async fn empty_source_has_no_header() {
        let reader = TsvChunkReader::new("".as_bytes(), size(10)).await.unwrap();
        assert!(reader.is_none());
    }

    #[tokio::test]
    async fn header_only_source_has_no_chunks() {
        assert!(read_all("a\tb\n", 10).await.is_empty());
    }
}
