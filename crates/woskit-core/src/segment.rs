//! Streaming record-boundary scanner.
//!
//! A WoS export concatenates independent `<REC>` fragments with surrounding
//! noise (prolog, container tags, partial trailing data), so the stream is
//! scanned line by line rather than parsed as one document. Blocks that do
//! not parse as well-formed XML are dropped without aborting the scan.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use thiserror::Error;

use crate::Record;

/// Line prefix that opens a record block.
const REC_START: &str = "<REC";
/// Trimmed line suffix that closes a record block.
const REC_END: &str = "</REC>";

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress emitted after each segmented block is processed.
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    /// Record blocks segmented out of the stream so far.
    pub blocks_scanned: u64,
    /// Blocks that parsed as well-formed records.
    pub records_parsed: u64,
}

/// Lazy iterator over raw record blocks in a line stream.
///
/// Two-state scan: while seeking, lines are discarded until one starts
/// with the record start marker; while collecting, lines accumulate until
/// a trimmed line ends with the end marker, at which point the block is
/// emitted. End of input while collecting discards the partial block; a
/// block is only ever emitted once both markers were seen in order.
pub struct RecordBlocks<B> {
    lines: std::io::Lines<B>,
    done: bool,
}

impl<B: BufRead> RecordBlocks<B> {
    pub fn new(reader: B) -> Self {
        Self {
            lines: reader.lines(),
            done: false,
        }
    }
}

impl<B: BufRead> Iterator for RecordBlocks<B> {
    type Item = Result<String, std::io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut block = String::new();
        let mut collecting = false;
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if !collecting {
                if !line.starts_with(REC_START) {
                    continue;
                }
                collecting = true;
            }
            block.push_str(&line);
            block.push('\n');
            if line.trim().ends_with(REC_END) {
                return Some(Ok(block));
            }
        }
        // Input exhausted. A partially collected block has no end marker
        // and is discarded, not emitted.
        self.done = true;
        None
    }
}

/// Segment and parse records from a line source.
///
/// Blocks that fail to parse are dropped silently (debug-logged): they do
/// not appear in the output and do not error, but they do count toward
/// `limit`, which bounds segmentation attempts rather than successful
/// parses. `progress` is invoked once per processed block.
pub fn read_records<B: BufRead>(
    reader: B,
    limit: Option<usize>,
    mut progress: impl FnMut(ScanProgress),
) -> Result<Vec<Record>, SegmentError> {
    let mut records = Vec::new();
    let mut scanned: u64 = 0;

    for block in RecordBlocks::new(reader) {
        let block = block?;
        scanned += 1;
        match Record::parse(&block) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(block = scanned, error = %e, "dropping malformed record block");
            }
        }
        progress(ScanProgress {
            blocks_scanned: scanned,
            records_parsed: records.len() as u64,
        });
        if let Some(limit) = limit
            && scanned as usize >= limit
        {
            break;
        }
    }

    Ok(records)
}

/// Read records from a WoS XML file on disk.
pub fn read_xml(
    path: &Path,
    limit: Option<usize>,
    progress: impl FnMut(ScanProgress),
) -> Result<Vec<Record>, SegmentError> {
    let file = File::open(path)?;
    read_records(BufReader::new(file), limit, progress)
}

/// Read records from an in-memory WoS XML string.
pub fn read_xml_str(
    xml: &str,
    limit: Option<usize>,
    progress: impl FnMut(ScanProgress),
) -> Result<Vec<Record>, SegmentError> {
    read_records(Cursor::new(xml), limit, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_rec(uid: &str) -> String {
        format!(
            "<REC>\n<UID>{}</UID>\n<static_data><summary>\
             <doctypes><doctype>Article</doctype></doctypes>\
             </summary></static_data>\n</REC>",
            uid
        )
    }

    fn collect(xml: &str, limit: Option<usize>) -> Vec<Record> {
        read_xml_str(xml, limit, |_| {}).unwrap()
    }

    #[test]
    fn test_single_record() {
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<records>\n{}\n</records>\n",
            wrap_rec("WOS:1")
        );
        let records = collect(&xml, None);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].root().find("UID").unwrap().text(),
            "WOS:1"
        );
    }

    #[test]
    fn test_noise_between_records_is_skipped() {
        let xml = format!(
            "junk line\n{}\nmore junk\n{}\ntrailing noise\n",
            wrap_rec("WOS:1"),
            wrap_rec("WOS:2")
        );
        let records = collect(&xml, None);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unterminated_block_is_discarded() {
        let xml = format!(
            "{}\n<REC>\n<UID>WOS:PARTIAL</UID>\n",
            wrap_rec("WOS:1")
        );
        let records = collect(&xml, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].root().find("UID").unwrap().text(), "WOS:1");
    }

    #[test]
    fn test_malformed_block_dropped_silently() {
        let xml = format!(
            "{}\n<REC>\n<UID>WOS:BAD\n</REC>\n{}\n",
            wrap_rec("WOS:1"),
            wrap_rec("WOS:3")
        );
        let records = collect(&xml, None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].root().find("UID").unwrap().text(), "WOS:3");
    }

    #[test]
    fn test_limit_caps_scan() {
        let xml: String = (0..50)
            .map(|i| wrap_rec(&format!("WOS:{}", i)) + "\n")
            .collect();
        let records = collect(&xml, Some(25));
        assert_eq!(records.len(), 25);
    }

    #[test]
    fn test_limit_counts_attempts_not_parses() {
        // Three blocks, middle one malformed, cap of 2: the malformed
        // block consumes an attempt, so only the first record survives.
        let xml = format!(
            "{}\n<REC>\n<UID>oops\n</REC>\n{}\n",
            wrap_rec("WOS:1"),
            wrap_rec("WOS:3")
        );
        let records = collect(&xml, Some(2));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_end_marker_with_trailing_whitespace() {
        let xml = "<REC>\n<UID>WOS:1</UID>\n</REC>   \n";
        let records = collect(xml, None);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_single_line_record() {
        let xml = "<REC><UID>WOS:1</UID></REC>\n";
        let records = collect(xml, None);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_progress_reports_scanned_and_parsed() {
        let xml = format!(
            "{}\n<REC>\n<UID>oops\n</REC>\n{}\n",
            wrap_rec("WOS:1"),
            wrap_rec("WOS:3")
        );
        let mut last = None;
        let records = read_xml_str(&xml, None, |p| last = Some(p)).unwrap();
        assert_eq!(records.len(), 2);
        let last = last.unwrap();
        assert_eq!(last.blocks_scanned, 3);
        assert_eq!(last.records_parsed, 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(collect("", None).is_empty());
        assert!(collect("no records here\n", None).is_empty());
    }

    #[test]
    fn test_blocks_iterator_emits_raw_text() {
        let xml = "preamble\n<REC>\n<UID>WOS:1</UID>\n</REC>\n";
        let blocks: Vec<String> = RecordBlocks::new(Cursor::new(xml))
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].starts_with("<REC>\n"));
        assert!(blocks[0].trim_end().ends_with("</REC>"));
        assert!(!blocks[0].contains("preamble"));
    }
}
