//! This module is responsible for SRT parsing and serialization.
//! It exposes helpers to read and write SRT blocks while preserving order.

use tracing::trace;

/// Represents a single SRT subtitle (index, time range, text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Parse SRT text into a list of subtitles.
/// Blocks that do not match the index/time-range grammar are skipped
/// silently; the parser resynchronizes at the next empty line. Order of
/// the surviving blocks is preserved.
pub fn parse(input: &str) -> Vec<Subtitle> {
    let mut subtitles = Vec::new();
    let mut lines = input.lines();
    'blocks: loop {
        // Find the next candidate index line.
        let index_line = loop {
            match lines.next() {
                Some(l) if l.trim().is_empty() => continue,
                Some(l) => break l,
                None => break 'blocks,
            }
        };
        let Ok(index) = index_line.trim().parse::<u32>() else {
            skip_block(&mut lines);
            continue;
        };
        let Some(time_line) = lines.next() else {
            break;
        };
        let Some((start_ms, end_ms)) = parse_times(time_line) else {
            skip_block(&mut lines);
            continue;
        };
        // Text runs until a truly empty line; lines holding only
        // whitespace stay part of the text.
        let mut text: Vec<&str> = Vec::new();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            text.push(line);
        }
        let text = text.join("\n").trim_end().to_string();
        subtitles.push(Subtitle {
            index,
            start_ms,
            end_ms,
            text,
        });
    }
    trace!("parsed {} subtitles", subtitles.len());
    subtitles
}

/// Format subtitles back to SRT text.
/// Each block is written sequentially with a trailing blank line.
pub fn format(subtitles: &[Subtitle]) -> String {
    let mut out = String::new();
    for sub in subtitles {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            sub.index,
            format_time(sub.start_ms),
            format_time(sub.end_ms),
            sub.text
        ));
    }
    out
}

/// Consume the remainder of a malformed block up to its blank line.
fn skip_block<'a>(lines: &mut impl Iterator<Item = &'a str>) {
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
    }
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000` to milliseconds.
fn parse_times(line: &str) -> Option<(u64, u64)> {
    let (start, end) = line.split_once(" --> ")?;
    Some((parse_time(start)?, parse_time(end)?))
}

/// Parse `HH:MM:SS,mmm` into milliseconds.
/// Field widths and component ranges are checked so that every accepted
/// timestamp renders back byte-identically.
fn parse_time(t: &str) -> Option<u64> {
    let parts: Vec<&str> = t.split([':', ',']).collect();
    if parts.len() != 4 {
        return None;
    }
    let widths = [2, 2, 2, 3];
    for (part, width) in parts.iter().zip(widths) {
        if part.len() != width || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    let h: u64 = parts[0].parse().ok()?;
    let m: u64 = parts[1].parse().ok()?;
    let s: u64 = parts[2].parse().ok()?;
    let ms: u64 = parts[3].parse().ok()?;
    if m >= 60 || s >= 60 {
        return None;
    }
    Some(((h * 60 + m) * 60 + s) * 1000 + ms)
}

/// Format milliseconds back to `HH:MM:SS,mmm`.
fn format_time(ms: u64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let ms = ms % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A single well-formed block round-trips to the identical text.
    #[test]
    fn roundtrip_srt() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n";
        let subtitles = parse(input);
        assert_eq!(subtitles.len(), 1);
        assert_eq!(
            subtitles[0],
            Subtitle {
                index: 1,
                start_ms: 1000,
                end_ms: 2000,
                text: "Hello".to_string(),
            }
        );
        assert_eq!(format(&subtitles), input);
    }

    /// N well-formed blocks parse to N subtitles in original order.
    #[test]
    fn preserves_order() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\na\n\n\
                     2\n00:00:01,000 --> 00:00:02,000\nb\n\n\
                     3\n00:00:02,000 --> 00:00:03,000\nc\n\n";
        let subtitles = parse(input);
        let indices: Vec<u32> = subtitles.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        let reparsed = parse(&format(&subtitles));
        assert_eq!(subtitles, reparsed);
    }

    /// Multi-line text is kept as one string joined with newlines.
    #[test]
    fn keeps_multiline_text() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nfirst line\nsecond line\n\n";
        let subtitles = parse(input);
        assert_eq!(subtitles[0].text, "first line\nsecond line");
        assert_eq!(format(&subtitles), input);
    }

    /// A line holding only whitespace does not terminate the block.
    #[test]
    fn whitespace_only_line_stays_in_text() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nabove\n \nbelow\n\n";
        let subtitles = parse(input);
        assert_eq!(subtitles.len(), 1);
        assert_eq!(subtitles[0].text, "above\n \nbelow");
    }

    /// Trailing whitespace is trimmed from the text.
    #[test]
    fn trims_trailing_whitespace() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nhello  \n\n";
        let subtitles = parse(input);
        assert_eq!(subtitles[0].text, "hello");
    }

    /// Blocks with a broken index or time line are dropped, not reported.
    #[test]
    fn skips_malformed_blocks() {
        let input = "not a subtitle\njust noise\n\n\
                     1\n00:00:00,000 --> 00:00:01,000\nkept\n\n\
                     2\nbroken time line\nlost\n\n\
                     3\n00:00:02,000 --> 00:00:03,000\nalso kept\n\n";
        let subtitles = parse(input);
        assert_eq!(subtitles.len(), 2);
        assert_eq!(subtitles[0].text, "kept");
        assert_eq!(subtitles[1].index, 3);
    }

    /// Out-of-range time components make the whole block malformed.
    #[test]
    fn rejects_out_of_range_times() {
        let input = "1\n00:99:00,000 --> 00:99:01,000\ndropped\n\n\
                     2\n00:00:00,000 --> 00:00:01,000\nkept\n\n";
        let subtitles = parse(input);
        assert_eq!(subtitles.len(), 1);
        assert_eq!(subtitles[0].index, 2);
    }

    /// Missing the final blank line still yields the last block.
    #[test]
    fn parses_block_at_end_of_input() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nlast";
        let subtitles = parse(input);
        assert_eq!(subtitles.len(), 1);
        assert_eq!(subtitles[0].text, "last");
    }

    /// Empty input parses to an empty sequence.
    #[test]
    fn parses_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n\n").is_empty());
    }
}
