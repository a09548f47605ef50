//! Line and field splitting shared by the item reader and the fetch helper.

use std::io::{self, BufRead};

/// Iterator over the raw byte lines of a reader.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. Terminators are not part of the
/// yielded line, and a terminator at the very end of the input does not produce
/// an extra empty line. Decoding is left to the caller.
pub struct RawLines<R> {
    reader: R,
    skip_lf: bool,
    done: bool,
}

impl<R: BufRead> RawLines<R> {
    /// Split `reader` into raw lines.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            skip_lf: false,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        let mut started = false;
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if buf.is_empty() {
                self.done = true;
                return started.then_some(Ok(line));
            }

            let mut start = 0;
            if self.skip_lf {
                self.skip_lf = false;
                if buf[0] == b'\n' {
                    start = 1;
                }
            }

            match buf[start..].iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(offset) => {
                    let end = start + offset;
                    line.extend_from_slice(&buf[start..end]);
                    self.skip_lf = buf[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Some(Ok(line));
                }
                None => {
                    let len = buf.len();
                    started |= len > start;
                    line.extend_from_slice(&buf[start..]);
                    self.reader.consume(len);
                }
            }
        }
    }
}

/// Concatenate the lines of `text` without re-inserting any line break.
pub fn concat_lines(text: &str) -> String {
    RawLines::new(text.as_bytes())
        .filter_map(std::result::Result::ok)
        .map(|line| String::from_utf8_lossy(&line).into_owned())
        .collect()
}

/// Split `line` on the literal `separator`.
///
/// Trailing empty fields are dropped, so `"Forest;"` yields one field and `";"`
/// yields none. A line without the separator, and any line when the separator is
/// empty, yields the line itself as the only field.
pub fn split_fields<'a>(line: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() || !line.contains(separator) {
        return vec![line];
    }

    let mut fields: Vec<&str> = line.split(separator).collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[u8]) -> Vec<String> {
        RawLines::new(input)
            .map(|line| String::from_utf8(line.unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn test_all_terminators_end_a_line() {
        assert_eq!(lines(b"a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_trailing_terminator_adds_no_line() {
        assert_eq!(lines(b"a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(lines(b"a\r"), vec!["a"]);
        assert!(lines(b"").is_empty());
    }

    #[test]
    fn test_blank_lines_are_kept() {
        assert_eq!(lines(b"a\n\n\r\nb"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn test_crlf_split_across_buffer_boundary() {
        let reader = io::BufReader::with_capacity(2, &b"ab\r\ncd"[..]);
        let collected: Vec<Vec<u8>> = RawLines::new(reader).map(Result::unwrap).collect();
        assert_eq!(collected, vec![b"ab".to_vec(), b"cd".to_vec()]);
    }

    #[test]
    fn test_concat_lines_drops_breaks() {
        assert_eq!(concat_lines("<html>\r\n<body>ok</body>\n</html>\n"), "<html><body>ok</body></html>");
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields("Island;4", ";"), vec!["Island", "4"]);
        assert_eq!(split_fields("Sol Ring", ";"), vec!["Sol Ring"]);
        assert_eq!(split_fields("a;b;c", ";"), vec!["a", "b", "c"]);
        assert_eq!(split_fields("Forest;", ";"), vec!["Forest"]);
        assert!(split_fields(";", ";").is_empty());
        assert_eq!(split_fields("", ";"), vec![""]);
        assert_eq!(split_fields("Island;4", ""), vec!["Island;4"]);
        assert_eq!(split_fields("Fire // Ice::2", "::"), vec!["Fire // Ice", "2"]);
    }
}
