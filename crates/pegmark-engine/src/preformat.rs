//! Input normalization ahead of parsing.
//!
//! Tabs are expanded to spaces against fixed tab stops and a trailing blank
//! line is appended, so the grammar never has to reason about tab widths or
//! an unterminated last line.

use std::io::{self, Read};

/// Tab stop width in columns.
pub const TAB_STOP: usize = 4;

/// Size of the read chunk and the initial capacity of the output buffer.
pub const BUFFER_SIZE: usize = 32 * 1024;

/// Reusable tab-expanding input reader.
///
/// Both buffers are kept between documents; only their contents are reset.
#[derive(Debug)]
pub struct Preformatter {
    chunk: Vec<u8>,
    out: Vec<u8>,
}

impl Default for Preformatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Preformatter {
    pub fn new() -> Self {
        Self {
            chunk: vec![0; BUFFER_SIZE],
            out: Vec::with_capacity(BUFFER_SIZE),
        }
    }

    /// Read all of `src`, expand tabs and append `"\n\n"`.
    ///
    /// Reads are not line aligned, so the column counter carries across
    /// chunks. Invalid UTF-8 is replaced with U+FFFD.
    pub fn preformat<R: Read>(&mut self, mut src: R) -> io::Result<String> {
        self.out.clear();
        let mut until_stop = TAB_STOP;

        loop {
            let n = match src.read(&mut self.chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let chunk = &self.chunk[..n];
            let mut flushed = 0;
            for (i, &byte) in chunk.iter().enumerate() {
                match byte {
                    b'\t' => {
                        self.out.extend_from_slice(&chunk[flushed..i]);
                        self.out.resize(self.out.len() + until_stop, b' ');
                        flushed = i + 1;
                        until_stop = TAB_STOP;
                    }
                    b'\n' => {
                        self.out.extend_from_slice(&chunk[flushed..=i]);
                        flushed = i + 1;
                        until_stop = TAB_STOP;
                    }
                    _ => {
                        until_stop -= 1;
                        if until_stop == 0 {
                            until_stop = TAB_STOP;
                        }
                    }
                }
            }
            self.out.extend_from_slice(&chunk[flushed..]);
        }

        self.out.extend_from_slice(b"\n\n");
        Ok(String::from_utf8_lossy(&self.out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn preformat(input: &[u8]) -> String {
        Preformatter::new().preformat(input).unwrap()
    }

    /// Hands out one byte per read, interrupted before every other byte.
    struct Trickle<'a> {
        bytes: &'a [u8],
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let Some((&first, rest)) = self.bytes.split_first() else {
                return Ok(0);
            };
            buf[0] = first;
            self.bytes = rest;
            Ok(1)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[rstest]
    #[case::leading_tab("\tx\n", "    x\n\n\n")]
    #[case::mid_stop("ab\tc\n", "ab  c\n\n\n")]
    #[case::at_stop("abcd\te", "abcd    e\n\n")]
    #[case::two_tabs("\t\tx", "        x\n\n")]
    #[case::newline_resets_column("abc\n\tb", "abc\n    b\n\n")]
    #[case::no_tabs("plain text\nline two\n", "plain text\nline two\n\n\n")]
    #[case::empty("", "\n\n")]
    fn expands_tabs(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(preformat(input.as_bytes()), expected);
    }

    #[rstest]
    fn tab_fills_to_next_stop(#[values(0, 1, 2, 3, 4, 5, 6, 7)] column: usize) {
        let input = format!("{}\tx", "a".repeat(column));
        let out = preformat(input.as_bytes());
        let spaces = out.chars().skip(column).take_while(|&c| c == ' ').count();
        assert_eq!(spaces, TAB_STOP - column % TAB_STOP);
    }

    #[test]
    fn column_carries_across_reads() {
        let input = b"ab\tc\n\tline\n";
        let mut preformatter = Preformatter::new();
        let trickled = preformatter
            .preformat(Trickle {
                bytes: input,
                interrupt: false,
            })
            .unwrap();
        assert_eq!(trickled, "ab  c\n    line\n\n\n");
    }

    #[test]
    fn read_errors_are_returned() {
        let err = Preformatter::new().preformat(Broken).unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(preformat(b"a\xffb"), "a\u{fffd}b\n\n");
    }

    #[test]
    fn buffers_are_reused() {
        let mut preformatter = Preformatter::new();
        preformatter.preformat(&b"first document\n"[..]).unwrap();
        assert_eq!(preformatter.preformat(&b"x"[..]).unwrap(), "x\n\n");
    }
}
