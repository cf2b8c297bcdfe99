//! Wire protocol shared by the storage client and server.
//!
//! Requests and responses are newline-terminated, `|`-delimited text lines
//! over one persistent stream. Raw payload bytes follow an `UPLOAD` request
//! or an `OK|DATA|<n>` response with no framing beyond the declared count.
//! The helpers are generic over [`BufRead`]/[`Write`] so both sides, and the
//! tests, can run them against in-memory buffers.

use std::io::{self, BufRead, Write};

pub const CMD_LIST: &str = "LIST";
pub const CMD_UPLOAD: &str = "UPLOAD";
pub const CMD_DOWNLOAD: &str = "DOWNLOAD";
pub const CMD_DELETE: &str = "DELETE";

pub const RESP_OK: &str = "OK";
pub const RESP_ERROR: &str = "ERROR";
pub const RESP_DATA: &str = "DATA";

/// Field separator within a protocol line.
pub const SEP: char = '|';

/// Write one protocol line, appending the terminating newline.
pub fn send_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Read one protocol line, stripping the trailing newline and any carriage
/// return. Returns `None` on a clean end of stream.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Read exactly `len` payload bytes. A short read is an error for the
/// operation; the connection itself stays up.
pub fn read_exact<R: BufRead>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// An `OK|...` or `ERROR|...` status line, split into status and message.
#[derive(Debug, PartialEq, Eq)]
pub struct Response {
    pub ok: bool,
    pub message: String,
}

impl Response {
    /// Parse a status line. Anything other than an `OK` status, including a
    /// line with no separator at all, is treated as an error response.
    pub fn parse(line: &str) -> Response {
        match line.split_once(SEP) {
            Some((status, message)) if status == RESP_OK => Response {
                ok: true,
                message: message.to_string(),
            },
            Some((_, message)) => Response {
                ok: false,
                message: message.to_string(),
            },
            None => Response {
                ok: false,
                message: line.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_send_line_appends_newline() {
        let mut buf = Vec::new();
        send_line(&mut buf, "LIST").unwrap();
        assert_eq!(buf, b"LIST\n");
    }

    #[test]
    fn test_read_line_strips_line_ending() {
        let mut cur = Cursor::new(b"OK|hello\r\nnext\n".to_vec());
        assert_eq!(read_line(&mut cur).unwrap(), Some("OK|hello".to_string()));
        assert_eq!(read_line(&mut cur).unwrap(), Some("next".to_string()));
        assert_eq!(read_line(&mut cur).unwrap(), None);
    }

    #[test]
    fn test_read_line_empty_line_is_not_eof() {
        let mut cur = Cursor::new(b"\nrest\n".to_vec());
        assert_eq!(read_line(&mut cur).unwrap(), Some(String::new()));
        assert_eq!(read_line(&mut cur).unwrap(), Some("rest".to_string()));
    }

    #[test]
    fn test_read_exact_short_read_is_error() {
        let mut cur = Cursor::new(b"abc".to_vec());
        assert!(read_exact(&mut cur, 5).is_err());
    }

    #[test]
    fn test_read_exact_leaves_remainder() {
        let mut cur = Cursor::new(b"abcde\nmore\n".to_vec());
        assert_eq!(read_exact(&mut cur, 5).unwrap(), b"abcde");
        assert_eq!(read_line(&mut cur).unwrap(), Some(String::new()));
        assert_eq!(read_line(&mut cur).unwrap(), Some("more".to_string()));
    }

    #[test]
    fn test_response_parse() {
        assert_eq!(
            Response::parse("OK|File uploaded successfully"),
            Response {
                ok: true,
                message: "File uploaded successfully".to_string()
            }
        );
        assert_eq!(
            Response::parse("ERROR|File not found"),
            Response {
                ok: false,
                message: "File not found".to_string()
            }
        );
        let garbled = Response::parse("garbled");
        assert!(!garbled.ok);
        assert_eq!(garbled.message, "garbled");
    }
}
