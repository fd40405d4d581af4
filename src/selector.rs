//! EPS Body Selector
//!
//! Drives a single line-by-line pass over an EPS document, copying the
//! header and DSC (`%%`) comment lines verbatim while handing everything
//! else to the [`crate::lzw::Coder`]/[`crate::ascii85::Packer`] pipeline.
//!
//! A short look-ahead window (`DSCGRACE` lines) keeps a lone non-comment
//! line sandwiched between two DSC comments (e.g. `%%BeginSetup` / one
//! setup line / `%%EndSetup`) from opening a compressed segment of its
//! own; that would otherwise pay for a filter invocation and an EOD marker
//! to save almost nothing.

use crate::ascii85::Packer;
use crate::lzw::Coder;
use crate::Error;
use std::io::{BufRead, BufReader, Read, Write};

/// Maximum number of non-comment lines buffered before compression opens.
const DSCGRACE: usize = 10;
/// Maximum bytes read for one line, terminator included; longer lines are
/// split at this boundary rather than treated as an error (see SPEC_FULL §4.3).
const MAXSTR: usize = 1024;

const FILTER_LINE: &[u8] = b"currentfile/ASCII85Decode filter/LZWDecode filter cvx exec\n";
const ASCII_MAGIC: &[u8] = b"%!PS-Adobe-";
const BINARY_MAGIC: [u8; 4] = [0xC5, 0xD0, 0xD3, 0xC6];

/// Wraps a `Write` to count total bytes written, so `run` can report its
/// `(bytes_read, bytes_written)` result without threading a counter through
/// every call site that touches the sink (including the packer's own writes).
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Read one line (terminator included) into `line`, capped at `MAXSTR`
/// bytes. Returns the number of bytes read; `0` means end-of-file with
/// nothing left to read.
fn read_line_capped<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<usize, Error> {
    line.clear();
    loop {
        if line.len() >= MAXSTR {
            break;
        }
        let available = reader.fill_buf().map_err(Error::Read)?;
        if available.is_empty() {
            break;
        }
        let remaining_cap = MAXSTR - line.len();
        let take = available.len().min(remaining_cap);
        if let Some(pos) = available[..take].iter().position(|&b| b == b'\n') {
            line.extend_from_slice(&available[..=pos]);
            reader.consume(pos + 1);
            break;
        }
        line.extend_from_slice(&available[..take]);
        reader.consume(take);
        if take < available.len() {
            // hit the MAXSTR cap without finding a newline in this chunk
            break;
        }
    }
    Ok(line.len())
}

fn write_all<W: Write>(w: &mut W, buf: &[u8]) -> Result<(), Error> {
    w.write_all(buf).map_err(Error::Write)
}

fn is_dsc(line: &[u8]) -> bool {
    line.starts_with(b"%%")
}

/// Stream `input` through the selector/coder/packer pipeline into `output`.
/// Returns `(bytes read, bytes written)` on success.
pub fn run<R: Read, W: Write>(input: R, output: W) -> Result<(u64, u64), Error> {
    let mut reader = BufReader::new(input);
    let mut output = CountingWriter { inner: output, count: 0 };
    let mut bytes_read: u64 = 0;

    let mut first_line = Vec::new();
    let n = read_line_capped(&mut reader, &mut first_line)?;
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    bytes_read += n as u64;

    let has_ascii_magic = first_line.len() >= ASCII_MAGIC.len() && &first_line[..ASCII_MAGIC.len()] == ASCII_MAGIC;
    let has_binary_magic = first_line.len() >= 4 && first_line[..4] == BINARY_MAGIC;
    if !has_ascii_magic && !has_binary_magic {
        return Err(Error::Format);
    }
    write_all(&mut output, &first_line)?;

    'passthrough: loop {
        let mut candidate = Vec::new();
        let n = read_line_capped(&mut reader, &mut candidate)?;
        if n == 0 {
            break;
        }
        bytes_read += n as u64;

        if is_dsc(&candidate) {
            write_all(&mut output, &candidate)?;
            continue;
        }

        let mut buffered = vec![candidate];
        let mut found_dsc = false;
        let mut hit_eof = false;
        while buffered.len() < DSCGRACE {
            let mut line = Vec::new();
            let n = read_line_capped(&mut reader, &mut line)?;
            if n == 0 {
                hit_eof = true;
                break;
            }
            bytes_read += n as u64;
            let is_dsc_line = is_dsc(&line);
            buffered.push(line);
            if is_dsc_line {
                found_dsc = true;
                break;
            }
        }

        if found_dsc || hit_eof {
            for line in &buffered {
                write_all(&mut output, line)?;
            }
            if hit_eof {
                break;
            }
            continue;
        }

        // DSCGRACE consecutive non-comment lines: open a compressed segment.
        log::debug!("DSCGRACE={} non-comment lines, opening segment", DSCGRACE);
        write_all(&mut output, FILTER_LINE)?;
        let mut packer = Packer::new(&mut output);
        let mut coder = Coder::new();
        coder.begin(&mut packer)?;
        for line in &buffered {
            for &b in line {
                coder.feed(b, &mut packer)?;
            }
        }

        loop {
            let mut line = Vec::new();
            let n = read_line_capped(&mut reader, &mut line)?;
            if n == 0 {
                coder.end(packer)?;
                write_all(&mut output, b"\n")?;
                break 'passthrough;
            }
            bytes_read += n as u64;
            if is_dsc(&line) {
                coder.end(packer)?;
                write_all(&mut output, b"\n")?;
                write_all(&mut output, &line)?;
                break;
            }
            for &b in &line {
                coder.feed(b, &mut packer)?;
            }
        }
    }

    Ok((bytes_read, output.count))
}
