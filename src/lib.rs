//! # epscompress
//!
//! Compress the body of an Encapsulated PostScript (EPS) document into an
//! inline LZW/ASCII85 PostScript filter pipeline, leaving the header and
//! Document Structuring Convention (DSC) comments untouched.
//!
//! The three pipeline stages live in their own modules:
//! * `ascii85` packs variable-width LZW codes into Adobe's printable encoding
//! * `lzw` is a fixed-parameter, PostScript `LZWDecode`-compatible encoder
//! * `selector` drives the line-by-line pass that decides which runs of the
//!   input are passed through verbatim and which are handed to the encoder
//!
//! There is no decoder here: a conforming PostScript interpreter decodes the
//! output when it renders the page, so round-tripping back to bytes in this
//! crate is test-only scaffolding, never a shipped capability.
//!
//! ## File Example
//!
//! ```no_run
//! use epscompress::compress_file;
//! let (read, written) = compress_file("figure.eps", "figure.compressed.eps")
//!     .expect("compression failed");
//! eprintln!("read {} bytes, wrote {}", read, written);
//! ```
//!
//! ## Buffer Example
//!
//! ```
//! use epscompress::compress_slice;
//! let doc = b"%!PS-Adobe-3.0 EPSF-3.0\n%%EndComments\n".to_vec();
//! let compressed = epscompress::compress_slice(&doc).expect("compression failed");
//! ```

pub mod ascii85;
pub mod lzw;
pub mod selector;

use std::io::{Read, Write};
use std::path::Path;

/// Errors fatal to an encoding session.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("wrong number or type of arguments")]
    Argument,
    #[error("could not open input {path}: {source}")]
    InputOpen { path: String, source: std::io::Error },
    #[error("could not open output {path}: {source}")]
    OutputOpen { path: String, source: std::io::Error },
    #[error("input does not begin with a recognized EPS magic")]
    Format,
    #[error("input is empty")]
    EmptyInput,
    #[error("read failed: {0}")]
    Read(std::io::Error),
    #[error("write failed: {0}")]
    Write(std::io::Error),
}

/// Compress the body of an EPS document read from `input`, writing the
/// result to `output`. Returns `(bytes read, bytes written)` on success.
pub fn compress<R: Read, W: Write>(input: R, output: W) -> Result<(u64, u64), Error> {
    selector::run(input, output)
}

/// Convenience wrapper over an in-memory buffer.
pub fn compress_slice(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    compress(input, &mut out)?;
    Ok(out)
}

/// Convenience wrapper that opens both paths and streams between them.
pub fn compress_file<P: AsRef<Path>>(input: P, output: P) -> Result<(u64, u64), Error> {
    let in_path = input.as_ref();
    let out_path = output.as_ref();
    let in_file = std::fs::File::open(in_path).map_err(|source| Error::InputOpen {
        path: in_path.display().to_string(),
        source,
    })?;
    let out_file = std::fs::File::create(out_path).map_err(|source| Error::OutputOpen {
        path: out_path.display().to_string(),
        source,
    })?;
    compress(std::io::BufReader::new(in_file), std::io::BufWriter::new(out_file))
}
