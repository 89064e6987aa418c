//! Parses `hexdump`/`od` style text dumps back into the original bytes.
//!
//! A dump is a sequence of lines, each pairing an address column with
//! whitespace-separated numeric (or named-character) tokens, optionally
//! followed by a rendered-character panel. A lone `*` line marks rows the
//! dumping tool elided because they repeated the previous one; the parser
//! reconstructs them from the address arithmetic.

use crate::error::{Error, Result};
use crate::types::{Endianness, ScalarType};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

/// Tool flavor the dump came from. Selects the default address base,
/// numeric base, and word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `od`: octal addresses, octal 2-byte words.
    Od,
    /// `hexdump`: hex addresses, hex 2-byte words, optional `|...|` panel.
    Hexdump,
}

const FORMATS: &str = "od, hexdump";

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "od" => Ok(Format::Od),
            "hexdump" => Ok(Format::Hexdump),
            _ => Err(Error::Config {
                kind: "format",
                given: s.to_string(),
                expected: FORMATS,
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Od => write!(f, "od"),
            Format::Hexdump => write!(f, "hexdump"),
        }
    }
}

/// Numeric-base/word-size token. Overrides the format-implied numeric base,
/// and (for the `_bytes`/`_shorts`/`_ints`/`_quads` variants) the word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Octal,
    OctalBytes,
    OctalShorts,
    OctalInts,
    OctalQuads,
    Decimal,
    DecimalBytes,
    DecimalShorts,
    DecimalInts,
    DecimalQuads,
    Hex,
    HexBytes,
    HexShorts,
    HexInts,
    HexQuads,
}

const ENCODINGS: &str = "binary, octal[_bytes|_shorts|_ints|_quads], \
                         decimal[_bytes|_shorts|_ints|_quads], \
                         hex[_bytes|_shorts|_ints|_quads]";

impl Encoding {
    /// Numeric base this token implies.
    pub fn base(self) -> u32 {
        match self {
            Encoding::Binary => 2,
            Encoding::Octal
            | Encoding::OctalBytes
            | Encoding::OctalShorts
            | Encoding::OctalInts
            | Encoding::OctalQuads => 8,
            Encoding::Decimal
            | Encoding::DecimalBytes
            | Encoding::DecimalShorts
            | Encoding::DecimalInts
            | Encoding::DecimalQuads => 10,
            Encoding::Hex
            | Encoding::HexBytes
            | Encoding::HexShorts
            | Encoding::HexInts
            | Encoding::HexQuads => 16,
        }
    }

    /// Word size this token implies, or `None` when it only fixes the base.
    pub fn word_size(self) -> Option<u32> {
        match self {
            Encoding::OctalBytes | Encoding::DecimalBytes | Encoding::HexBytes => Some(1),
            Encoding::OctalShorts | Encoding::DecimalShorts | Encoding::HexShorts => Some(2),
            Encoding::OctalInts | Encoding::DecimalInts | Encoding::HexInts => Some(4),
            Encoding::OctalQuads | Encoding::DecimalQuads | Encoding::HexQuads => Some(8),
            _ => None,
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "binary" => Ok(Encoding::Binary),
            "octal" => Ok(Encoding::Octal),
            "octal_bytes" => Ok(Encoding::OctalBytes),
            "octal_shorts" => Ok(Encoding::OctalShorts),
            "octal_ints" => Ok(Encoding::OctalInts),
            "octal_quads" => Ok(Encoding::OctalQuads),
            "decimal" => Ok(Encoding::Decimal),
            "decimal_bytes" => Ok(Encoding::DecimalBytes),
            "decimal_shorts" => Ok(Encoding::DecimalShorts),
            "decimal_ints" => Ok(Encoding::DecimalInts),
            "decimal_quads" => Ok(Encoding::DecimalQuads),
            "hex" => Ok(Encoding::Hex),
            "hex_bytes" => Ok(Encoding::HexBytes),
            "hex_shorts" => Ok(Encoding::HexShorts),
            "hex_ints" => Ok(Encoding::HexInts),
            "hex_quads" => Ok(Encoding::HexQuads),
            _ => Err(Error::Config {
                kind: "encoding",
                given: s.to_string(),
                expected: ENCODINGS,
            }),
        }
    }
}

/// Construction-time parser options.
#[derive(Debug, Clone)]
pub struct Options {
    pub format: Option<Format>,
    pub encoding: Option<Encoding>,
    /// Maximum bytes decoded per line.
    pub segment: usize,
    /// Overrides the word width and supplies the byte order used to expand
    /// multi-byte words, e.g. a type pulled from an [crate::arch::Arch]
    /// table. Defaults to the unsigned little-endian type of the resolved
    /// word size.
    pub word_type: Option<ScalarType>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            format: None,
            encoding: None,
            segment: 16,
            word_type: None,
        }
    }
}

impl Options {
    /// Word width in bytes after format/encoding resolution, ignoring any
    /// explicit `word_type` override.
    pub fn resolved_word_size(&self) -> u32 {
        let implied = match self.format {
            Some(_) => 2,
            None => 1,
        };
        self.encoding
            .and_then(Encoding::word_size)
            .unwrap_or(implied)
    }
}

/// A configured dump parser. Holds only resolved configuration; every parse
/// call owns a private state record, so one `Parser` can serve sequential
/// calls but concurrent callers should construct their own.
#[derive(Debug)]
pub struct Parser {
    format: Option<Format>,
    address_base: u32,
    base: u32,
    word: ScalarType,
    segment_length: usize,
}

impl Parser {
    pub fn new(options: &Options) -> Result<Self> {
        if options.segment == 0 {
            return Err(Error::Config {
                kind: "segment length",
                given: "0".to_string(),
                expected: "a positive byte count",
            });
        }

        let (address_base, mut base) = match options.format {
            Some(Format::Od) => (8, 8),
            Some(Format::Hexdump) | None => (16, 16),
        };
        if let Some(encoding) = options.encoding {
            base = encoding.base();
        }
        let word_size = options.resolved_word_size();

        let word = match options.word_type {
            Some(ty) if ty.float => {
                return Err(Error::Config {
                    kind: "word type",
                    given: ty.name.to_string(),
                    expected: "an integer type",
                })
            }
            Some(ty) => ty,
            // od and hexdump render multi-byte words little-endian on the
            // targets we care about.
            None => ScalarType::unsigned(word_size, Endianness::Little).ok_or_else(|| {
                Error::Config {
                    kind: "word size",
                    given: word_size.to_string(),
                    expected: "1, 2, 4, or 8",
                }
            })?,
        };

        log::debug!(
            "parser configured: address base {}, numeric base {}, {}-byte {} words, {}-byte segments",
            address_base,
            base,
            word.size,
            word.endian,
            options.segment
        );

        Ok(Parser {
            format: options.format,
            address_base,
            base,
            word,
            segment_length: options.segment,
        })
    }

    /// Parses a dump from any line-by-line-iterable source.
    pub fn parse_lines<'a, I>(&self, lines: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut session = Session::new(self);
        for line in lines {
            session.feed(line)?;
        }
        session.finish()
    }

    /// Parses a dump from an open reader.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Vec<u8>> {
        let mut session = Session::new(self);
        for line in reader.lines() {
            session.feed(&line?)?;
        }
        session.finish()
    }
}

/// Constructs a parser from options and feeds it the textual source in one
/// call. This is the entry point file/text wrappers go through.
pub fn unhexdump<R: BufRead>(reader: R, options: &Options) -> Result<Vec<u8>> {
    Parser::new(options)?.parse(reader)
}

/// Per-call mutable state, created fresh for every parse and consumed by
/// [Session::finish].
struct Session<'p> {
    parser: &'p Parser,
    segment: Vec<u8>,
    buffer: Vec<u8>,
    first_addr: Option<u64>,
    last_addr: Option<u64>,
    repeat_pending: bool,
    line: usize,
}

impl<'p> Session<'p> {
    fn new(parser: &'p Parser) -> Self {
        Session {
            parser,
            segment: Vec::with_capacity(parser.segment_length),
            buffer: Vec::new(),
            first_addr: None,
            last_addr: None,
            repeat_pending: false,
            line: 0,
        }
    }

    fn feed(&mut self, line: &str) -> Result<()> {
        self.line += 1;

        // od output never carries a rendered-character panel; both the
        // hexdump format and the default configuration (which exists to
        // consume `hexdump -C`) must drop it before tokenizing.
        let line = match self.parser.format {
            Some(Format::Od) => line,
            _ => strip_panel(line),
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&addr_token, words)) = tokens.split_first() else {
            return Ok(());
        };

        // A lone `*` marks rows elided by the dumping tool.
        if addr_token == "*" && words.is_empty() {
            self.repeat_pending = true;
            return Ok(());
        }

        let addr = self.parse_int(addr_token, self.parser.address_base, "address")?;
        if self.first_addr.is_none() {
            self.first_addr = Some(addr);
        }

        if self.repeat_pending {
            self.expand_repeat(addr)?;
            self.repeat_pending = false;
        }

        self.segment.clear();
        for &token in words {
            if self.parser.base != 10 {
                if let Some(byte) = named_byte(token, self.parser.base) {
                    self.segment.push(byte);
                    continue;
                }
            }
            let value = self.parse_int(token, self.parser.base, "integer")?;
            self.parser.word.pack_into(value as i128, &mut self.segment)?;
        }
        self.segment.truncate(self.parser.segment_length);

        self.buffer.extend_from_slice(&self.segment);
        self.last_addr = Some(addr);
        Ok(())
    }

    /// Re-appends the previous segment once per elided row. The elided rows
    /// were full-width by construction (tools only compress identical full
    /// lines), so the stride is the configured segment length; anything else
    /// means the dump is corrupt.
    fn expand_repeat(&mut self, addr: u64) -> Result<()> {
        let last = self.last_addr.ok_or_else(|| Error::Inconsistent {
            line: self.line,
            reason: "repeat marker before any decoded line".to_string(),
        })?;
        let stride = self.parser.segment_length as u64;

        if self.segment.len() < self.parser.segment_length {
            return Err(Error::Inconsistent {
                line: self.line,
                reason: format!(
                    "repeat marker follows a {}-byte segment, expected {} bytes",
                    self.segment.len(),
                    self.parser.segment_length
                ),
            });
        }
        let delta = addr.checked_sub(last).filter(|&d| d > 0).ok_or_else(|| {
            Error::Inconsistent {
                line: self.line,
                reason: format!("address {addr:#x} does not advance past {last:#x}"),
            }
        })?;
        if delta % stride != 0 {
            return Err(Error::Inconsistent {
                line: self.line,
                reason: format!(
                    "address delta {delta} is not a multiple of the {stride}-byte segment length"
                ),
            });
        }

        let elided = (delta / stride - 1) as usize;
        log::debug!("expanding {} elided row(s) before line {}", elided, self.line);
        for _ in 0..elided {
            self.buffer.extend_from_slice(&self.segment);
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.repeat_pending {
            log::warn!("dump ends with a dangling repeat marker; nothing to expand");
        }
        let (Some(first), Some(last)) = (self.first_addr, self.last_addr) else {
            return Ok(Vec::new());
        };
        let span = last.checked_sub(first).ok_or_else(|| Error::Inconsistent {
            line: self.line,
            reason: format!("final address {last:#x} precedes first address {first:#x}"),
        })?;

        // The final line's bytes sit past `span`; a trailing bare-address
        // line (the usual od/hexdump epilogue) leaves an empty segment and
        // truncates the output to the address span exactly.
        let mut buffer = self.buffer;
        buffer.truncate(span as usize + self.segment.len());
        Ok(buffer)
    }

    fn parse_int(&self, token: &str, base: u32, what: &str) -> Result<u64> {
        u64::from_str_radix(token, base).map_err(|_| Error::Parse {
            token: token.to_string(),
            what: format!("a base-{base} {what}"),
            line: self.line,
        })
    }
}

/// Drops a trailing `|...|` rendered-character panel, if present.
fn strip_panel(line: &str) -> &str {
    let trimmed = line.trim_end();
    if !trimmed.ends_with('|') {
        return line;
    }
    match trimmed.find('|') {
        // The panel itself may render a `|` byte, so cut at the first bar.
        Some(start) if start > 0 && start < trimmed.len() - 1 => &trimmed[..start],
        _ => line,
    }
}

/// Decodes a named single-character token: a printable ASCII character, a
/// backslash control mnemonic, or (outside hex, where `ff` must stay
/// numeric) an `od`-style control-character name.
fn named_byte(token: &str, base: u32) -> Option<u8> {
    let bytes = token.as_bytes();
    if bytes.len() == 1 && (0x20..=0x7e).contains(&bytes[0]) {
        return Some(bytes[0]);
    }
    let byte = match token {
        "\\0" => 0x00,
        "\\a" => 0x07,
        "\\b" => 0x08,
        "\\t" => 0x09,
        "\\n" => 0x0a,
        "\\v" => 0x0b,
        "\\f" => 0x0c,
        "\\r" => 0x0d,
        _ if base < 16 => od_char_name(token)?,
        _ => return None,
    };
    Some(byte)
}

fn od_char_name(token: &str) -> Option<u8> {
    let byte = match token {
        "nul" => 0x00,
        "soh" => 0x01,
        "stx" => 0x02,
        "etx" => 0x03,
        "eot" => 0x04,
        "enq" => 0x05,
        "ack" => 0x06,
        "bel" => 0x07,
        "bs" => 0x08,
        "ht" => 0x09,
        "nl" => 0x0a,
        "vt" => 0x0b,
        "ff" => 0x0c,
        "cr" => 0x0d,
        "so" => 0x0e,
        "si" => 0x0f,
        "dle" => 0x10,
        "dc1" => 0x11,
        "dc2" => 0x12,
        "dc3" => 0x13,
        "dc4" => 0x14,
        "nak" => 0x15,
        "syn" => 0x16,
        "etb" => 0x17,
        "can" => 0x18,
        "em" => 0x19,
        "sub" => 0x1a,
        "esc" => 0x1b,
        "fs" => 0x1c,
        "gs" => 0x1d,
        "rs" => 0x1e,
        "us" => 0x1f,
        "sp" => 0x20,
        "del" => 0x7f,
        _ => return None,
    };
    Some(byte)
}
