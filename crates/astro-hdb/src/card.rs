//! FITS header card parsing and writing.
//!
//! This is the raw codec layer: it deals in 80-byte card images and hands the
//! higher layers `(keyword, value-text, comment)` tuples. Value text for
//! character values keeps its surrounding single quotes (doubled interior
//! quotes are collapsed); classifying the text into a concrete keyword kind
//! is the job of the [`codec`](crate::codec) module.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::str;

use crate::block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE, HEADER_PAD_BYTE};
use crate::error::{Error, Result};

// ── Types ──

/// A parsed FITS header card (one 80-byte keyword record).
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// The 8-byte keyword name, ASCII, left-justified, space-padded.
    pub keyword: [u8; 8],
    /// The raw value text. Empty for commentary and valueless cards.
    /// Character values keep one surrounding quote on each side.
    pub value_text: String,
    /// The comment text, empty when the card carries none.
    pub comment: String,
}

impl Card {
    /// Return the keyword as a trimmed UTF-8 string.
    pub fn keyword_str(&self) -> &str {
        let end = self
            .keyword
            .iter()
            .rposition(|&b| b != b' ')
            .map(|i| i + 1)
            .unwrap_or(0);
        str::from_utf8(&self.keyword[..end]).unwrap_or("")
    }

    /// Returns `true` if this card is the END keyword.
    pub fn is_end(&self) -> bool {
        &self.keyword == b"END     "
    }

    /// Returns `true` if this is a blank card (keyword is all spaces).
    pub fn is_blank(&self) -> bool {
        self.keyword.iter().all(|&b| b == b' ')
    }

    /// Returns `true` if this card carries a commentary keyword
    /// (COMMENT, HISTORY, or blank).
    pub fn is_commentary(&self) -> bool {
        let kw = self.keyword_str();
        kw == "COMMENT" || kw == "HISTORY" || self.is_blank()
    }
}

/// Pad a short keyword name to 8 bytes with trailing ASCII spaces.
pub const fn kw(name: &[u8]) -> [u8; 8] {
    let mut buf = [b' '; 8];
    let mut i = 0;
    while i < name.len() && i < 8 {
        buf[i] = name[i];
        i += 1;
    }
    buf
}

// ── Parsing ──

/// Keywords that never carry a value indicator. Their bytes 8..80 are free-form text.
const COMMENTARY_KEYWORDS: [&[u8; 8]; 3] = [b"COMMENT ", b"HISTORY ", b"        "];

fn is_commentary_keyword(keyword: &[u8; 8]) -> bool {
    COMMENTARY_KEYWORDS.contains(&keyword)
}

/// Split a non-string value field at the comment separator.
///
/// The FITS standard uses ` / ` (space-slash-space) but real-world files
/// produced by IDL and other tools omit the trailing space (e.g.
/// `BITPIX = -32 /No. of bits per pixel`). Both forms are accepted.
fn split_comment(field: &[u8]) -> (&[u8], String) {
    let len = field.len();
    let mut i = 0;
    while i + 1 < len {
        if field[i] == b' ' && field[i + 1] == b'/' {
            let value_part = &field[..i];
            // Skip the slash; also skip one optional space after it.
            let mut comment_start = i + 2;
            if comment_start < len && field[comment_start] == b' ' {
                comment_start += 1;
            }
            let comment = str::from_utf8(&field[comment_start..])
                .ok()
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default();
            return (value_part, comment);
        }
        i += 1;
    }
    (field, String::new())
}

/// Parse a FITS character-string value from the 70-byte value field.
///
/// String values begin with `'` at the first byte. The content continues
/// until the closing `'`; doubled single-quotes inside the string represent
/// a literal `'` and are collapsed here. The returned value text is the
/// content (trailing spaces trimmed) re-wrapped in one quote on each side.
fn parse_string(field: &[u8]) -> (String, String) {
    let mut content = String::new();
    let mut i = 1; // skip opening quote
    let len = field.len();

    loop {
        if i >= len {
            // Unterminated string: be lenient and accept what we have.
            break;
        }
        if field[i] == b'\'' {
            if i + 1 < len && field[i + 1] == b'\'' {
                content.push('\'');
                i += 2;
            } else {
                i += 1;
                break;
            }
        } else {
            content.push(field[i] as char);
            i += 1;
        }
    }

    // FITS pads string values to a minimum of 8 characters.
    let trimmed = content.trim_end();
    let value_text = format!("'{trimmed}'");

    let (_, comment) = split_comment(&field[i..]);
    (value_text, comment)
}

/// Parse a single 80-byte FITS header card.
pub fn parse_card(card_bytes: &[u8; CARD_SIZE]) -> Result<Card> {
    let mut keyword = [b' '; 8];
    keyword.copy_from_slice(&card_bytes[..8]);

    for &b in &keyword {
        match b {
            b'A'..=b'Z' | b'0'..=b'9' | b' ' | b'-' | b'_' => {}
            _ => return Err(Error::InvalidKeyword),
        }
    }

    if &keyword == b"END     " {
        return Ok(Card {
            keyword,
            value_text: String::new(),
            comment: String::new(),
        });
    }

    if is_commentary_keyword(&keyword) {
        let text = str::from_utf8(&card_bytes[8..CARD_SIZE])
            .map_err(|_| Error::InvalidHeader("non-UTF8 commentary text"))?
            .trim_end();
        return Ok(Card {
            keyword,
            value_text: String::new(),
            comment: text.to_string(),
        });
    }

    if card_bytes[8] == b'=' && card_bytes[9] == b' ' {
        let field = &card_bytes[10..CARD_SIZE];
        let first = field.iter().position(|&b| b != b' ');
        match first {
            Some(pos) if field[pos] == b'\'' => {
                let (value_text, comment) = parse_string(&field[pos..]);
                Ok(Card {
                    keyword,
                    value_text,
                    comment,
                })
            }
            Some(_) => {
                let (value_part, comment) = split_comment(field);
                let value_text = str::from_utf8(value_part)
                    .map_err(|_| Error::InvalidHeader("non-UTF8 value text"))?
                    .trim()
                    .to_string();
                Ok(Card {
                    keyword,
                    value_text,
                    comment,
                })
            }
            None => Ok(Card {
                keyword,
                value_text: String::new(),
                comment: String::new(),
            }),
        }
    } else {
        // No value indicator: the text bytes are treated as a comment,
        // same as cfitsio does for non-standard cards.
        let text = str::from_utf8(&card_bytes[8..CARD_SIZE])
            .map_err(|_| Error::InvalidHeader("non-UTF8 card text"))?
            .trim_end();
        Ok(Card {
            keyword,
            value_text: String::new(),
            comment: text.to_string(),
        })
    }
}

/// Parse consecutive 2880-byte header blocks until the END card is found.
///
/// Only complete 2880-byte blocks are scanned; trailing bytes shorter than a
/// full block are ignored. The END card itself is not returned.
pub fn parse_header_blocks(data: &[u8]) -> Result<Vec<Card>> {
    if data.len() < BLOCK_SIZE {
        return Err(Error::UnexpectedEof);
    }

    let mut cards = Vec::new();
    let num_blocks = data.len() / BLOCK_SIZE;

    for block_idx in 0..num_blocks {
        let block_start = block_idx * BLOCK_SIZE;
        for card_idx in 0..CARDS_PER_BLOCK {
            let card_start = block_start + card_idx * CARD_SIZE;
            let card_bytes: &[u8; CARD_SIZE] = data[card_start..card_start + CARD_SIZE]
                .try_into()
                .map_err(|_| Error::InvalidHeader("short card"))?;

            let card = parse_card(card_bytes)?;
            if card.is_end() {
                return Ok(cards);
            }
            cards.push(card);
        }
    }

    Err(Error::UnexpectedEof)
}

/// Return the number of bytes consumed by the header (always a multiple of
/// [`BLOCK_SIZE`]), found by scanning complete blocks for the END card.
pub fn header_byte_len(data: &[u8]) -> Result<usize> {
    if data.len() < BLOCK_SIZE {
        return Err(Error::UnexpectedEof);
    }

    let num_blocks = data.len() / BLOCK_SIZE;

    for block_idx in 0..num_blocks {
        let block_start = block_idx * BLOCK_SIZE;
        for card_idx in 0..CARDS_PER_BLOCK {
            let card_start = block_start + card_idx * CARD_SIZE;
            if &data[card_start..card_start + 8] == b"END     " {
                return Ok((block_idx + 1) * BLOCK_SIZE);
            }
        }
    }

    Err(Error::UnexpectedEof)
}

// ── Value-field formatting ──

/// Right-justify `src` within `dest`, padding the left with spaces.
fn right_justify(src: &[u8], dest: &mut [u8]) {
    for b in dest.iter_mut() {
        *b = b' ';
    }
    let len = src.len().min(dest.len());
    let start = dest.len() - len;
    dest[start..start + len].copy_from_slice(&src[..len]);
}

/// Format a FITS logical value field: `T` or `F` in column 30 of the card.
pub fn format_logical_field(value: bool) -> [u8; 70] {
    let mut buf = [b' '; 70];
    buf[19] = if value { b'T' } else { b'F' };
    buf
}

/// Format an integer value field, right-justified in the first 20 bytes.
pub fn format_int_field(value: i64) -> [u8; 70] {
    let mut buf = [b' '; 70];
    let s = format!("{value}");
    right_justify(s.as_bytes(), &mut buf[..20]);
    buf
}

/// Format a floating-point value field, right-justified in the first 20
/// bytes, using exponential notation with as much precision as fits.
pub fn format_float_field(value: f64) -> [u8; 70] {
    let mut buf = [b' '; 70];
    let s = format_float(value, 20);
    right_justify(s.as_bytes(), &mut buf[..20]);
    buf
}

fn format_float(f: f64, max_len: usize) -> String {
    if f == 0.0 {
        return String::from("0.0");
    }
    // Start with high precision and reduce until the result fits.
    let mut precision = 15usize;
    loop {
        let s = format!("{f:.precision$E}");
        if s.len() <= max_len || precision == 0 {
            return s;
        }
        precision -= 1;
    }
}

/// Format a character-string value field: opening quote at byte 0, interior
/// quotes doubled, content padded to a minimum of 8 characters.
pub fn format_string_field(value: &str) -> [u8; 70] {
    let mut buf = [b' '; 70];
    let mut pos = 0;
    buf[pos] = b'\'';
    pos += 1;

    for ch in value.bytes() {
        if pos >= 69 {
            break; // leave room for the closing quote
        }
        if ch == b'\'' {
            if pos + 1 >= 69 {
                break;
            }
            buf[pos] = b'\'';
            buf[pos + 1] = b'\'';
            pos += 2;
        } else {
            buf[pos] = ch;
            pos += 1;
        }
    }

    while pos < 9 {
        buf[pos] = b' ';
        pos += 1;
    }

    if pos < 70 {
        buf[pos] = b'\'';
    }

    buf
}

/// Insert a ` / comment` string into a formatted 70-byte value field.
fn insert_comment(field: &mut [u8; 70], comment: &str) {
    let content_end = if field[0] == b'\'' {
        let mut i = 1;
        loop {
            if i >= 70 {
                break i;
            }
            if field[i] == b'\'' {
                if i + 1 < 70 && field[i + 1] == b'\'' {
                    i += 2;
                } else {
                    break i + 1;
                }
            } else {
                i += 1;
            }
        }
    } else {
        20
    };

    let sep_start = content_end + 1;
    if sep_start + 3 >= 70 {
        return;
    }

    field[sep_start] = b'/';
    field[sep_start + 1] = b' ';

    let comment_start = sep_start + 2;
    let comment_bytes = comment.as_bytes();
    let len = comment_bytes.len().min(70 - comment_start);
    field[comment_start..comment_start + len].copy_from_slice(&comment_bytes[..len]);
}

/// Assemble a complete 80-byte value card from a keyword name, a formatted
/// 70-byte value field, and an optional comment.
pub fn format_value_card(keyword: &[u8; 8], field: [u8; 70], comment: &str) -> [u8; CARD_SIZE] {
    let mut buf = [b' '; CARD_SIZE];
    buf[..8].copy_from_slice(keyword);
    buf[8] = b'=';
    buf[9] = b' ';

    let mut field = field;
    if !comment.is_empty() {
        insert_comment(&mut field, comment);
    }
    buf[10..80].copy_from_slice(&field);
    buf
}

/// Assemble an 80-byte commentary card (COMMENT, HISTORY, or blank keyword).
pub fn format_commentary_card(keyword: &[u8; 8], text: &str) -> [u8; CARD_SIZE] {
    let mut buf = [b' '; CARD_SIZE];
    buf[..8].copy_from_slice(keyword);
    let bytes = text.as_bytes();
    let len = bytes.len().min(72);
    buf[8..8 + len].copy_from_slice(&bytes[..len]);
    buf
}

/// Create the standard FITS END card.
pub fn format_end_card() -> [u8; CARD_SIZE] {
    let mut buf = [b' '; CARD_SIZE];
    buf[0] = b'E';
    buf[1] = b'N';
    buf[2] = b'D';
    buf
}

/// Serialize a sequence of raw 80-byte card images into complete header
/// blocks, appending the END card and padding the final block with spaces.
pub fn serialize_cards(cards: &[[u8; CARD_SIZE]]) -> Vec<u8> {
    let total_cards = cards.len() + 1; // +1 for END
    let total_blocks = total_cards.div_ceil(CARDS_PER_BLOCK);
    let mut buf = vec![HEADER_PAD_BYTE; total_blocks * BLOCK_SIZE];

    for (i, card) in cards.iter().enumerate() {
        let offset = i * CARD_SIZE;
        buf[offset..offset + CARD_SIZE].copy_from_slice(card);
    }

    let end_offset = cards.len() * CARD_SIZE;
    buf[end_offset..end_offset + CARD_SIZE].copy_from_slice(&format_end_card());

    buf
}

// ── Tests ──
