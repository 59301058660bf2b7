//! Value classification and header-unit codec adapters.
//!
//! [`infer_value_type`] classifies raw card value text into the five FITS
//! value families; [`infer_integer_kind`] narrows integer text to the
//! smallest keyword kind that can represent it. [`HduReader`] and
//! [`HduWriter`] bridge the card layer and the block layer in [`hdb`](crate::hdb).

use alloc::string::String;
use alloc::vec::Vec;

use crate::block::CARD_SIZE;
use crate::card::{self, format_commentary_card, format_value_card, kw, Card};
use crate::error::{Error, Result};
use crate::keyword::KeywordKind;

// ── Value classification ──

/// The five FITS value families, as written in a header card value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Character string, delimited by single quotes.
    Char,
    /// Logical, a single `T` or `F`.
    Logical,
    /// Integer, an optional sign followed by digits only.
    Int,
    /// Floating point, digits with a decimal point or exponent.
    Float,
    /// Complex, a parenthesized pair. Not supported by the keyword model.
    Complex,
}

/// Classify raw value text into its FITS value family.
///
/// The first character decides the family: a quote means string, `T`/`F`
/// means logical, `(` means complex. Numeric text is an integer unless it
/// contains a decimal point or an exponent character.
pub fn infer_value_type(text: &str) -> Result<ValueType> {
    let bytes = text.as_bytes();
    let first = match bytes.first() {
        Some(&b) => b,
        None => return Err(Error::InvalidValue),
    };

    match first {
        b'\'' => Ok(ValueType::Char),
        b'T' | b'F' => Ok(ValueType::Logical),
        b'(' => Ok(ValueType::Complex),
        b'+' | b'-' | b'.' | b'0'..=b'9' => {
            let is_float = bytes
                .iter()
                .any(|&b| matches!(b, b'.' | b'E' | b'e' | b'D' | b'd'));
            if is_float {
                Ok(ValueType::Float)
            } else {
                Ok(ValueType::Int)
            }
        }
        _ => Err(Error::InvalidValue),
    }
}

/// Narrow integer value text to the smallest keyword kind that holds it,
/// returning the kind together with the parsed value.
///
/// Negative values walk the signed ladder (i8, i16, i32, i64); non-negative
/// values alternate unsigned and signed widths (u8, i16, u16, i32, u32, i64)
/// so that the reported kind is always the tightest fit.
///
/// # Panics
///
/// Panics if the text does not parse as a 64-bit integer. The caller has
/// already classified it as [`ValueType::Int`], so this indicates a value
/// outside the representable range.
pub fn infer_integer_kind(text: &str) -> (KeywordKind, i64) {
    let value: i64 = match text.parse() {
        Ok(v) => v,
        Err(_) => panic!("integer keyword value not representable in 64 bits: {text}"),
    };

    let kind = if value < 0 {
        if value >= i8::MIN as i64 {
            KeywordKind::Int8
        } else if value >= i16::MIN as i64 {
            KeywordKind::Int16
        } else if value >= i32::MIN as i64 {
            KeywordKind::Int32
        } else {
            KeywordKind::Int64
        }
    } else if value <= u8::MAX as i64 {
        KeywordKind::UInt8
    } else if value <= i16::MAX as i64 {
        KeywordKind::Int16
    } else if value <= u16::MAX as i64 {
        KeywordKind::UInt16
    } else if value <= i32::MAX as i64 {
        KeywordKind::Int32
    } else if value <= u32::MAX as i64 {
        KeywordKind::UInt32
    } else {
        KeywordKind::Int64
    };

    (kind, value)
}

/// Parse float value text, accepting the Fortran `D` exponent marker.
pub fn parse_float_text(text: &str) -> Result<f64> {
    let normalized: String = text
        .chars()
        .map(|c| match c {
            'D' | 'd' => 'E',
            c => c,
        })
        .collect();
    normalized.parse().map_err(|_| Error::InvalidValue)
}

// ── Header-unit reader ──

/// The parsed header of one HDU, ready for the block layer to consume.
#[derive(Debug)]
pub struct HduReader {
    cards: Vec<Card>,
    header_len: usize,
}

impl HduReader {
    /// Parse the header blocks at the start of `data`, returning the reader
    /// and the number of bytes consumed (a multiple of the block size).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header_len = card::header_byte_len(data)?;
        let cards = card::parse_header_blocks(&data[..header_len])?;
        Ok(HduReader { cards, header_len })
    }

    /// The number of header bytes consumed, including block padding.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// All cards of this header, in file order, END excluded.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Find the first card with the given (already uppercase) keyword name.
    pub fn find(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.keyword_str() == name)
    }
}

// ── Header-unit writer ──

/// Accumulates formatted cards for one HDU header and emits complete,
/// space-padded 2880-byte blocks.
#[derive(Debug, Default)]
pub struct HduWriter {
    cards: Vec<[u8; CARD_SIZE]>,
}

impl HduWriter {
    pub fn new() -> Self {
        HduWriter { cards: Vec::new() }
    }

    /// The number of cards written so far, END excluded.
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn write_logical(&mut self, name: &str, value: bool, comment: &str) {
        let field = card::format_logical_field(value);
        self.cards
            .push(format_value_card(&kw(name.as_bytes()), field, comment));
    }

    pub fn write_int(&mut self, name: &str, value: i64, comment: &str) {
        let field = card::format_int_field(value);
        self.cards
            .push(format_value_card(&kw(name.as_bytes()), field, comment));
    }

    pub fn write_float(&mut self, name: &str, value: f64, comment: &str) {
        let field = card::format_float_field(value);
        self.cards
            .push(format_value_card(&kw(name.as_bytes()), field, comment));
    }

    pub fn write_string(&mut self, name: &str, value: &str, comment: &str) {
        let field = card::format_string_field(value);
        self.cards
            .push(format_value_card(&kw(name.as_bytes()), field, comment));
    }

    pub fn write_comment(&mut self, text: &str) {
        self.cards.push(format_commentary_card(&kw(b"COMMENT"), text));
    }

    pub fn write_history(&mut self, text: &str) {
        self.cards.push(format_commentary_card(&kw(b"HISTORY"), text));
    }

    /// Emit the accumulated cards as complete header blocks, appending the
    /// END card and padding the final block with spaces.
    pub fn finish(self) -> Vec<u8> {
        card::serialize_cards(&self.cards)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_SIZE;

    #[test]
    fn classify_string() {
        assert_eq!(infer_value_type("'NGC 1234'").unwrap(), ValueType::Char);
    }

    #[test]
    fn classify_logical() {
        assert_eq!(infer_value_type("T").unwrap(), ValueType::Logical);
        assert_eq!(infer_value_type("F").unwrap(), ValueType::Logical);
    }

    #[test]
    fn classify_integer() {
        assert_eq!(infer_value_type("42").unwrap(), ValueType::Int);
        assert_eq!(infer_value_type("-17").unwrap(), ValueType::Int);
        assert_eq!(infer_value_type("+8").unwrap(), ValueType::Int);
    }

    #[test]
    fn classify_float() {
        assert_eq!(infer_value_type("3.14").unwrap(), ValueType::Float);
        assert_eq!(infer_value_type("1E10").unwrap(), ValueType::Float);
        assert_eq!(infer_value_type("2.5D-3").unwrap(), ValueType::Float);
        assert_eq!(infer_value_type(".5").unwrap(), ValueType::Float);
    }

    #[test]
    fn classify_complex() {
        assert_eq!(infer_value_type("(1.0, 2.0)").unwrap(), ValueType::Complex);
    }

    #[test]
    fn classify_garbage() {
        assert!(infer_value_type("hello").is_err());
        assert!(infer_value_type("").is_err());
    }

    #[test]
    fn integer_kind_non_negative_ladder() {
        assert_eq!(infer_integer_kind("0").0, KeywordKind::UInt8);
        assert_eq!(infer_integer_kind("255").0, KeywordKind::UInt8);
        assert_eq!(infer_integer_kind("256").0, KeywordKind::Int16);
        assert_eq!(infer_integer_kind("32767").0, KeywordKind::Int16);
        assert_eq!(infer_integer_kind("32768").0, KeywordKind::UInt16);
        assert_eq!(infer_integer_kind("65535").0, KeywordKind::UInt16);
        assert_eq!(infer_integer_kind("65536").0, KeywordKind::Int32);
        assert_eq!(infer_integer_kind("2147483647").0, KeywordKind::Int32);
        assert_eq!(infer_integer_kind("2147483648").0, KeywordKind::UInt32);
        assert_eq!(infer_integer_kind("4294967295").0, KeywordKind::UInt32);
        assert_eq!(infer_integer_kind("4294967296").0, KeywordKind::Int64);
    }

    #[test]
    fn integer_kind_negative_ladder() {
        assert_eq!(infer_integer_kind("-1").0, KeywordKind::Int8);
        assert_eq!(infer_integer_kind("-128").0, KeywordKind::Int8);
        assert_eq!(infer_integer_kind("-129").0, KeywordKind::Int16);
        assert_eq!(infer_integer_kind("-32768").0, KeywordKind::Int16);
        assert_eq!(infer_integer_kind("-32769").0, KeywordKind::Int32);
        assert_eq!(infer_integer_kind("-2147483648").0, KeywordKind::Int32);
        assert_eq!(infer_integer_kind("-2147483649").0, KeywordKind::Int64);
    }

    #[test]
    fn integer_kind_returns_parsed_value() {
        assert_eq!(infer_integer_kind("-32769").1, -32769);
    }

    #[test]
    #[should_panic(expected = "not representable in 64 bits")]
    fn integer_kind_overflow_panics() {
        infer_integer_kind("99999999999999999999");
    }

    #[test]
    fn float_text_fortran_exponent() {
        assert!((parse_float_text("2.5D3").unwrap() - 2500.0).abs() < 1e-9);
        assert!((parse_float_text("1.5E2").unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn writer_emits_block_aligned_header() {
        let mut w = HduWriter::new();
        w.write_logical("SIMPLE", true, "conforms to FITS standard");
        w.write_int("BITPIX", 16, "bits per pixel");
        w.write_int("NAXIS", 0, "");
        let bytes = w.finish();
        assert_eq!(bytes.len(), BLOCK_SIZE);

        let reader = HduReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.cards().len(), 3);
        assert_eq!(reader.find("BITPIX").unwrap().value_text, "16");
    }

    #[test]
    fn writer_string_and_commentary() {
        let mut w = HduWriter::new();
        w.write_logical("SIMPLE", true, "");
        w.write_string("OBJECT", "M31", "target");
        w.write_comment("observing run 12");
        w.write_history("calibrated");
        let bytes = w.finish();

        let reader = HduReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.find("OBJECT").unwrap().value_text, "'M31'");
        assert_eq!(reader.cards()[2].keyword_str(), "COMMENT");
        assert_eq!(reader.cards()[2].comment, "observing run 12");
        assert_eq!(reader.cards()[3].keyword_str(), "HISTORY");
    }

    #[test]
    fn reader_reports_header_len() {
        let mut w = HduWriter::new();
        for i in 0..40 {
            w.write_int(&alloc::format!("KEY{i:05}"), i, "");
        }
        let bytes = w.finish();
        let reader = HduReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.header_len(), 2 * BLOCK_SIZE);
        assert_eq!(reader.cards().len(), 40);
    }
}
