//! The typed FITS header keyword model.
//!
//! A [`Keyword`] owns a case-normalized name, a comment, and exactly one
//! concrete value out of the closed set in [`KeywordValue`]. Conversions to
//! requested Rust types go through the [`FromKeyword`] trait and are
//! range-checked: narrowing a stored value into a type that cannot hold it is
//! a recoverable [`Error::CastOutOfRange`], not a silent truncation.

use alloc::format;
use alloc::string::{String, ToString};

use crate::card::Card;
use crate::codec::{self, HduWriter, ValueType};
use crate::error::{Error, Result};

// ── Kinds and values ──

/// Discriminant for the concrete keyword kinds.
///
/// `None` is the "absent" answer of
/// [`KeywordStore::kind_of`](crate::store::KeywordStore::kind_of); no stored
/// keyword ever reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    None,
    Logical,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    Float,
    Double,
    String,
}

impl KeywordKind {
    /// A short lowercase name for display purposes.
    pub fn name(&self) -> &'static str {
        match self {
            KeywordKind::None => "none",
            KeywordKind::Logical => "logical",
            KeywordKind::Int8 => "int8",
            KeywordKind::Int16 => "int16",
            KeywordKind::Int32 => "int32",
            KeywordKind::Int64 => "int64",
            KeywordKind::UInt8 => "uint8",
            KeywordKind::UInt16 => "uint16",
            KeywordKind::UInt32 => "uint32",
            KeywordKind::Float => "float",
            KeywordKind::Double => "double",
            KeywordKind::String => "string",
        }
    }
}

/// The value payload of a keyword, exactly one concrete kind. There is no
/// "no value" payload; a keyword always holds a value, and
/// [`KeywordKind::None`] only ever describes an absent lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Float(f32),
    Double(f64),
    String(String),
}

impl KeywordValue {
    pub fn kind(&self) -> KeywordKind {
        match self {
            KeywordValue::Logical(_) => KeywordKind::Logical,
            KeywordValue::Int8(_) => KeywordKind::Int8,
            KeywordValue::Int16(_) => KeywordKind::Int16,
            KeywordValue::Int32(_) => KeywordKind::Int32,
            KeywordValue::Int64(_) => KeywordKind::Int64,
            KeywordValue::UInt8(_) => KeywordKind::UInt8,
            KeywordValue::UInt16(_) => KeywordKind::UInt16,
            KeywordValue::UInt32(_) => KeywordKind::UInt32,
            KeywordValue::Float(_) => KeywordKind::Float,
            KeywordValue::Double(_) => KeywordKind::Double,
            KeywordValue::String(_) => KeywordKind::String,
        }
    }
}

impl From<bool> for KeywordValue {
    fn from(v: bool) -> Self {
        KeywordValue::Logical(v)
    }
}
impl From<i8> for KeywordValue {
    fn from(v: i8) -> Self {
        KeywordValue::Int8(v)
    }
}
impl From<i16> for KeywordValue {
    fn from(v: i16) -> Self {
        KeywordValue::Int16(v)
    }
}
impl From<i32> for KeywordValue {
    fn from(v: i32) -> Self {
        KeywordValue::Int32(v)
    }
}
impl From<i64> for KeywordValue {
    fn from(v: i64) -> Self {
        KeywordValue::Int64(v)
    }
}
impl From<u8> for KeywordValue {
    fn from(v: u8) -> Self {
        KeywordValue::UInt8(v)
    }
}
impl From<u16> for KeywordValue {
    fn from(v: u16) -> Self {
        KeywordValue::UInt16(v)
    }
}
impl From<u32> for KeywordValue {
    fn from(v: u32) -> Self {
        KeywordValue::UInt32(v)
    }
}
impl From<f32> for KeywordValue {
    fn from(v: f32) -> Self {
        KeywordValue::Float(v)
    }
}
impl From<f64> for KeywordValue {
    fn from(v: f64) -> Self {
        KeywordValue::Double(v)
    }
}
impl From<&str> for KeywordValue {
    fn from(v: &str) -> Self {
        KeywordValue::String(v.to_string())
    }
}
impl From<String> for KeywordValue {
    fn from(v: String) -> Self {
        KeywordValue::String(v)
    }
}

// ── Keyword ──

/// Remove the surrounding quotes from a string value: one leading quote if
/// present, and only after a leading quote was removed, one trailing quote.
/// A string with no leading quote keeps a trailing quote it may have.
fn strip_string_quotes(value: KeywordValue) -> KeywordValue {
    match value {
        KeywordValue::String(s) => {
            let mut t = s.as_str();
            if let Some(rest) = t.strip_prefix('\'') {
                t = rest;
                if let Some(rest) = t.strip_suffix('\'') {
                    t = rest;
                }
            }
            KeywordValue::String(t.to_string())
        }
        other => other,
    }
}

/// One FITS header keyword: name, concrete value, comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    name: String,
    value: KeywordValue,
    comment: String,
}

impl Keyword {
    /// Create a keyword. The name is normalized to uppercase; FITS keyword
    /// names are case-insensitive. String values have their surrounding
    /// quotes removed (a leading quote, and only then a trailing one), so
    /// `'M31'` and `M31` construct the same keyword.
    pub fn new(name: &str, value: impl Into<KeywordValue>, comment: &str) -> Result<Keyword> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyKeywordName);
        }
        Ok(Keyword {
            name: trimmed.to_ascii_uppercase(),
            value: strip_string_quotes(value.into()),
            comment: comment.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &KeywordValue {
        &self.value
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn kind(&self) -> KeywordKind {
        self.value.kind()
    }

    /// Replace the value in place. The new value must be of the same
    /// concrete kind as the current one. String values get the same quote
    /// stripping as construction.
    ///
    /// # Panics
    ///
    /// Panics if the kinds differ. Changing a keyword's kind is done by
    /// replacing the keyword in its store, not by mutating it.
    pub fn set_value(&mut self, value: impl Into<KeywordValue>) {
        let value = value.into();
        if value.kind() != self.value.kind() {
            panic!(
                "keyword {} holds {}, cannot assign {}",
                self.name,
                self.value.kind().name(),
                value.kind().name()
            );
        }
        self.value = strip_string_quotes(value);
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_string();
    }

    /// Convert the stored value to the requested type, range-checked.
    pub fn to<T: FromKeyword>(&self) -> Result<T> {
        T::from_keyword(self)
    }

    /// Construct a keyword from a parsed card with a non-empty value field.
    ///
    /// Integer text is narrowed to the smallest kind that holds it; float
    /// text always becomes a double. String cards keep their quoted text
    /// here; [`Keyword::new`] strips the quotes.
    ///
    /// # Panics
    ///
    /// Panics on complex-valued cards; the keyword model has no complex kind.
    pub(crate) fn from_card(card: &Card) -> Result<Keyword> {
        let text = card.value_text.as_str();
        let value = match codec::infer_value_type(text)? {
            ValueType::Char => KeywordValue::String(text.to_string()),
            ValueType::Logical => KeywordValue::Logical(text == "T"),
            ValueType::Int => {
                let (kind, v) = codec::infer_integer_kind(text);
                match kind {
                    KeywordKind::Int8 => KeywordValue::Int8(v as i8),
                    KeywordKind::Int16 => KeywordValue::Int16(v as i16),
                    KeywordKind::Int32 => KeywordValue::Int32(v as i32),
                    KeywordKind::UInt8 => KeywordValue::UInt8(v as u8),
                    KeywordKind::UInt16 => KeywordValue::UInt16(v as u16),
                    KeywordKind::UInt32 => KeywordValue::UInt32(v as u32),
                    _ => KeywordValue::Int64(v),
                }
            }
            ValueType::Float => KeywordValue::Double(codec::parse_float_text(text)?),
            ValueType::Complex => panic!(
                "complex keyword value is not supported: {} = {}",
                card.keyword_str(),
                text
            ),
        };
        Keyword::new(card.keyword_str(), value, &card.comment)
    }

    /// Serialize this keyword as one header card. Strings are written
    /// without their quotes; the card layer adds them.
    pub fn write_to(&self, writer: &mut HduWriter) {
        match &self.value {
            KeywordValue::Logical(v) => writer.write_logical(&self.name, *v, &self.comment),
            KeywordValue::Int8(v) => writer.write_int(&self.name, *v as i64, &self.comment),
            KeywordValue::Int16(v) => writer.write_int(&self.name, *v as i64, &self.comment),
            KeywordValue::Int32(v) => writer.write_int(&self.name, *v as i64, &self.comment),
            KeywordValue::Int64(v) => writer.write_int(&self.name, *v, &self.comment),
            KeywordValue::UInt8(v) => writer.write_int(&self.name, *v as i64, &self.comment),
            KeywordValue::UInt16(v) => writer.write_int(&self.name, *v as i64, &self.comment),
            KeywordValue::UInt32(v) => writer.write_int(&self.name, *v as i64, &self.comment),
            KeywordValue::Float(v) => writer.write_float(&self.name, *v as f64, &self.comment),
            KeywordValue::Double(v) => writer.write_float(&self.name, *v, &self.comment),
            KeywordValue::String(v) => writer.write_string(&self.name, v, &self.comment),
        }
    }
}

impl PartialEq<str> for Keyword {
    fn eq(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

// ── Conversions ──

/// Conversion from a stored keyword value into a concrete Rust type.
///
/// Implementations are range-checked: a stored value that does not fit the
/// destination type yields [`Error::CastOutOfRange`], and a stored kind with
/// no sensible conversion to the destination yields [`Error::CastNotApplicable`].
pub trait FromKeyword: Sized {
    fn from_keyword(keyword: &Keyword) -> Result<Self>;
}

/// Widen any stored integer to i64 for range checking. Logicals are not
/// numbers; converting one yields [`Error::CastNotApplicable`].
fn integer_value(keyword: &Keyword) -> Result<i64> {
    match keyword.value() {
        KeywordValue::Int8(v) => Ok(*v as i64),
        KeywordValue::Int16(v) => Ok(*v as i64),
        KeywordValue::Int32(v) => Ok(*v as i64),
        KeywordValue::Int64(v) => Ok(*v),
        KeywordValue::UInt8(v) => Ok(*v as i64),
        KeywordValue::UInt16(v) => Ok(*v as i64),
        KeywordValue::UInt32(v) => Ok(*v as i64),
        _ => Err(Error::CastNotApplicable),
    }
}

macro_rules! impl_from_keyword_int {
    ($($t:ty),*) => {$(
        impl FromKeyword for $t {
            fn from_keyword(keyword: &Keyword) -> Result<Self> {
                let v = integer_value(keyword)?;
                if v < <$t>::MIN as i64 || v > <$t>::MAX as i64 {
                    return Err(Error::CastOutOfRange);
                }
                Ok(v as $t)
            }
        }
    )*};
}

impl_from_keyword_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromKeyword for f64 {
    fn from_keyword(keyword: &Keyword) -> Result<Self> {
        match keyword.value() {
            KeywordValue::Float(v) => Ok(*v as f64),
            KeywordValue::Double(v) => Ok(*v),
            _ => integer_value(keyword).map(|v| v as f64),
        }
    }
}

impl FromKeyword for f32 {
    fn from_keyword(keyword: &Keyword) -> Result<Self> {
        // Float-to-float width changes never fail; precision loss is
        // ordinary floating-point behavior.
        f64::from_keyword(keyword).map(|v| v as f32)
    }
}

impl FromKeyword for bool {
    fn from_keyword(keyword: &Keyword) -> Result<Self> {
        match keyword.value() {
            KeywordValue::Logical(v) => Ok(*v),
            _ => Err(Error::CastNotApplicable),
        }
    }
}

impl FromKeyword for String {
    fn from_keyword(keyword: &Keyword) -> Result<Self> {
        match keyword.value() {
            KeywordValue::Logical(v) => Ok(if *v { "T" } else { "F" }.to_string()),
            KeywordValue::Int8(v) => Ok(format!("{v}")),
            KeywordValue::Int16(v) => Ok(format!("{v}")),
            KeywordValue::Int32(v) => Ok(format!("{v}")),
            KeywordValue::Int64(v) => Ok(format!("{v}")),
            KeywordValue::UInt8(v) => Ok(format!("{v}")),
            KeywordValue::UInt16(v) => Ok(format!("{v}")),
            KeywordValue::UInt32(v) => Ok(format!("{v}")),
            KeywordValue::Float(v) => Ok(format!("{v}")),
            KeywordValue::Double(v) => Ok(format!("{v}")),
            KeywordValue::String(v) => Ok(v.clone()),
        }
    }
}

// ── Tests ──
