//! Table column metadata.
//!
//! ASCII and binary table HDUs describe their columns through indexed
//! keywords: `TFIELDS` (column count), `TTYPEn` (name), `TFORMn` (format
//! code), `TBCOLn` (start column, ASCII only), `TUNITn` (physical unit).
//! [`TableInfo::from_store`] is the post-read step that collects these from
//! an HDB's keyword store without altering it.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::store::KeywordStore;

/// Which table family a column layout belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// XTENSION = 'TABLE': fixed-width printable ASCII fields.
    Ascii,
    /// XTENSION = 'BINTABLE': packed big-endian binary fields.
    Binary,
}

/// A parsed `TFORMn` format code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFormat {
    /// Repeat count (binary tables; always 1 for ASCII).
    pub repeat: usize,
    /// The data-type character, e.g. `I`, `E`, `A`.
    pub type_char: char,
    /// Field width in characters (ASCII tables).
    pub width: Option<usize>,
    /// Digits after the decimal point (ASCII `F`/`E`/`D` forms).
    pub decimals: Option<usize>,
}

/// One table column: name, raw and parsed format, unit, ASCII start column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Column name from `TTYPEn`, empty when the keyword is absent.
    pub name: String,
    /// Raw `TFORMn` code as stored in the header.
    pub tform: String,
    pub format: ColumnFormat,
    /// Physical unit from `TUNITn`, empty when absent.
    pub unit: String,
    /// 1-based field start column from `TBCOLn`; ASCII tables only.
    pub start_col: Option<i64>,
}

/// Column layout of one table HDU.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub kind: TableKind,
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// An empty layout, used by freshly created table HDBs before any
    /// columns are declared.
    pub fn empty(kind: TableKind) -> Self {
        TableInfo {
            kind,
            columns: Vec::new(),
        }
    }

    /// Collect the column layout from a table HDU's keyword store.
    ///
    /// `TFIELDS` and every `TFORMn` are required; `TTYPEn` and `TUNITn`
    /// default to empty. `TBCOLn` is required for ASCII tables and ignored
    /// for binary tables.
    pub fn from_store(kind: TableKind, store: &KeywordStore) -> Result<TableInfo> {
        let tfields: i64 = match store.find("TFIELDS") {
            Ok(k) => k.to()?,
            Err(_) => return Err(Error::MissingKeyword("TFIELDS")),
        };
        if tfields < 0 {
            return Err(Error::InvalidValue);
        }

        let mut columns = Vec::with_capacity(tfields as usize);
        for n in 1..=tfields {
            let tform: String = store.find(&format!("TFORM{n}"))?.to()?;
            let format = parse_tform(kind, &tform)?;

            let name = store
                .find(&format!("TTYPE{n}"))
                .and_then(|k| k.to::<String>())
                .unwrap_or_default();
            let unit = store
                .find(&format!("TUNIT{n}"))
                .and_then(|k| k.to::<String>())
                .unwrap_or_default();

            let start_col = match kind {
                TableKind::Ascii => Some(store.find(&format!("TBCOL{n}"))?.to()?),
                TableKind::Binary => None,
            };

            columns.push(ColumnInfo {
                name,
                tform,
                format,
                unit,
                start_col,
            });
        }

        Ok(TableInfo { kind, columns })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Find a column by name, case-insensitive, first match.
    pub fn find_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Parse a `TFORMn` format code.
///
/// ASCII codes are `Tw[.d]` with `T` one of `A I F E D`. Binary codes are
/// `rT` with an optional leading repeat count and `T` one of
/// `L X B I J K A E D C M P Q`; trailing display hints after the type
/// character are ignored.
pub fn parse_tform(kind: TableKind, code: &str) -> Result<ColumnFormat> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::InvalidValue);
    }

    match kind {
        TableKind::Ascii => {
            let mut chars = code.chars();
            let type_char = chars.next().unwrap_or(' ');
            if !matches!(type_char, 'A' | 'I' | 'F' | 'E' | 'D') {
                return Err(Error::InvalidValue);
            }
            let rest = chars.as_str();
            let (width_text, decimals_text) = match rest.split_once('.') {
                Some((w, d)) => (w, Some(d)),
                None => (rest, None),
            };
            let width = if width_text.is_empty() {
                None
            } else {
                Some(width_text.parse().map_err(|_| Error::InvalidValue)?)
            };
            let decimals = match decimals_text {
                Some(d) => Some(d.parse().map_err(|_| Error::InvalidValue)?),
                None => None,
            };
            Ok(ColumnFormat {
                repeat: 1,
                type_char,
                width,
                decimals,
            })
        }
        TableKind::Binary => {
            let digits_end = code
                .find(|c: char| !c.is_ascii_digit())
                .ok_or(Error::InvalidValue)?;
            let repeat = if digits_end == 0 {
                1
            } else {
                code[..digits_end].parse().map_err(|_| Error::InvalidValue)?
            };
            let type_char = code[digits_end..].chars().next().unwrap_or(' ');
            if !matches!(
                type_char,
                'L' | 'X' | 'B' | 'I' | 'J' | 'K' | 'A' | 'E' | 'D' | 'C' | 'M' | 'P' | 'Q'
            ) {
                return Err(Error::InvalidValue);
            }
            Ok(ColumnFormat {
                repeat,
                type_char,
                width: None,
                decimals: None,
            })
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::Keyword;

    fn table_store() -> KeywordStore {
        let mut store = KeywordStore::new();
        store.push(Keyword::new("TFIELDS", 2i32, "number of columns").unwrap());
        store.push(Keyword::new("TTYPE1", "OBJECT", "").unwrap());
        store.push(Keyword::new("TFORM1", "A12", "").unwrap());
        store.push(Keyword::new("TBCOL1", 1i32, "").unwrap());
        store.push(Keyword::new("TTYPE2", "MAG", "").unwrap());
        store.push(Keyword::new("TFORM2", "F8.3", "").unwrap());
        store.push(Keyword::new("TBCOL2", 14i32, "").unwrap());
        store.push(Keyword::new("TUNIT2", "mag", "").unwrap());
        store
    }

    #[test]
    fn ascii_layout_from_store() {
        let info = TableInfo::from_store(TableKind::Ascii, &table_store()).unwrap();
        assert_eq!(info.column_count(), 2);

        assert_eq!(info.columns[0].name, "OBJECT");
        assert_eq!(info.columns[0].format.type_char, 'A');
        assert_eq!(info.columns[0].format.width, Some(12));
        assert_eq!(info.columns[0].start_col, Some(1));

        assert_eq!(info.columns[1].format.type_char, 'F');
        assert_eq!(info.columns[1].format.width, Some(8));
        assert_eq!(info.columns[1].format.decimals, Some(3));
        assert_eq!(info.columns[1].unit, "mag");
    }

    #[test]
    fn binary_layout_ignores_tbcol() {
        let mut store = KeywordStore::new();
        store.push(Keyword::new("TFIELDS", 2i32, "").unwrap());
        store.push(Keyword::new("TTYPE1", "RA", "").unwrap());
        store.push(Keyword::new("TFORM1", "1D", "").unwrap());
        store.push(Keyword::new("TTYPE2", "FLUX", "").unwrap());
        store.push(Keyword::new("TFORM2", "10E", "").unwrap());

        let info = TableInfo::from_store(TableKind::Binary, &store).unwrap();
        assert_eq!(info.columns[0].format.type_char, 'D');
        assert_eq!(info.columns[0].format.repeat, 1);
        assert_eq!(info.columns[1].format.repeat, 10);
        assert_eq!(info.columns[1].start_col, None);
    }

    #[test]
    fn missing_tfields_is_error() {
        let store = KeywordStore::new();
        assert!(matches!(
            TableInfo::from_store(TableKind::Binary, &store),
            Err(Error::MissingKeyword("TFIELDS"))
        ));
    }

    #[test]
    fn missing_tform_is_error() {
        let mut store = KeywordStore::new();
        store.push(Keyword::new("TFIELDS", 1i32, "").unwrap());
        assert!(TableInfo::from_store(TableKind::Binary, &store).is_err());
    }

    #[test]
    fn find_column_case_insensitive() {
        let info = TableInfo::from_store(TableKind::Ascii, &table_store()).unwrap();
        assert!(info.find_column("object").is_some());
        assert!(info.find_column("FLUX").is_none());
    }

    #[test]
    fn tform_binary_default_repeat() {
        let f = parse_tform(TableKind::Binary, "J").unwrap();
        assert_eq!(f.repeat, 1);
        assert_eq!(f.type_char, 'J');
    }

    #[test]
    fn tform_rejects_garbage() {
        assert!(parse_tform(TableKind::Ascii, "Z9").is_err());
        assert!(parse_tform(TableKind::Binary, "12").is_err());
        assert!(parse_tform(TableKind::Binary, "").is_err());
    }
}
