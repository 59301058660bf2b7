//! The header-data-block facade.
//!
//! An [`Hdb`] models one FITS header-data unit: structural metadata held in
//! dedicated fields (BITPIX, the axis list, PCOUNT/GCOUNT, BSCALE/BZERO),
//! everything else in an insertion-ordered keyword store, plus comment and
//! history logs and an optional raw data unit. The block kind is a closed
//! payload union, not a class hierarchy: calling a kind-specific accessor on
//! the wrong payload is a programming error and panics.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::astrometry::AstrometryData;
use crate::codec::{HduReader, HduWriter};
use crate::data::{self, PixelData, VALID_BITPIX};
use crate::error::{Error, Result};
use crate::keyword::Keyword;
use crate::photometry::PhotometryData;
use crate::store::KeywordStore;
use crate::table::{TableInfo, TableKind};

/// The largest axis index the FITS standard permits.
pub const NAXIS_MAX: usize = 999;

/// Structural keywords serialized from dedicated fields; the generic
/// keyword loop must never emit them.
const RESERVED_KEYWORDS: [&str; 7] = [
    "SIMPLE", "XTENSION", "BITPIX", "GCOUNT", "PCOUNT", "BSCALE", "BZERO",
];

/// Returns `true` for keyword names the write path reserves for structural
/// cards. Any name starting with `NAXIS` is reserved, which also catches
/// non-axis names like `NAXISTYPE`.
pub fn is_reserved_keyword(name: &str) -> bool {
    if name.len() >= 5 && name[..5].eq_ignore_ascii_case("NAXIS") {
        return true;
    }
    RESERVED_KEYWORDS
        .iter()
        .any(|r| r.eq_ignore_ascii_case(name))
}

// ── Block kinds ──

/// Kind-specific payload of an HDB.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPayload {
    /// Primary array or IMAGE extension.
    Image,
    /// TABLE extension with its column layout.
    AsciiTable(TableInfo),
    /// BINTABLE extension with its column layout.
    BinaryTable(TableInfo),
    /// Astrometry lists layered on a BINTABLE.
    Astrometry(AstrometryData),
    /// Photometry observations layered on a BINTABLE.
    Photometry(PhotometryData),
}

impl BlockPayload {
    /// The XTENSION string this payload serializes as. Astrometry and
    /// photometry are BINTABLE specializations.
    pub fn xtension_name(&self) -> &'static str {
        match self {
            BlockPayload::Image => "IMAGE",
            BlockPayload::AsciiTable(_) => "TABLE",
            BlockPayload::BinaryTable(_)
            | BlockPayload::Astrometry(_)
            | BlockPayload::Photometry(_) => "BINTABLE",
        }
    }
}

// ── The facade ──

/// One header-data block.
#[derive(Debug, Clone, PartialEq)]
pub struct Hdb {
    is_primary: bool,
    name: String,
    simple: bool,
    bitpix: i64,
    axis_lengths: Vec<i64>,
    pcount: i64,
    gcount: i64,
    bscale: f64,
    bzero: f64,
    keywords: KeywordStore,
    comments: Vec<String>,
    history: Vec<String>,
    first_edit_done: bool,
    dirty: bool,
    has_data: bool,
    data: Vec<u8>,
    payload: BlockPayload,
}

impl Hdb {
    fn blank(is_primary: bool, name: &str, payload: BlockPayload) -> Hdb {
        Hdb {
            is_primary,
            name: name.to_ascii_uppercase(),
            simple: true,
            bitpix: 8,
            axis_lengths: Vec::new(),
            pcount: 0,
            gcount: 1,
            bscale: 1.0,
            bzero: 0.0,
            keywords: KeywordStore::new(),
            comments: Vec::new(),
            history: Vec::new(),
            first_edit_done: false,
            dirty: false,
            has_data: false,
            data: Vec::new(),
            payload,
        }
    }

    /// A fresh primary HDB: SIMPLE = T, BITPIX = 8, no axes.
    pub fn new_primary() -> Hdb {
        Hdb::blank(true, "PRIMARY", BlockPayload::Image)
    }

    /// A fresh IMAGE extension.
    pub fn new_image(name: &str) -> Hdb {
        Hdb::blank(false, name, BlockPayload::Image)
    }

    /// A fresh TABLE extension with an empty column layout.
    pub fn new_ascii_table(name: &str) -> Hdb {
        Hdb::blank(
            false,
            name,
            BlockPayload::AsciiTable(TableInfo::empty(TableKind::Ascii)),
        )
    }

    /// A fresh BINTABLE extension with an empty column layout.
    pub fn new_binary_table(name: &str) -> Hdb {
        Hdb::blank(
            false,
            name,
            BlockPayload::BinaryTable(TableInfo::empty(TableKind::Binary)),
        )
    }

    /// A fresh astrometry extension (BINTABLE specialization).
    pub fn new_astrometry(name: &str) -> Hdb {
        Hdb::blank(false, name, BlockPayload::Astrometry(AstrometryData::new()))
    }

    /// A fresh photometry extension (BINTABLE specialization).
    pub fn new_photometry(name: &str) -> Hdb {
        Hdb::blank(false, name, BlockPayload::Photometry(PhotometryData::new()))
    }

    // ── Identity ──

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_ascii_uppercase();
        self.dirty = true;
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// The SIMPLE flag. Only the primary block carries one; querying an
    /// extension is a precondition failure.
    pub fn simple(&self) -> Result<bool> {
        if self.is_primary {
            Ok(self.simple)
        } else {
            Err(Error::NotPrimary)
        }
    }

    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    // ── Structural metadata ──

    pub fn bitpix(&self) -> i64 {
        self.bitpix
    }

    pub fn set_bitpix(&mut self, bitpix: i64) -> Result<()> {
        if !VALID_BITPIX.contains(&bitpix) {
            return Err(Error::InvalidBitpix(bitpix));
        }
        self.bitpix = bitpix;
        self.dirty = true;
        Ok(())
    }

    /// The number of data axes.
    pub fn naxis(&self) -> usize {
        self.axis_lengths.len()
    }

    pub fn axis_lengths(&self) -> &[i64] {
        &self.axis_lengths
    }

    /// Set the number of axes, in `1..=999`. Growing the list zero-fills
    /// the new slots; shrinking discards the tail.
    pub fn set_naxis(&mut self, n: usize) -> Result<()> {
        if n < 1 || n > NAXIS_MAX {
            return Err(Error::AxisOutOfRange(n));
        }
        self.axis_lengths.resize(n, 0);
        self.dirty = true;
        Ok(())
    }

    /// The length of axis `i` (1-based). An index outside `1..=999` and an
    /// index beyond the declared NAXIS are distinct failures.
    pub fn naxis_len(&self, i: usize) -> Result<i64> {
        if i < 1 || i > NAXIS_MAX {
            return Err(Error::AxisOutOfRange(i));
        }
        if i > self.axis_lengths.len() {
            return Err(Error::AxisNotDefined(i));
        }
        Ok(self.axis_lengths[i - 1])
    }

    pub fn set_naxis_len(&mut self, i: usize, len: i64) -> Result<()> {
        if i < 1 || i > NAXIS_MAX {
            return Err(Error::AxisOutOfRange(i));
        }
        if i > self.axis_lengths.len() {
            return Err(Error::AxisNotDefined(i));
        }
        self.axis_lengths[i - 1] = len;
        self.dirty = true;
        Ok(())
    }

    pub fn pcount(&self) -> i64 {
        self.pcount
    }

    pub fn gcount(&self) -> i64 {
        self.gcount
    }

    pub fn bscale(&self) -> f64 {
        self.bscale
    }

    pub fn bzero(&self) -> f64 {
        self.bzero
    }

    pub fn set_scaling(&mut self, bscale: f64, bzero: f64) {
        self.bscale = bscale;
        self.bzero = bzero;
        self.dirty = true;
    }

    // ── Keywords, comments, history ──

    pub fn keywords(&self) -> &KeywordStore {
        &self.keywords
    }

    pub fn keyword_exists(&self, name: &str) -> bool {
        self.keywords.exists(name)
    }

    pub fn keyword_find(&self, name: &str) -> Result<&Keyword> {
        self.keywords.find(name)
    }

    /// Replace-or-append a keyword; updated keywords move to the end of the
    /// store.
    pub fn keyword_write(&mut self, keyword: Keyword) {
        self.keywords.write(keyword);
        self.dirty = true;
    }

    /// Delete a keyword. Deleting an absent name is a no-op returning false.
    pub fn keyword_delete(&mut self, name: &str) -> bool {
        let deleted = self.keywords.delete(name);
        if deleted {
            self.dirty = true;
        }
        deleted
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn comment_write(&mut self, text: &str) {
        self.comments.push(text.to_string());
        self.dirty = true;
    }

    pub fn history_write(&mut self, text: &str) {
        self.history.push(text.to_string());
        self.dirty = true;
    }

    /// Record a modification stamp in the history log, once. Later calls
    /// are no-ops.
    pub fn first_edit(&mut self) {
        if self.first_edit_done {
            return;
        }
        self.first_edit_done = true;
        self.history.push(format!(
            "Modified by {} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        self.dirty = true;
    }

    /// Exposure time in seconds: EXPTIME takes precedence over EXPOSURE.
    pub fn exposure(&self) -> Result<f64> {
        for name in ["EXPTIME", "EXPOSURE"] {
            if let Ok(keyword) = self.keywords.find(name) {
                return keyword.to::<f64>();
            }
        }
        Err(Error::KeywordNotFound("EXPTIME".to_string()))
    }

    // ── Flags and data unit ──

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// The raw data unit, without block padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Attach a raw data unit. The length must match what the structural
    /// keywords imply.
    pub fn set_data_raw(&mut self, data: Vec<u8>) -> Result<()> {
        let expected = data::data_byte_len(self.bitpix, &self.axis_lengths, self.pcount, self.gcount)?;
        if data.len() != expected {
            return Err(Error::InvalidValue);
        }
        self.has_data = !data.is_empty();
        self.data = data;
        self.dirty = true;
        Ok(())
    }

    /// Attach typed pixels, setting BITPIX to match their element type.
    /// The axis lengths must already describe the pixel count.
    pub fn set_data(&mut self, pixels: &PixelData) -> Result<()> {
        self.bitpix = pixels.bitpix();
        let encoded = data::encode_pixels(pixels);
        let expected =
            data::data_byte_len(self.bitpix, &self.axis_lengths, self.pcount, self.gcount)?;
        if pixels.len() * (self.bitpix.unsigned_abs() / 8) as usize != expected {
            return Err(Error::InvalidValue);
        }
        self.data = encoded[..expected].to_vec();
        self.has_data = !self.data.is_empty();
        self.dirty = true;
        Ok(())
    }

    /// Decode the raw data unit into native typed pixels.
    pub fn decode_data(&self) -> Result<PixelData> {
        data::decode_pixels(self.bitpix, &self.data)
    }

    // ── Kind-specific accessors ──

    /// Column layout of a table HDB.
    ///
    /// # Panics
    ///
    /// Panics on non-table payloads.
    pub fn table_info(&self) -> &TableInfo {
        match &self.payload {
            BlockPayload::AsciiTable(info) | BlockPayload::BinaryTable(info) => info,
            other => panic!("{} block has no column layout", other.xtension_name()),
        }
    }

    /// Photometry observations of a photometry HDB.
    ///
    /// # Panics
    ///
    /// Panics on non-photometry payloads.
    pub fn photometry(&self) -> &PhotometryData {
        match &self.payload {
            BlockPayload::Photometry(data) => data,
            _ => panic!("block has no photometry payload"),
        }
    }

    pub fn photometry_mut(&mut self) -> &mut PhotometryData {
        self.dirty = true;
        match &mut self.payload {
            BlockPayload::Photometry(data) => data,
            _ => panic!("block has no photometry payload"),
        }
    }

    /// Astrometry lists of an astrometry HDB.
    ///
    /// # Panics
    ///
    /// Panics on non-astrometry payloads.
    pub fn astrometry(&self) -> &AstrometryData {
        match &self.payload {
            BlockPayload::Astrometry(data) => data,
            _ => panic!("block has no astrometry payload"),
        }
    }

    pub fn astrometry_mut(&mut self) -> &mut AstrometryData {
        self.dirty = true;
        match &mut self.payload {
            BlockPayload::Astrometry(data) => data,
            _ => panic!("block has no astrometry payload"),
        }
    }

    // ── Read protocol ──

    /// Build an HDB from one parsed header unit.
    ///
    /// Structural keywords are captured into dedicated fields; SIMPLE and
    /// XTENSION are consumed (they never reach the keyword store); every
    /// other valued card becomes a stored keyword. Valueless cards are
    /// commentary: HISTORY and COMMENT go to their logs, blank-name cards
    /// count as comments.
    ///
    /// # Panics
    ///
    /// Panics on a valueless card with any other keyword name, and on
    /// complex-valued cards; both indicate a header this model cannot
    /// represent.
    pub fn read_from(reader: &HduReader) -> Result<Hdb> {
        let mut hdb = Hdb::blank(false, "", BlockPayload::Image);
        let mut xtension: Option<String> = None;

        for card in reader.cards() {
            if card.value_text.is_empty() {
                match card.keyword_str() {
                    "HISTORY" => hdb.history.push(card.comment.clone()),
                    "COMMENT" | "" => hdb.comments.push(card.comment.clone()),
                    other => panic!("unexpected valueless header card: {other}"),
                }
                continue;
            }

            let keyword = Keyword::from_card(card)?;
            match keyword.name() {
                "SIMPLE" => {
                    hdb.is_primary = true;
                    hdb.simple = keyword.to()?;
                    hdb.name = String::from("PRIMARY");
                }
                "XTENSION" => {
                    hdb.is_primary = false;
                    xtension = Some(keyword.to()?);
                }
                "BITPIX" => hdb.bitpix = keyword.to()?,
                "NAXIS" => {
                    let n: i64 = keyword.to()?;
                    if n < 0 || n as usize > NAXIS_MAX {
                        return Err(Error::InvalidHeader("NAXIS outside 0..=999"));
                    }
                    hdb.axis_lengths.resize(n as usize, 0);
                }
                "PCOUNT" => hdb.pcount = keyword.to()?,
                "GCOUNT" => hdb.gcount = keyword.to()?,
                "BSCALE" => hdb.bscale = keyword.to()?,
                "BZERO" => hdb.bzero = keyword.to()?,
                name => {
                    if let Some(axis) = parse_axis_index(name) {
                        if axis > hdb.axis_lengths.len() {
                            return Err(Error::InvalidHeader("NAXISn without matching NAXIS"));
                        }
                        hdb.axis_lengths[axis - 1] = keyword.to()?;
                    } else {
                        if name == "EXTNAME" {
                            hdb.name = keyword.to()?;
                        }
                        hdb.keywords.push(keyword);
                    }
                }
            }
        }

        match xtension.as_deref() {
            None => {
                if !hdb.is_primary {
                    return Err(Error::MissingKeyword("SIMPLE"));
                }
            }
            Some("IMAGE") => hdb.payload = BlockPayload::Image,
            Some("TABLE") => {
                let info = TableInfo::from_store(TableKind::Ascii, &hdb.keywords)?;
                hdb.payload = BlockPayload::AsciiTable(info);
            }
            Some("BINTABLE") => {
                let info = TableInfo::from_store(TableKind::Binary, &hdb.keywords)?;
                hdb.payload = BlockPayload::BinaryTable(info);
            }
            Some(_) => return Err(Error::UnsupportedExtension("unknown XTENSION value")),
        }

        Ok(hdb)
    }

    // ── Write protocol ──

    /// Serialize this HDB's header: structural cards from the dedicated
    /// fields, then the generic keywords (reserved names skipped), then all
    /// comments, then all history, in that fixed order.
    pub fn write_to(&self, writer: &mut HduWriter) {
        if self.is_primary {
            writer.write_logical("SIMPLE", self.simple, "conforms to FITS standard");
        } else {
            writer.write_string("XTENSION", self.payload.xtension_name(), "extension type");
        }
        writer.write_int("BITPIX", self.bitpix, "bits per data element");
        writer.write_int("NAXIS", self.axis_lengths.len() as i64, "number of data axes");
        for (i, len) in self.axis_lengths.iter().enumerate() {
            writer.write_int(&format!("NAXIS{}", i + 1), *len, "");
        }
        if !self.is_primary {
            writer.write_int("PCOUNT", self.pcount, "parameter count");
            writer.write_int("GCOUNT", self.gcount, "group count");
        }
        if self.bscale != 1.0 || self.bzero != 0.0 {
            writer.write_float("BSCALE", self.bscale, "data scaling factor");
            writer.write_float("BZERO", self.bzero, "data zero offset");
        }

        for keyword in &self.keywords {
            if is_reserved_keyword(keyword.name()) {
                continue;
            }
            keyword.write_to(writer);
        }

        for comment in &self.comments {
            writer.write_comment(comment);
        }
        for history in &self.history {
            writer.write_history(history);
        }
    }
}

/// Parse the axis index of a `NAXISn` keyword name; `None` for `NAXIS`
/// itself and for non-numeric suffixes such as `NAXISTYPE`.
fn parse_axis_index(name: &str) -> Option<usize> {
    let suffix = name.strip_prefix("NAXIS")?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok().filter(|&i| i >= 1)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{HduReader, HduWriter};

    fn roundtrip(hdb: &Hdb) -> Hdb {
        let mut writer = HduWriter::new();
        hdb.write_to(&mut writer);
        let bytes = writer.finish();
        let reader = HduReader::from_bytes(&bytes).unwrap();
        Hdb::read_from(&reader).unwrap()
    }

    #[test]
    fn primary_defaults() {
        let hdb = Hdb::new_primary();
        assert!(hdb.is_primary());
        assert_eq!(hdb.name(), "PRIMARY");
        assert!(hdb.simple().unwrap());
        assert_eq!(hdb.bitpix(), 8);
        assert_eq!(hdb.naxis(), 0);
        assert!(!hdb.is_dirty());
    }

    #[test]
    fn simple_on_extension_is_error() {
        let hdb = Hdb::new_image("SCI");
        assert!(matches!(hdb.simple(), Err(Error::NotPrimary)));
    }

    #[test]
    fn axis_precondition_matrix() {
        let mut hdb = Hdb::new_primary();

        assert!(matches!(hdb.set_naxis(0), Err(Error::AxisOutOfRange(0))));
        assert!(matches!(hdb.set_naxis(1000), Err(Error::AxisOutOfRange(1000))));
        hdb.set_naxis(2).unwrap();
        assert_eq!(hdb.naxis(), 2);
        assert_eq!(hdb.naxis_len(1).unwrap(), 0);

        hdb.set_naxis_len(1, 100).unwrap();
        hdb.set_naxis_len(2, 50).unwrap();
        assert_eq!(hdb.naxis_len(2).unwrap(), 50);

        // Out of 1..=999 vs. beyond declared NAXIS are distinct failures.
        assert!(matches!(hdb.naxis_len(0), Err(Error::AxisOutOfRange(0))));
        assert!(matches!(hdb.naxis_len(1000), Err(Error::AxisOutOfRange(1000))));
        assert!(matches!(hdb.naxis_len(3), Err(Error::AxisNotDefined(3))));
        assert!(matches!(hdb.set_naxis_len(3, 1), Err(Error::AxisNotDefined(3))));
    }

    #[test]
    fn set_naxis_shrink_discards_tail() {
        let mut hdb = Hdb::new_primary();
        hdb.set_naxis(3).unwrap();
        hdb.set_naxis_len(3, 7).unwrap();
        hdb.set_naxis(1).unwrap();
        assert!(matches!(hdb.naxis_len(3), Err(Error::AxisNotDefined(3))));
        hdb.set_naxis(3).unwrap();
        // Regrown slots are zero-filled, not restored.
        assert_eq!(hdb.naxis_len(3).unwrap(), 0);
    }

    #[test]
    fn exposure_precedence() {
        let mut hdb = Hdb::new_primary();
        assert!(matches!(hdb.exposure(), Err(Error::KeywordNotFound(_))));

        hdb.keyword_write(Keyword::new("EXPOSURE", 60.0f64, "").unwrap());
        assert_eq!(hdb.exposure().unwrap(), 60.0);

        hdb.keyword_write(Keyword::new("EXPTIME", 30.0f64, "").unwrap());
        assert_eq!(hdb.exposure().unwrap(), 30.0);
    }

    #[test]
    fn first_edit_is_idempotent() {
        let mut hdb = Hdb::new_primary();
        hdb.first_edit();
        hdb.first_edit();
        hdb.first_edit();
        assert_eq!(hdb.history().len(), 1);
        assert!(hdb.history()[0].starts_with("Modified by"));
    }

    #[test]
    fn edits_set_dirty() {
        let mut hdb = Hdb::new_primary();
        assert!(!hdb.is_dirty());
        hdb.comment_write("note");
        assert!(hdb.is_dirty());

        hdb.mark_clean();
        hdb.keyword_write(Keyword::new("OBJECT", "M31", "").unwrap());
        assert!(hdb.is_dirty());

        hdb.mark_clean();
        assert!(!hdb.keyword_delete("MISSING"));
        assert!(!hdb.is_dirty());
        assert!(hdb.keyword_delete("OBJECT"));
        assert!(hdb.is_dirty());
    }

    #[test]
    fn reserved_keyword_set() {
        for name in ["SIMPLE", "XTENSION", "BITPIX", "GCOUNT", "PCOUNT", "BSCALE", "BZERO"] {
            assert!(is_reserved_keyword(name), "{name}");
        }
        assert!(is_reserved_keyword("NAXIS"));
        assert!(is_reserved_keyword("NAXIS1"));
        assert!(is_reserved_keyword("naxis2"));
        // The NAXIS prefix rule also shadows non-axis names.
        assert!(is_reserved_keyword("NAXISTYPE"));
        assert!(!is_reserved_keyword("OBJECT"));
        assert!(!is_reserved_keyword("EXPTIME"));
    }

    #[test]
    #[should_panic(expected = "has no column layout")]
    fn table_info_on_image_panics() {
        let hdb = Hdb::new_image("SCI");
        let _ = hdb.table_info();
    }

    #[test]
    #[should_panic(expected = "no photometry payload")]
    fn photometry_on_table_panics() {
        let hdb = Hdb::new_binary_table("OBS");
        let _ = hdb.photometry();
    }

    #[test]
    fn astrometry_payload_accessible() {
        let mut hdb = Hdb::new_astrometry("ASTROM");
        hdb.astrometry_mut().push_target(
            crate::astrometry::AstrometryObservation::new("2002 AB", 1.0, 2.0, 2000.0),
        );
        assert_eq!(hdb.astrometry().targets().len(), 1);
        assert!(hdb.is_dirty());
    }

    #[test]
    fn roundtrip_primary_header() {
        let mut hdb = Hdb::new_primary();
        hdb.set_bitpix(16).unwrap();
        hdb.set_naxis(2).unwrap();
        hdb.set_naxis_len(1, 100).unwrap();
        hdb.set_naxis_len(2, 50).unwrap();
        hdb.keyword_write(Keyword::new("OBJECT", "M31", "target").unwrap());
        hdb.keyword_write(Keyword::new("EXPTIME", 30.0f64, "seconds").unwrap());
        hdb.comment_write("first comment");
        hdb.comment_write("second comment");
        hdb.history_write("dark subtracted");

        let back = roundtrip(&hdb);
        assert!(back.is_primary());
        assert_eq!(back.name(), "PRIMARY");
        assert_eq!(back.bitpix(), 16);
        assert_eq!(back.axis_lengths(), &[100, 50]);
        assert_eq!(back.keyword_find("OBJECT").unwrap().to::<String>().unwrap(), "M31");
        assert_eq!(back.exposure().unwrap(), 30.0);
        assert_eq!(back.comments(), &["first comment", "second comment"]);
        assert_eq!(back.history(), &["dark subtracted"]);
    }

    #[test]
    fn simple_and_xtension_never_reach_store() {
        let hdb = roundtrip(&Hdb::new_primary());
        assert!(!hdb.keyword_exists("SIMPLE"));

        let mut image = Hdb::new_image("SCI");
        image.keyword_write(Keyword::new("EXTNAME", "SCI", "").unwrap());
        let back = roundtrip(&image);
        assert!(!back.keyword_exists("XTENSION"));
        assert!(!back.is_primary());
        assert_eq!(back.name(), "SCI");
    }

    #[test]
    fn false_simple_flag_roundtrips() {
        let mut writer = HduWriter::new();
        writer.write_logical("SIMPLE", false, "");
        writer.write_int("BITPIX", 8, "");
        writer.write_int("NAXIS", 0, "");
        let bytes = writer.finish();
        let hdb = Hdb::read_from(&HduReader::from_bytes(&bytes).unwrap()).unwrap();
        assert!(!hdb.simple().unwrap());
    }

    #[test]
    fn scaling_keywords_intercepted() {
        let mut writer = HduWriter::new();
        writer.write_logical("SIMPLE", true, "");
        writer.write_int("BITPIX", 16, "");
        writer.write_int("NAXIS", 0, "");
        writer.write_float("BSCALE", 2.0, "");
        writer.write_float("BZERO", 32768.0, "");
        let bytes = writer.finish();
        let hdb = Hdb::read_from(&HduReader::from_bytes(&bytes).unwrap()).unwrap();

        assert_eq!(hdb.bscale(), 2.0);
        assert_eq!(hdb.bzero(), 32768.0);
        assert!(!hdb.keyword_exists("BSCALE"));
    }

    #[test]
    fn binary_table_roundtrip_restores_columns() {
        let mut hdb = Hdb::new_binary_table("OBSLIST");
        hdb.set_naxis(2).unwrap();
        hdb.set_naxis_len(1, 20).unwrap();
        hdb.set_naxis_len(2, 3).unwrap();
        hdb.keyword_write(Keyword::new("EXTNAME", "OBSLIST", "").unwrap());
        hdb.keyword_write(Keyword::new("TFIELDS", 2i32, "").unwrap());
        hdb.keyword_write(Keyword::new("TTYPE1", "RA", "").unwrap());
        hdb.keyword_write(Keyword::new("TFORM1", "1D", "").unwrap());
        hdb.keyword_write(Keyword::new("TTYPE2", "DEC", "").unwrap());
        hdb.keyword_write(Keyword::new("TFORM2", "1D", "").unwrap());

        let back = roundtrip(&hdb);
        assert_eq!(back.name(), "OBSLIST");
        assert_eq!(back.table_info().column_count(), 2);
        assert_eq!(back.table_info().find_column("dec").unwrap().format.type_char, 'D');
    }

    #[test]
    fn missing_simple_and_xtension_is_error() {
        let mut writer = HduWriter::new();
        writer.write_int("BITPIX", 8, "");
        writer.write_int("NAXIS", 0, "");
        let bytes = writer.finish();
        assert!(matches!(
            Hdb::read_from(&HduReader::from_bytes(&bytes).unwrap()),
            Err(Error::MissingKeyword("SIMPLE"))
        ));
    }

    #[test]
    fn unknown_xtension_is_error() {
        let mut writer = HduWriter::new();
        writer.write_string("XTENSION", "FOREIGN", "");
        writer.write_int("BITPIX", 8, "");
        writer.write_int("NAXIS", 0, "");
        let bytes = writer.finish();
        assert!(matches!(
            Hdb::read_from(&HduReader::from_bytes(&bytes).unwrap()),
            Err(Error::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn naxisn_without_naxis_is_error() {
        let mut writer = HduWriter::new();
        writer.write_logical("SIMPLE", true, "");
        writer.write_int("BITPIX", 8, "");
        writer.write_int("NAXIS1", 100, "");
        let bytes = writer.finish();
        assert!(Hdb::read_from(&HduReader::from_bytes(&bytes).unwrap()).is_err());
    }

    #[test]
    fn comment_history_order_preserved() {
        let mut hdb = Hdb::new_primary();
        hdb.history_write("step one");
        hdb.comment_write("alpha");
        hdb.history_write("step two");
        hdb.comment_write("beta");

        let back = roundtrip(&hdb);
        assert_eq!(back.comments(), &["alpha", "beta"]);
        assert_eq!(back.history(), &["step one", "step two"]);
    }

    #[test]
    fn reserved_names_in_store_are_not_written_twice() {
        let mut hdb = Hdb::new_primary();
        // A stray structural name in the store must not shadow the field.
        hdb.keyword_write(Keyword::new("BITPIX", 32i32, "stray").unwrap());
        hdb.set_bitpix(16).unwrap();

        let back = roundtrip(&hdb);
        assert_eq!(back.bitpix(), 16);
        assert!(!back.keyword_exists("BITPIX"));
    }

    #[test]
    fn data_unit_length_check() {
        let mut hdb = Hdb::new_primary();
        hdb.set_bitpix(16).unwrap();
        hdb.set_naxis(1).unwrap();
        hdb.set_naxis_len(1, 3).unwrap();

        assert!(hdb.set_data_raw(alloc::vec![0; 5]).is_err());
        hdb.set_data_raw(alloc::vec![0, 1, 0, 2, 0, 3]).unwrap();
        assert!(hdb.has_data());

        match hdb.decode_data().unwrap() {
            PixelData::I16(v) => assert_eq!(v, alloc::vec![1, 2, 3]),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn set_data_typed_sets_bitpix() {
        let mut hdb = Hdb::new_primary();
        hdb.set_naxis(1).unwrap();
        hdb.set_naxis_len(1, 2).unwrap();
        hdb.set_data(&PixelData::F32(alloc::vec![1.0, 2.0])).unwrap();
        assert_eq!(hdb.bitpix(), -32);
        assert_eq!(hdb.data().len(), 8);
    }

    #[test]
    #[should_panic(expected = "unexpected valueless header card")]
    fn unknown_valueless_card_panics() {
        use crate::block::CARD_SIZE;
        let mut bytes = alloc::vec![b' '; crate::block::BLOCK_SIZE];
        let cards = [
            "SIMPLE  =                    T",
            "BLANKKEY",
            "END",
        ];
        for (i, text) in cards.iter().enumerate() {
            bytes[i * CARD_SIZE..i * CARD_SIZE + text.len()].copy_from_slice(text.as_bytes());
        }
        let reader = HduReader::from_bytes(&bytes).unwrap();
        let _ = Hdb::read_from(&reader);
    }
}
