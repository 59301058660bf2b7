//! The owning FITS file container.
//!
//! An [`HdbFile`] owns its blocks outright; blocks never point back at the
//! file. The primary block always sits at index 0 and every later block is
//! an extension. Data units are carried as raw unpadded byte runs and block
//! padding is re-applied on save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::slice;

use crate::block::{padded_byte_len, BLOCK_SIZE, DATA_PAD_BYTE};
use crate::codec::{HduReader, HduWriter};
use crate::data;
use crate::error::{Error, Result};
use crate::hdb::Hdb;
use crate::table::TableKind;

/// A FITS file as an owned sequence of header-data blocks.
#[derive(Debug, Clone)]
pub struct HdbFile {
    path: Option<PathBuf>,
    hdbs: Vec<Hdb>,
}

impl Default for HdbFile {
    fn default() -> Self {
        HdbFile::new()
    }
}

impl HdbFile {
    /// A new in-memory file holding one fresh primary block.
    pub fn new() -> HdbFile {
        HdbFile {
            path: None,
            hdbs: vec![Hdb::new_primary()],
        }
    }

    /// Read a FITS file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<HdbFile> {
        let bytes = fs::read(path.as_ref())?;
        let mut file = HdbFile::from_bytes(&bytes)?;
        file.path = Some(path.as_ref().to_path_buf());
        Ok(file)
    }

    /// Parse a FITS byte stream. The first HDU must be primary; trailing
    /// bytes shorter than a block are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<HdbFile> {
        let mut hdbs = Vec::new();
        let mut offset = 0;

        while bytes.len() - offset >= BLOCK_SIZE {
            let reader = HduReader::from_bytes(&bytes[offset..])?;
            let mut hdb = Hdb::read_from(&reader)?;
            offset += reader.header_len();

            if hdbs.is_empty() && !hdb.is_primary() {
                return Err(Error::InvalidHeader("first HDU is not primary"));
            }

            let data_len =
                data::data_byte_len(hdb.bitpix(), hdb.axis_lengths(), hdb.pcount(), hdb.gcount())?;
            if data_len > 0 {
                let padded = padded_byte_len(data_len);
                if offset + padded > bytes.len() {
                    return Err(Error::UnexpectedEof);
                }
                hdb.set_data_raw(bytes[offset..offset + data_len].to_vec())?;
                offset += padded;
            }

            hdb.mark_clean();
            hdbs.push(hdb);
        }

        if hdbs.is_empty() {
            return Err(Error::UnexpectedEof);
        }
        Ok(HdbFile { path: None, hdbs })
    }

    /// Serialize every block, headers and padded data units, in order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for hdb in &self.hdbs {
            let mut writer = HduWriter::new();
            hdb.write_to(&mut writer);
            out.extend_from_slice(&writer.finish());

            if hdb.has_data() {
                let data = hdb.data();
                let padded = padded_byte_len(data.len());
                out.extend_from_slice(data);
                out.resize(out.len() + (padded - data.len()), DATA_PAD_BYTE);
            }
        }
        out
    }

    /// Write back to the path this file was opened from.
    pub fn save(&mut self) -> Result<()> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file has no path; use save_as",
                )))
            }
        };
        self.save_to(&path)
    }

    /// Write to a new path, which becomes this file's path.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.save_to(path.as_ref())?;
        self.path = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    fn save_to(&mut self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        for hdb in &mut self.hdbs {
            hdb.mark_clean();
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ── Block access ──

    pub fn len(&self) -> usize {
        self.hdbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hdbs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Hdb> {
        self.hdbs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Hdb> {
        self.hdbs.get_mut(index)
    }

    /// The primary block, always at index 0.
    pub fn primary(&self) -> &Hdb {
        &self.hdbs[0]
    }

    pub fn primary_mut(&mut self) -> &mut Hdb {
        &mut self.hdbs[0]
    }

    /// Find a block by name, case-insensitive: EXTNAME for extensions,
    /// `PRIMARY` for the primary block.
    pub fn find_by_name(&self, name: &str) -> Option<&Hdb> {
        self.hdbs.iter().find(|h| h.name().eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> slice::Iter<'_, Hdb> {
        self.hdbs.iter()
    }

    /// Append an extension block. Appending a second primary is a
    /// precondition failure.
    pub fn add(&mut self, hdb: Hdb) -> Result<&mut Hdb> {
        if hdb.is_primary() {
            return Err(Error::InvalidHeader("file already has a primary HDU"));
        }
        self.hdbs.push(hdb);
        let last = self.hdbs.len() - 1;
        Ok(&mut self.hdbs[last])
    }

    /// Append a fresh IMAGE extension and return it for population.
    pub fn create_image_hdb(&mut self, name: &str) -> &mut Hdb {
        self.hdbs.push(Hdb::new_image(name));
        let last = self.hdbs.len() - 1;
        &mut self.hdbs[last]
    }

    /// Append a fresh table extension and return it for population.
    pub fn create_table_hdb(&mut self, name: &str, kind: TableKind) -> &mut Hdb {
        let hdb = match kind {
            TableKind::Ascii => Hdb::new_ascii_table(name),
            TableKind::Binary => Hdb::new_binary_table(name),
        };
        self.hdbs.push(hdb);
        let last = self.hdbs.len() - 1;
        &mut self.hdbs[last]
    }

    // ── Flag aggregation ──

    /// True when any block has unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.hdbs.iter().any(|h| h.is_dirty())
    }

    /// True when any block carries a data unit.
    pub fn has_data(&self) -> bool {
        self.hdbs.iter().any(|h| h.has_data())
    }
}

impl<'a> IntoIterator for &'a HdbFile {
    type Item = &'a Hdb;
    type IntoIter = slice::Iter<'a, Hdb>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Tests ──
