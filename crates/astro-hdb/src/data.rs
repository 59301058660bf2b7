//! Data-unit pixel codec.
//!
//! FITS stores array data big-endian; this module converts raw data-unit
//! bytes into native typed vectors and back, and applies or reverses the
//! BSCALE/BZERO linear calibration. The HDB keeps its data unit as raw
//! bytes; decoding happens on demand.

use alloc::vec::Vec;

use crate::block::{padded_byte_len, DATA_PAD_BYTE};
use crate::error::{Error, Result};

/// BITPIX values the standard defines.
pub const VALID_BITPIX: [i64; 6] = [8, 16, 32, 64, -32, -64];

/// One decoded data unit in its native element type.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelData {
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::I16(v) => v.len(),
            PixelData::I32(v) => v.len(),
            PixelData::I64(v) => v.len(),
            PixelData::F32(v) => v.len(),
            PixelData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The BITPIX value matching this element type.
    pub fn bitpix(&self) -> i64 {
        match self {
            PixelData::U8(_) => 8,
            PixelData::I16(_) => 16,
            PixelData::I32(_) => 32,
            PixelData::I64(_) => 64,
            PixelData::F32(_) => -32,
            PixelData::F64(_) => -64,
        }
    }
}

/// The data-unit byte length implied by the structural keywords:
/// `|BITPIX|/8 * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`,
/// zero when no axes are defined. Overflow is an error, not a wrap.
pub fn data_byte_len(bitpix: i64, axis_lengths: &[i64], pcount: i64, gcount: i64) -> Result<usize> {
    if !VALID_BITPIX.contains(&bitpix) {
        return Err(Error::InvalidBitpix(bitpix));
    }
    if axis_lengths.is_empty() {
        return Ok(0);
    }

    let mut elements: usize = 1;
    for &len in axis_lengths {
        if len < 0 {
            return Err(Error::InvalidValue);
        }
        elements = elements
            .checked_mul(len as usize)
            .ok_or(Error::InvalidValue)?;
    }

    if pcount < 0 || gcount < 1 {
        return Err(Error::InvalidValue);
    }
    let group = elements
        .checked_add(pcount as usize)
        .ok_or(Error::InvalidValue)?;
    let total = group
        .checked_mul(gcount as usize)
        .ok_or(Error::InvalidValue)?;

    let bytes_per_element = (bitpix.unsigned_abs() / 8) as usize;
    total
        .checked_mul(bytes_per_element)
        .ok_or(Error::InvalidValue)
}

/// Decode raw big-endian data-unit bytes into native typed pixels.
///
/// `raw` must be an exact multiple of the element size; block padding is
/// expected to have been sliced off by the caller.
pub fn decode_pixels(bitpix: i64, raw: &[u8]) -> Result<PixelData> {
    let bytes_per_element = match bitpix {
        8 => 1,
        16 | -16 => 2,
        32 | -32 => 4,
        64 | -64 => 8,
        other => return Err(Error::InvalidBitpix(other)),
    };
    if raw.len() % bytes_per_element != 0 {
        return Err(Error::InvalidValue);
    }

    match bitpix {
        8 => Ok(PixelData::U8(raw.to_vec())),
        16 => {
            let values: Vec<i16> = bytemuck::pod_collect_to_vec::<u8, i16>(raw)
                .into_iter()
                .map(i16::from_be)
                .collect();
            Ok(PixelData::I16(values))
        }
        32 => {
            let values: Vec<i32> = bytemuck::pod_collect_to_vec::<u8, i32>(raw)
                .into_iter()
                .map(i32::from_be)
                .collect();
            Ok(PixelData::I32(values))
        }
        64 => {
            let values: Vec<i64> = bytemuck::pod_collect_to_vec::<u8, i64>(raw)
                .into_iter()
                .map(i64::from_be)
                .collect();
            Ok(PixelData::I64(values))
        }
        -32 => {
            let values: Vec<f32> = bytemuck::pod_collect_to_vec::<u8, u32>(raw)
                .into_iter()
                .map(|bits| f32::from_bits(u32::from_be(bits)))
                .collect();
            Ok(PixelData::F32(values))
        }
        -64 => {
            let values: Vec<f64> = bytemuck::pod_collect_to_vec::<u8, u64>(raw)
                .into_iter()
                .map(|bits| f64::from_bits(u64::from_be(bits)))
                .collect();
            Ok(PixelData::F64(values))
        }
        other => Err(Error::InvalidBitpix(other)),
    }
}

/// Encode native pixels as a big-endian data unit, zero-padded to a whole
/// number of 2880-byte blocks.
pub fn encode_pixels(pixels: &PixelData) -> Vec<u8> {
    let mut raw = Vec::new();
    match pixels {
        PixelData::U8(v) => raw.extend_from_slice(v),
        PixelData::I16(v) => {
            for x in v {
                raw.extend_from_slice(&x.to_be_bytes());
            }
        }
        PixelData::I32(v) => {
            for x in v {
                raw.extend_from_slice(&x.to_be_bytes());
            }
        }
        PixelData::I64(v) => {
            for x in v {
                raw.extend_from_slice(&x.to_be_bytes());
            }
        }
        PixelData::F32(v) => {
            for x in v {
                raw.extend_from_slice(&x.to_be_bytes());
            }
        }
        PixelData::F64(v) => {
            for x in v {
                raw.extend_from_slice(&x.to_be_bytes());
            }
        }
    }

    raw.resize(padded_byte_len(raw.len()), DATA_PAD_BYTE);
    raw
}

/// Apply the linear calibration `physical = BSCALE * stored + BZERO`.
pub fn apply_scaling(pixels: &PixelData, bscale: f64, bzero: f64) -> Vec<f64> {
    let scale = |x: f64| bscale * x + bzero;
    match pixels {
        PixelData::U8(v) => v.iter().map(|&x| scale(x as f64)).collect(),
        PixelData::I16(v) => v.iter().map(|&x| scale(x as f64)).collect(),
        PixelData::I32(v) => v.iter().map(|&x| scale(x as f64)).collect(),
        PixelData::I64(v) => v.iter().map(|&x| scale(x as f64)).collect(),
        PixelData::F32(v) => v.iter().map(|&x| scale(x as f64)).collect(),
        PixelData::F64(v) => v.iter().map(|&x| scale(x)).collect(),
    }
}

/// Reverse the linear calibration, rounding to the nearest stored integer
/// and clamping to the destination range.
pub fn reverse_scaling(physical: &[f64], bscale: f64, bzero: f64, bitpix: i64) -> Result<PixelData> {
    if bscale == 0.0 {
        return Err(Error::InvalidValue);
    }
    let unscale = |p: f64| (p - bzero) / bscale;

    match bitpix {
        8 => Ok(PixelData::U8(
            physical
                .iter()
                .map(|&p| libm::round(unscale(p)).clamp(u8::MIN as f64, u8::MAX as f64) as u8)
                .collect(),
        )),
        16 => Ok(PixelData::I16(
            physical
                .iter()
                .map(|&p| libm::round(unscale(p)).clamp(i16::MIN as f64, i16::MAX as f64) as i16)
                .collect(),
        )),
        32 => Ok(PixelData::I32(
            physical
                .iter()
                .map(|&p| libm::round(unscale(p)).clamp(i32::MIN as f64, i32::MAX as f64) as i32)
                .collect(),
        )),
        64 => Ok(PixelData::I64(
            physical
                .iter()
                .map(|&p| libm::round(unscale(p)).clamp(i64::MIN as f64, i64::MAX as f64) as i64)
                .collect(),
        )),
        -32 => Ok(PixelData::F32(
            physical.iter().map(|&p| unscale(p) as f32).collect(),
        )),
        -64 => Ok(PixelData::F64(physical.iter().map(|&p| unscale(p)).collect())),
        other => Err(Error::InvalidBitpix(other)),
    }
}

// ── Tests ──
