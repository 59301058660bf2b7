#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod astrometry;
pub mod block;
pub mod card;
pub mod codec;
pub mod data;
pub mod error;
pub mod hdb;
pub mod keyword;
pub mod orbital;
pub mod photometry;
pub mod store;
pub mod table;

pub use block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE};
pub use error::{Error, Result};
pub use hdb::{Hdb, NAXIS_MAX};
pub use keyword::{Keyword, KeywordKind, KeywordValue};

#[cfg(feature = "std")]
pub mod file;

#[cfg(feature = "std")]
pub use file::HdbFile;
