//! ROM image loading and validation.
//!
//! The system ROM ships as a single flat image of 16 KiB banks (KERNAL,
//! BASIC, utilities, ...). Images shorter than the full bank window are
//! accepted and zero-padded; anything that is not a whole number of banks
//! is rejected up front rather than silently truncated.

use std::path::Path;

use thiserror::Error;

use crate::x16::{NUM_ROM_BANKS, ROM_BANK_SIZE};

/// Errors that can occur when loading a ROM image.
#[derive(Error, Debug)]
pub enum RomLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ROM image {path}: {size} bytes is not a multiple of the 16 KiB bank size")]
    BadSize { path: String, size: usize },

    #[error("ROM image {path}: {banks} banks exceeds the {max}-bank window")]
    TooLarge {
        path: String,
        banks: usize,
        max: usize,
    },

    #[error("ROM image {path} is empty")]
    Empty { path: String },
}

/// A validated ROM image, a whole number of 16 KiB banks.
pub struct RomImage {
    data: Vec<u8>,
}

impl RomImage {
    pub fn from_file(path: &Path) -> Result<Self, RomLoadError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data, &path.display().to_string())
    }

    pub fn from_bytes(data: Vec<u8>, name: &str) -> Result<Self, RomLoadError> {
        if data.is_empty() {
            return Err(RomLoadError::Empty {
                path: name.to_string(),
            });
        }
        if !data.len().is_multiple_of(ROM_BANK_SIZE) {
            return Err(RomLoadError::BadSize {
                path: name.to_string(),
                size: data.len(),
            });
        }
        let banks = data.len() / ROM_BANK_SIZE;
        if banks > NUM_ROM_BANKS {
            return Err(RomLoadError::TooLarge {
                path: name.to_string(),
                banks,
                max: NUM_ROM_BANKS,
            });
        }
        Ok(Self { data })
    }

    pub fn banks(&self) -> usize {
        self.data.len() / ROM_BANK_SIZE
    }

    /// The image padded out to the full bank window.
    pub fn into_banked(mut self) -> Vec<u8> {
        self.data.resize(NUM_ROM_BANKS * ROM_BANK_SIZE, 0);
        self.data
    }
}
