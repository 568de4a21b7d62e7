//! Document logo lookup
//!
//! The logo is optional. A missing file is silent; a file that exists but
//! cannot be read or is not a PNG is skipped with a warning.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name searched for next to the executable and in the working directory
pub const LOGO_FILE_NAME: &str = "vtc_logo.png";

/// A PNG logo with its pixel dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandingAsset {
    /// Where the logo was loaded from
    pub path: PathBuf,
    /// Raw PNG bytes
    pub bytes: Vec<u8>,
    /// Width in pixels
    pub width_px: u32,
    /// Height in pixels
    pub height_px: u32,
}

impl BrandingAsset {
    /// Validate PNG bytes and read their dimensions
    ///
    /// Only the header is decoded. Returns `None` for other formats or a
    /// header the decoder rejects.
    pub fn from_png_bytes(path: PathBuf, bytes: Vec<u8>) -> Option<Self> {
        let reader = ImageReader::new(Cursor::new(&bytes)).with_guessed_format().ok()?;
        if reader.format() != Some(ImageFormat::Png) {
            return None;
        }
        let (width_px, height_px) = match reader.into_dimensions() {
            Ok(dimensions) => dimensions,
            Err(e) => {
                debug!("Unreadable PNG header in {}: {}", path.display(), e);
                return None;
            }
        };
        if width_px == 0 || height_px == 0 {
            return None;
        }
        Some(Self {
            path,
            bytes,
            width_px,
            height_px,
        })
    }

    /// Load a logo from `path`
    pub fn load(path: &Path) -> Option<Self> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let asset = Self::from_png_bytes(path.to_path_buf(), bytes);
                if asset.is_none() {
                    warn!("Ignoring logo {}: not a PNG image", path.display());
                }
                asset
            }
            Err(e) => {
                warn!("Ignoring logo {}: {}", path.display(), e);
                None
            }
        }
    }

    /// First existing candidate that loads
    pub fn locate(candidates: &[PathBuf]) -> Option<Self> {
        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            if let Some(asset) = Self::load(candidate) {
                debug!("Using logo {}", candidate.display());
                return Some(asset);
            }
        }
        debug!("No logo found");
        None
    }

    /// Size in EMU for a fixed width, keeping the aspect ratio
    pub fn scaled_emu(&self, width_emu: u32) -> (u32, u32) {
        let height = u64::from(width_emu) * u64::from(self.height_px) / u64::from(self.width_px);
        (width_emu, u32::try_from(height).unwrap_or(u32::MAX))
    }
}

/// Default logo locations: next to the executable, then the working directory
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(LOGO_FILE_NAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(LOGO_FILE_NAME));
    }
    candidates
}
