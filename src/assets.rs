//! Image assets laid out on the screen from a manifest
//!
//! Sizes and positions are given per axis as `"full"`, a percentage of the
//! viewport (`"70%"`) or plain pixels. The grid asset's resolved rectangle
//! is the sub-region every curve is drawn into.

use crate::display::PixelBuffer;
use crate::plot::{GeometryError, SubRegion};
use image::imageops::FilterType;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid extent '{0}': expected \"full\", \"N%\" or a pixel count")]
    BadExtent(String),
    #[error("asset '{name}' resolves to an empty {width}x{height} image")]
    EmptySize { name: String, width: u32, height: u32 },
    #[error("grid asset '{0}' is not in the manifest")]
    MissingGrid(String),
    #[error("grid asset geometry: {0}")]
    Region(#[from] GeometryError),
}

/// Size or offset along one axis of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "ExtentRepr")]
pub enum Extent {
    Full,
    Percent(f64),
    Pixels(u32),
}

impl Extent {
    /// Pixels along an axis `axis_len` long. Percentages truncate.
    pub fn resolve(&self, axis_len: u32) -> u32 {
        match *self {
            Self::Full => axis_len,
            Self::Percent(p) => (axis_len as f64 * p / 100.0).floor() as u32,
            Self::Pixels(n) => n,
        }
    }
}

impl FromStr for Extent {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("full") {
            return Ok(Self::Full);
        }
        let bad = || AssetError::BadExtent(s.to_string());
        if let Some(num) = t.strip_suffix('%') {
            let p: f64 = num.trim().parse().map_err(|_| bad())?;
            if !p.is_finite() || p < 0.0 {
                return Err(bad());
            }
            return Ok(Self::Percent(p));
        }
        t.parse::<u32>().map(Self::Pixels).map_err(|_| bad())
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Percent(p) => write!(f, "{}%", p),
            Self::Pixels(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtentRepr {
    Pixels(u32),
    Text(String),
}

impl TryFrom<ExtentRepr> for Extent {
    type Error = AssetError;

    fn try_from(repr: ExtentRepr) -> Result<Self, Self::Error> {
        match repr {
            ExtentRepr::Pixels(n) => Ok(Self::Pixels(n)),
            ExtentRepr::Text(s) => s.parse(),
        }
    }
}

/// One picture to load: file name, (width, height), (x, y)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub size: (Extent, Extent),
    pub position: (Extent, Extent),
}

impl ManifestEntry {
    pub fn new(file: impl Into<String>, size: (Extent, Extent), position: (Extent, Extent)) -> Self {
        Self {
            file: file.into(),
            size,
            position,
        }
    }

    /// Asset name: the file name without its extension
    pub fn name(&self) -> &str {
        Path::new(&self.file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file)
    }

    /// (x, y, width, height) in pixels for a viewport
    pub fn resolve(&self, viewport: (u32, u32)) -> (i32, i32, u32, u32) {
        let (vw, vh) = viewport;
        (
            self.position.0.resolve(vw) as i32,
            self.position.1.resolve(vh) as i32,
            self.size.0.resolve(vw),
            self.size.1.resolve(vh),
        )
    }
}

pub struct Asset {
    pub name: String,
    pub image: PixelBuffer,
    pub position: (i32, i32),
}

/// Loaded assets in manifest (draw) order
pub struct AssetSet {
    assets: Vec<Asset>,
}

impl AssetSet {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    /// Decode and scale every manifest entry found under `dir`
    pub fn load(dir: &Path, manifest: &[ManifestEntry], viewport: (u32, u32)) -> Result<Self, AssetError> {
        let mut assets = Vec::with_capacity(manifest.len());
        for entry in manifest {
            let (x, y, width, height) = entry.resolve(viewport);
            if width == 0 || height == 0 {
                return Err(AssetError::EmptySize {
                    name: entry.name().to_string(),
                    width,
                    height,
                });
            }

            let path = dir.join(&entry.file);
            let decoded = image::open(&path)
                .map_err(|source| AssetError::Decode {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            let scaled = if decoded.dimensions() == (width, height) {
                decoded
            } else {
                image::imageops::resize(&decoded, width, height, FilterType::Triangle)
            };

            let image = PixelBuffer::from_rgba(width, height, scaled.as_raw()).ok_or_else(|| {
                AssetError::EmptySize {
                    name: entry.name().to_string(),
                    width,
                    height,
                }
            })?;
            log::debug!("loaded {} at ({}, {}) as {}x{}", path.display(), x, y, width, height);
            assets.push(Asset {
                name: entry.name().to_string(),
                image,
                position: (x, y),
            });
        }
        Ok(Self { assets })
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    /// On-screen rectangle of the named asset
    pub fn sub_region(&self, grid: &str) -> Result<SubRegion, AssetError> {
        let asset = self
            .get(grid)
            .ok_or_else(|| AssetError::MissingGrid(grid.to_string()))?;
        let (x, y) = asset.position;
        Ok(SubRegion::new(x, y, asset.image.width(), asset.image.height())?)
    }
}
