//! QR image link construction.
//!
//! Images are rendered by the public qrserver API. This module only
//! validates input and builds the link to it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Base endpoint of the QR image API.
pub const QR_API_BASE: &str = "https://api.qrserver.com/v1/create-qr-code/";

const MIN_SIZE: u32 = 50;
const MAX_SIZE: u32 = 1000;
const MAX_MARGIN: u32 = 50;

/// Errors from validating a QR request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QrError {
    #[error("url is required")]
    EmptyUrl,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("size must be between 50 and 1000, got {0}")]
    SizeOutOfRange(u32),

    #[error("margin must be at most 50, got {0}")]
    MarginOutOfRange(u32),
}

/// Error correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ecc {
    L,
    #[default]
    M,
    Q,
    H,
}

impl Ecc {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecc::L => "L",
            Ecc::M => "M",
            Ecc::Q => "Q",
            Ecc::H => "H",
        }
    }
}

/// An sRGB color, sent to the image API as `r-g-b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub fn to_param(&self) -> String {
        let [r, g, b] = self.0;
        format!("{}-{}-{}", r, g, b)
    }
}

/// Rendering options for a QR image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrOptions {
    /// Edge length in pixels
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub ecc: Ecc,
    /// Quiet zone in modules
    #[serde(default = "default_margin")]
    pub margin: u32,
    /// Module color
    #[serde(default = "default_color")]
    pub color: Rgb,
    #[serde(default = "default_bgcolor")]
    pub bgcolor: Rgb,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: default_size(),
            ecc: Ecc::default(),
            margin: default_margin(),
            color: default_color(),
            bgcolor: default_bgcolor(),
        }
    }
}

fn default_size() -> u32 {
    256
}

fn default_margin() -> u32 {
    2
}

fn default_color() -> Rgb {
    Rgb::BLACK
}

fn default_bgcolor() -> Rgb {
    Rgb::WHITE
}

impl QrOptions {
    pub fn validate(&self) -> Result<(), QrError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(QrError::SizeOutOfRange(self.size));
        }
        if self.margin > MAX_MARGIN {
            return Err(QrError::MarginOutOfRange(self.margin));
        }
        Ok(())
    }
}

/// Trim `input` and default its scheme to `https://`.
pub fn canonicalize(input: &str) -> Result<String, QrError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QrError::EmptyUrl);
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&candidate).map_err(|e| QrError::InvalidUrl(e.to_string()))?;
    Ok(candidate)
}

/// Build the QR image link encoding `data`.
pub fn build_image_url(data: &str, options: &QrOptions) -> Result<Url, QrError> {
    options.validate()?;

    let size = format!("{0}x{0}", options.size);
    let margin = options.margin.to_string();
    let color = options.color.to_param();
    let bgcolor = options.bgcolor.to_param();
    Url::parse_with_params(
        QR_API_BASE,
        [
            ("size", size.as_str()),
            ("data", data),
            ("ecc", options.ecc.as_str()),
            ("margin", margin.as_str()),
            ("color", color.as_str()),
            ("bgcolor", bgcolor.as_str()),
            ("format", "png"),
        ],
    )
    .map_err(|e| QrError::InvalidUrl(e.to_string()))
}
