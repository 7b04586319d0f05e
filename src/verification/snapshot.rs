use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};

use crate::error::VerificationError;
use crate::models::DetectedStrike;

/// A detected strike paired with the frame it was seen on.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    /// Shared between strikes detected on the same frame.
    pub image_png: Arc<Vec<u8>>,
    pub timestamp: f64,
    pub strike: DetectedStrike,
}

impl FrameSnapshot {
    pub fn new(image_png: Arc<Vec<u8>>, strike: DetectedStrike) -> Self {
        Self {
            image_png,
            timestamp: strike.timestamp,
            strike,
        }
    }

    pub fn strike_id(&self) -> &str {
        &self.strike.id
    }
}

pub fn encode_png(image: &DynamicImage) -> Result<Arc<Vec<u8>>, VerificationError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| VerificationError::Snapshot(err.to_string()))?;
    Ok(Arc::new(bytes))
}
