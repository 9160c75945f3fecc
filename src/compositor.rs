//! Flattened export.
//!
//! [`FlattenedScene::capture`] takes a point-in-time copy of everything that
//! ends up in an exported image: visible layers bottom-first, each with its
//! paint operations and its placed elements. Edits made after capture never
//! reach an in-flight export. Turning the scene into encoded bytes is the job
//! of a host-provided [`Compositor`].

#[cfg(test)]
#[path = "compositor_test.rs"]
mod compositor_test;

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::Document;
use crate::element::Element;
use crate::layer::{LayerId, StrokeRecord};

/// One visible layer as it will be composited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedLayer {
    pub id: LayerId,
    pub name: String,
    pub raster: Vec<StrokeRecord>,
    /// Placed elements in paint order, with selection state cleared.
    pub elements: Vec<Element>,
}

/// A point-in-time export snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedScene {
    /// Output size in canvas pixels.
    pub width: f64,
    pub height: f64,
    /// Visible layers, bottom layer first.
    pub layers: Vec<FlattenedLayer>,
}

impl FlattenedScene {
    #[must_use]
    pub fn capture(doc: &Document, width: f64, height: f64) -> Self {
        let layers = doc
            .layers
            .iter()
            .rev()
            .filter(|l| !l.hidden)
            .map(|layer| FlattenedLayer {
                id: layer.id,
                name: layer.name.clone(),
                raster: layer.raster.clone(),
                elements: doc
                    .elements
                    .iter()
                    .filter(|e| e.layer_id == layer.id && e.position.is_some())
                    .map(|e| Element { focused: false, ..e.clone() })
                    .collect(),
            })
            .collect();
        Self { width, height, layers }
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.layers.iter().all(|l| l.raster.is_empty() && l.elements.is_empty())
    }
}

/// Renders a flattened scene to encoded image bytes.
pub trait Compositor {
    type Error;

    /// `quality` is in `0.0..=1.0`, as for lossy browser image encoders.
    ///
    /// # Errors
    ///
    /// Implementation-defined encoding or surface failures.
    fn render_flattened(&self, scene: &FlattenedScene, quality: f64) -> Result<Vec<u8>, Self::Error>;
}

/// Clamp `quality` and hand the scene to `compositor`.
///
/// # Errors
///
/// Whatever the compositor returns.
pub fn export<C: Compositor>(compositor: &C, scene: &FlattenedScene, quality: f64) -> Result<Vec<u8>, C::Error> {
    let quality = if quality.is_nan() { 1.0 } else { quality.clamp(0.0, 1.0) };
    if scene.is_blank() {
        warn!("exporting a blank scene");
    }
    let bytes = compositor.render_flattened(scene, quality)?;
    debug!(layers = scene.layers.len(), bytes = bytes.len(), quality, "export rendered");
    Ok(bytes)
}
