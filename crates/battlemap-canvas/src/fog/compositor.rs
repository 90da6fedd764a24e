//! Fog compositing: replays the area log into a cached raster.
//!
//! The raster is rebuilt only when the fog revision or the map dimensions
//! change. Renderers ask for it every frame and get the cached pixmap back.

use battlemap_core::{FogError, Result};
use image::RgbaImage;
use tiny_skia::{BlendMode, Color, FillRule, Paint, Pixmap, Transform};

use super::state::{FogOperation, FogState};

/// A composited visibility mask the size of the map.
///
/// Pixels are premultiplied RGBA; alpha 0 means the map shows through.
#[derive(Debug, Clone)]
pub struct FogRaster {
    pixmap: Pixmap,
}

impl FogRaster {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Fog alpha at a canvas pixel; `None` outside the map.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    /// True when any fog covers the pixel. Pixels outside the map are not fogged.
    pub fn is_fogged(&self, x: u32, y: u32) -> bool {
        self.alpha_at(x, y).is_some_and(|a| a > 0)
    }

    /// Copies the raster into a straight-alpha RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        crate::renderer::pixmap_to_image(&self.pixmap)
    }
}

/// Replays every fog operation onto a fresh raster.
///
/// 1. Fill the map with fog colour at fog opacity.
/// 2. Walk reveals and hides in `created_at` order.
/// 3. Reveals clear their shape, hides paint the fog back with `Source` blending
///    so overlapping hides never darken beyond the configured opacity.
pub fn composite(fog: &FogState, width: u32, height: u32) -> Result<FogRaster> {
    let mut pixmap = Pixmap::new(width, height).ok_or(FogError::RasterAllocation { width, height })?;

    let color = fog.color();
    let alpha = (fog.opacity() * 255.0).round() as u8;
    let fog_color = Color::from_rgba8(color.r, color.g, color.b, alpha);
    pixmap.fill(fog_color);

    let mut reveal = Paint::default();
    reveal.blend_mode = BlendMode::Clear;
    reveal.anti_alias = true;

    let mut hide = Paint::default();
    hide.set_color(fog_color);
    hide.blend_mode = BlendMode::Source;
    hide.anti_alias = true;

    for (operation, area) in fog.ordered_operations() {
        let Some(path) = area.shape().to_path() else {
            tracing::warn!("Skipping fog area {} with no drawable path", area.id());
            continue;
        };
        let paint = match operation {
            FogOperation::Reveal => &reveal,
            FogOperation::Hide => &hide,
        };
        pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }

    Ok(FogRaster { pixmap })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    width: u32,
    height: u32,
}

/// Memoizes [`composite`] keyed on fog revision and map size.
#[derive(Debug, Default)]
pub struct FogCompositor {
    cache: Option<(CacheKey, FogRaster)>,
    rebuilds: u64,
}

impl FogCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current raster, rebuilding it if stale.
    ///
    /// `Ok(None)` when fog is disabled: nothing should be drawn.
    pub fn raster(&mut self, fog: &FogState, width: u32, height: u32) -> Result<Option<&FogRaster>> {
        if !fog.enabled() {
            return Ok(None);
        }

        let key = CacheKey {
            revision: fog.revision(),
            width,
            height,
        };
        let stale = !matches!(&self.cache, Some((cached, _)) if *cached == key);
        if stale {
            let raster = composite(fog, width, height)?;
            self.rebuilds += 1;
            tracing::debug!(
                "Fog raster rebuilt ({}x{}, {} areas, rebuild #{})",
                width,
                height,
                fog.area_count(),
                self.rebuilds
            );
            self.cache = Some((key, raster));
        }

        Ok(self.cache.as_ref().map(|(_, raster)| raster))
    }

    /// Number of times the raster has been recomposited.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}
