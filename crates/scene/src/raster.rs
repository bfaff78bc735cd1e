//! CPU side-view rasterization of an [`Aquarium`] frame.
//!
//! An orthographic view down the z axis: x to the right, y up. This is a
//! debugging aid for motion, not a renderer; fish are discs with a heading
//! tick, seaweed blades are their bent spines, bubbles are soft dots. Always
//! available (no feature gate) so the pixel buffer can be inspected without
//! the `image` crate.

use crate::Aquarium;
use aquarium_core::error::AquariumError;
use aquarium_particles::bubbles::bubble_alpha;
use aquarium_school::Species;
use glam::{DVec2, DVec3};

const WATER_TOP: [u8; 3] = [36, 120, 160];
const WATER_BOTTOM: [u8; 3] = [8, 40, 70];
const FLOOR: [u8; 3] = [143, 72, 41];
const PEBBLE: [u8; 3] = [99, 98, 98];
const SEAWEED: [u8; 3] = [60, 150, 70];
const BUBBLE: [u8; 3] = [200, 230, 255];

/// Spine samples per seaweed blade.
const SPINE_POINTS: usize = 6;

/// Largest accepted image side in pixels.
pub const MAX_RASTER_SIDE: usize = 16_384;

/// Body colour of each species.
pub fn species_color(species: Species) -> [u8; 3] {
    match species {
        Species::Koi => [240, 110, 40],
        Species::GoldFish => [250, 190, 30],
        Species::BlueTang => [40, 90, 230],
        Species::Betta => [200, 30, 90],
        Species::MandarinFish => [40, 200, 180],
    }
}

/// The world window mapped onto the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideView {
    pub width: usize,
    pub height: usize,
    /// World `(x, y)` at the bottom-left corner.
    pub min: DVec2,
    /// World `(x, y)` at the top-right corner.
    pub max: DVec2,
}

impl SideView {
    /// Frames one and a half roaming widths and two roaming heights, with
    /// the image height following the window's aspect ratio.
    pub fn for_bounds(bounds: DVec3, width: usize) -> Result<Self, AquariumError> {
        let half = DVec2::new(bounds.x * 1.5, bounds.y * 2.0);
        let height = ((width as f64) * half.y / half.x).round().max(1.0);
        // Saturating cast; oversized heights are rejected by `new`.
        let height = height as usize;
        Self::new(width, height, -half, half)
    }

    pub fn new(width: usize, height: usize, min: DVec2, max: DVec2) -> Result<Self, AquariumError> {
        for (name, side) in [("raster.width", width), ("raster.height", height)] {
            if side == 0 || side > MAX_RASTER_SIDE {
                return Err(AquariumError::InvalidCount {
                    name: name.into(),
                    value: side,
                });
            }
        }
        if !(min.is_finite() && max.is_finite() && min.x < max.x && min.y < max.y) {
            return Err(AquariumError::InvalidRange {
                name: "raster window".into(),
                min: min.x,
                max: max.x,
            });
        }
        Ok(Self {
            width,
            height,
            min,
            max,
        })
    }

    /// Continuous pixel coordinates of world `(x, y)`; row 0 is the top.
    pub fn to_pixel(&self, x: f64, y: f64) -> DVec2 {
        let u = (x - self.min.x) / (self.max.x - self.min.x);
        let v = (self.max.y - y) / (self.max.y - self.min.y);
        DVec2::new(u * self.width as f64, v * self.height as f64)
    }

    /// World x at the center of pixel column `px`.
    fn column_x(&self, px: usize) -> f64 {
        self.min.x + (px as f64 + 0.5) / self.width as f64 * (self.max.x - self.min.x)
    }

    /// World units per pixel, horizontally.
    fn scale(&self) -> f64 {
        self.width as f64 / (self.max.x - self.min.x)
    }
}

/// An RGBA8 image with alpha compositing over an opaque background.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl Raster {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// RGBA of pixel `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    fn blend(&mut self, x: i64, y: i64, rgb: [u8; 3], alpha: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let i = (y as usize * self.width + x as usize) * 4;
        for (c, &src) in rgb.iter().enumerate() {
            let dst = f64::from(self.rgba[i + c]);
            self.rgba[i + c] = (dst + (f64::from(src) - dst) * a).round() as u8;
        }
        self.rgba[i + 3] = 255;
    }

    fn disc(&mut self, center: DVec2, radius: f64, rgb: [u8; 3], alpha: f64) {
        let r = radius.max(0.5);
        let (x0, x1) = ((center.x - r).floor() as i64, (center.x + r).ceil() as i64);
        let (y0, y1) = ((center.y - r).floor() as i64, (center.y + r).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
                if d <= r {
                    self.blend(x, y, rgb, alpha);
                }
            }
        }
    }

    fn line(&mut self, from: DVec2, to: DVec2, rgb: [u8; 3], alpha: f64) {
        let steps = from.distance(to).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let p = from.lerp(to, s as f64 / steps as f64);
            self.blend(p.x.floor() as i64, p.y.floor() as i64, rgb, alpha);
        }
    }
}

/// Draws the aquarium's current frame at its last elapsed time.
pub fn render_side_view(aquarium: &Aquarium, view: &SideView) -> Raster {
    let mut raster = Raster::new(view.width, view.height);
    let time = aquarium.elapsed();

    for y in 0..view.height {
        let t = y as f64 / (view.height.max(2) - 1) as f64;
        let rgb = [0, 1, 2].map(|c| {
            (f64::from(WATER_TOP[c]) + (f64::from(WATER_BOTTOM[c]) - f64::from(WATER_TOP[c])) * t)
                .round() as u8
        });
        for x in 0..view.width {
            raster.blend(x as i64, y as i64, rgb, 1.0);
        }
    }

    let floor = aquarium.floor();
    for px in 0..view.width {
        let ground = floor.height_at(view.column_x(px), 0.0);
        let top = view.to_pixel(0.0, ground).y.floor().max(0.0) as usize;
        for py in top..view.height {
            raster.blend(px as i64, py as i64, FLOOR, 1.0);
        }
    }

    let px_per_unit = view.scale();
    for pebble in aquarium.pebbles() {
        let p = view.to_pixel(pebble.position.x, pebble.position.y);
        raster.disc(p, pebble.radius * pebble.scale * 0.5 * px_per_unit, PEBBLE, 1.0);
    }

    let seaweed = aquarium.seaweed();
    let blade_height = seaweed.seaweed_params().blade_height;
    let bend_amp = seaweed.seaweed_params().bend_amp;
    for (id, blade) in seaweed.blades().iter().enumerate() {
        let spine: Vec<DVec2> = (0..SPINE_POINTS)
            .map(|k| {
                let y = blade_height * k as f64 / (SPINE_POINTS - 1) as f64;
                let p = blade.deform(DVec3::new(0.0, y, 0.0), id, time, bend_amp, blade_height);
                view.to_pixel(p.x, p.y)
            })
            .collect();
        for pair in spine.windows(2) {
            raster.line(pair[0], pair[1], SEAWEED, 0.8);
        }
    }

    let bubbles = aquarium.bubbles();
    let ceiling = bubbles.bubble_params().ceiling;
    let origin = bubbles.origin();
    for (b, world) in bubbles.bubbles().iter().zip(bubbles.positions_at(time)) {
        let alpha = bubble_alpha(world.y - origin.y, ceiling);
        let p = view.to_pixel(world.x, world.y);
        raster.disc(p, (b.size / 20.0).max(1.0), BUBBLE, 0.2 + 0.6 * alpha);
    }

    for entry in aquarium.schools() {
        let rgb = species_color(entry.species);
        for t in entry.school.transforms() {
            let p = view.to_pixel(t.position.x, t.position.y);
            let radius = (t.scale * 10.0 * px_per_unit).max(1.5);
            raster.disc(p, radius, rgb, 1.0);
            let heading = t.orientation * DVec3::Z;
            let nose = view.to_pixel(
                t.position.x + heading.x * t.scale * 20.0,
                t.position.y + heading.y * t.scale * 20.0,
            );
            raster.line(p, nose, rgb, 1.0);
        }
    }

    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClipCatalog;
    use aquarium_core::config::AquariumConfig;
    use serde_json::json;

    fn tank() -> Aquarium {
        let config = AquariumConfig::from_json(&json!({
            "total_fish_count": 4,
            "school_count": 2,
            "pebble_count": 3,
            "bubbles": {"count": 5},
            "seaweed": {"count": 6, "segments": 2}
        }))
        .unwrap();
        Aquarium::new(&config, &ClipCatalog::swim_clips(1.0)).unwrap()
    }

    #[test]
    fn view_follows_bounds_aspect() {
        let view = SideView::for_bounds(DVec3::new(60.0, 10.0, 10.0), 900).unwrap();
        assert_eq!(view.height, 200);
        assert_eq!(view.min, DVec2::new(-90.0, -20.0));
    }

    #[test]
    fn to_pixel_maps_corners() {
        let view = SideView::new(100, 50, DVec2::new(-10.0, -5.0), DVec2::new(10.0, 5.0)).unwrap();
        assert_eq!(view.to_pixel(-10.0, 5.0), DVec2::ZERO);
        assert_eq!(view.to_pixel(10.0, -5.0), DVec2::new(100.0, 50.0));
        assert_eq!(view.to_pixel(0.0, 0.0), DVec2::new(50.0, 25.0));
    }

    #[test]
    fn degenerate_views_are_rejected() {
        assert!(SideView::new(0, 10, DVec2::ZERO, DVec2::ONE).is_err());
        assert!(SideView::new(10, 10, DVec2::ONE, DVec2::ZERO).is_err());
        assert!(SideView::new(usize::MAX, 2, DVec2::ZERO, DVec2::ONE).is_err());
    }

    #[test]
    fn oversized_views_are_rejected_before_allocation() {
        assert!(SideView::new(MAX_RASTER_SIDE, MAX_RASTER_SIDE, DVec2::ZERO, DVec2::ONE).is_ok());
        let wide = SideView::new(MAX_RASTER_SIDE + 1, 10, DVec2::ZERO, DVec2::ONE);
        assert!(matches!(
            wide,
            Err(AquariumError::InvalidCount { ref name, value }) if name == "raster.width" && value == MAX_RASTER_SIDE + 1
        ));
        assert!(SideView::for_bounds(DVec3::new(60.0, 10.0, 10.0), 1_000_000_000).is_err());
        // A flat, tall tank pushes the derived height over the cap.
        assert!(SideView::for_bounds(DVec3::new(1.0, 1000.0, 1.0), 1000).is_err());
    }

    #[test]
    fn render_fills_every_pixel_opaque() {
        let a = tank();
        let view = SideView::for_bounds(a.config().bounds, 240).unwrap();
        let raster = render_side_view(&a, &view);
        assert_eq!(raster.rgba().len(), view.width * view.height * 4);
        assert!(raster.rgba().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn fish_are_drawn_in_species_colour() {
        let mut a = tank();
        for frame in 1..=30 {
            a.tick(1.0 / 30.0, frame as f64 / 30.0);
        }
        let view = SideView::for_bounds(a.config().bounds, 600).unwrap();
        let raster = render_side_view(&a, &view);
        let entry = a.schools().last().unwrap();
        let t = *entry.school.transforms().last().unwrap();
        let p = view.to_pixel(t.position.x, t.position.y);
        let pixel = raster.pixel(p.x as usize, p.y as usize).unwrap();
        let rgb = species_color(entry.species);
        assert_eq!([pixel[0], pixel[1], pixel[2]], rgb);
    }

    #[test]
    fn floor_is_drawn_below_ground() {
        let a = tank();
        let view = SideView::for_bounds(a.config().bounds, 300).unwrap();
        let raster = render_side_view(&a, &view);
        let bottom = raster.pixel(0, view.height - 1).unwrap();
        assert_eq!([bottom[0], bottom[1], bottom[2]], FLOOR);
    }

    #[test]
    fn pixel_outside_is_none() {
        let a = tank();
        let view = SideView::for_bounds(a.config().bounds, 60).unwrap();
        let raster = render_side_view(&a, &view);
        assert!(raster.pixel(view.width, 0).is_none());
        assert_eq!(raster.width(), 60);
        assert_eq!(raster.height(), view.height);
    }
}
