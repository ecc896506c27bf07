use egui::{Id, Pos2, Rect, Ui, Vec2};

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 4.0;

/// Zoom and pan of one canvas, kept in egui temp memory between frames.
///
/// `pan` is relative to the widget's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Vec2,
    /// Set until the first fit-to-screen has happened.
    pub first_frame: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            first_frame: true,
        }
    }
}

impl Viewport {
    fn key(id: Id) -> Id {
        id.with("graph_studio_viewport")
    }

    pub fn load(ui: &Ui, id: Id) -> Self {
        ui.data_mut(|d| d.get_temp::<Viewport>(Self::key(id)))
            .unwrap_or_default()
    }

    pub fn save(self, ui: &mut Ui, id: Id) {
        ui.data_mut(|d| d.insert_temp(Self::key(id), self));
    }

    pub fn canvas_to_local(&self, pos: Pos2) -> Pos2 {
        (pos.to_vec2() * self.zoom + self.pan).to_pos2()
    }

    pub fn local_to_canvas(&self, pos: Pos2) -> Pos2 {
        ((pos.to_vec2() - self.pan) / self.zoom).to_pos2()
    }

    /// Zooms by `delta` keeping `center` (local coordinates) in place.
    pub fn zoom_by(&mut self, local_rect: Rect, delta: f32, center: Option<Pos2>) {
        let center = center.unwrap_or(local_rect.center()).to_vec2();
        let anchor = (center - self.pan) / self.zoom;
        let new_zoom = (self.zoom * (1.0 + delta)).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan += anchor * self.zoom - anchor * new_zoom;
        self.zoom = new_zoom;
    }

    /// Centers `bounds` in `local_rect` with `padding` (fraction of the graph size).
    pub fn fit(&mut self, local_rect: Rect, bounds: Option<Rect>, padding: f32) {
        let bounds = bounds
            .filter(|b| b.is_finite() && b.width() >= 0.0 && b.height() >= 0.0)
            .unwrap_or(Rect::from_center_size(Pos2::ZERO, Vec2::splat(1.0)));
        let size = bounds.size().max(Vec2::splat(1.0)) * (1.0 + padding);
        let zoom = (local_rect.width() / size.x)
            .min(local_rect.height() / size.y)
            .abs();
        self.zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom.clamp(MIN_ZOOM, 1.5)
        } else {
            1.0
        };
        self.pan = local_rect.center().to_vec2() - bounds.center().to_vec2() * self.zoom;
        self.first_frame = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_are_inverse() {
        let v = Viewport {
            zoom: 2.0,
            pan: Vec2::new(10.0, -5.0),
            first_frame: false,
        };
        let p = Pos2::new(3.0, 4.0);
        assert_eq!(v.canvas_to_local(p), Pos2::new(16.0, 3.0));
        assert_eq!(v.local_to_canvas(v.canvas_to_local(p)), p);
    }

    #[test]
    fn zoom_keeps_anchor_in_place() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0));
        let mut v = Viewport::default();
        let anchor = Pos2::new(100.0, 50.0);
        let before = v.local_to_canvas(anchor);
        v.zoom_by(rect, 0.5, Some(anchor));
        assert_eq!(v.zoom, 1.5);
        let after = v.local_to_canvas(anchor);
        assert!((before - after).length() < 1e-4);
    }

    #[test]
    fn fit_centers_bounds() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let bounds = Rect::from_min_max(Pos2::new(200.0, 100.0), Pos2::new(600.0, 500.0));
        let mut v = Viewport::default();
        v.fit(rect, Some(bounds), 0.0);
        assert!(!v.first_frame);
        assert_eq!(v.zoom, 1.5);
        let c = v.canvas_to_local(bounds.center());
        assert!((c - rect.center()).length() < 1e-3);

        // empty graph still yields a usable transform
        v.fit(rect, None, 0.1);
        assert!(v.zoom.is_finite() && v.zoom > 0.0);
    }
}
