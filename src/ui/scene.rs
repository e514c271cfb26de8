use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Ui};

use crate::camera::{MAX_PITCH, OrbitCamera};
use crate::data::collars::CollarCloud;
use crate::error::DrillError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Orthographic projection
// ---------------------------------------------------------------------------

/// Centre and scale shared by all three axes, so one unit of easting,
/// northing and elevation has the same length on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub center: [f64; 3],
    pub half_extent: f64,
}

impl SceneFrame {
    pub fn from_bounds(bounds: [(f64, f64); 3]) -> Self {
        let center = bounds.map(|(lo, hi)| (lo + hi) / 2.0);
        let half_extent = bounds
            .iter()
            .map(|(lo, hi)| (hi - lo) / 2.0)
            .fold(0.0, f64::max);
        Self {
            center,
            half_extent: if half_extent > 0.0 { half_extent } else { 1.0 },
        }
    }

    pub fn normalize(&self, p: [f64; 3]) -> [f64; 3] {
        [0, 1, 2].map(|i| (p[i] - self.center[i]) / self.half_extent)
    }
}

/// A collar placed on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub index: usize,
    pub pos: Pos2,
    pub depth: f64,
}

fn to_screen(view: [f64; 3], camera: &OrbitCamera, rect: Rect) -> Pos2 {
    let scale = camera.zoom * 0.4 * rect.width().min(rect.height()) as f64;
    let c = rect.center();
    Pos2::new(
        c.x + (view[0] * scale) as f32,
        c.y - (view[1] * scale) as f32,
    )
}

/// Project every collar into `rect`, ordered back to front.
pub fn project_cloud(cloud: &CollarCloud, camera: &OrbitCamera, rect: Rect) -> Vec<Projected> {
    let Some(bounds) = cloud.bounds() else {
        return Vec::new();
    };
    let frame = SceneFrame::from_bounds(bounds);

    let mut projected: Vec<Projected> = cloud
        .points
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let view = camera.view(frame.normalize(p.position));
            Projected {
                index,
                pos: to_screen(view, camera, rect),
                depth: view[2],
            }
        })
        .collect();
    projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    projected
}

/// The projected point under the pointer, nearest first.
pub fn pick(projected: &[Projected], pointer: Pos2, radius: f32) -> Option<Projected> {
    projected
        .iter()
        .filter(|p| p.pos.distance(pointer) <= radius)
        .min_by(|a, b| a.pos.distance(pointer).total_cmp(&b.pos.distance(pointer)))
        .copied()
}

// ---------------------------------------------------------------------------
// 3D tab
// ---------------------------------------------------------------------------

/// Render the 3D collar view in the central panel.
pub fn scene_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("3D Drill-Hole Visualization");
    ui.separator();

    let cloud = match state.collar_cloud() {
        Ok(cloud) => cloud,
        Err(DrillError::MissingDatasets) => {
            ui.label(RichText::new(DrillError::MissingDatasets.to_string()).color(Color32::from_rgb(230, 160, 0)));
            return;
        }
        Err(e) => {
            ui.label(RichText::new(format!("Cannot build the 3D view: {e}")).color(Color32::RED));
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{} collars", cloud.len()));
        if cloud.skipped > 0 {
            ui.label(format!("({} rows without coordinates)", cloud.skipped));
        }
        ui.separator();
        ui.label("Drag to rotate, scroll to zoom, double-click to reset.");
        if ui.small_button("Top view").clicked() {
            state.camera = OrbitCamera {
                yaw: 0.0,
                pitch: MAX_PITCH,
                zoom: state.camera.zoom,
            };
        }
    });

    let style = state.config.scene.clone();
    let size = ui.available_size().max(egui::vec2(200.0, 200.0));
    let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
    let rect = response.rect;

    if response.dragged() {
        let d = response.drag_delta();
        state.camera.orbit(d.x as f64, d.y as f64);
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            state.camera.zoom_by(scroll as f64);
        }
    }
    if response.double_clicked() {
        state.camera = OrbitCamera::default();
    }
    let camera = state.camera;

    painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);
    painter.text(
        rect.center_top() + egui::vec2(0.0, 8.0),
        Align2::CENTER_TOP,
        &style.title,
        FontId::proportional(16.0),
        ui.visuals().strong_text_color(),
    );

    if cloud.is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No collar has complete coordinates.",
            FontId::proportional(14.0),
            ui.visuals().text_color(),
        );
        return;
    }

    // Axes from the minimum corner of the bounding box.
    if let Some(bounds) = cloud.bounds() {
        let frame = SceneFrame::from_bounds(bounds);
        let origin = [bounds[0].0, bounds[1].0, bounds[2].0];
        let axis_color = ui.visuals().weak_text_color();
        let o = to_screen(camera.view(frame.normalize(origin)), &camera, rect);
        for (axis, label) in style.axis_labels.iter().enumerate() {
            let mut tip = origin;
            tip[axis] = bounds[axis].1.max(bounds[axis].0 + frame.half_extent * 0.5);
            let t = to_screen(camera.view(frame.normalize(tip)), &camera, rect);
            painter.line_segment([o, t], Stroke::new(1.0, axis_color));
            painter.text(t, Align2::LEFT_BOTTOM, label, FontId::proportional(13.0), axis_color);
        }
    }

    let projected = project_cloud(&cloud, &camera, rect);
    for p in &projected {
        painter.circle_filled(p.pos, style.marker_radius, style.marker_color);
    }

    // Legend
    let legend_pos = rect.right_top() + egui::vec2(-90.0, 12.0);
    painter.circle_filled(legend_pos, style.marker_radius, style.marker_color);
    painter.text(
        legend_pos + egui::vec2(10.0, 0.0),
        Align2::LEFT_CENTER,
        cloud.name,
        FontId::proportional(13.0),
        ui.visuals().text_color(),
    );

    if let Some(pointer) = response.hover_pos() {
        if let Some(hit) = pick(&projected, pointer, style.marker_radius + 3.0) {
            let point = &cloud.points[hit.index];
            let [x, y, z] = point.position;
            let id = point.hole_id.as_deref().unwrap_or("?");
            let [ex, no, el] = &style.axis_labels;
            painter.text(
                hit.pos + egui::vec2(8.0, -8.0),
                Align2::LEFT_BOTTOM,
                format!("{id}\n{ex}: {x}\n{no}: {y}\n{el}: {z}"),
                FontId::monospace(12.0),
                ui.visuals().strong_text_color(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::collars::{CollarPoint, TRACE_NAME};

    fn cloud(points: &[[f64; 3]]) -> CollarCloud {
        CollarCloud {
            name: TRACE_NAME,
            points: points
                .iter()
                .map(|&position| CollarPoint { hole_id: None, position })
                .collect(),
            skipped: 0,
        }
    }

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(400.0, 400.0))
    }

    #[test]
    fn single_collar_sits_in_the_middle() {
        let projected = project_cloud(&cloud(&[[100.0, 200.0, 50.0]]), &OrbitCamera::default(), rect());
        assert_eq!(projected.len(), 1);
        assert!(projected[0].pos.distance(Pos2::new(200.0, 200.0)) < 1e-3);
    }

    #[test]
    fn map_view_puts_east_right_and_north_up() {
        let camera = OrbitCamera { yaw: 0.0, pitch: MAX_PITCH, zoom: 1.0 };
        let c = cloud(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]]);
        let projected = project_cloud(&c, &camera, rect());
        let at = |i: usize| projected.iter().find(|p| p.index == i).unwrap().pos;
        assert!(at(1).x > at(0).x);
        assert!((at(1).y - at(0).y).abs() < 1e-3);
        assert!(at(2).y < at(0).y);
    }

    #[test]
    fn points_are_sorted_back_to_front() {
        let camera = OrbitCamera { yaw: 0.0, pitch: 0.0, zoom: 1.0 };
        // Looking along +north: the northern collar is farther away.
        let projected = project_cloud(&cloud(&[[0.0, 0.0, 0.0], [0.0, 10.0, 0.0]]), &camera, rect());
        assert_eq!(projected[0].index, 1);
        assert!(projected[0].depth > projected[1].depth);
    }

    #[test]
    fn frame_uses_one_scale_for_all_axes() {
        let frame = SceneFrame::from_bounds([(0.0, 100.0), (0.0, 10.0), (40.0, 60.0)]);
        assert_eq!(frame.half_extent, 50.0);
        assert_eq!(frame.normalize([100.0, 10.0, 60.0]), [1.0, 0.1, 0.2]);
    }

    #[test]
    fn pick_finds_the_nearest_marker() {
        let projected = vec![
            Projected { index: 0, pos: Pos2::new(10.0, 10.0), depth: 0.0 },
            Projected { index: 1, pos: Pos2::new(14.0, 10.0), depth: 0.0 },
        ];
        assert_eq!(pick(&projected, Pos2::new(13.0, 10.0), 5.0).unwrap().index, 1);
        assert!(pick(&projected, Pos2::new(100.0, 100.0), 5.0).is_none());
    }
}
