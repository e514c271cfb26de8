use eframe::egui::Color32;

/// Tunables of the viewer. There is no config file: the defaults are the
/// configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Rows shown in each dataset preview.
    pub preview_rows: usize,
    /// Upper bound on automatic histogram bins.
    pub max_histogram_bins: usize,
    pub scene: SceneStyle,
}

/// Look of the 3D collar view.
#[derive(Debug, Clone)]
pub struct SceneStyle {
    pub title: String,
    pub marker_radius: f32,
    pub marker_color: Color32,
    pub axis_labels: [String; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Drill-Hole Explorer – Mining Drill Data".to_string(),
            window_size: [1280.0, 860.0],
            min_window_size: [720.0, 480.0],
            preview_rows: 5,
            max_histogram_bins: 200,
            scene: SceneStyle::default(),
        }
    }
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            title: "3D Drill-Hole View".to_string(),
            marker_radius: 5.0,
            // blue at 0.8 opacity
            marker_color: Color32::from_rgba_unmultiplied(0, 0, 255, 204),
            axis_labels: ["Est".to_string(), "Nord".to_string(), "Élévation".to_string()],
        }
    }
}
