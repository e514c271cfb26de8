const DEFAULT_YAW: f64 = -0.6;
const DEFAULT_PITCH: f64 = 0.5;
pub const MAX_PITCH: f64 = std::f64::consts::FRAC_PI_2;

/// Orbit camera around the centre of the collar cloud.
///
/// `yaw` turns around the vertical (elevation) axis, `pitch` tilts from a
/// side view (0) to a map view looking straight down (π/2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f64,
    pub pitch: f64,
    pub zoom: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            zoom: 1.0,
        }
    }
}

impl OrbitCamera {
    /// Map a normalized world point to (right, up, depth). Larger depth is
    /// farther from the viewer.
    pub fn view(&self, p: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = p;
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let right = x * cy - y * sy;
        let forward = x * sy + y * cy;
        let up = z * cp + forward * sp;
        let depth = forward * cp - z * sp;
        [right, up, depth]
    }

    pub fn orbit(&mut self, dx: f64, dy: f64) {
        self.yaw -= dx * 0.01;
        self.pitch = (self.pitch + dy * 0.01).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn zoom_by(&mut self, scroll: f64) {
        self.zoom = (self.zoom * (1.0 + scroll * 0.002)).clamp(0.1, 50.0);
    }
}
