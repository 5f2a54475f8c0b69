use glam::{Vec2, Vec3};

use crate::camera::Camera;

use super::draw::{DebugDraw, DebugStyle};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridConfig {
    /// Cell size in world units.
    pub cell: Vec2,
    pub color: Vec3,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell: Vec2::new(32.0, 32.0),
            color: Vec3::splat(0.5),
        }
    }
}

/// Editor grid covering the camera's view, re-emitted every frame as
/// one-frame debug lines.
#[derive(Debug, Clone, Default)]
pub struct GridLines {
    config: GridConfig,
}

impl GridLines {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Segments for a view whose bottom-left is `camera_pos` and which spans
    /// `projection_size`. The grid starts one cell before the view and runs
    /// one cell past it on each axis.
    pub fn segments(&self, camera_pos: Vec2, projection_size: Vec2) -> Vec<(Vec2, Vec2)> {
        let cell = self.config.cell;
        if cell.x <= 0.0 || cell.y <= 0.0 {
            return Vec::new();
        }

        let first_x = ((camera_pos.x / cell.x) as i32 - 1) as f32 * cell.x;
        let first_y = ((camera_pos.y / cell.y) as i32 - 1) as f32 * cell.y;

        let horizontal = (projection_size.y / cell.y) as usize + 2;
        let vertical = (projection_size.x / cell.x) as usize + 2;

        let width = projection_size.x.trunc() + cell.x;
        let height = projection_size.y.trunc() + cell.y;

        let mut out = Vec::with_capacity(horizontal + vertical);
        for i in 0..horizontal.max(vertical) {
            let x = first_x + cell.x * i as f32;
            let y = first_y + cell.y * i as f32;

            if i < horizontal {
                out.push((Vec2::new(first_x, y), Vec2::new(x + width, y)));
            }
            if i < vertical {
                out.push((Vec2::new(x, first_y), Vec2::new(x, y + height)));
            }
        }
        out
    }

    /// Queues this frame's grid into `debug`.
    pub fn update(&self, camera: &Camera, debug: &mut DebugDraw) {
        let style = DebugStyle::colored(self.config.color);
        for (start, end) in self.segments(camera.position, camera.projection_size()) {
            if !debug.add_line(start, end, style) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, CameraConfig};

    fn grid() -> GridLines {
        GridLines::default()
    }

    fn is_horizontal(seg: &(Vec2, Vec2)) -> bool {
        seg.0.y == seg.1.y && seg.0.x != seg.1.x
    }

    #[test]
    fn line_counts_follow_view_size() {
        let segs = grid().segments(Vec2::ZERO, Vec2::new(1280.0, 672.0));
        let h = segs.iter().filter(|s| is_horizontal(s)).count();
        assert_eq!(h, 21 + 2);
        assert_eq!(segs.len() - h, 40 + 2);
    }

    #[test]
    fn grid_starts_one_cell_before_camera() {
        let segs = grid().segments(Vec2::new(100.0, 70.0), Vec2::new(64.0, 64.0));
        // 100 / 32 -> 3 cells, minus one -> 64; 70 / 32 -> 2, minus one -> 32.
        assert_eq!(segs[0].0, Vec2::new(64.0, 32.0));
        assert_eq!(segs[1].0, Vec2::new(64.0, 32.0));
        assert!(segs.iter().all(|s| s.0.x >= 64.0 && s.0.y >= 32.0));
    }

    #[test]
    fn lines_snap_to_cells() {
        let segs = grid().segments(Vec2::new(45.0, 13.0), Vec2::new(128.0, 96.0));
        for (a, _) in &segs {
            assert_eq!(a.x % 32.0, 0.0);
            assert_eq!(a.y % 32.0, 0.0);
        }
    }

    #[test]
    fn update_queues_one_frame_lines() {
        let camera = Camera::with_config(
            Vec2::ZERO,
            CameraConfig {
                projection_size: Vec2::new(320.0, 160.0),
                ..Default::default()
            },
        );
        let mut debug = DebugDraw::default();
        grid().update(&camera, &mut debug);
        assert_eq!(debug.len(), (5 + 2) + (10 + 2));
        assert!(debug.lines().iter().all(|l| l.color == Vec3::splat(0.5)));

        debug.begin_frame();
        debug.begin_frame();
        assert!(debug.is_empty());
    }

    #[test]
    fn non_positive_cell_yields_nothing() {
        let g = GridLines::new(GridConfig {
            cell: Vec2::new(0.0, 32.0),
            ..Default::default()
        });
        assert!(g.segments(Vec2::ZERO, Vec2::splat(100.0)).is_empty());
    }
}
