use glam::Vec2;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Held camera-pan keys (arrows or WASD).
#[derive(Debug, Default, Copy, Clone)]
pub struct PanKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl PanKeys {
    /// Returns `true` if the key is a pan key.
    pub fn handle(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        let held = event.state == ElementState::Pressed;
        let slot = match code {
            KeyCode::ArrowLeft | KeyCode::KeyA => &mut self.left,
            KeyCode::ArrowRight | KeyCode::KeyD => &mut self.right,
            KeyCode::ArrowUp | KeyCode::KeyW => &mut self.up,
            KeyCode::ArrowDown | KeyCode::KeyS => &mut self.down,
            _ => return false,
        };
        *slot = held;
        true
    }

    /// Unit-or-zero pan direction; diagonals are normalized.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.down, self.up)).normalize_or_zero()
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

/// Maps a cursor position in physical pixels (top-left origin) to NDC.
pub fn cursor_to_ndc(cursor: (f64, f64), size: (u32, u32)) -> Option<Vec2> {
    let (w, h) = size;
    if w == 0 || h == 0 {
        return None;
    }
    let x = cursor.0 as f32 / w as f32 * 2.0 - 1.0;
    let y = 1.0 - cursor.1 as f32 / h as f32 * 2.0;
    Some(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_keys_do_not_pan() {
        assert_eq!(PanKeys::default().direction(), Vec2::ZERO);
    }

    #[test]
    fn opposite_keys_cancel() {
        let keys = PanKeys {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(keys.direction(), Vec2::ZERO);
    }

    #[test]
    fn diagonal_is_normalized() {
        let keys = PanKeys {
            right: true,
            up: true,
            ..Default::default()
        };
        assert!((keys.direction().length() - 1.0).abs() < 1e-6);
        assert!(keys.direction().x > 0.0 && keys.direction().y > 0.0);
    }

    #[test]
    fn cursor_corners_map_to_ndc() {
        assert_eq!(cursor_to_ndc((0.0, 0.0), (200, 100)), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(cursor_to_ndc((200.0, 100.0), (200, 100)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(cursor_to_ndc((5.0, 5.0), (0, 100)), None);
    }
}
