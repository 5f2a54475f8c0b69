use glam::Mat4;

/// Type of a named uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    /// Column-major 4×4 float matrix (64 bytes).
    Mat4,
    /// `len` tightly packed `i32`s. In WGSL declare it as
    /// `array<vec4<i32>, len / 4>` so the std140 stride matches.
    IntArray(usize),
}

impl UniformKind {
    pub const fn size(self) -> usize {
        match self {
            UniformKind::Mat4 => 64,
            UniformKind::IntArray(len) => len * 4,
        }
    }
}

/// One named entry of a shader's uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    /// Byte offset inside the block (16-byte aligned).
    pub offset: usize,
}

/// CPU mirror of a uniform buffer, addressed by field name.
#[derive(Debug)]
pub(crate) struct UniformBlock {
    fields: &'static [UniformField],
    bytes: Vec<u8>,
    dirty: bool,
    warned_unknown: bool,
}

impl UniformBlock {
    pub(crate) fn new(fields: &'static [UniformField]) -> Self {
        let end = fields
            .iter()
            .map(|f| f.offset + f.kind.size())
            .max()
            .unwrap_or(0);
        // Uniform buffers bind in 16-byte units.
        let size = end.div_ceil(16).max(1) * 16;
        Self {
            fields,
            bytes: vec![0; size],
            dirty: true,
            warned_unknown: false,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn set_mat4(&mut self, name: &str, m: &Mat4) -> bool {
        let Some(field) = self.lookup(name, |k| k == UniformKind::Mat4) else {
            return false;
        };
        let cols = m.to_cols_array();
        self.write(field.offset, bytemuck::cast_slice(&cols));
        true
    }

    /// Writes `values` from the start of the array. Values beyond the declared
    /// length are ignored; shorter input leaves the tail untouched.
    pub(crate) fn set_int_array(&mut self, name: &str, values: &[i32]) -> bool {
        let Some(field) = self.lookup(name, |k| matches!(k, UniformKind::IntArray(_))) else {
            return false;
        };
        let UniformKind::IntArray(len) = field.kind else { return false };
        if values.len() > len {
            log::debug!("uniform '{name}': {} values truncated to {len}", values.len());
        }
        let n = values.len().min(len);
        self.write(field.offset, bytemuck::cast_slice(&values[..n]));
        true
    }

    /// Whether the contents changed since the last call.
    pub(crate) fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn lookup(&mut self, name: &str, kind_ok: impl Fn(UniformKind) -> bool) -> Option<UniformField> {
        let found = self
            .fields
            .iter()
            .find(|f| f.name == name && kind_ok(f.kind))
            .copied();
        if found.is_none() && !self.warned_unknown {
            log::warn!("uniform '{name}' is not declared with that type; upload ignored");
            self.warned_unknown = true;
        }
        found
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        let dst = &mut self.bytes[offset..offset + data.len()];
        if dst != data {
            dst.copy_from_slice(data);
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[UniformField] = &[
        UniformField { name: "u_projection", kind: UniformKind::Mat4, offset: 0 },
        UniformField { name: "u_view", kind: UniformKind::Mat4, offset: 64 },
        UniformField { name: "u_textures", kind: UniformKind::IntArray(16), offset: 128 },
    ];

    fn floats_at(block: &UniformBlock, offset: usize, n: usize) -> Vec<f32> {
        bytemuck::cast_slice::<u8, f32>(&block.bytes()[offset..offset + n * 4]).to_vec()
    }

    #[test]
    fn block_size_covers_all_fields() {
        assert_eq!(UniformBlock::new(FIELDS).size(), 192);
    }

    #[test]
    fn size_rounds_up_to_sixteen() {
        const ODD: &[UniformField] =
            &[UniformField { name: "u_slots", kind: UniformKind::IntArray(3), offset: 0 }];
        assert_eq!(UniformBlock::new(ODD).size(), 16);
    }

    #[test]
    fn mat4_lands_at_its_offset() {
        let mut block = UniformBlock::new(FIELDS);
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        assert!(block.set_mat4("u_view", &m));
        assert_eq!(floats_at(&block, 64, 16), m.to_cols_array().to_vec());
        assert_eq!(floats_at(&block, 0, 16), vec![0.0; 16]);
    }

    #[test]
    fn int_array_is_truncated_to_declared_length() {
        let mut block = UniformBlock::new(FIELDS);
        let values: Vec<i32> = (0..20).collect();
        assert!(block.set_int_array("u_textures", &values));
        let written: &[i32] = bytemuck::cast_slice(&block.bytes()[128..192]);
        assert_eq!(written, &values[..16]);
    }

    #[test]
    fn unknown_or_mistyped_names_are_ignored() {
        let mut block = UniformBlock::new(FIELDS);
        block.take_changed();
        assert!(!block.set_mat4("u_model", &Mat4::IDENTITY));
        assert!(!block.set_int_array("u_view", &[1, 2]));
        assert!(!block.take_changed());
    }

    #[test]
    fn dirty_only_when_contents_change() {
        let mut block = UniformBlock::new(FIELDS);
        assert!(block.take_changed());
        block.set_mat4("u_projection", &Mat4::ZERO);
        assert!(!block.take_changed());
        block.set_mat4("u_projection", &Mat4::IDENTITY);
        assert!(block.take_changed());
        assert!(!block.take_changed());
    }
}
