use anyhow::{Context, Result};
use glam::Mat4;

use super::common::validated;
use super::ctx::RenderCtx;
use super::slots::FrameSlots;
use super::uniforms::{UniformBlock, UniformField};

/// Uniform regions allocated up front; the buffer doubles past that.
const INITIAL_UNIFORM_SLOTS: usize = 4;

/// Compiled WGSL program with a named uniform block at `@group(0) @binding(0)`.
///
/// Uniform uploads are staged on the CPU. Each [`use_program`](Self::use_program)
/// of a frame binds its own region of the uniform buffer (dynamic offset), so
/// drawing with two cameras in one frame keeps both.
pub struct Shader {
    label: String,
    module: wgpu::ShaderModule,
    uniforms: UniformBlock,
    slots: FrameSlots,
    ubo: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    in_use: bool,
}

impl Shader {
    /// Compiles `source` and allocates its uniform buffer.
    ///
    /// WGSL parse and validation errors are fatal and returned as `Err`.
    pub fn compile(
        device: &wgpu::Device,
        label: &str,
        source: &str,
        fields: &'static [UniformField],
    ) -> Result<Self> {
        let module = validated(device, "shader compilation", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })
        .with_context(|| format!("compiling shader '{label}'"))?;

        let uniforms = UniformBlock::new(fields);
        let block = uniforms.size() as u64;
        let slots = FrameSlots::new(
            block,
            device.limits().min_uniform_buffer_offset_alignment as u64,
            INITIAL_UNIFORM_SLOTS,
        );

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} uniform layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(block),
                },
                count: None,
            }],
        });

        let (ubo, bind_group) = uniform_buffer(device, label, &layout, &slots, block);

        log::debug!("shader '{label}' compiled ({block} uniform bytes)");

        Ok(Self {
            label: label.to_owned(),
            module,
            uniforms,
            slots,
            ubo,
            layout,
            bind_group,
            in_use: false,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    /// Layout of bind group 0; pipelines using this shader start with it.
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn upload_mat4(&mut self, name: &str, m: &Mat4) {
        self.uniforms.set_mat4(name, m);
    }

    pub fn upload_int_array(&mut self, name: &str, values: &[i32]) {
        self.uniforms.set_int_array(name, values);
    }

    /// Writes the staged uniforms into this draw's region and binds it as
    /// group 0 of `pass`. A region already holding the same values is not
    /// written again.
    pub fn use_program(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) {
        let changed = self.uniforms.take_changed();
        let claim = self.slots.claim(ctx.frame, changed);

        if claim.grew {
            log::debug!(
                "shader '{}': uniform buffer grown to {} regions",
                self.label,
                self.slots.capacity()
            );
            let block = self.uniforms.size() as u64;
            (self.ubo, self.bind_group) =
                uniform_buffer(ctx.device, &self.label, &self.layout, &self.slots, block);
        }
        if claim.upload {
            ctx.queue
                .write_buffer(&self.ubo, claim.offset, self.uniforms.bytes());
        }

        pass.set_bind_group(0, &self.bind_group, &[claim.offset as wgpu::DynamicOffset]);
        self.in_use = true;
    }

    /// Marks the program inactive. Bindings end with the pass itself.
    pub fn detach(&mut self) {
        self.in_use = false;
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use
    }
}

/// Buffer sized for every region of `slots`, bound one block at a time.
fn uniform_buffer(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    slots: &FrameSlots,
    block: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let ubo = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{label} uniforms")),
        size: slots.buffer_size(),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} uniform bind group")),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &ubo,
                offset: 0,
                size: wgpu::BufferSize::new(block),
            }),
        }],
    });
    (ubo, bind_group)
}
