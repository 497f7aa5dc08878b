//! Post-processing chain: bright extract -> separable blur -> composite with
//! ACES tone mapping onto the swap chain.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::pipeline::{
    create_blur_bind_group_layout, create_blur_pipeline, create_bright_bind_group_layout,
    create_bright_pipeline, create_composite_bind_group_layout, create_composite_pipeline,
};
use crate::texture::Texture;

/// Bloom is computed at 1/BLOOM_DOWNSCALE of the surface resolution.
pub const BLOOM_DOWNSCALE: u32 = 4;

/// Tunables of the bloom pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Bloom contribution added in the composite.
    pub strength: f32,
    /// Spread of the blur kernel.
    pub radius: f32,
    /// Luminance above which pixels bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 0.8,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

impl BloomSettings {
    /// Distance between blur taps, in bloom texels.
    pub fn tap_spacing(&self) -> f32 {
        1.0 + self.radius.max(0.0) * 4.0
    }
}

/// Size of the bloom targets for a given surface size.
pub fn bloom_extent(width: u32, height: u32) -> (u32, u32) {
    ((width / BLOOM_DOWNSCALE).max(1), (height / BLOOM_DOWNSCALE).max(1))
}

/// Bright pass uniform (must match bright.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BrightUniform {
    threshold: f32,
    _pad: [f32; 3],
}

/// Blur pass uniform (must match blur.wgsl). `step` is in UV units.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlurUniform {
    step: [f32; 2],
    _pad: [f32; 2],
}

impl BlurUniform {
    fn new(axis: [f32; 2], bloom: &BloomSettings, width: u32, height: u32) -> Self {
        let spacing = bloom.tap_spacing();
        Self {
            step: [
                axis[0] * spacing / width.max(1) as f32,
                axis[1] * spacing / height.max(1) as f32,
            ],
            _pad: [0.0; 2],
        }
    }
}

/// Composite uniform (must match composite.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CompositeUniform {
    bloom_strength: f32,
    exposure: f32,
    _pad: [f32; 2],
}

pub struct PostChain {
    bloom: BloomSettings,

    sampler: wgpu::Sampler,
    bloom_a: Texture,
    bloom_b: Texture,

    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    bright_bind_group_layout: wgpu::BindGroupLayout,
    blur_bind_group_layout: wgpu::BindGroupLayout,
    composite_bind_group_layout: wgpu::BindGroupLayout,

    bright_uniform_buffer: wgpu::Buffer,
    blur_uniform_h: wgpu::Buffer,
    blur_uniform_v: wgpu::Buffer,
    composite_uniform_buffer: wgpu::Buffer,
}

impl PostChain {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        bloom: BloomSettings,
        exposure: f32,
    ) -> Self {
        let bright_bind_group_layout = create_bright_bind_group_layout(device);
        let blur_bind_group_layout = create_blur_bind_group_layout(device);
        let composite_bind_group_layout = create_composite_bind_group_layout(device);

        let bright_pipeline = create_bright_pipeline(device, &bright_bind_group_layout);
        let blur_pipeline = create_blur_pipeline(device, &blur_bind_group_layout);
        let composite_pipeline =
            create_composite_pipeline(device, &composite_bind_group_layout, surface_format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let (bloom_w, bloom_h) = bloom_extent(width, height);
        let bloom_a = Texture::create_render_target(device, bloom_w, bloom_h, Texture::HDR_FORMAT, "Bloom A");
        let bloom_b = Texture::create_render_target(device, bloom_w, bloom_h, Texture::HDR_FORMAT, "Bloom B");

        let bright_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bright Uniform"),
            contents: bytemuck::cast_slice(&[BrightUniform {
                threshold: bloom.threshold,
                _pad: [0.0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let blur_uniform_h = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blur Uniform H"),
            contents: bytemuck::cast_slice(&[BlurUniform::new([1.0, 0.0], &bloom, bloom_w, bloom_h)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let blur_uniform_v = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blur Uniform V"),
            contents: bytemuck::cast_slice(&[BlurUniform::new([0.0, 1.0], &bloom, bloom_w, bloom_h)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let composite_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Composite Uniform"),
            contents: bytemuck::cast_slice(&[CompositeUniform {
                bloom_strength: bloom.strength,
                exposure,
                _pad: [0.0; 2],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            bloom,
            sampler,
            bloom_a,
            bloom_b,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            bright_bind_group_layout,
            blur_bind_group_layout,
            composite_bind_group_layout,
            bright_uniform_buffer,
            blur_uniform_h,
            blur_uniform_v,
            composite_uniform_buffer,
        }
    }

    /// Recreate the bloom targets and rescale the blur step for a new surface size.
    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        let (bloom_w, bloom_h) = bloom_extent(width, height);
        self.bloom_a.destroy();
        self.bloom_b.destroy();
        self.bloom_a = Texture::create_render_target(device, bloom_w, bloom_h, Texture::HDR_FORMAT, "Bloom A");
        self.bloom_b = Texture::create_render_target(device, bloom_w, bloom_h, Texture::HDR_FORMAT, "Bloom B");
        queue.write_buffer(
            &self.blur_uniform_h,
            0,
            bytemuck::cast_slice(&[BlurUniform::new([1.0, 0.0], &self.bloom, bloom_w, bloom_h)]),
        );
        queue.write_buffer(
            &self.blur_uniform_v,
            0,
            bytemuck::cast_slice(&[BlurUniform::new([0.0, 1.0], &self.bloom, bloom_w, bloom_h)]),
        );
    }

    fn fullscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        target: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn sample_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        source: &wgpu::TextureView,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(source) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&self.sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: uniform.as_entire_binding() },
            ],
        })
    }

    /// Bright extract (scene -> A), blur H (A -> B), blur V (B -> A), then
    /// composite scene + A onto `output_view`.
    pub fn run(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        scene_view: &wgpu::TextureView,
        output_view: &wgpu::TextureView,
    ) {
        let bright = self.sample_bind_group(
            device,
            "Bright Bind Group",
            &self.bright_bind_group_layout,
            scene_view,
            &self.bright_uniform_buffer,
        );
        self.fullscreen_pass(encoder, "Bright Pass", &self.bright_pipeline, &bright, &self.bloom_a.view);

        let blur_h = self.sample_bind_group(
            device,
            "Blur Bind H",
            &self.blur_bind_group_layout,
            &self.bloom_a.view,
            &self.blur_uniform_h,
        );
        self.fullscreen_pass(encoder, "Blur H Pass", &self.blur_pipeline, &blur_h, &self.bloom_b.view);

        let blur_v = self.sample_bind_group(
            device,
            "Blur Bind V",
            &self.blur_bind_group_layout,
            &self.bloom_b.view,
            &self.blur_uniform_v,
        );
        self.fullscreen_pass(encoder, "Blur V Pass", &self.blur_pipeline, &blur_v, &self.bloom_a.view);

        let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &self.composite_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(scene_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&self.sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: self.composite_uniform_buffer.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&self.bloom_a.view),
                },
            ],
        });
        self.fullscreen_pass(encoder, "Composite Pass", &self.composite_pipeline, &composite, output_view);
    }

    /// Release the bloom targets and uniform buffers.
    pub fn destroy(&self) {
        self.bloom_a.destroy();
        self.bloom_b.destroy();
        self.bright_uniform_buffer.destroy();
        self.blur_uniform_h.destroy();
        self.blur_uniform_v.destroy();
        self.composite_uniform_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bloom_settings() {
        let b = BloomSettings::default();
        assert_eq!((b.strength, b.radius, b.threshold), (0.8, 0.4, 0.85));
    }

    #[test]
    fn bloom_extent_is_quarter_and_never_zero() {
        assert_eq!(bloom_extent(1920, 1080), (480, 270));
        assert_eq!(bloom_extent(2, 3), (1, 1));
    }

    #[test]
    fn blur_step_follows_axis_and_radius() {
        let b = BloomSettings::default();
        let h = BlurUniform::new([1.0, 0.0], &b, 480, 270);
        let v = BlurUniform::new([0.0, 1.0], &b, 480, 270);
        assert!((h.step[0] - b.tap_spacing() / 480.0).abs() < 1e-7);
        assert_eq!(h.step[1], 0.0);
        assert_eq!(v.step[0], 0.0);
        assert!(v.step[1] > h.step[0]);
    }
}
