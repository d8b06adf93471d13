//! WebGPU sprite pipeline
//!
//! Every frame the scene's sprites are tessellated into one vertex buffer
//! and drawn in order, switching bind groups only where consecutive sprites
//! use different textures.

use wgpu::util::DeviceExt;

use super::scene::Sprite;
use super::texture::Texture;
use super::vertex::Vertex;
use crate::assets::{AssetBundle, ImageAsset};

/// Renderer setup errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Contiguous vertices drawn with one texture
#[derive(Debug, Clone, PartialEq)]
struct Batch {
    /// `None` for the white texture
    image: Option<ImageAsset>,
    start: u32,
    end: u32,
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: Texture,
    /// Loaded sprite images by manifest slot
    textures: Vec<Option<Texture>>,
    /// Surface size in device pixels
    pub size: (u32, u32),
    /// Size of the coordinate space sprites are given in (CSS pixels)
    logical_size: (f32, f32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cosmic-ride-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });

        let texture_layout = Texture::bind_group_layout(&device);
        let sampler = Texture::sampler(&device);
        let white = Texture::white(&device, &queue, &texture_layout, &sampler);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            texture_layout,
            sampler,
            white,
            textures: ImageAsset::all().map(|_| None).collect(),
            size: (width, height),
            logical_size: (width as f32, height as f32),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload every decoded image of the bundle, keeping only availability
    /// on the CPU side
    pub fn upload_images<S>(&mut self, bundle: AssetBundle<image::RgbaImage, S>) -> AssetBundle<(), S> {
        bundle.map_images(|asset, img| {
            let texture = Texture::from_image(
                &self.device,
                &self.queue,
                &self.texture_layout,
                &self.sampler,
                &img,
                asset.path(),
            );
            log::debug!("Uploaded {} ({}x{})", asset.path(), texture.width, texture.height);
            self.textures[asset.index()] = Some(texture);
            Some(())
        })
    }

    /// Set the coordinate space sprites are given in, independent of the
    /// device pixel ratio
    pub fn set_logical_size(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.logical_size = (width, height);
        }
    }

    /// Convert logical pixels (origin top-left, y down) to clip space
    pub fn pixel_to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = self.logical_size;
        (x / w * 2.0 - 1.0, 1.0 - y / h * 2.0)
    }

    fn bind_group(&self, image: Option<ImageAsset>) -> &wgpu::BindGroup {
        let texture = image
            .and_then(|asset| self.textures[asset.index()].as_ref())
            .unwrap_or(&self.white);
        &texture.bind_group
    }

    /// Tessellate, upload and draw `sprites` over a cleared background
    pub fn render(&mut self, sprites: &[Sprite], clear: [f32; 4]) -> Result<(), wgpu::SurfaceError> {
        let (vertices, batches) = self.tessellate(sprites);

        let vertex_buffer = (!vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("vertex_buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0] as f64,
                            g: clear[1] as f64,
                            b: clear[2] as f64,
                            a: clear[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(buffer) = &vertex_buffer {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                for batch in &batches {
                    render_pass.set_bind_group(0, self.bind_group(batch.image), &[]);
                    render_pass.draw(batch.start..batch.end, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Clip-space vertices and per-texture draw ranges
    fn tessellate(&self, sprites: &[Sprite]) -> (Vec<Vertex>, Vec<Batch>) {
        let mut vertices: Vec<Vertex> = Vec::with_capacity(sprites.len() * 6);
        let mut batches: Vec<Batch> = Vec::new();

        for sprite in sprites {
            // Images that never loaded draw through the white texture
            let image = sprite
                .image
                .filter(|asset| self.textures[asset.index()].is_some());
            let start = vertices.len() as u32;
            vertices.extend(sprite.vertices().into_iter().map(|v| {
                let (x, y) = self.pixel_to_ndc(v.position[0], v.position[1]);
                Vertex::textured(x, y, v.uv[0], v.uv[1], v.color)
            }));
            let end = vertices.len() as u32;

            match batches.last_mut() {
                Some(last) if last.image == image => last.end = end,
                _ => batches.push(Batch { image, start, end }),
            }
        }

        (vertices, batches)
    }
}
