//! GPU presenter
//!
//! Rasterizes the recorded paint commands with one alpha-blended wgpu
//! pipeline over a transparent surface. Polylines are tessellated on the
//! CPU into a connected triangle strip: adjacent segments share their
//! offset edge exactly, so translucent strokes never double-blend at the
//! joins.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use stria_paint::{Color, LineCap, PaintCommand, Point, StrokeVertex};

const SHADER: &str = r#"
struct VsIn {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
};

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct GpuVertex {
    position: [f32; 2],
    color: [f32; 4],
}

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    surface_config: wgpu::SurfaceConfiguration,
}

impl GpuRenderer {
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .context("creating render surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))
                .context("requesting GPU device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];
        // The overlay depends on a transparent surface; pick an alpha mode
        // that composites instead of overwriting.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| caps.alpha_modes.contains(mode))
        .unwrap_or(caps.alpha_modes[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stria-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stria-pipeline-layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stria-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            pipeline,
            surface_config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Draw one frame. A lost or outdated surface is reconfigured and the
    /// frame skipped; the next tick retries cleanly.
    pub fn present(&mut self, commands: &[PaintCommand]) -> Result<()> {
        let viewport = (
            self.surface_config.width as f32,
            self.surface_config.height as f32,
        );
        let vertices = tessellate(commands, viewport);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(error) => return Err(error).context("acquiring surface frame"),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let buffer = (!vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("stria-vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stria-frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stria-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(buffer) = &buffer {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Convert pixel coordinates (origin top-left) to clip space.
fn to_ndc(point: Point, viewport: (f32, f32)) -> [f32; 2] {
    [
        point.x / viewport.0 * 2.0 - 1.0,
        1.0 - point.y / viewport.1 * 2.0,
    ]
}

fn vertex(position: Point, color: Color, viewport: (f32, f32)) -> GpuVertex {
    GpuVertex {
        position: to_ndc(position, viewport),
        color: [color.r, color.g, color.b, color.a],
    }
}

pub(crate) fn tessellate(commands: &[PaintCommand], viewport: (f32, f32)) -> Vec<GpuVertex> {
    let mut out = Vec::new();
    for command in commands {
        match command {
            PaintCommand::FillCircle { circle, color } => {
                circle_fan(circle.center, circle.radius, *color, viewport, &mut out);
            }
            PaintCommand::StrokeLine {
                from,
                to,
                width,
                color,
                cap,
            } => {
                let segment = [
                    StrokeVertex::new(*from, *color),
                    StrokeVertex::new(*to, *color),
                ];
                strip(&segment, *width, viewport, &mut out);
                if *cap == LineCap::Round {
                    circle_fan(*from, *width / 2.0, *color, viewport, &mut out);
                    circle_fan(*to, *width / 2.0, *color, viewport, &mut out);
                }
            }
            PaintCommand::StrokePolyline { stroke } => {
                strip(&stroke.vertices, stroke.width, viewport, &mut out);
                if stroke.cap == LineCap::Round {
                    for end in [stroke.vertices.first(), stroke.vertices.last()]
                        .into_iter()
                        .flatten()
                    {
                        circle_fan(
                            end.position,
                            stroke.width / 2.0,
                            end.color,
                            viewport,
                            &mut out,
                        );
                    }
                }
            }
        }
    }
    out
}

/// Tessellate a polyline into a connected strip, two triangles per
/// segment. Offsets use the averaged normal at each vertex so consecutive
/// quads share their edge instead of overlapping.
fn strip(vertices: &[StrokeVertex], width: f32, viewport: (f32, f32), out: &mut Vec<GpuVertex>) {
    if vertices.len() < 2 || width <= 0.0 {
        return;
    }
    let half = width / 2.0;
    let normals: Vec<Point> = (0..vertices.len())
        .map(|i| vertex_normal(vertices, i))
        .collect();

    for i in 0..vertices.len() - 1 {
        let (a, b) = (&vertices[i], &vertices[i + 1]);
        let a_hi = vertex(a.position + normals[i] * half, a.color, viewport);
        let a_lo = vertex(a.position - normals[i] * half, a.color, viewport);
        let b_hi = vertex(b.position + normals[i + 1] * half, b.color, viewport);
        let b_lo = vertex(b.position - normals[i + 1] * half, b.color, viewport);
        out.extend_from_slice(&[a_hi, a_lo, b_hi, b_hi, a_lo, b_lo]);
    }
}

/// Unit normal at vertex `i`: perpendicular to the direction between its
/// neighbors. Degenerate spans fall back to the x axis so the strip never
/// collapses to NaN.
fn vertex_normal(vertices: &[StrokeVertex], i: usize) -> Point {
    let prev = &vertices[i.saturating_sub(1)];
    let next = &vertices[(i + 1).min(vertices.len() - 1)];
    let dir = next.position - prev.position;
    let length = dir.distance(Point::ZERO);
    if length <= f32::EPSILON {
        return Point::new(0.0, 1.0);
    }
    Point::new(-dir.y / length, dir.x / length)
}

const CIRCLE_SEGMENTS_MIN: usize = 8;
const CIRCLE_SEGMENTS_MAX: usize = 48;

fn circle_fan(center: Point, radius: f32, color: Color, viewport: (f32, f32), out: &mut Vec<GpuVertex>) {
    if radius <= 0.0 {
        return;
    }
    let segments = (radius as usize).clamp(CIRCLE_SEGMENTS_MIN, CIRCLE_SEGMENTS_MAX);
    let center_vertex = vertex(center, color, viewport);
    for i in 0..segments {
        let a0 = std::f32::consts::TAU * i as f32 / segments as f32;
        let a1 = std::f32::consts::TAU * (i + 1) as f32 / segments as f32;
        out.push(center_vertex);
        out.push(vertex(
            Point::new(center.x + radius * a0.cos(), center.y + radius * a0.sin()),
            color,
            viewport,
        ));
        out.push(vertex(
            Point::new(center.x + radius * a1.cos(), center.y + radius * a1.sin()),
            color,
            viewport,
        ));
    }
}
