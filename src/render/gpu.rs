use wgpu::util::DeviceExt as _;

use crate::{
    composite::{
        background::draw_background,
        plan::{BackgroundOp, StencilRegion, WarpUniforms},
    },
    foundation::{
        core::Canvas,
        error::{ShardmapError, ShardmapResult},
    },
    homography::solver::to_cols_f32,
    render::{backend::FrameRGBA, passes::CompositeBackend},
    surface::Surface,
};

const STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Stencil8;
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const PARAMS_SIZE: usize = 48;

const SHADER: &str = r#"
struct Params {
  background: vec4<f32>,
  resolution: vec2<f32>,
  opacity: f32,
  debug_view: u32,
  shard_count: u32,
};

@group(0) @binding(0) var t_src: texture_2d<f32>;
@group(0) @binding(1) var s_src: sampler;
@group(0) @binding(2) var<uniform> params: Params;
@group(0) @binding(3) var<storage, read> homographies: array<mat4x4<f32>>;

@vertex
fn vs_stencil(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
  return vec4<f32>(pos, 0.0, 1.0);
}

@fragment
fn fs_stencil() -> @location(0) vec4<f32> {
  return vec4<f32>(0.0);
}

struct WarpOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) @interpolate(flat) shard: u32,
};

@vertex
fn vs_warp(@builtin(vertex_index) vi: u32, @builtin(instance_index) ii: u32) -> WarpOut {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  var o: WarpOut;
  o.pos = vec4<f32>(p[vi], 0.0, 1.0);
  o.shard = ii;
  return o;
}

fn debug_color(i: u32) -> vec4<f32> {
  var palette = array<vec4<f32>, 14>(
    vec4<f32>(1.0, 0.0, 0.0, 1.0),
    vec4<f32>(0.0, 1.0, 0.0, 1.0),
    vec4<f32>(0.0, 0.0, 1.0, 1.0),
    vec4<f32>(1.0, 1.0, 0.0, 1.0),
    vec4<f32>(1.0, 0.0, 1.0, 1.0),
    vec4<f32>(0.0, 1.0, 1.0, 1.0),
    vec4<f32>(1.0, 0.5, 0.0, 1.0),
    vec4<f32>(0.5, 0.0, 1.0, 1.0),
    vec4<f32>(0.0, 0.5, 0.5, 1.0),
    vec4<f32>(0.5, 0.5, 0.0, 1.0),
    vec4<f32>(0.5, 0.0, 0.0, 1.0),
    vec4<f32>(0.0, 0.5, 0.0, 1.0),
    vec4<f32>(0.0, 0.4, 0.2, 1.0),
    vec4<f32>(0.0, 0.4, 0.3, 1.0),
  );
  if (i < 14u) {
    return palette[i];
  }
  return vec4<f32>(0.5, 0.5, 0.5, 1.0);
}

@fragment
fn fs_warp(v: WarpOut) -> @location(0) vec4<f32> {
  if (v.shard >= params.shard_count) {
    return vec4<f32>(0.0);
  }
  let r = homographies[v.shard] * vec4<f32>(v.pos.x, v.pos.y, 0.0, 1.0);
  var q = v.pos.xy;
  if (abs(r.w) >= 1e-6) {
    q = r.xy / r.w;
  }
  let uv = clamp(q / params.resolution, vec2<f32>(0.0), vec2<f32>(1.0));
  var c = textureSampleLevel(t_src, s_src, uv, 0.0);
  if (params.debug_view != 0u) {
    c = mix(c, debug_color(v.shard), 0.5);
  }
  return c * params.opacity;
}
"#;

struct Pipelines {
    stencil: wgpu::RenderPipeline,
    warp: wgpu::RenderPipeline,
    warp_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

struct Target {
    width: u32,
    height: u32,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    stencil_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    bytes_per_row: u32,
}

struct BoundProgram {
    source: Surface,
    params: [u8; PARAMS_SIZE],
    matrices: Vec<u8>,
}

/// Work recorded between `begin_frame` and `end_frame`; submitted as one
/// render pass.
struct PendingFrame {
    canvas: Canvas,
    background: Surface,
    /// Clip-space triangle vertices, one run per stencil write.
    stencil_vertices: Vec<[f32; 2]>,
    stencil_runs: Vec<(u32, std::ops::Range<u32>)>,
    program: Option<BoundProgram>,
    shard_draws: Vec<(u32, u32)>,
}

/// wgpu compositor: stencil-tagged regions plus one instanced program draw
/// per shard. The stencil is 8-bit, so at most 255 shards fit in a frame.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: Pipelines,
    target: Option<Target>,
    frame: Option<PendingFrame>,
}

impl GpuBackend {
    pub fn new() -> ShardmapResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                ShardmapError::render("no gpu adapter available")
            }
            other => ShardmapError::render(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("shardmap_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| ShardmapError::render(format!("wgpu request_device failed: {e:?}")))?;

        let pipelines = create_pipelines(&device);
        Ok(Self {
            device,
            queue,
            pipelines,
            target: None,
            frame: None,
        })
    }

    fn ensure_target(&mut self, width: u32, height: u32) -> ShardmapResult<()> {
        if self
            .target
            .as_ref()
            .is_some_and(|t| t.width == width && t.height == height)
        {
            return Ok(());
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shardmap_color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let stencil = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shardmap_stencil"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let bytes_per_row_unpadded = width
            .checked_mul(4)
            .ok_or_else(|| ShardmapError::render("render target width overflow"))?;
        let bytes_per_row = align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer_size = u64::from(bytes_per_row)
            .checked_mul(u64::from(height))
            .ok_or_else(|| ShardmapError::render("readback buffer size overflow"))?;
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shardmap_readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.target = Some(Target {
            width,
            height,
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            stencil_view: stencil.create_view(&wgpu::TextureViewDescriptor::default()),
            readback,
            bytes_per_row,
        });
        Ok(())
    }

    fn pending(&mut self) -> ShardmapResult<&mut PendingFrame> {
        self.frame
            .as_mut()
            .ok_or_else(|| ShardmapError::render("no frame in progress"))
    }

    fn submit(&self, frame: &PendingFrame, target: &Target) -> ShardmapResult<FrameRGBA> {
        let (w, h) = (frame.canvas.width, frame.canvas.height);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.background.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w * 4),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );

        let vertex_buffer = (!frame.stencil_vertices.is_empty()).then(|| {
            let bytes: Vec<u8> = frame
                .stencil_vertices
                .iter()
                .flat_map(|v| v.iter().flat_map(|c| c.to_le_bytes()))
                .collect();
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shardmap_stencil_vertices"),
                contents: &bytes,
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let warp_bind_group = match &frame.program {
            Some(program) if !frame.shard_draws.is_empty() => {
                Some(self.create_warp_bind_group(program)?)
            }
            _ => None,
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("shardmap_frame_encoder"),
        });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shardmap_frame_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.stencil_view,
                    depth_ops: None,
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Discard,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(vb) = &vertex_buffer {
                rp.set_pipeline(&self.pipelines.stencil);
                rp.set_vertex_buffer(0, vb.slice(..));
                for (id, range) in &frame.stencil_runs {
                    rp.set_stencil_reference(*id);
                    rp.draw(range.clone(), 0..1);
                }
            }

            if let Some(bg) = &warp_bind_group {
                rp.set_pipeline(&self.pipelines.warp);
                rp.set_bind_group(0, bg, &[]);
                for &(ordinal, id) in &frame.shard_draws {
                    rp.set_stencil_reference(id);
                    rp.draw(0..3, ordinal..ordinal + 1);
                }
            }
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(target.bytes_per_row),
                    rows_per_image: Some(h),
                },
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = target.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| ShardmapError::render(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| ShardmapError::render("readback channel closed"))?
            .map_err(|e| ShardmapError::render(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let row_bytes = w as usize * 4;
        let padded_row_bytes = target.bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * h as usize);
        for row in 0..h as usize {
            let start = row * padded_row_bytes;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        target.readback.unmap();

        Ok(FrameRGBA {
            width: w,
            height: h,
            data: out,
            premultiplied: true,
        })
    }

    fn create_warp_bind_group(&self, program: &BoundProgram) -> ShardmapResult<wgpu::BindGroup> {
        let src = &program.source;
        let size = wgpu::Extent3d {
            width: src.width,
            height: src.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shardmap_source"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &src.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(src.width * 4),
                rows_per_image: Some(src.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        if program.matrices.is_empty() {
            return Err(ShardmapError::render("program bound without homographies"));
        }
        let params = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shardmap_params"),
            contents: &program.params,
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let matrices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shardmap_homographies"),
            contents: &program.matrices,
            usage: wgpu::BufferUsages::STORAGE,
        });

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shardmap_warp_bg"),
            layout: &self.pipelines.warp_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.pipelines.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: matrices.as_entire_binding(),
                },
            ],
        }))
    }
}

impl CompositeBackend for GpuBackend {
    fn max_stencil_id(&self) -> u16 {
        u16::from(u8::MAX)
    }

    fn begin_frame(&mut self, canvas: Canvas) -> ShardmapResult<()> {
        if self.frame.is_some() {
            return Err(ShardmapError::render("begin_frame called while a frame is active"));
        }
        self.ensure_target(canvas.width, canvas.height)?;
        self.frame = Some(PendingFrame {
            canvas,
            background: Surface::new(canvas.width, canvas.height)?,
            stencil_vertices: Vec::new(),
            stencil_runs: Vec::new(),
            program: None,
            shard_draws: Vec::new(),
        });
        Ok(())
    }

    fn draw_background(&mut self, op: &BackgroundOp, live: &Surface) -> ShardmapResult<()> {
        let frame = self.pending()?;
        frame.background.clear();
        draw_background(&mut frame.background, op, live)
    }

    fn write_stencil(&mut self, region: &StencilRegion) -> ShardmapResult<()> {
        if region.id == 0 || region.id > self.max_stencil_id() {
            return Err(ShardmapError::render(format!(
                "stencil id {} does not fit an 8-bit stencil",
                region.id
            )));
        }
        let frame = self.pending()?;
        let (w, h) = (
            f64::from(frame.canvas.width),
            f64::from(frame.canvas.height),
        );
        let start = u32::try_from(frame.stencil_vertices.len())
            .map_err(|_| ShardmapError::render("too many stencil vertices"))?;
        for tri in &region.triangles {
            for &i in tri {
                let Some(p) = region.polygon.get(i) else {
                    return Err(ShardmapError::render("triangle index out of range"));
                };
                frame
                    .stencil_vertices
                    .push([(p.x / w * 2.0 - 1.0) as f32, (1.0 - p.y / h * 2.0) as f32]);
            }
        }
        let end = u32::try_from(frame.stencil_vertices.len())
            .map_err(|_| ShardmapError::render("too many stencil vertices"))?;
        if end > start {
            frame.stencil_runs.push((u32::from(region.id), start..end));
        }
        Ok(())
    }

    fn bind_program(&mut self, source: &Surface, uniforms: &WarpUniforms) -> ShardmapResult<()> {
        if !source.is_allocated() {
            return Err(ShardmapError::render("source surface is not allocated"));
        }
        let shard_count = u32::try_from(uniforms.shard_count())
            .map_err(|_| ShardmapError::render("too many shards"))?;

        let mut params = [0u8; PARAMS_SIZE];
        let bg = uniforms.background.to_f32();
        let floats = [
            bg[0],
            bg[1],
            bg[2],
            bg[3],
            uniforms.resolution[0],
            uniforms.resolution[1],
            uniforms.opacity.clamp(0.0, 1.0),
        ];
        for (i, f) in floats.iter().enumerate() {
            params[i * 4..i * 4 + 4].copy_from_slice(&f.to_le_bytes());
        }
        params[28..32].copy_from_slice(&u32::from(uniforms.debug_view).to_le_bytes());
        params[32..36].copy_from_slice(&shard_count.to_le_bytes());

        let matrices = uniforms
            .matrices
            .iter()
            .flat_map(|m| to_cols_f32(m).into_iter().flat_map(f32::to_le_bytes))
            .collect();

        self.pending()?.program = Some(BoundProgram {
            source: source.clone(),
            params,
            matrices,
        });
        Ok(())
    }

    fn draw_shard(&mut self, _source: &Surface, ordinal: usize, stencil_id: u16) -> ShardmapResult<()> {
        let frame = self.pending()?;
        let Some(program) = &frame.program else {
            return Err(ShardmapError::render("draw_shard before bind_program"));
        };
        let ordinal = u32::try_from(ordinal).map_err(|_| ShardmapError::render("ordinal overflow"))?;
        if (ordinal as usize) * 64 >= program.matrices.len() {
            return Err(ShardmapError::render(format!(
                "no homography for shard ordinal {ordinal}"
            )));
        }
        frame.shard_draws.push((ordinal, u32::from(stencil_id)));
        Ok(())
    }

    fn end_frame(&mut self) -> ShardmapResult<FrameRGBA> {
        let frame = self
            .frame
            .take()
            .ok_or_else(|| ShardmapError::render("no frame in progress"))?;
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| ShardmapError::render("gpu target not initialized"))?;
        self.submit(&frame, target)
    }

    fn abort_frame(&mut self) {
        self.frame = None;
    }
}

fn create_pipelines(device: &wgpu::Device) -> Pipelines {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("shardmap_shader"),
        source: wgpu::ShaderSource::Wgsl(SHADER.into()),
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("shardmap_source_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    let warp_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("shardmap_warp_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let stencil_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shardmap_stencil_pl"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });
    let warp_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shardmap_warp_pl"),
        bind_group_layouts: &[&warp_layout],
        push_constant_ranges: &[],
    });

    let stencil_face = |compare, pass_op| wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op,
    };
    let depth_stencil = |compare, pass_op, write_mask| wgpu::DepthStencilState {
        format: STENCIL_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState {
            front: stencil_face(compare, pass_op),
            back: stencil_face(compare, pass_op),
            read_mask: 0xff,
            write_mask,
        },
        bias: wgpu::DepthBiasState::default(),
    };

    let stencil = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shardmap_stencil_pipeline"),
        layout: Some(&stencil_pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_stencil"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_stencil"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: COLOR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::empty(),
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(depth_stencil(
            wgpu::CompareFunction::Always,
            wgpu::StencilOperation::Replace,
            0xff,
        )),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let warp = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shardmap_warp_pipeline"),
        layout: Some(&warp_pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_warp"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_warp"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: COLOR_FORMAT,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(depth_stencil(
            wgpu::CompareFunction::Equal,
            wgpu::StencilOperation::Keep,
            0x00,
        )),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    Pipelines {
        stencil,
        warp,
        warp_layout,
        sampler,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
#[path = "../../tests/unit/render/gpu.rs"]
mod tests;
