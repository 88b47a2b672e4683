use super::*;
use crate::{
    composite::plan::{BackgroundOp, StencilRegion, WarpUniforms},
    config::ShardSelection,
    foundation::{
        core::{Point, Rgba8, Rgba8Premul},
        error::ShardmapError,
    },
    render::{backend::FrameRGBA, cpu::CpuBackend},
};

fn canvas() -> Canvas {
    Canvas::new(32, 24).unwrap()
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

fn shard(index: usize, mask: Vec<Point>) -> Shard {
    let mut s = Shard::new(format!("s{index}"), index, canvas());
    let pts = square(0.0, 0.0, 32.0, 24.0);
    s.set_correspondences(pts.clone(), pts).unwrap();
    s.set_mask_perimeter(mask);
    assert!(s.compute_homography());
    s
}

fn flat_settings() -> CompositorSettings {
    CompositorSettings {
        flat_background: true,
        background: Rgba8::opaque(0, 0, 255),
        ..CompositorSettings::default()
    }
}

fn solid(r: u8, g: u8, b: u8) -> Surface {
    Surface::solid(32, 24, Rgba8Premul::from_straight_rgba(r, g, b, 255)).unwrap()
}

struct FailingBackend;

impl CompositeBackend for FailingBackend {
    fn max_stencil_id(&self) -> u16 {
        u16::MAX
    }

    fn begin_frame(&mut self, _canvas: Canvas) -> ShardmapResult<()> {
        Ok(())
    }

    fn draw_background(&mut self, _op: &BackgroundOp, _live: &Surface) -> ShardmapResult<()> {
        Err(ShardmapError::render("device lost"))
    }

    fn write_stencil(&mut self, _region: &StencilRegion) -> ShardmapResult<()> {
        Ok(())
    }

    fn bind_program(&mut self, _source: &Surface, _uniforms: &WarpUniforms) -> ShardmapResult<()> {
        Ok(())
    }

    fn draw_shard(&mut self, _source: &Surface, _ordinal: usize, _stencil_id: u16) -> ShardmapResult<()> {
        Ok(())
    }

    fn end_frame(&mut self) -> ShardmapResult<FrameRGBA> {
        Err(ShardmapError::render("unreachable"))
    }
}

#[test]
fn shard_pixels_show_the_source_and_the_rest_the_background() {
    let mut c = Compositor::new(canvas(), flat_settings(), Box::new(CpuBackend::new())).unwrap();
    let mut shards = vec![shard(0, square(4.0, 4.0, 12.0, 12.0))];
    let out = c.render_frame(&solid(255, 0, 0), &solid(0, 255, 0), &mut shards);
    assert_eq!(out.get(6, 6).unwrap(), [255, 0, 0, 255]);
    assert_eq!(out.get(20, 20).unwrap(), [0, 0, 255, 255]);
    assert_eq!(c.stats().frames_rendered, 1);
}

#[test]
fn missing_inputs_are_a_no_op_that_keeps_the_previous_output() {
    let mut c = Compositor::new(canvas(), flat_settings(), Box::new(CpuBackend::new())).unwrap();
    let mut shards = vec![shard(0, square(4.0, 4.0, 12.0, 12.0))];
    assert!(!c.render_frame(&solid(255, 0, 0), &Surface::default(), &mut shards).is_allocated());

    c.render_frame(&solid(255, 0, 0), &solid(0, 0, 0), &mut shards);
    let before = c.output().clone();
    c.render_frame(&Surface::default(), &solid(0, 0, 0), &mut shards);
    c.render_frame(&solid(9, 9, 9), &solid(0, 0, 0), &mut []);
    assert_eq!(c.output(), &before);
    assert_eq!(c.stats().frames_skipped, 3);
}

#[test]
fn backend_errors_do_not_escape_and_keep_the_previous_output() {
    let mut c = Compositor::new(canvas(), flat_settings(), Box::new(FailingBackend)).unwrap();
    let mut shards = vec![shard(0, square(4.0, 4.0, 12.0, 12.0))];
    let out = c.render_frame(&solid(255, 0, 0), &solid(0, 0, 0), &mut shards);
    assert!(!out.is_allocated());
    assert_eq!(c.stats().frames_failed, 1);
}

#[test]
fn single_selection_draws_only_the_chosen_shard() {
    let settings = CompositorSettings {
        selection: ShardSelection::Single { index: 1 },
        ..flat_settings()
    };
    let mut c = Compositor::new(canvas(), settings, Box::new(CpuBackend::new())).unwrap();
    let mut shards = vec![
        shard(0, square(2.0, 2.0, 10.0, 10.0)),
        shard(1, square(16.0, 10.0, 28.0, 20.0)),
    ];
    let out = c.render_frame(&solid(255, 0, 0), &solid(0, 0, 0), &mut shards);
    assert_eq!(out.get(5, 5).unwrap(), [0, 0, 255, 255]);
    assert_eq!(out.get(20, 15).unwrap(), [255, 0, 0, 255]);
}

#[test]
fn debug_view_tints_owned_pixels_only() {
    let settings = CompositorSettings {
        debug_view: true,
        ..flat_settings()
    };
    let mut c = Compositor::new(canvas(), settings, Box::new(CpuBackend::new())).unwrap();
    let mut shards = vec![shard(0, square(4.0, 4.0, 12.0, 12.0))];
    let out = c.render_frame(&solid(0, 0, 0), &solid(0, 0, 0), &mut shards);
    // black source mixed half with the red palette entry
    let px = out.get(6, 6).unwrap();
    assert!((126..=129).contains(&px[0]), "{px:?}");
    assert_eq!(&px[1..], &[0, 0, 255]);
    assert_eq!(out.get(20, 20).unwrap(), [0, 0, 255, 255]);
}

#[test]
fn invalid_settings_are_rejected() {
    let settings = CompositorSettings {
        shard_opacity: 2.0,
        ..CompositorSettings::default()
    };
    assert!(Compositor::new(canvas(), settings.clone(), Box::new(CpuBackend::new())).is_err());
    let mut c = Compositor::new(canvas(), flat_settings(), Box::new(CpuBackend::new())).unwrap();
    assert!(c.set_settings(settings).is_err());
    assert_eq!(c.settings(), &flat_settings());
}
