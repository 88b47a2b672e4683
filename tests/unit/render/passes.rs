use super::*;
use crate::foundation::{
    core::{Point, Rgba8},
    error::ShardmapError,
};

#[derive(Default)]
struct MockBackend {
    calls: Vec<String>,
    fail_on_stencil: bool,
    aborted: bool,
}

impl CompositeBackend for MockBackend {
    fn max_stencil_id(&self) -> u16 {
        u16::MAX
    }

    fn begin_frame(&mut self, _canvas: Canvas) -> ShardmapResult<()> {
        self.calls.push("begin_frame".into());
        Ok(())
    }

    fn draw_background(&mut self, _op: &BackgroundOp, _live: &Surface) -> ShardmapResult<()> {
        self.calls.push("draw_background".into());
        Ok(())
    }

    fn write_stencil(&mut self, region: &StencilRegion) -> ShardmapResult<()> {
        if self.fail_on_stencil {
            return Err(ShardmapError::render("stencil unavailable"));
        }
        self.calls.push(format!("write_stencil {}", region.id));
        Ok(())
    }

    fn bind_program(&mut self, _source: &Surface, uniforms: &WarpUniforms) -> ShardmapResult<()> {
        self.calls.push(format!("bind_program {}", uniforms.shard_count()));
        Ok(())
    }

    fn draw_shard(&mut self, _source: &Surface, ordinal: usize, stencil_id: u16) -> ShardmapResult<()> {
        self.calls.push(format!("draw_shard {ordinal} {stencil_id}"));
        Ok(())
    }

    fn end_frame(&mut self) -> ShardmapResult<FrameRGBA> {
        self.calls.push("end_frame".into());
        Ok(FrameRGBA {
            width: 4,
            height: 3,
            data: vec![0; 4 * 3 * 4],
            premultiplied: true,
        })
    }

    fn abort_frame(&mut self) {
        self.aborted = true;
    }
}

fn region(ordinal: usize) -> StencilRegion {
    StencilRegion {
        id: ordinal as u16 + 1,
        ordinal,
        shard_index: ordinal,
        polygon: vec![Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
        triangles: vec![[0, 1, 2]],
    }
}

fn plan(regions: Vec<StencilRegion>) -> CompositePlan {
    let matrices = regions.iter().map(|_| nalgebra::Matrix4::identity()).collect();
    CompositePlan {
        canvas: Canvas::new(4, 3).unwrap(),
        background: BackgroundOp::Flat {
            color: Rgba8::opaque(0, 0, 0),
        },
        regions,
        uniforms: WarpUniforms {
            resolution: [4.0, 3.0],
            debug_view: false,
            opacity: 1.0,
            background: Rgba8::opaque(0, 0, 0),
            matrices,
        },
    }
}

#[test]
fn execute_plan_calls_in_expected_order() {
    let mut backend = MockBackend::default();
    let frame = execute_plan(
        &mut backend,
        &plan(vec![region(0), region(1)]),
        &Surface::default(),
        &Surface::default(),
    )
    .unwrap();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert_eq!(
        backend.calls,
        [
            "begin_frame",
            "draw_background",
            "write_stencil 1",
            "write_stencil 2",
            "bind_program 2",
            "draw_shard 0 1",
            "draw_shard 1 2",
            "end_frame",
        ]
    );
}

#[test]
fn empty_plan_skips_the_program() {
    let mut backend = MockBackend::default();
    execute_plan(&mut backend, &plan(Vec::new()), &Surface::default(), &Surface::default()).unwrap();
    assert_eq!(backend.calls, ["begin_frame", "draw_background", "end_frame"]);
}

#[test]
fn failure_mid_frame_aborts() {
    let mut backend = MockBackend {
        fail_on_stencil: true,
        ..MockBackend::default()
    };
    let err = execute_plan(&mut backend, &plan(vec![region(0)]), &Surface::default(), &Surface::default());
    assert!(matches!(err, Err(ShardmapError::Render(_))));
    assert!(backend.aborted);
}
