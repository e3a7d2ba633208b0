use nalgebra::vector;
use volume_tf::{
    derivative::BoundaryPolicy,
    pipeline::Command,
    render::{OrbitCamera, RayCastRenderer, RenderBackend},
    test_helpers::{ball_grid, constant_grid, scratch_dir, two_face_grid, write_dataset},
    transfer::TransferConfig,
    volumetric::{self, Samples, VolumeGrid},
    PipelineContext, PipelineError, PipelineOptions,
};

#[test]
fn constant_volume_end_to_end() {
    let dir = scratch_dir("it-constant");
    let header = write_dataset(&dir, "constant", &constant_grid(vector![4, 4, 4], 42));

    let ctx = PipelineContext::load(&header, PipelineOptions::default()).unwrap();

    assert!(ctx.derivatives().gradient.values().iter().all(|&g| g == 0));
    assert_eq!(ctx.transfer().current().visible_count(), 0);

    let histogram = ctx.stats().histogram();
    assert_eq!(histogram.iter().filter(|&&h| h != 0).count(), 1);
    assert_eq!(histogram[42], 64);
}

#[test]
fn two_face_volume_both_formats() {
    let dir = scratch_dir("it-two-face");
    let narrow = two_face_grid();
    let wide = VolumeGrid::new(
        vector![2, 2, 2],
        Samples::U16(vec![0, 0, 0, 0, 255, 255, 255, 255]),
    )
    .unwrap();

    for (name, grid) in [("narrow", narrow), ("wide", wide)] {
        let header = write_dataset(&dir, name, &grid);
        let options = PipelineOptions {
            boundary: BoundaryPolicy::AllAxes,
            ..Default::default()
        };
        let ctx = PipelineContext::load(&header, options).unwrap();

        assert_eq!(ctx.derivatives().gradient.range().high, 255);
        assert!((ctx.stats().mean - 127.5).abs() < 1e-9);
        assert!(ctx.stats().variance > 0.0);
        assert_eq!(ctx.grid().samples(), grid.samples());
    }
}

#[test]
fn raw_file_next_to_header() {
    let dir = scratch_dir("it-relative");
    let nested = dir.join("data");
    std::fs::create_dir_all(&nested).unwrap();
    let grid = ball_grid(6, 2.0, 99);
    let header = write_dataset(&nested, "ball", &grid);

    // working directory does not contain ball.raw
    let loaded = volumetric::load(&header).unwrap();
    assert_eq!(loaded, grid);
}

#[test]
fn malformed_inputs() {
    let dir = scratch_dir("it-malformed");

    let missing = dir.join("missing.dat");
    let err = PipelineContext::load(&missing, PipelineOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Io { .. }));
    assert!(err.to_string().contains("missing.dat"));

    let float = dir.join("float.dat");
    std::fs::write(
        &float,
        "ObjectFileName: float.raw\nResolution: 2 2 2\nFormat: FLOAT\n",
    )
    .unwrap();
    let err = PipelineContext::load(&float, PipelineOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Format { .. }));

    let short = dir.join("short.dat");
    std::fs::write(
        &short,
        "ObjectFileName: short.raw\nResolution: 4 4 4\nFormat: UCHAR\n",
    )
    .unwrap();
    std::fs::write(dir.join("short.raw"), [0u8; 10]).unwrap();
    let err = PipelineContext::load(&short, PipelineOptions::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        PipelineError::RawSize {
            expected: 64,
            found: 10,
            ..
        }
    ));

    // voxel count wraps around to the raw file length
    let huge = dir.join("huge.dat");
    std::fs::write(
        &huge,
        "ObjectFileName: huge.raw\nResolution: 2 2147549185 4294836226\nFormat: UCHAR\n",
    )
    .unwrap();
    std::fs::write(dir.join("huge.raw"), [1u8, 2, 3, 4]).unwrap();
    let err = PipelineContext::load(&huge, PipelineOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Header { .. }));
}

#[test]
fn rebuild_is_byte_identical() {
    let grid = ball_grid(14, 5.0, 180);
    let options = PipelineOptions {
        transfer: TransferConfig::discrete(),
        ..Default::default()
    };
    let mut ctx = PipelineContext::from_grid(grid, options).unwrap();
    let first = ctx.transfer().current();

    ctx.apply(Command::HueHighDown).unwrap();
    ctx.apply(Command::HueHighUp).unwrap();
    let second = ctx.transfer().current();

    assert_eq!(ctx.transfer().generation(), 2);
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn renderer_consumes_pipeline_output() {
    let ctx = PipelineContext::from_grid(ball_grid(12, 4.0, 200), PipelineOptions::default())
        .unwrap();
    let mut renderer = RayCastRenderer::default();
    renderer.upload_volume(ctx.grid().clone());
    renderer.upload_transfer(ctx.transfer().current());

    let params = ctx.controls().render_params((24, 24));
    let mut buffer = vec![0; 3 * 24 * 24];
    renderer.render(&OrbitCamera::unit_cube(), &params, &mut buffer);
    assert_eq!(buffer.len(), 3 * 24 * 24);
}
