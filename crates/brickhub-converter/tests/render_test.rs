//! STL → PNG rendering against stub `stl2pov` and POV-Ray binaries.

#![cfg(unix)]

mod common;

use std::path::PathBuf;

use brickhub_converter::{ConversionError, ProcessRunner, StlRenderer};
use brickhub_core::config::renderer::RendererConfig;
use common::{fixtures, stub};
use tempfile::TempDir;

fn renderer(work: &TempDir, stl2pov: &str) -> StlRenderer {
    let config = RendererConfig {
        povray_path: stub("povray-stub"),
        stl2pov_path: stub(stl2pov),
        layout_template: fixtures().join("layout.tmpl"),
        work_dir: Some(work.path().to_path_buf()),
        ..Default::default()
    };
    StlRenderer::new(config, ProcessRunner::with_timeout_seconds(30))
}

fn stl() -> PathBuf {
    fixtures().join("973c00.stl")
}

#[tokio::test]
async fn test_render_produces_png_and_cleans_up() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let image = renderer(&work, "stl2pov-stub")
        .render(stl(), out.path())
        .await
        .unwrap();

    assert_eq!(image, out.path().join("973c00.png"));
    assert_eq!(std::fs::read(&image).unwrap(), b"PNG");
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_keep_intermediate_scene() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    renderer(&work, "stl2pov-stub")
        .render_with(&stl(), out.path(), true)
        .await
        .unwrap();

    let job_dir = std::fs::read_dir(work.path())
        .unwrap()
        .next()
        .expect("job dir")
        .unwrap()
        .path();

    let mesh = std::fs::read_to_string(job_dir.join("973c00.inc")).unwrap();
    assert!(mesh.contains("#declare m_973c00 = mesh"));

    let scene = std::fs::read_to_string(job_dir.join("973c00.pov")).unwrap();
    assert!(scene.starts_with(&format!(
        "#version 3.7;\n#include \"{}\"",
        job_dir.join("973c00.inc").display()
    )));
    assert_eq!(scene.matches("#version").count(), 1);
    assert!(scene.contains("#declare model = m_973c00;"));
    assert!(scene.contains("object { model"));
}

#[tokio::test]
async fn test_empty_mesh_is_converting_failed() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let err = renderer(&work, "ldview-silent")
        .render(stl(), out.path())
        .await
        .unwrap_err();

    match err {
        ConversionError::ConvertingFailed { format, .. } => assert_eq!(format, "POV"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!out.path().join("973c00.png").exists());
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_mesh_export_names_file_and_format() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let err = renderer(&work, "ldview-quiet-fail")
        .render(stl(), out.path())
        .await
        .unwrap_err();

    match &err {
        ConversionError::ToolFailed { file, format, source } => {
            assert_eq!(file, &stl());
            assert_eq!(format, "POV");
            assert!(matches!(
                source.as_ref(),
                ConversionError::ProcessFailed { code: 2, .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("973c00.stl"));
}
