use image::Rgba;

use streetview_viewer::graticule::{build_graticule, GraticuleSettings};
use streetview_viewer::overlay::{export_overlay, render_overlay, OverlayStyle};
use streetview_viewer::{Orientation, Projector, ViewportConfig};

#[test]
fn test_rendered_overlay_has_crosshair_and_horizon() {
    let projector = Projector::new(ViewportConfig::new(320, 240, 90.0).unwrap());
    let pivot = Orientation::new(0.0, 20.0);
    let lines = build_graticule(&projector, pivot, &GraticuleSettings::default());
    let style = OverlayStyle::default();

    let img = render_overlay(320, 240, &lines, &style);
    assert_eq!(img.dimensions(), (320, 240));
    assert_eq!(*img.get_pixel(5, 120), style.crosshair);
    assert_eq!(*img.get_pixel(160, 5), style.crosshair);

    // looking up, the horizon sits below the centre row
    let horizon_rows: Vec<u32> = (0..240)
        .filter(|&y| *img.get_pixel(40, y) == style.horizon)
        .collect();
    assert!(!horizon_rows.is_empty());
    assert!(horizon_rows.iter().all(|&y| y > 120));
}

#[test]
fn test_overlay_round_trips_through_png() {
    let projector = Projector::new(ViewportConfig::new(64, 48, 60.0).unwrap());
    let lines = build_graticule(&projector, Orientation::default(), &GraticuleSettings::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.png");
    export_overlay(&path, 64, 48, &lines, &OverlayStyle::default()).unwrap();

    let loaded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(loaded.dimensions(), (64, 48));
    assert_eq!(*loaded.get_pixel(32, 0), Rgba([255, 255, 0, 255]));
}

#[test]
fn test_export_to_unknown_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.nope");
    let err = export_overlay(&path, 8, 8, &[], &OverlayStyle::default()).unwrap_err();
    assert!(matches!(err, streetview_viewer::ViewerError::Image(_)));
}
