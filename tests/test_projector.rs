use approx::assert_relative_eq;

use streetview_viewer::projector::{Orientation, PixelCoordinate, Projector, ViewportConfig};

fn projector(width: u32, height: u32, fov: f64) -> Projector {
    Projector::new(ViewportConfig::new(width, height, fov).unwrap())
}

/// Signed difference between two headings, folded into [-180, 180).
fn heading_delta(a: f64, b: f64) -> f64 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

const ORIENTATIONS: [(f64, f64); 10] = [
    (0.0, 0.0),
    (30.0, 0.0),
    (-45.0, 10.0),
    (135.0, -20.0),
    (-170.0, 45.0),
    (179.0, -60.0),
    (90.0, 80.0),
    (-90.0, -80.0),
    (12.5, 33.3),
    (180.0, 5.0),
];

const PIXELS: [(f64, f64); 7] = [
    (0.0, 0.0),
    (800.0, 600.0),
    (400.0, 300.0),
    (123.4, 567.8),
    (799.0, 1.0),
    (10.0, 300.0),
    (400.0, 599.0),
];

// ---------------------------------------------------------------------------
// Fixed 800x600 / 90 degree scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_centre_click_keeps_orientation() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(400.0, 300.0), Orientation::new(0.0, 0.0));
    assert_relative_eq!(o.heading, 0.0, epsilon = 1e-12);
    assert_relative_eq!(o.pitch, 0.0, epsilon = 1e-12);
}

#[test]
fn test_right_edge_is_half_fov() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(800.0, 300.0), Orientation::new(0.0, 0.0));
    assert_relative_eq!(o.heading, 45.0, epsilon = 1e-9);
    assert_relative_eq!(o.pitch, 0.0, epsilon = 1e-9);
}

#[test]
fn test_left_edge_is_negative_half_fov() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(0.0, 300.0), Orientation::new(0.0, 0.0));
    assert_relative_eq!(o.heading, -45.0, epsilon = 1e-9);
}

#[test]
fn test_top_edge_pitch_follows_aspect() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(400.0, 0.0), Orientation::new(0.0, 0.0));

    // half height over focal length: 300 / 400
    let expected = (300.0_f64 / p.focal_length()).atan().to_degrees();
    assert_relative_eq!(o.pitch, expected, epsilon = 1e-9);
    assert_relative_eq!(o.pitch, 36.869_897_645_844, epsilon = 1e-9);
    assert_relative_eq!(o.heading, 0.0, epsilon = 1e-9);
}

#[test]
fn test_bottom_edge_looks_down() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(400.0, 600.0), Orientation::new(0.0, 0.0));
    assert!(o.pitch < 0.0);
}

#[test]
fn test_corner_click_under_a_tilted_view() {
    // closed form: rotate the image-plane point (du, f, dv) by the pivot pitch
    let p = projector(800, 600, 90.0);
    let pivot = Orientation::new(0.0, 30.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(800.0, 0.0), pivot);

    let f = p.focal_length();
    let (du, dv) = (400.0_f64, 300.0_f64);
    let p0 = 30.0_f64.to_radians();
    let x = du;
    let y = f * p0.cos() - dv * p0.sin();
    let z = f * p0.sin() + dv * p0.cos();
    let r = (x * x + y * y + z * z).sqrt();

    assert_relative_eq!(o.heading, x.atan2(y).to_degrees(), epsilon = 1e-9);
    assert_relative_eq!(o.pitch, (z / r).asin().to_degrees(), epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn test_centre_round_trip_for_many_orientations() {
    for &(w, h, fov) in &[(800, 600, 90.0), (640, 480, 60.0), (300, 700, 120.0)] {
        let p = projector(w, h, fov);
        for &(heading, pitch) in &ORIENTATIONS {
            let o = Orientation::new(heading, pitch);
            let back = p.pixel_to_orientation(p.center(), o);
            assert!(heading_delta(back.heading, heading).abs() < 1e-9, "{:?} -> {:?}", o, back);
            assert_relative_eq!(back.pitch, pitch, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_map_then_unmap_recovers_pixel() {
    let p = projector(800, 600, 90.0);
    for &(heading, pitch) in &ORIENTATIONS {
        let pivot = Orientation::new(heading, pitch);
        for &(u, v) in &PIXELS {
            let target = p.pixel_to_orientation(PixelCoordinate::new(u, v), pivot);
            let pixel = p.orientation_to_pixel(target, pivot);
            assert_relative_eq!(pixel.u, u, epsilon = 1e-6, max_relative = 1e-6);
            assert_relative_eq!(pixel.v, v, epsilon = 1e-6, max_relative = 1e-6);
        }
    }
}

#[test]
fn test_unmap_map_unmap_is_stable() {
    let p = projector(640, 480, 75.0);
    let pivot = Orientation::new(-20.0, 15.0);
    for &(heading, pitch) in &[(-10.0, 5.0), (-35.0, 30.0), (0.0, 0.0), (-20.0, -10.0)] {
        let target = Orientation::new(heading, pitch);
        let first = p.orientation_to_pixel(target, pivot);
        let again = p.orientation_to_pixel(p.pixel_to_orientation(first, pivot), pivot);
        assert_relative_eq!(again.u, first.u, epsilon = 1e-6);
        assert_relative_eq!(again.v, first.v, epsilon = 1e-6);
    }
}

#[test]
fn test_pivot_unmaps_to_centre() {
    let p = projector(800, 600, 90.0);
    for &(heading, pitch) in &ORIENTATIONS {
        let o = Orientation::new(heading, pitch);
        let c = p.orientation_to_pixel(o, o);
        assert_relative_eq!(c.u, 400.0, epsilon = 1e-9);
        assert_relative_eq!(c.v, 300.0, epsilon = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Heading periodicity and numerical edges
// ---------------------------------------------------------------------------

#[test]
fn test_heading_plus_full_turn_is_equivalent() {
    let p = projector(800, 600, 90.0);
    for &h in &[0.0, 45.0, -120.0, 179.0] {
        for &(u, v) in &PIXELS {
            let pixel = PixelCoordinate::new(u, v);
            let a = p.pixel_to_orientation(pixel, Orientation::new(h, 0.0));
            let b = p.pixel_to_orientation(pixel, Orientation::new(h + 360.0, 0.0));
            assert!(heading_delta(a.heading, b.heading).abs() < 1e-9);
            assert_relative_eq!(a.pitch, b.pitch, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_heading_is_atan2_range() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(700.0, 300.0), Orientation::new(170.0, 0.0));
    assert!(o.heading > -180.0 && o.heading <= 180.0);
    assert!(o.heading < 0.0, "crossing 180 wraps to negative headings");
}

#[test]
fn test_looking_straight_up_stays_finite() {
    let p = projector(800, 600, 90.0);
    let o = p.pixel_to_orientation(PixelCoordinate::new(250.0, 100.0), Orientation::new(0.0, 90.0));
    assert!(o.is_finite());
    assert!(o.pitch <= 90.0);
}

#[test]
fn test_pitch_never_nan_from_asin_drift() {
    let p = projector(800, 600, 90.0);
    // huge vertical offsets push z/R towards 1
    let o = p.pixel_to_orientation(PixelCoordinate::new(400.0, -1e12), Orientation::new(0.0, 0.0));
    assert!(!o.pitch.is_nan());
    assert_relative_eq!(o.pitch, 90.0, epsilon = 1e-6);
}

#[test]
fn test_target_behind_camera_is_mirrored_not_rejected() {
    let p = projector(800, 600, 90.0);
    let front = Orientation::new(0.0, 0.0);
    let behind = Orientation::new(180.0, 0.0);

    // t comes out negative and the ray is reflected onto the centre
    let pixel = p.orientation_to_pixel(behind, front);
    assert_relative_eq!(pixel.u, 400.0, epsilon = 1e-6);
    assert_relative_eq!(pixel.v, 300.0, epsilon = 1e-6);
    assert!(p.view_cosine(behind, front) < 0.0);
}

#[test]
fn test_perpendicular_target_diverges() {
    let p = projector(800, 600, 90.0);
    let pixel = p.orientation_to_pixel(Orientation::new(0.0, 90.0), Orientation::new(0.0, 0.0));
    assert!(!pixel.is_finite() || pixel.v.abs() > 1e12);
}
