// projector.rs — 针孔相机：视口像素 <-> 视角 (heading/pitch)
//
// Frame: x points east (heading 90), y points forward (heading 0), z points up.
// The image plane is tangent to the sphere of radius `f` at the current look
// direction, so a pixel offset from the centre is a point on that plane.
//
// Known numerical limits (left as-is, callers must check):
// - `orientation_to_pixel` divides by the dot product of the target and pivot
//   directions; targets at or behind 90 degrees from the pivot give huge,
//   infinite or NaN pixels. `view_cosine` tells callers which side they are on.
// - pivots near pitch ±90 make the tangent basis flip (see `sgn`).

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Viewing direction in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Orientation {
    pub heading: f64,
    pub pitch: f64,
}

impl Orientation {
    pub const fn new(heading: f64, pitch: f64) -> Self {
        Self { heading, pitch }
    }

    pub fn is_finite(&self) -> bool {
        self.heading.is_finite() && self.pitch.is_finite()
    }
}

/// Viewport position in pixels, origin top-left, `v` growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelCoordinate {
    pub u: f64,
    pub v: f64,
}

impl PixelCoordinate {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }
}

/// Immutable camera and display parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    width: u32,
    height: u32,
    fov_degrees: f64,
}

impl ViewportConfig {
    pub fn new(width: u32, height: u32, fov_degrees: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidViewport { width, height });
        }
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(ViewerError::InvalidFieldOfView(fov_degrees));
        }
        Ok(Self {
            width,
            height,
            fov_degrees,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full horizontal field of view.
    pub fn fov_degrees(&self) -> f64 {
        self.fov_degrees
    }
}

fn sgn(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    config: ViewportConfig,
    focal_length: f64,
}

impl Projector {
    pub fn new(config: ViewportConfig) -> Self {
        let fov = config.fov_degrees.to_radians();
        let focal_length = 0.5 * config.width as f64 / (0.5 * fov).tan();
        Self {
            config,
            focal_length,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Distance from the eye to the image plane, in pixels.
    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    pub fn center(&self) -> PixelCoordinate {
        PixelCoordinate::new(
            self.config.width as f64 / 2.0,
            self.config.height as f64 / 2.0,
        )
    }

    /// Ray of length `f` pointing along `orientation`.
    pub(crate) fn orientation_to_direction(&self, orientation: Orientation) -> DVec3 {
        let f = self.focal_length;
        let h = orientation.heading.to_radians();
        let p = orientation.pitch.to_radians();

        DVec3::new(f * p.cos() * h.sin(), f * p.cos() * h.cos(), f * p.sin())
    }

    /// Orthonormal (right, up) basis of the image plane tangent at `pivot`.
    fn tangent_basis(pivot: Orientation) -> (DVec3, DVec3) {
        let h0 = pivot.heading.to_radians();
        let p0 = pivot.pitch.to_radians();
        let s = sgn(p0.cos());

        let u_axis = DVec3::new(s * h0.cos(), -s * h0.sin(), 0.0);
        let v_axis = DVec3::new(-p0.sin() * h0.sin(), -p0.sin() * h0.cos(), p0.cos());
        (u_axis, v_axis)
    }

    /// Map: the viewing direction seen at `pixel` while looking along `current`.
    pub fn pixel_to_orientation(
        &self,
        pixel: PixelCoordinate,
        current: Orientation,
    ) -> Orientation {
        let m0 = self.orientation_to_direction(current);
        let (u_axis, v_axis) = Self::tangent_basis(current);

        let du = pixel.u - self.config.width as f64 / 2.0;
        let dv = self.config.height as f64 / 2.0 - pixel.v;

        let point = m0 + du * u_axis + dv * v_axis;
        let r = point.length();

        // 比值漂移到 ±1 之外时 asin 会得到 NaN
        let sin_pitch = (point.z / r).clamp(-1.0, 1.0);

        Orientation {
            heading: point.x.atan2(point.y).to_degrees(),
            pitch: sin_pitch.asin().to_degrees(),
        }
    }

    /// Unmap: where `target` appears on the image plane of `current`.
    ///
    /// `target` must lie in the forward hemisphere of `current`; otherwise the
    /// ray/plane intersection diverges and the result is not meaningful.
    pub fn orientation_to_pixel(
        &self,
        target: Orientation,
        current: Orientation,
    ) -> PixelCoordinate {
        let f = self.focal_length;
        let d = self.orientation_to_direction(target);
        let m0 = self.orientation_to_direction(current);

        // n . (t d - M0) = 0 with n = M0, and n . M0 = f^2
        let t = f * f / m0.dot(d);
        let offset = t * d - m0;

        let (u_axis, v_axis) = Self::tangent_basis(current);
        let du = u_axis.dot(offset);
        let dv = v_axis.dot(offset);

        PixelCoordinate {
            u: du + self.config.width as f64 / 2.0,
            v: self.config.height as f64 / 2.0 - dv,
        }
    }

    /// Cosine of the angle between two look directions. Positive means
    /// `target` is in front of the image plane of `pivot`.
    pub fn view_cosine(&self, target: Orientation, pivot: Orientation) -> f64 {
        let f = self.focal_length;
        self.orientation_to_direction(target)
            .dot(self.orientation_to_direction(pivot))
            / (f * f)
    }
}
