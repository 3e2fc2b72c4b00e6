// graticule.rs — 经纬网 (heading/pitch 网格) 投影到当前像平面
//
// Meridians (constant heading) and parallels (constant pitch) are sampled on
// the sphere and pushed through `orientation_to_pixel`. Samples too close to
// or behind the image plane split the line instead of being projected.

use serde::{Deserialize, Serialize};

use crate::projector::{Orientation, PixelCoordinate, Projector};

/// Samples whose view cosine falls below this are not projected (~87 degrees).
pub const MIN_VIEW_COSINE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraticuleSettings {
    pub enabled: bool,
    pub heading_step: f64,
    pub pitch_step: f64,
    pub sample_step: f64,
}

impl Default for GraticuleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            heading_step: 30.0,
            pitch_step: 15.0,
            sample_step: 1.0,
        }
    }
}

impl GraticuleSettings {
    fn is_valid(&self) -> bool {
        [self.heading_step, self.pitch_step, self.sample_step]
            .iter()
            .all(|s| s.is_finite() && *s >= 0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    /// Constant heading, degrees.
    Meridian(f64),
    /// Constant pitch, degrees.
    Parallel(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraticuleLine {
    pub kind: LineKind,
    pub points: Vec<PixelCoordinate>,
}

struct LineBuilder<'a> {
    projector: &'a Projector,
    pivot: Orientation,
    kind: LineKind,
    run: Vec<PixelCoordinate>,
    out: &'a mut Vec<GraticuleLine>,
}

impl LineBuilder<'_> {
    fn push(&mut self, target: Orientation) {
        if self.projector.view_cosine(target, self.pivot) < MIN_VIEW_COSINE {
            self.flush();
            return;
        }
        self.run
            .push(self.projector.orientation_to_pixel(target, self.pivot));
    }

    fn flush(&mut self) {
        let run = std::mem::take(&mut self.run);
        if run.len() >= 2 && touches_viewport(self.projector, &run) {
            self.out.push(GraticuleLine {
                kind: self.kind,
                points: run,
            });
        }
    }
}

fn touches_viewport(projector: &Projector, points: &[PixelCoordinate]) -> bool {
    let width = projector.config().width() as f64;
    let height = projector.config().height() as f64;

    let (mut min_u, mut min_v) = (f64::INFINITY, f64::INFINITY);
    let (mut max_u, mut max_v) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_u = min_u.min(p.u);
        min_v = min_v.min(p.v);
        max_u = max_u.max(p.u);
        max_v = max_v.max(p.v);
    }
    max_u >= 0.0 && min_u <= width && max_v >= 0.0 && min_v <= height
}

/// Inclusive samples from `start` to `end` spaced at most `step` apart.
fn samples(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let n = ((end - start) / step).ceil().max(1.0) as usize;
    (0..=n).map(move |i| start + (end - start) * i as f64 / n as f64)
}

pub fn build_graticule(
    projector: &Projector,
    pivot: Orientation,
    settings: &GraticuleSettings,
) -> Vec<GraticuleLine> {
    let mut lines = Vec::new();
    if !settings.enabled || !settings.is_valid() {
        return lines;
    }

    let meridians = (360.0 / settings.heading_step).floor() as usize;
    for k in 0..meridians {
        let heading = k as f64 * settings.heading_step;
        let mut b = LineBuilder {
            projector,
            pivot,
            kind: LineKind::Meridian(heading),
            run: Vec::new(),
            out: &mut lines,
        };
        for pitch in samples(-90.0, 90.0, settings.sample_step) {
            b.push(Orientation::new(heading, pitch));
        }
        b.flush();
    }

    let max_level = ((90.0 / settings.pitch_step).ceil() as i64 - 1).max(0);
    for j in -max_level..=max_level {
        let pitch = j as f64 * settings.pitch_step;
        let mut b = LineBuilder {
            projector,
            pivot,
            kind: LineKind::Parallel(pitch),
            run: Vec::new(),
            out: &mut lines,
        };
        for heading in samples(0.0, 360.0, settings.sample_step) {
            b.push(Orientation::new(heading, pitch));
        }
        b.flush();
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::ViewportConfig;
    use approx::assert_relative_eq;

    fn projector() -> Projector {
        Projector::new(ViewportConfig::new(800, 600, 90.0).unwrap())
    }

    #[test]
    fn samples_include_both_ends() {
        let s: Vec<f64> = samples(-90.0, 90.0, 45.0).collect();
        assert_eq!(s, vec![-90.0, -45.0, 0.0, 45.0, 90.0]);
    }

    #[test]
    fn horizon_runs_through_centre_row() {
        let lines = build_graticule(&projector(), Orientation::default(), &GraticuleSettings::default());
        let horizon = lines
            .iter()
            .find(|l| l.kind == LineKind::Parallel(0.0))
            .expect("horizon visible");
        for p in &horizon.points {
            assert_relative_eq!(p.v, 300.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn forward_meridian_is_the_centre_column() {
        let lines = build_graticule(&projector(), Orientation::default(), &GraticuleSettings::default());
        let meridian = lines
            .iter()
            .find(|l| l.kind == LineKind::Meridian(0.0))
            .expect("forward meridian visible");
        for p in &meridian.points {
            assert_relative_eq!(p.u, 400.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn every_point_is_finite() {
        let pivot = Orientation::new(-135.0, 40.0);
        for line in build_graticule(&projector(), pivot, &GraticuleSettings::default()) {
            assert!(line.points.len() >= 2);
            assert!(line.points.iter().all(PixelCoordinate::is_finite));
        }
    }

    #[test]
    fn meridian_behind_the_camera_is_culled() {
        let lines = build_graticule(&projector(), Orientation::default(), &GraticuleSettings::default());
        assert!(!lines.iter().any(|l| l.kind == LineKind::Meridian(180.0)));
    }

    #[test]
    fn disabled_or_invalid_settings_give_nothing() {
        let p = projector();
        let disabled = GraticuleSettings {
            enabled: false,
            ..Default::default()
        };
        assert!(build_graticule(&p, Orientation::default(), &disabled).is_empty());

        let zero_step = GraticuleSettings {
            heading_step: 0.0,
            ..Default::default()
        };
        assert!(build_graticule(&p, Orientation::default(), &zero_step).is_empty());
    }
}
