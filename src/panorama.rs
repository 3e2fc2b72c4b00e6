// panorama.rs — 视角状态与点击回中处理

use crate::error::{Result, ViewerError};
use crate::projector::{Orientation, PixelCoordinate, Projector};
use crate::tile::{GeoLocation, TileRequest, TileSource};

/// Diagnostic record of one click, handed to the trace hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickTrace {
    pub click: PixelCoordinate,
    pub previous: Orientation,
    /// Unmap of `previous` onto its own image plane; the viewport centre.
    pub previous_center: PixelCoordinate,
    pub target: Orientation,
    /// Unmap of `target` against the previous pivot; should reproduce `click`.
    pub reprojected: PixelCoordinate,
}

type TraceHook = Box<dyn FnMut(&ClickTrace)>;

/// Holds the current orientation and drives the tile source.
pub struct PanoramaViewer<S: TileSource> {
    projector: Projector,
    location: GeoLocation,
    home: Orientation,
    orientation: Orientation,
    tiles: S,
    trace_hook: Option<TraceHook>,
}

impl<S: TileSource> PanoramaViewer<S> {
    pub fn new(projector: Projector, location: GeoLocation, start: Orientation, tiles: S) -> Self {
        Self {
            projector,
            location,
            home: start,
            orientation: start,
            tiles,
            trace_hook: None,
        }
    }

    pub fn with_trace_hook(mut self, hook: impl FnMut(&ClickTrace) + 'static) -> Self {
        self.trace_hook = Some(Box::new(hook));
        self
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn location(&self) -> GeoLocation {
        self.location
    }

    pub fn tiles(&self) -> &S {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut S {
        &mut self.tiles
    }

    pub fn tile_request(&self) -> TileRequest {
        TileRequest::new(self.projector.config(), self.orientation, self.location)
    }

    /// Asks the tile source to show the current orientation.
    pub fn refresh(&mut self) -> Result<()> {
        let request = self.tile_request();
        log::info!(
            "refresh: heading {:.3}, pitch {:.3}, fov {}",
            request.orientation.heading,
            request.orientation.pitch,
            request.fov_degrees
        );
        self.tiles.refresh(&request)
    }

    /// Re-centres the view on the direction under `click`.
    ///
    /// A click that maps to a non-finite orientation is rejected and leaves the
    /// state untouched. A tile source failure is returned after the
    /// orientation has already moved.
    pub fn click(&mut self, click: PixelCoordinate) -> Result<Orientation> {
        let previous = self.orientation;
        let target = self.projector.pixel_to_orientation(click, previous);

        if !target.is_finite() {
            log::warn!("click at ({}, {}) mapped to {:?}", click.u, click.v, target);
            return Err(ViewerError::DegenerateClick {
                u: click.u,
                v: click.v,
            });
        }

        if let Some(hook) = self.trace_hook.as_mut() {
            let trace = ClickTrace {
                click,
                previous,
                previous_center: self.projector.orientation_to_pixel(previous, previous),
                target,
                reprojected: self.projector.orientation_to_pixel(target, previous),
            };
            hook(&trace);
        }

        log::debug!(
            "click ({:.1}, {:.1}) -> heading {:.4}, pitch {:.4}",
            click.u,
            click.v,
            target.heading,
            target.pitch
        );

        self.orientation = target;
        self.refresh()?;
        Ok(target)
    }

    /// Points the view straight at `orientation`.
    pub fn look_at(&mut self, orientation: Orientation) -> Result<()> {
        self.orientation = orientation;
        self.refresh()
    }

    /// Back to the start orientation.
    pub fn reset(&mut self) -> Result<()> {
        self.look_at(self.home)
    }
}
