//! Collaborator interface between the input panel and the compositor
//!
//! The input panel never renders, animates or enumerates outputs itself. It
//! reaches those services through [`PanelHost`], which the compositor
//! implements (see [`crate::headless::HeadlessHost`] for the in-memory one).

use crate::config::SlideConfig;
use crate::geometry::{OutputGeometry, OutputId, Rectangle, ResourceId, SurfaceId};
use crate::signal::Signal;
use crate::stack::LayerStack;

/// Configure role assigned to a display surface.
///
/// A surface can be claimed by a single role-owning subsystem for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
    /// No subsystem owns the surface's configure path
    None,
    /// Owned by the input panel
    InputPanel,
    /// Owned by another subsystem (shell toplevel, cursor, ...)
    Other(&'static str),
}

/// Easing curve for the slide-in animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideCurve {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl SlideCurve {
    /// Parse a curve name as written in the configuration file
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(SlideCurve::Linear),
            "ease" => Some(SlideCurve::Ease),
            "ease-in" => Some(SlideCurve::EaseIn),
            "ease-out" => Some(SlideCurve::EaseOut),
            "ease-in-out" => Some(SlideCurve::EaseInOut),
            _ => None,
        }
    }
}

/// Parameters handed to the slide animation on every reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideParams {
    pub enabled: bool,
    pub duration_ms: u32,
    pub curve: SlideCurve,
}

impl SlideParams {
    /// Unknown curve names fall back to `ease-out`; `validate` rejects them earlier.
    pub fn from_config(config: &SlideConfig) -> Self {
        Self {
            enabled: config.enabled,
            duration_ms: config.duration,
            curve: SlideCurve::from_name(&config.curve).unwrap_or(SlideCurve::EaseOut),
        }
    }
}

impl Default for SlideParams {
    fn default() -> Self {
        Self::from_config(&SlideConfig::default())
    }
}

/// Services the compositor provides to the input panel.
///
/// Every method runs while the panel is mutably borrowed. Implementations
/// must not emit compositor or surface destroy signals synchronously from
/// inside these calls. Anything that is emitted anyway is queued and only
/// runs on the panel's next notification or
/// [`InputPanel::run_deferred`](crate::panel::InputPanel::run_deferred).
pub trait PanelHost {
    /// The compositor's global layer list
    fn layer_stack(&mut self) -> &mut LayerStack;

    fn surface_exists(&self, surface: SurfaceId) -> bool;

    /// Current configure role of a surface. Unknown surfaces report `None`.
    fn surface_role(&self, surface: SurfaceId) -> SurfaceRole;

    fn set_surface_role(&mut self, surface: SurfaceId, role: SurfaceRole);

    /// Position and size of a surface, if it exists
    fn surface_geometry(&self, surface: SurfaceId) -> Option<Rectangle>;

    /// Whether the surface has a committed buffer
    fn has_content(&self, surface: SurfaceId) -> bool;

    /// Destroy notification of a display surface
    fn surface_destroy_signal(&self, surface: SurfaceId) -> Option<Signal<SurfaceId>>;

    /// Output position and current mode size
    fn output_geometry(&self, output: OutputId) -> Option<OutputGeometry>;

    /// Applies position and size to a surface
    fn configure_surface(&mut self, surface: SurfaceId, geometry: Rectangle);

    fn geometry_dirty(&mut self, surface: SurfaceId);

    fn update_transform(&mut self, surface: SurfaceId);

    fn damage(&mut self, surface: SurfaceId);

    /// Starts a vertical slide from `from` to `to`
    fn slide_run(&mut self, surface: SurfaceId, from: f32, to: f32, params: &SlideParams);

    /// Removes a surface from rendering
    fn unmap_surface(&mut self, surface: SurfaceId);

    /// Tells the protocol layer that a client resource is gone.
    ///
    /// The resource's own destroy handling must reach the panel later,
    /// through `InputPanel::destroy_resource`, not from inside this call.
    fn destroy_resource(&mut self, resource: ResourceId);
}

/// Per-role configure callback.
///
/// The compositor calls this for every commit on a surface whose role is
/// owned by the implementor.
pub trait RoleConfigure {
    fn configure(&mut self, surface: SurfaceId, sx: i32, sy: i32, width: i32, height: i32);
}
