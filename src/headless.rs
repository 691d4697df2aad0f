//! In-memory compositor host
//!
//! `HeadlessHost` implements [`PanelHost`] without any rendering: surfaces,
//! outputs and the layer list live in plain collections and every rendering
//! primitive is appended to an event log. The scenario replayer and the test
//! suites drive the input panel through it.

use std::collections::HashMap;

use log::{debug, trace};

use crate::geometry::{LayerId, OutputGeometry, OutputId, Rectangle, ResourceId, SurfaceId};
use crate::host::{PanelHost, SlideParams, SurfaceRole};
use crate::signal::Signal;
use crate::stack::LayerStack;

/// Rendering primitive recorded by the headless host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Configure(SurfaceId, Rectangle),
    GeometryDirty(SurfaceId),
    UpdateTransform(SurfaceId),
    Damage(SurfaceId),
    Slide {
        surface: SurfaceId,
        from: f32,
        to: f32,
        params: SlideParams,
    },
    Unmap(SurfaceId),
    ResourceDestroyed(ResourceId),
}

/// Display surface as seen by the headless host
#[derive(Debug)]
pub struct HeadlessSurface {
    pub geometry: Rectangle,
    /// A buffer has been committed
    pub has_content: bool,
    /// Surface is assigned to an output and rendered
    pub mapped: bool,
    pub role: SurfaceRole,
    destroy_signal: Signal<SurfaceId>,
}

impl HeadlessSurface {
    fn new(geometry: Rectangle) -> Self {
        Self {
            geometry,
            has_content: false,
            mapped: false,
            role: SurfaceRole::None,
            destroy_signal: Signal::new(),
        }
    }
}

/// Compositor stand-in with no rendering backend.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    layers: LayerStack,
    surfaces: HashMap<SurfaceId, HeadlessSurface>,
    outputs: HashMap<OutputId, OutputGeometry>,
    events: Vec<HostEvent>,
    next_surface: u32,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            next_surface: 1,
            ..Self::default()
        }
    }

    /// Creates a surface with a fresh id
    pub fn create_surface(&mut self, geometry: Rectangle) -> SurfaceId {
        while self.surfaces.contains_key(&SurfaceId(self.next_surface)) {
            self.next_surface += 1;
        }
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.insert_surface(id, geometry);
        id
    }

    /// Creates a surface with a caller-chosen id, replacing any previous one
    pub fn insert_surface(&mut self, id: SurfaceId, geometry: Rectangle) {
        debug!("🖼️ Headless surface {} created", id);
        self.surfaces.insert(id, HeadlessSurface::new(geometry));
    }

    /// Attaches a buffer of the given size
    pub fn commit(&mut self, surface: SurfaceId, width: i32, height: i32) -> bool {
        let Some(s) = self.surfaces.get_mut(&surface) else {
            return false;
        };
        s.has_content = width > 0 && height > 0;
        s.geometry.width = width;
        s.geometry.height = height;
        true
    }

    /// Removes a surface and hands back its destroy signal.
    ///
    /// The caller emits the signal once it no longer holds borrows of the
    /// listeners' state.
    pub fn destroy_surface(&mut self, surface: SurfaceId) -> Option<Signal<SurfaceId>> {
        self.surfaces.remove(&surface).map(|s| s.destroy_signal)
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<&HeadlessSurface> {
        self.surfaces.get(&surface)
    }

    pub fn add_output(&mut self, output: OutputId, geometry: OutputGeometry) {
        self.outputs.insert(output, geometry);
    }

    pub fn remove_output(&mut self, output: OutputId) -> Option<OutputGeometry> {
        self.outputs.remove(&output)
    }

    /// Allocates a layer and links it at the bottom of the list
    pub fn add_layer(&mut self) -> LayerId {
        let id = self.layers.new_layer();
        self.layers.push(id);
        id
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of slide animations started for a surface
    pub fn slides_for(&self, surface: SurfaceId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::Slide { surface: s, .. } if *s == surface))
            .count()
    }

    /// Number of times a surface was unmapped
    pub fn unmaps_for(&self, surface: SurfaceId) -> usize {
        self.events
            .iter()
            .filter(|e| **e == HostEvent::Unmap(surface))
            .count()
    }

    fn record(&mut self, event: HostEvent) {
        trace!("headless: {:?}", event);
        self.events.push(event);
    }
}

impl PanelHost for HeadlessHost {
    fn layer_stack(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    fn surface_exists(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    fn surface_role(&self, surface: SurfaceId) -> SurfaceRole {
        self.surfaces
            .get(&surface)
            .map(|s| s.role)
            .unwrap_or(SurfaceRole::None)
    }

    fn set_surface_role(&mut self, surface: SurfaceId, role: SurfaceRole) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.role = role;
        }
    }

    fn surface_geometry(&self, surface: SurfaceId) -> Option<Rectangle> {
        self.surfaces.get(&surface).map(|s| s.geometry)
    }

    fn has_content(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .map(|s| s.has_content)
            .unwrap_or(false)
    }

    fn surface_destroy_signal(&self, surface: SurfaceId) -> Option<Signal<SurfaceId>> {
        self.surfaces.get(&surface).map(|s| s.destroy_signal.clone())
    }

    fn output_geometry(&self, output: OutputId) -> Option<OutputGeometry> {
        self.outputs.get(&output).copied()
    }

    fn configure_surface(&mut self, surface: SurfaceId, geometry: Rectangle) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.geometry = geometry;
        }
        self.record(HostEvent::Configure(surface, geometry));
    }

    fn geometry_dirty(&mut self, surface: SurfaceId) {
        self.record(HostEvent::GeometryDirty(surface));
    }

    fn update_transform(&mut self, surface: SurfaceId) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.mapped = true;
        }
        self.record(HostEvent::UpdateTransform(surface));
    }

    fn damage(&mut self, surface: SurfaceId) {
        self.record(HostEvent::Damage(surface));
    }

    fn slide_run(&mut self, surface: SurfaceId, from: f32, to: f32, params: &SlideParams) {
        self.record(HostEvent::Slide {
            surface,
            from,
            to,
            params: *params,
        });
    }

    fn unmap_surface(&mut self, surface: SurfaceId) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.mapped = false;
        }
        self.record(HostEvent::Unmap(surface));
    }

    fn destroy_resource(&mut self, resource: ResourceId) {
        self.record(HostEvent::ResourceDestroyed(resource));
    }
}
