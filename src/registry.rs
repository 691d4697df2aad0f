//! Registry of input panel surfaces
//!
//! A display surface first gets *claimed* when the input method asks for a
//! panel surface on it, and becomes *registered* once the client gives it a
//! role (`set_toplevel` / `set_overlay_panel`). Only registered surfaces are
//! candidates for display. Registration order is most-recent first.

use std::collections::HashMap;

use log::debug;

use crate::geometry::{OutputId, ResourceId, SurfaceId};
use crate::signal::Subscription;

/// Placement of a toplevel panel on its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToplevelPosition {
    /// Horizontally centered, flush with the bottom edge
    CenterBottom,
}

impl ToplevelPosition {
    /// Decode the wire value of the position argument
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(ToplevelPosition::CenterBottom),
            _ => None,
        }
    }
}

/// How a panel surface is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRole {
    /// Full virtual keyboard docked on an output
    Toplevel {
        output: OutputId,
        position: ToplevelPosition,
    },
    /// Small overlay anchored to the text cursor
    Panel,
}

/// One surface handed to the input panel by the input method
#[derive(Debug)]
pub struct PanelSurface {
    /// Display surface this panel surface decorates
    pub surface: SurfaceId,
    /// Role chosen by the client, `None` until set
    pub role: Option<PanelRole>,
    /// Live client resource, if the panel surface still has one
    pub resource: Option<ResourceId>,
    /// Set once teardown has started
    pub destroying: bool,
    destroy_subscription: Option<Subscription>,
}

impl PanelSurface {
    pub fn new(surface: SurfaceId, resource: Option<ResourceId>) -> Self {
        Self {
            surface,
            role: None,
            resource,
            destroying: false,
            destroy_subscription: None,
        }
    }

    /// Keeps the display surface's destroy listener alive with this entry
    pub fn set_destroy_subscription(&mut self, subscription: Subscription) {
        self.destroy_subscription = Some(subscription);
    }

    /// Drops the destroy listener
    pub fn disconnect(&mut self) {
        self.destroy_subscription.take();
    }

    /// Whether the display surface's destroy listener is still hooked
    pub fn is_listening(&self) -> bool {
        self.destroy_subscription.is_some()
    }
}

/// Tracks panel surfaces keyed by display surface identity.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, PanelSurface>,
    /// Registered surfaces, most recently registered first
    order: Vec<SurfaceId>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the panel surface entry for `surface`.
    ///
    /// Returns `None` if the surface is already claimed.
    pub fn claim(&mut self, surface: SurfaceId, resource: Option<ResourceId>) -> Option<&mut PanelSurface> {
        if self.surfaces.contains_key(&surface) {
            return None;
        }
        debug!("⌨️  Claimed {} for the input panel", surface);
        Some(
            self.surfaces
                .entry(surface)
                .or_insert_with(|| PanelSurface::new(surface, resource)),
        )
    }

    /// Gives a claimed surface its role and puts it at the head of the set.
    ///
    /// Returns `None` for surfaces not claimed through this registry.
    /// Registering again moves the surface back to the head.
    pub fn register(&mut self, surface: SurfaceId, role: PanelRole) -> Option<&PanelSurface> {
        let entry = self.surfaces.get_mut(&surface)?;
        entry.role = Some(role);

        self.order.retain(|s| *s != surface);
        self.order.insert(0, surface);
        debug!("⌨️  Registered {} as {:?}", surface, role);

        self.surfaces.get(&surface)
    }

    /// Removes a surface entirely. Idempotent.
    pub fn unregister(&mut self, surface: SurfaceId) -> Option<PanelSurface> {
        self.order.retain(|s| *s != surface);
        self.surfaces.remove(&surface)
    }

    /// Role of a registered surface, `None` if the surface is not ours or
    /// has no role yet
    pub fn lookup_role(&self, surface: SurfaceId) -> Option<PanelRole> {
        self.surfaces.get(&surface).and_then(|s| s.role)
    }

    pub fn is_claimed(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    pub fn is_registered(&self, surface: SurfaceId) -> bool {
        self.order.contains(&surface)
    }

    pub fn get(&self, surface: SurfaceId) -> Option<&PanelSurface> {
        self.surfaces.get(&surface)
    }

    pub fn get_mut(&mut self, surface: SurfaceId) -> Option<&mut PanelSurface> {
        self.surfaces.get_mut(&surface)
    }

    /// Display surface bound to a client resource
    pub fn by_resource(&self, resource: ResourceId) -> Option<SurfaceId> {
        self.surfaces
            .values()
            .find(|s| s.resource == Some(resource))
            .map(|s| s.surface)
    }

    /// Registered surfaces, most recently registered first
    pub fn registered(&self) -> &[SurfaceId] {
        &self.order
    }

    /// Number of claimed surfaces
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Removes every entry, returning them for teardown
    pub fn drain(&mut self) -> Vec<PanelSurface> {
        self.order.clear();
        self.surfaces.drain().map(|(_, s)| s).collect()
    }
}
