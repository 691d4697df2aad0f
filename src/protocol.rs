//! Client-facing input panel protocol
//!
//! Request handling for the input panel global and its per-surface objects.
//! Wire marshalling is not done here: the compositor decodes requests into
//! [`InputPanelRequest`] / [`InputPanelSurfaceRequest`] and posts any
//! returned [`ProtocolError`] to the client with [`ProtocolError::code`].
//!
//! Requests follow the global's lifecycle:
//! 1. **Bind**: a single input-method client holds the global
//! 2. **Create**: `get_input_panel_surface` claims a display surface
//! 3. **Role**: `set_toplevel` / `set_overlay_panel` registers it
//! 4. **Release**: the client destroys the object, or the display surface goes away

use log::{debug, info, warn};
use thiserror::Error;

use crate::geometry::{ClientId, OutputId, ResourceId, SurfaceId};
use crate::host::{PanelHost, SurfaceRole};
use crate::panel::InputPanel;
use crate::registry::{PanelRole, ToplevelPosition};

/// Wire error codes of the display object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    InvalidObject = 0,
    InvalidMethod = 1,
}

/// Protocol violation by the input-method client.
///
/// The request that produced it has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("input panel global already bound by {holder:?}")]
    AlreadyBound { holder: ClientId },

    #[error("{client:?} has not bound the input panel global")]
    NotBound { client: ClientId },

    #[error("{surface} does not exist")]
    UnknownSurface { surface: SurfaceId },

    #[error("input panel surface already requested for {surface}")]
    AlreadyRequested { surface: SurfaceId },

    #[error("{surface} already has another role")]
    RoleAlreadySet { surface: SurfaceId },

    #[error("resource id {0:?} is already in use")]
    DuplicateResource(ResourceId),

    #[error("no input panel surface with resource id {0:?}")]
    UnknownResource(ResourceId),

    #[error("invalid toplevel position {0}")]
    InvalidPosition(u32),
}

impl ProtocolError {
    /// Error code posted to the client
    pub fn code(&self) -> ErrorCode {
        match self {
            ProtocolError::InvalidPosition(_) => ErrorCode::InvalidMethod,
            _ => ErrorCode::InvalidObject,
        }
    }
}

/// Requests on the input panel global
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPanelRequest {
    GetInputPanelSurface { id: ResourceId, surface: SurfaceId },
}

/// Requests on an input panel surface object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPanelSurfaceRequest {
    SetToplevel { output: OutputId, position: u32 },
    SetOverlayPanel,
}

impl<H: PanelHost + 'static> InputPanel<H> {
    /// Binds the global for `client`. Only one client may hold it.
    pub fn bind(&mut self, client: ClientId) -> Result<(), ProtocolError> {
        if let Some(holder) = self.binding {
            warn!("⚠️ {:?} tried to bind the input panel held by {:?}", client, holder);
            return Err(ProtocolError::AlreadyBound { holder });
        }
        self.binding = Some(client);
        info!("⌨️  Input panel bound by {:?}", client);
        Ok(())
    }

    /// Releases the global if `client` holds it
    pub fn unbind(&mut self, client: ClientId) -> bool {
        if self.binding != Some(client) {
            return false;
        }
        self.binding = None;
        info!("⌨️  Input panel released by {:?}", client);
        true
    }

    pub fn handle_request(&mut self, client: ClientId, request: InputPanelRequest) -> Result<(), ProtocolError> {
        match request {
            InputPanelRequest::GetInputPanelSurface { id, surface } => {
                self.get_input_panel_surface(client, id, surface)
            }
        }
    }

    pub fn handle_surface_request(
        &mut self,
        resource: ResourceId,
        request: InputPanelSurfaceRequest,
    ) -> Result<(), ProtocolError> {
        match request {
            InputPanelSurfaceRequest::SetToplevel { output, position } => {
                self.set_toplevel(resource, output, position)
            }
            InputPanelSurfaceRequest::SetOverlayPanel => self.set_overlay_panel(resource),
        }
    }

    /// Creates an input panel surface object `id` for `surface`.
    pub fn get_input_panel_surface(
        &mut self,
        client: ClientId,
        id: ResourceId,
        surface: SurfaceId,
    ) -> Result<(), ProtocolError> {
        if self.binding != Some(client) {
            return Err(ProtocolError::NotBound { client });
        }
        if !self.host().surface_exists(surface) {
            return Err(ProtocolError::UnknownSurface { surface });
        }
        if self.registry.is_claimed(surface) {
            return Err(ProtocolError::AlreadyRequested { surface });
        }
        if self.host().surface_role(surface) != SurfaceRole::None {
            return Err(ProtocolError::RoleAlreadySet { surface });
        }
        if self.registry.by_resource(id).is_some() {
            return Err(ProtocolError::DuplicateResource(id));
        }

        if !self.attach_surface(surface, Some(id)) {
            return Err(ProtocolError::AlreadyRequested { surface });
        }
        debug!("⌨️  Input panel surface {:?} created for {}", id, surface);
        Ok(())
    }

    /// Docks the surface at the bottom of `output`
    pub fn set_toplevel(&mut self, resource: ResourceId, output: OutputId, position: u32) -> Result<(), ProtocolError> {
        let surface = self.resolve(resource)?;
        let position = ToplevelPosition::from_wire(position).ok_or(ProtocolError::InvalidPosition(position))?;
        self.assign_role(surface, PanelRole::Toplevel { output, position })
    }

    /// Makes the surface an overlay anchored at the text cursor
    pub fn set_overlay_panel(&mut self, resource: ResourceId) -> Result<(), ProtocolError> {
        let surface = self.resolve(resource)?;
        self.assign_role(surface, PanelRole::Panel)
    }

    /// Client destroyed the input panel surface object
    pub fn destroy_resource(&mut self, resource: ResourceId) -> Result<(), ProtocolError> {
        let surface = self.resolve(resource)?;
        if let Some(entry) = self.registry.get_mut(surface) {
            // Already gone on the client side, nothing to notify
            entry.resource = None;
        }
        self.close_surface(surface);
        Ok(())
    }

    fn resolve(&self, resource: ResourceId) -> Result<SurfaceId, ProtocolError> {
        self.registry
            .by_resource(resource)
            .ok_or(ProtocolError::UnknownResource(resource))
    }

    fn assign_role(&mut self, surface: SurfaceId, role: PanelRole) -> Result<(), ProtocolError> {
        if !self.register(surface, role) {
            return Err(ProtocolError::RoleAlreadySet { surface });
        }
        debug!("⌨️  {} registered as {:?}", surface, role);
        Ok(())
    }
}
