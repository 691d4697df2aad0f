//! Input panel manager
//!
//! `InputPanel` is the per-compositor owner of the on-screen keyboard state:
//! the registry of panel surfaces, the panel's node in the layer list, the
//! active text input and its cursor rectangle, and whether panels are
//! currently requested.
//!
//! The behaviour is split across submodules:
//! - [`visibility`]: reactions to text input show / hide / cursor updates
//! - [`layer`]: structural show / hide of the panel layer by the shell
//! - [`placement`]: positioning on configure
//!
//! The protocol entry points live in [`crate::protocol`].
//!
//! # Usage
//!
//! ```
//! use keypanel::config::InputPanelConfig;
//! use keypanel::headless::HeadlessHost;
//! use keypanel::panel::InputPanel;
//! use keypanel::signal::CompositorSignals;
//!
//! let signals = CompositorSignals::new();
//! let panel = InputPanel::create(HeadlessHost::new(), &InputPanelConfig::default(), &signals);
//!
//! signals.hide_input_panel.emit(&());
//! assert!(!panel.borrow().is_showing());
//!
//! signals.destroy.emit(&());
//! assert!(panel.borrow().is_destroyed());
//! ```

pub mod layer;
pub mod placement;
pub mod visibility;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::config::InputPanelConfig;
use crate::geometry::{ClientId, CursorRect, LayerId, ResourceId, SurfaceId};
use crate::host::{PanelHost, SlideParams, SurfaceRole};
use crate::registry::{PanelRole, SurfaceRegistry};
use crate::signal::{CompositorSignals, Subscription};

/// Shared handle used by signal listeners
pub type SharedInputPanel<H> = Rc<RefCell<InputPanel<H>>>;

/// Notifications that arrived while the panel was borrowed
type DeferredQueue<H> = Rc<RefCell<VecDeque<Box<dyn FnOnce(&mut InputPanel<H>)>>>>;

/// Whether panels are currently requested by the text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// No text input wants a panel
    Idle,
    /// Panels requested and displayed
    Showing,
}

/// The panel's node in the global layer list plus its render list
#[derive(Debug, Clone)]
pub struct PanelLayer {
    /// Identity of the panel layer in the layer list
    pub id: LayerId,
    /// Set between `show_layer` and `hide_layer`
    pub visible: bool,
    /// Neighbour the panel layer goes after
    pub previous: Option<LayerId>,
    /// Neighbour the panel layer goes before
    pub next: Option<LayerId>,
    /// Surfaces rendered in the panel layer, most recent first
    surfaces: Vec<SurfaceId>,
}

impl PanelLayer {
    fn new(id: LayerId) -> Self {
        Self {
            id,
            visible: false,
            previous: None,
            next: None,
            surfaces: Vec::new(),
        }
    }

    /// Surfaces currently in the render list
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains(&surface)
    }

    fn insert_surface(&mut self, surface: SurfaceId) -> bool {
        if self.contains(surface) {
            return false;
        }
        self.surfaces.insert(0, surface);
        true
    }

    fn remove_surface(&mut self, surface: SurfaceId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| *s != surface);
        self.surfaces.len() != before
    }
}

/// Text input the panels currently serve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// Surface holding the focused text field
    pub surface: Option<SurfaceId>,
    /// Cursor box relative to that surface
    pub cursor_rectangle: CursorRect,
}

/// Counters kept for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelStats {
    /// Idle → Showing transitions
    pub show_transitions: usize,
    /// Showing → Idle transitions
    pub hide_transitions: usize,
    /// Surfaces inserted into the render list
    pub reveals: usize,
    /// Surfaces removed from the render list
    pub unmaps: usize,
    /// Panel surfaces created
    pub surfaces_created: usize,
    /// Panel surfaces torn down
    pub surfaces_destroyed: usize,
}

/// Input panel manager, one per compositor.
pub struct InputPanel<H: PanelHost> {
    host: H,
    slide: SlideParams,
    pub(crate) registry: SurfaceRegistry,
    pub(crate) layer: PanelLayer,
    pub(crate) state: PanelState,
    pub(crate) text_input: TextInputState,
    pub(crate) binding: Option<ClientId>,
    subscriptions: Vec<Subscription>,
    deferred: DeferredQueue<H>,
    destroyed: bool,
    pub(crate) stats: PanelStats,
    self_ref: Weak<RefCell<InputPanel<H>>>,
}

impl<H: PanelHost + 'static> InputPanel<H> {
    /// Creates a detached manager. Nothing is subscribed; callers drive it
    /// by calling the handlers directly.
    pub fn new(mut host: H, config: &InputPanelConfig) -> Self {
        let layer_id = host.layer_stack().new_layer();
        debug!("⌨️  Input panel layer allocated as {}", layer_id);

        Self {
            host,
            slide: SlideParams::from_config(&config.slide),
            registry: SurfaceRegistry::new(),
            layer: PanelLayer::new(layer_id),
            state: PanelState::Idle,
            text_input: TextInputState::default(),
            binding: None,
            subscriptions: Vec::new(),
            deferred: Rc::new(RefCell::new(VecDeque::new())),
            destroyed: false,
            stats: PanelStats::default(),
            self_ref: Weak::new(),
        }
    }

    /// Creates the manager and subscribes it to the compositor's signals.
    ///
    /// The subscriptions are released when the compositor's destroy signal
    /// fires or when [`InputPanel::destroy`] is called.
    pub fn create(host: H, config: &InputPanelConfig, signals: &CompositorSignals) -> SharedInputPanel<H> {
        let panel = Rc::new_cyclic(|weak: &Weak<RefCell<Self>>| {
            let mut panel = Self::new(host, config);
            panel.self_ref = weak.clone();

            let (w, q) = (weak.clone(), panel.deferred.clone());
            panel.subscriptions.push(signals.destroy.subscribe(move |_| {
                Self::dispatch(&w, &q, "destroy", |p| p.destroy());
            }));
            let (w, q) = (weak.clone(), panel.deferred.clone());
            panel
                .subscriptions
                .push(signals.show_input_panel.subscribe(move |surface| {
                    let surface = *surface;
                    Self::dispatch(&w, &q, "show_input_panel", move |p| p.on_show(surface));
                }));
            let (w, q) = (weak.clone(), panel.deferred.clone());
            panel
                .subscriptions
                .push(signals.hide_input_panel.subscribe(move |_| {
                    Self::dispatch(&w, &q, "hide_input_panel", |p| p.on_hide());
                }));
            let (w, q) = (weak.clone(), panel.deferred.clone());
            panel
                .subscriptions
                .push(signals.update_input_panel.subscribe(move |rect| {
                    let rect = *rect;
                    Self::dispatch(&w, &q, "update_input_panel", move |p| p.on_update_cursor(rect));
                }));

            RefCell::new(panel)
        });

        info!("⌨️  Input panel created");
        panel
    }

    /// Runs a listener body against the panel if it is still alive.
    ///
    /// If the panel is already borrowed further up the stack the body is
    /// queued and runs, in arrival order, on the next dispatch or
    /// [`InputPanel::run_deferred`].
    fn dispatch(
        weak: &Weak<RefCell<Self>>,
        deferred: &DeferredQueue<H>,
        what: &str,
        f: impl FnOnce(&mut Self) + 'static,
    ) {
        let Some(panel) = weak.upgrade() else {
            return;
        };
        match panel.try_borrow_mut() {
            Ok(mut guard) => {
                guard.run_deferred();
                f(&mut *guard);
                guard.run_deferred();
            }
            Err(_) => {
                debug!("⌨️  Input panel busy, deferring {} notification", what);
                deferred.borrow_mut().push_back(Box::new(f));
            }
        };
    }

    /// Runs notifications that arrived while the panel was borrowed.
    ///
    /// Callers that hold the panel across code which may emit compositor or
    /// surface signals call this before releasing it.
    pub fn run_deferred(&mut self) {
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            match next {
                Some(job) => job(self),
                None => break,
            }
        }
    }

    /// Number of notifications waiting for [`InputPanel::run_deferred`]
    pub fn deferred_count(&self) -> usize {
        self.deferred.borrow().len()
    }

    /// Tears the manager down: unsubscribes first, then releases every panel
    /// surface and the layer node. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.subscriptions.clear();
        self.deferred.borrow_mut().clear();

        for mut entry in self.registry.drain() {
            entry.destroying = true;
            entry.disconnect();
            if self.host.surface_role(entry.surface) == SurfaceRole::InputPanel {
                self.host.set_surface_role(entry.surface, SurfaceRole::None);
            }
        }

        if self.state == PanelState::Showing && self.layer.visible {
            self.unlink_panel_layer();
        }
        self.layer.surfaces.clear();
        self.binding = None;

        info!("⌨️  Input panel destroyed");
    }

    /// Creates the panel surface entry for a display surface and hooks its
    /// destroy notification. Returns `false` if the surface was already
    /// claimed by the input panel.
    pub(crate) fn attach_surface(&mut self, surface: SurfaceId, resource: Option<ResourceId>) -> bool {
        let destroy_signal = self.host.surface_destroy_signal(surface);
        let Some(entry) = self.registry.claim(surface, resource) else {
            return false;
        };

        if let Some(signal) = destroy_signal {
            let (w, q) = (self.self_ref.clone(), self.deferred.clone());
            entry.set_destroy_subscription(signal.subscribe(move |destroyed| {
                let destroyed = *destroyed;
                Self::dispatch(&w, &q, "surface destroy", move |p| p.handle_surface_destroyed(destroyed));
            }));
        }

        self.host.set_surface_role(surface, SurfaceRole::InputPanel);
        self.stats.surfaces_created += 1;
        true
    }

    /// Registers a claimed surface under a role.
    ///
    /// Fails if the display surface's configure role belongs to anyone but
    /// the input panel, or if the surface was never claimed.
    pub fn register(&mut self, surface: SurfaceId, role: PanelRole) -> bool {
        if self.host.surface_role(surface) != SurfaceRole::InputPanel {
            debug!("⌨️  {} has a foreign role, not registering", surface);
            return false;
        }
        self.registry.register(surface, role).is_some()
    }

    /// Role of a surface registered through the input panel
    pub fn lookup_role(&self, surface: SurfaceId) -> Option<PanelRole> {
        self.registry.lookup_role(surface)
    }

    /// Tears down one panel surface. Runs once no matter how many triggers
    /// fire; returns `true` only for the call that did the teardown.
    pub fn close_surface(&mut self, surface: SurfaceId) -> bool {
        let Some(entry) = self.registry.get_mut(surface) else {
            return false;
        };
        if entry.destroying {
            return false;
        }
        entry.destroying = true;
        entry.disconnect();

        if self.layer.remove_surface(surface) {
            self.host.unmap_surface(surface);
            self.stats.unmaps += 1;
        }
        if self.host.surface_role(surface) == SurfaceRole::InputPanel {
            self.host.set_surface_role(surface, SurfaceRole::None);
        }

        self.registry.unregister(surface);
        self.stats.surfaces_destroyed += 1;
        debug!("⌨️  Panel surface on {} closed", surface);
        true
    }

    /// Destroy notification of the underlying display surface.
    ///
    /// A panel surface still backed by a client resource takes the resource
    /// down with it.
    pub fn handle_surface_destroyed(&mut self, surface: SurfaceId) {
        let Some(entry) = self.registry.get(surface) else {
            return;
        };
        if entry.destroying {
            return;
        }
        if let Some(resource) = entry.resource {
            self.host.destroy_resource(resource);
        }
        self.close_surface(surface);
    }

    /// Shared reveal path for `on_show` and first configure: the slide
    /// parameters must not differ between the two.
    pub(crate) fn reveal(&mut self, surface: SurfaceId) {
        self.host.geometry_dirty(surface);
        if !self.layer.insert_surface(surface) {
            debug!("⌨️  {} already in the panel layer", surface);
            return;
        }
        self.host.update_transform(surface);
        self.host.damage(surface);

        if self.slide.enabled {
            let height = self
                .host
                .surface_geometry(surface)
                .map(|g| g.height)
                .unwrap_or(0);
            let params = self.slide;
            self.host.slide_run(surface, height as f32, 0.0, &params);
        }
        self.stats.reveals += 1;
    }

    /// Removes a surface from the render list and from rendering
    pub(crate) fn unmap(&mut self, surface: SurfaceId) {
        if self.layer.remove_surface(surface) {
            self.host.unmap_surface(surface);
            self.stats.unmaps += 1;
        }
    }

    pub fn is_mapped(&self, surface: SurfaceId) -> bool {
        self.layer.contains(surface)
    }

    pub fn is_showing(&self) -> bool {
        self.state == PanelState::Showing
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn layer(&self) -> &PanelLayer {
        &self.layer
    }

    pub fn text_input(&self) -> TextInputState {
        self.text_input
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn binding(&self) -> Option<ClientId> {
        self.binding
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn slide_params(&self) -> SlideParams {
        self.slide
    }

    /// Number of live compositor signal subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn stats(&self) -> PanelStats {
        self.stats
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
