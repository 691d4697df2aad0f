// Input panel lifecycle integration tests
//
// Drives the panel manager through the compositor signals and the client
// protocol, the way a compositor would, and checks the interleavings of
// text input focus, panel surface lifetime and layer visibility.

use keypanel::geometry::{ClientId, LayerId, OutputGeometry, OutputId, Rectangle, ResourceId, SurfaceId};
use keypanel::headless::HostEvent;
use keypanel::panel::SharedInputPanel;
use keypanel::{
    CompositorSignals, HeadlessHost, InputPanel, InputPanelConfig, PanelState, ProtocolError, RoleConfigure,
};

const IM: ClientId = ClientId(1);
const OUTPUT: OutputId = OutputId(0);

struct Compositor {
    signals: CompositorSignals,
    panel: SharedInputPanel<HeadlessHost>,
    shell: LayerId,
    top: LayerId,
    text_input: SurfaceId,
}

impl Compositor {
    fn new() -> Self {
        let mut host = HeadlessHost::new();
        host.add_output(
            OUTPUT,
            OutputGeometry {
                x: 0,
                y: 0,
                mode_width: 1280,
                mode_height: 720,
            },
        );
        let shell = host.add_layer();
        let top = host.add_layer();
        let text_input = host.create_surface(Rectangle::new(40, 60, 600, 400));

        let signals = CompositorSignals::new();
        let panel = InputPanel::create(host, &InputPanelConfig::default(), &signals);
        panel.borrow_mut().bind(IM).unwrap();
        panel.borrow_mut().show_layer(shell, top);

        Self {
            signals,
            panel,
            shell,
            top,
            text_input,
        }
    }

    /// Creates a keyboard surface docked on the output, without a buffer
    fn keyboard(&self, resource: u32) -> SurfaceId {
        let mut panel = self.panel.borrow_mut();
        let surface = panel.host_mut().create_surface(Rectangle::default());
        panel
            .get_input_panel_surface(IM, ResourceId(resource), surface)
            .unwrap();
        panel.set_toplevel(ResourceId(resource), OUTPUT, 0).unwrap();
        surface
    }

    /// Buffer commit followed by the role's configure callback
    fn commit(&self, surface: SurfaceId, width: i32, height: i32) {
        let mut panel = self.panel.borrow_mut();
        panel.host_mut().commit(surface, width, height);
        panel.configure(surface, 0, 0, width, height);
    }

    fn destroy_surface(&self, surface: SurfaceId) {
        let signal = self.panel.borrow_mut().host_mut().destroy_surface(surface);
        if let Some(signal) = signal {
            signal.emit(&surface);
        }
    }

    fn show(&self) {
        self.signals.show_input_panel.emit(&self.text_input);
    }

    fn hide(&self) {
        self.signals.hide_input_panel.emit(&());
    }

    fn panel_linked(&self) -> bool {
        let panel = self.panel.borrow();
        panel.host().layers().contains(panel.layer().id)
    }
}

#[test]
fn test_keyboard_shown_and_hidden_with_focus() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);
    c.commit(keyboard, 1280, 300);

    // Committed while idle: nothing on screen yet
    assert!(!c.panel.borrow().is_mapped(keyboard));

    c.show();
    {
        let panel = c.panel.borrow();
        assert!(panel.is_mapped(keyboard));
        assert_eq!(panel.host().layers().next_of(c.shell), Some(panel.layer().id));
        assert_eq!(panel.host().layers().next_of(panel.layer().id), Some(c.top));
    }

    c.hide();
    let panel = c.panel.borrow();
    assert!(!panel.is_mapped(keyboard));
    assert_eq!(panel.host().layers().next_of(c.shell), Some(c.top));
    assert_eq!(panel.stats().show_transitions, 1);
    assert_eq!(panel.stats().hide_transitions, 1);
}

#[test]
fn test_keyboard_mapping_after_show_is_placed_and_revealed() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);

    c.show();
    assert!(!c.panel.borrow().is_mapped(keyboard));

    c.commit(keyboard, 800, 300);

    let panel = c.panel.borrow();
    assert!(panel.is_mapped(keyboard));
    assert_eq!(
        panel.host().surface(keyboard).unwrap().geometry,
        Rectangle::new(240, 420, 800, 300)
    );
    assert_eq!(panel.host().slides_for(keyboard), 1);
}

#[test]
fn test_text_input_hides_before_panel_maps() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);

    c.show();
    c.hide();
    c.commit(keyboard, 800, 300);

    let panel = c.panel.borrow();
    assert!(!panel.is_mapped(keyboard));
    assert_eq!(panel.host().slides_for(keyboard), 0);
    assert_eq!(panel.state(), PanelState::Idle);
}

#[test]
fn test_panel_destroyed_while_shown() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);
    c.commit(keyboard, 800, 300);
    c.show();

    c.destroy_surface(keyboard);

    let panel = c.panel.borrow();
    assert!(panel.layer().surfaces().is_empty());
    assert!(!panel.registry().is_claimed(keyboard));
    assert!(panel
        .host()
        .events()
        .contains(&HostEvent::ResourceDestroyed(ResourceId(10))));
    // Panels stay requested, the layer stays linked
    assert!(panel.is_showing());
    drop(panel);
    assert!(c.panel_linked());
}

#[test]
fn test_double_trigger_destroy_runs_once() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);
    c.commit(keyboard, 800, 300);
    c.show();

    c.panel.borrow_mut().destroy_resource(ResourceId(10)).unwrap();
    c.destroy_surface(keyboard);

    let panel = c.panel.borrow();
    assert_eq!(panel.stats().surfaces_destroyed, 1);
    assert_eq!(panel.stats().unmaps, 1);
    assert_eq!(panel.host().unmaps_for(keyboard), 1);
    assert!(!panel
        .host()
        .events()
        .iter()
        .any(|e| matches!(e, HostEvent::ResourceDestroyed(_))));
}

#[test]
fn test_resource_destroy_after_surface_destroy_is_unknown() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);

    c.destroy_surface(keyboard);

    assert_eq!(
        c.panel.borrow_mut().destroy_resource(ResourceId(10)),
        Err(ProtocolError::UnknownResource(ResourceId(10)))
    );
    assert_eq!(c.panel.borrow().stats().surfaces_destroyed, 1);
}

#[test]
fn test_shell_hides_layer_while_panels_visible() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);
    c.commit(keyboard, 800, 300);
    c.show();

    c.panel.borrow_mut().hide_layer();
    assert!(!c.panel_linked());
    assert!(c.panel.borrow().is_mapped(keyboard));

    c.panel.borrow_mut().show_layer(c.shell, c.top);
    assert!(c.panel_linked());
    assert_eq!(c.panel.borrow().host().slides_for(keyboard), 1);
}

#[test]
fn test_refocus_does_not_flicker() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);
    c.commit(keyboard, 800, 300);
    let other = c.panel.borrow_mut().host_mut().create_surface(Rectangle::default());

    c.show();
    c.signals.show_input_panel.emit(&other);

    let panel = c.panel.borrow();
    assert_eq!(panel.text_input().surface, Some(other));
    assert_eq!(panel.host().slides_for(keyboard), 1);
    assert_eq!(panel.host().unmaps_for(keyboard), 0);
}

#[test]
fn test_overlay_panel_follows_cursor_on_next_configure() {
    let c = Compositor::new();
    let candidate = {
        let mut panel = c.panel.borrow_mut();
        let surface = panel.host_mut().create_surface(Rectangle::default());
        panel.get_input_panel_surface(IM, ResourceId(20), surface).unwrap();
        panel.set_overlay_panel(ResourceId(20)).unwrap();
        surface
    };

    c.signals
        .update_input_panel
        .emit(&keypanel::geometry::CursorRect::new(10, 10, 30, 50));
    c.show();
    c.commit(candidate, 200, 40);

    let panel = c.panel.borrow();
    let geometry = panel.host().surface(candidate).unwrap().geometry;
    assert_eq!((geometry.x, geometry.y), (40 + 30, 60 + 50));
}

#[test]
fn test_compositor_teardown_releases_everything() {
    let c = Compositor::new();
    let keyboard = c.keyboard(10);
    c.commit(keyboard, 800, 300);
    c.show();

    c.signals.destroy.emit(&());

    {
        let panel = c.panel.borrow();
        assert!(panel.is_destroyed());
        assert!(panel.registry().is_empty());
        assert!(panel.layer().surfaces().is_empty());
        assert_eq!(panel.binding(), None);
        assert_eq!(
            panel.host().surface(keyboard).map(|s| s.role),
            Some(keypanel::host::SurfaceRole::None)
        );
    }
    assert!(!c.panel_linked());

    // Later notifications reach nobody
    c.hide();
    c.destroy_surface(keyboard);
    assert!(c.panel.borrow().is_showing());
    assert_eq!(c.panel.borrow().stats().surfaces_destroyed, 0);
}

#[test]
fn test_panel_dropped_before_signals_fire() {
    let signals = CompositorSignals::new();
    let panel = InputPanel::create(HeadlessHost::new(), &InputPanelConfig::default(), &signals);
    drop(panel);

    // Listeners hold only weak references
    signals.show_input_panel.emit(&SurfaceId(1));
    signals.destroy.emit(&());
}
