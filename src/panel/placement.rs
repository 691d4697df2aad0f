//! Placement of panel surfaces on configure
//!
//! A panel surface may get its first buffer after `on_show` already ran, so
//! the first configure with a size while panels are showing reveals it through
//! the same path `on_show` uses.

use log::{debug, warn};

use super::{InputPanel, PanelState};
use crate::geometry::{Rectangle, SurfaceId};
use crate::host::{PanelHost, RoleConfigure};
use crate::registry::PanelRole;

impl<H: PanelHost + 'static> InputPanel<H> {
    /// Position for a surface of the given size under `role`.
    ///
    /// `None` when the role's anchor (output) no longer exists.
    pub fn placement(&self, role: PanelRole, width: i32, height: i32) -> Option<(i32, i32)> {
        match role {
            PanelRole::Panel => {
                let (ox, oy) = self
                    .text_input
                    .surface
                    .and_then(|s| self.host().surface_geometry(s))
                    .map(|g| (g.x, g.y))
                    .unwrap_or((0, 0));
                // Cursor comes from the application, wrap instead of trapping
                let cursor = self.text_input.cursor_rectangle;
                Some((ox.wrapping_add(cursor.x2), oy.wrapping_add(cursor.y2)))
            }
            PanelRole::Toplevel { output, .. } => {
                let Some(out) = self.host().output_geometry(output) else {
                    warn!("⚠️ Output {:?} of toplevel panel is gone", output);
                    return None;
                };
                Some((
                    out.x.wrapping_add(out.mode_width.wrapping_sub(width) / 2),
                    out.y.wrapping_add(out.mode_height).wrapping_sub(height),
                ))
            }
        }
    }
}

impl<H: PanelHost + 'static> RoleConfigure for InputPanel<H> {
    fn configure(&mut self, surface: SurfaceId, _sx: i32, _sy: i32, width: i32, height: i32) {
        if width == 0 {
            return;
        }

        let Some(role) = self.registry.lookup_role(surface) else {
            debug!("⌨️  Configure on {} without a panel role, ignoring", surface);
            return;
        };

        let mapped = self.is_mapped(surface);
        if !mapped && self.state == PanelState::Idle {
            return;
        }
        let first_reveal = !mapped;

        let Some((x, y)) = self.placement(role, width, height) else {
            return;
        };
        self.host_mut()
            .configure_surface(surface, Rectangle::new(x, y, width, height));

        if first_reveal {
            self.reveal(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::geometry::{CursorRect, OutputGeometry, OutputId, Rectangle, SurfaceId};
    use crate::headless::HostEvent;
    use crate::host::RoleConfigure;
    use crate::registry::{PanelRole, ToplevelPosition};

    const TEXT_INPUT: SurfaceId = SurfaceId(500);

    #[test]
    fn test_zero_width_is_ignored() {
        let mut panel = panel();
        let surface = registered_surface(&mut panel, toplevel());
        panel.on_show(TEXT_INPUT);

        panel.configure(surface, 0, 0, 0, 300);

        assert!(panel.host().events().is_empty());
        assert!(!panel.is_mapped(surface));
    }

    #[test]
    fn test_unmapped_while_idle_is_ignored() {
        let mut panel = panel();
        let surface = surface_with_content(&mut panel, toplevel(), 600, 250);

        panel.configure(surface, 0, 0, 600, 250);

        assert!(panel.host().events().is_empty());
        assert!(!panel.is_mapped(surface));
    }

    #[test]
    fn test_toplevel_centered_at_bottom_of_output() {
        let mut panel = panel();
        let surface = registered_surface(&mut panel, toplevel());
        panel.on_show(TEXT_INPUT);

        panel.configure(surface, 0, 0, 600, 250);

        assert_eq!(
            panel.host().events()[0],
            HostEvent::Configure(surface, Rectangle::new(660, 830, 600, 250))
        );
        assert!(panel.is_mapped(surface));
    }

    #[test]
    fn test_toplevel_on_offset_output() {
        let mut panel = panel();
        let second = OutputId(1);
        panel.host_mut().add_output(
            second,
            OutputGeometry {
                x: 1920,
                y: 100,
                mode_width: 1281,
                mode_height: 800,
            },
        );
        let role = PanelRole::Toplevel {
            output: second,
            position: ToplevelPosition::CenterBottom,
        };
        let surface = registered_surface(&mut panel, role);
        panel.on_show(TEXT_INPUT);

        panel.configure(surface, 0, 0, 400, 200);

        // (1281 - 400) / 2 truncates
        let geometry = panel.host().surface(surface).unwrap().geometry;
        assert_eq!(geometry, Rectangle::new(1920 + 440, 100 + 600, 400, 200));
    }

    #[test]
    fn test_panel_anchored_at_cursor_far_corner() {
        let mut panel = panel();
        let text_input = panel
            .host_mut()
            .create_surface(Rectangle::new(300, 200, 800, 600));
        let surface = registered_surface(&mut panel, PanelRole::Panel);

        panel.on_update_cursor(CursorRect::new(10, 15, 42, 37));
        panel.on_show(text_input);
        panel.configure(surface, 0, 0, 120, 40);

        let geometry = panel.host().surface(surface).unwrap().geometry;
        assert_eq!(geometry, Rectangle::new(342, 237, 120, 40));
    }

    #[test]
    fn test_first_configure_reveal_matches_show_reveal() {
        let mut panel = panel();
        let early = surface_with_content(&mut panel, toplevel(), 600, 250);
        let late = registered_surface(&mut panel, toplevel());

        panel.on_show(TEXT_INPUT);
        let show_events = panel.host_mut().take_events();

        panel.host_mut().commit(late, 600, 250);
        panel.configure(late, 0, 0, 600, 250);
        let configure_events = panel.host_mut().take_events();

        let slide_of = |events: &[HostEvent]| {
            events
                .iter()
                .find_map(|e| match e {
                    HostEvent::Slide { from, to, params, .. } => Some((*from, *to, *params)),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(slide_of(&show_events), slide_of(&configure_events));

        // Configure first, then the same reveal sequence as on_show
        let strip = |events: Vec<HostEvent>, s: SurfaceId| -> Vec<&'static str> {
            events
                .into_iter()
                .filter_map(|e| match e {
                    HostEvent::GeometryDirty(x) if x == s => Some("dirty"),
                    HostEvent::UpdateTransform(x) if x == s => Some("transform"),
                    HostEvent::Damage(x) if x == s => Some("damage"),
                    HostEvent::Slide { surface: x, .. } if x == s => Some("slide"),
                    HostEvent::Configure(x, _) if x == s => Some("configure"),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(
            strip(show_events, early),
            vec!["dirty", "transform", "damage", "slide"]
        );
        assert_eq!(
            strip(configure_events, late),
            vec!["configure", "dirty", "transform", "damage", "slide"]
        );
    }

    #[test]
    fn test_mapped_surface_reconfigure_moves_without_animation() {
        let mut panel = panel();
        let surface = surface_with_content(&mut panel, toplevel(), 600, 250);
        panel.on_show(TEXT_INPUT);

        panel.configure(surface, 0, 0, 800, 300);
        panel.configure(surface, 0, 0, 1000, 300);

        assert_eq!(panel.host().slides_for(surface), 1);
        let geometry = panel.host().surface(surface).unwrap().geometry;
        assert_eq!(geometry, Rectangle::new(460, 780, 1000, 300));
    }

    #[test]
    fn test_configure_after_hide_does_not_reveal() {
        let mut panel = panel();
        let surface = surface_with_content(&mut panel, toplevel(), 600, 250);
        panel.on_show(TEXT_INPUT);
        panel.on_hide();

        panel.configure(surface, 0, 0, 600, 250);
        assert!(!panel.is_mapped(surface));
        assert_eq!(panel.host().slides_for(surface), 1);
    }

    #[test]
    fn test_missing_output_skips_placement() {
        let mut panel = panel();
        let surface = registered_surface(&mut panel, toplevel());
        panel.on_show(TEXT_INPUT);
        panel.host_mut().remove_output(OUTPUT);

        panel.configure(surface, 0, 0, 600, 250);

        assert!(panel.host().events().is_empty());
        assert!(!panel.is_mapped(surface));
    }

    #[test]
    fn test_surface_without_role_is_ignored() {
        let mut panel = panel();
        let surface = panel.host_mut().create_surface(Rectangle::default());
        panel.attach_surface(surface, None);
        panel.on_show(TEXT_INPUT);

        panel.configure(surface, 0, 0, 600, 250);

        assert!(panel.host().events().is_empty());
    }

    #[test]
    fn test_extreme_cursor_corner_wraps() {
        let mut panel = panel();
        let text_input = panel
            .host_mut()
            .create_surface(Rectangle::new(100, 100, 800, 600));
        let surface = registered_surface(&mut panel, PanelRole::Panel);

        panel.on_update_cursor(CursorRect::new(0, 0, i32::MAX, i32::MAX));
        panel.on_show(text_input);
        panel.configure(surface, 0, 0, 100, 40);

        let geometry = panel.host().surface(surface).unwrap().geometry;
        assert_eq!(
            (geometry.x, geometry.y),
            (100i32.wrapping_add(i32::MAX), 100i32.wrapping_add(i32::MAX))
        );
        assert!(panel.is_mapped(surface));
    }

    #[test]
    fn test_oversized_toplevel_does_not_trap() {
        let mut panel = panel();
        let surface = registered_surface(&mut panel, toplevel());
        panel.on_show(TEXT_INPUT);

        panel.configure(surface, 0, 0, i32::MAX, i32::MAX);

        let geometry = panel.host().surface(surface).unwrap().geometry;
        assert_eq!(geometry.x, 1920i32.wrapping_sub(i32::MAX) / 2);
        assert_eq!(geometry.y, 1080i32.wrapping_sub(i32::MAX));
    }

    #[test]
    fn test_panel_without_text_input_anchors_at_origin() {
        let mut panel = panel();
        let surface = registered_surface(&mut panel, PanelRole::Panel);
        panel.on_update_cursor(CursorRect::new(0, 0, 25, 35));

        // Text input surface is unknown to the host
        panel.on_show(SurfaceId(9999));
        panel.configure(surface, 0, 0, 50, 20);

        let geometry = panel.host().surface(surface).unwrap().geometry;
        assert_eq!((geometry.x, geometry.y), (25, 35));
    }
}
