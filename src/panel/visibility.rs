//! Reactions to the text input's show / hide / cursor notifications
//!
//! Layer splicing here always looks at the current `layer.visible` flag and
//! the current list membership, so any interleaving with the shell's
//! `show_layer` / `hide_layer` calls stays consistent.

use log::{debug, info};

use super::{InputPanel, PanelState};
use crate::geometry::{CursorRect, SurfaceId};
use crate::host::PanelHost;

impl<H: PanelHost + 'static> InputPanel<H> {
    /// Text input activated on `text_input_surface`.
    ///
    /// Repeated calls while showing only retarget the text input.
    pub fn on_show(&mut self, text_input_surface: SurfaceId) {
        self.text_input.surface = Some(text_input_surface);

        if self.state == PanelState::Showing {
            debug!("⌨️  Panels already showing, text input now {}", text_input_surface);
            return;
        }

        self.state = PanelState::Showing;
        self.stats.show_transitions += 1;
        info!("⌨️  Showing input panels for {}", text_input_surface);

        if self.layer.visible {
            self.link_panel_layer();
        }

        let candidates = self.registry.registered().to_vec();
        for surface in candidates {
            if !self.host().has_content(surface) {
                debug!("⌨️  {} has no content yet, waiting for configure", surface);
                continue;
            }
            self.reveal(surface);
        }
    }

    /// Text input deactivated: every displayed panel surface is unmapped.
    pub fn on_hide(&mut self) {
        if self.state == PanelState::Idle {
            return;
        }

        self.state = PanelState::Idle;
        self.stats.hide_transitions += 1;
        info!("⌨️  Hiding input panels");

        if self.layer.visible {
            self.unlink_panel_layer();
        }

        let displayed = self.layer.surfaces().to_vec();
        for surface in displayed {
            self.unmap(surface);
        }
    }

    /// New cursor rectangle; used by the next placement.
    pub fn on_update_cursor(&mut self, rect: CursorRect) {
        self.text_input.cursor_rectangle = rect;
    }
}
