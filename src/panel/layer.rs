//! Structural show / hide of the panel layer
//!
//! The shell decides where the panel layer sits in the layer list by calling
//! `show_layer(previous, next)`. Whether the panel node actually occupies a
//! slot depends on whether panels are showing; the remembered neighbours are
//! re-checked against the live list each time the node is linked.
//!
//! Ordering quirk kept on purpose: `on_show` after `show_layer` links the
//! panel node after `previous` only, while `show_layer` during `Showing`
//! also pulls `next` in directly behind the panel node. If the list changed
//! in between, the two orders end in different stacks.

use log::{debug, info, warn};

use super::{InputPanel, PanelState};
use crate::geometry::LayerId;
use crate::host::PanelHost;

impl<H: PanelHost + 'static> InputPanel<H> {
    /// Makes the panel layer part of the layer list between `previous` and
    /// `next`. Warns and does nothing if the layer is already shown.
    pub fn show_layer(&mut self, previous: LayerId, next: LayerId) {
        if self.layer.visible {
            warn!("⚠️ show_layer: input panel layer is already shown");
            return;
        }

        self.layer.previous = Some(previous);
        self.layer.next = Some(next);
        self.layer.visible = true;
        info!("⌨️  Input panel layer shown between {} and {}", previous, next);

        if self.state == PanelState::Showing {
            self.link_panel_layer();
            let id = self.layer.id;
            if !self.host_mut().layer_stack().link(id, next) {
                warn!("⚠️ show_layer: could not link {} after the panel layer", next);
            }
        } else if !self.host_mut().layer_stack().link(previous, next) {
            warn!("⚠️ show_layer: {} is not in the layer list", previous);
        }
    }

    /// Takes the panel layer out of the layer list. Warns and does nothing
    /// if the layer is already hidden.
    pub fn hide_layer(&mut self) {
        if !self.layer.visible {
            warn!("⚠️ hide_layer: input panel layer is already hidden");
            return;
        }

        self.layer.visible = false;
        info!("⌨️  Input panel layer hidden");

        if self.state == PanelState::Showing {
            self.unlink_panel_layer();
        }
    }

    /// Links the panel node after the remembered `previous` neighbour.
    ///
    /// Falls back to before `next`, then to the bottom of the list, when the
    /// neighbours were removed behind our back.
    pub(crate) fn link_panel_layer(&mut self) {
        let id = self.layer.id;
        let previous = self.layer.previous;
        let next = self.layer.next;
        let stack = self.host_mut().layer_stack();

        if stack.contains(id) {
            debug!("⌨️  Panel layer already linked");
            return;
        }

        match (previous, next) {
            (Some(prev), _) if stack.contains(prev) => {
                stack.insert_after(prev, id);
            }
            (_, Some(next)) if stack.contains(next) => {
                warn!("⚠️ Panel layer neighbour {:?} is gone, linking before {}", previous, next);
                stack.insert_before(next, id);
            }
            _ => {
                warn!("⚠️ Panel layer neighbours are gone, linking at the bottom");
                stack.push(id);
            }
        }
    }

    /// Unlinks the panel node if it is in the list.
    pub(crate) fn unlink_panel_layer(&mut self) {
        let id = self.layer.id;
        if self.host_mut().layer_stack().remove(id).is_none() {
            debug!("⌨️  Panel layer was not linked");
        }
    }
}
