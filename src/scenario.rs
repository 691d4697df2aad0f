//! Scripted replay of compositor events against a headless input panel
//!
//! A scenario is a TOML file describing outputs, display surfaces, the
//! shell's layers and a list of steps:
//!
//! ```toml
//! layers = ["background", "shell", "top"]
//!
//! [[outputs]]
//! id = 0
//! width = 1920
//! height = 1080
//!
//! [[surfaces]]
//! id = 1
//! x = 100
//! y = 100
//! width = 800
//! height = 600
//!
//! [[steps]]
//! action = "show_layer"
//! previous = "shell"
//! next = "top"
//! ```
//!
//! Protocol violations are recorded in the [`ReplayReport`]; mistakes in the
//! script itself (unknown layer names, missing surfaces) abort the replay.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::InputPanelConfig;
use crate::geometry::{ClientId, CursorRect, LayerId, OutputGeometry, OutputId, Rectangle, ResourceId, SurfaceId};
use crate::headless::HeadlessHost;
use crate::host::{PanelHost, RoleConfigure, SurfaceRole};
use crate::panel::{InputPanel, PanelState, PanelStats, SharedInputPanel};
use crate::protocol::ProtocolError;
use crate::signal::CompositorSignals;

/// Name the panel's own layer gets in reports
pub const PANEL_LAYER_NAME: &str = "input-panel";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSpec {
    pub id: u32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceSpec {
    pub id: u32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
}

/// One scripted event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Bind { client: u32 },
    Unbind { client: u32 },
    GetPanelSurface { client: u32, id: u32, surface: u32 },
    SetToplevel {
        resource: u32,
        output: u32,
        #[serde(default)]
        position: u32,
    },
    SetPanel { resource: u32 },
    /// Buffer commit; runs the configure callback for input panel surfaces
    Commit { surface: u32, width: i32, height: i32 },
    Configure { surface: u32, width: i32, height: i32 },
    Show { surface: u32 },
    Hide,
    Cursor { x1: i32, y1: i32, x2: i32, y2: i32 },
    ShowLayer { previous: String, next: String },
    HideLayer,
    DestroySurface { surface: u32 },
    DestroyResource { resource: u32 },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Bind { .. } => "bind",
            Step::Unbind { .. } => "unbind",
            Step::GetPanelSurface { .. } => "get_panel_surface",
            Step::SetToplevel { .. } => "set_toplevel",
            Step::SetPanel { .. } => "set_panel",
            Step::Commit { .. } => "commit",
            Step::Configure { .. } => "configure",
            Step::Show { .. } => "show",
            Step::Hide => "hide",
            Step::Cursor { .. } => "cursor",
            Step::ShowLayer { .. } => "show_layer",
            Step::HideLayer => "hide_layer",
            Step::DestroySurface { .. } => "destroy_surface",
            Step::DestroyResource { .. } => "destroy_resource",
        }
    }
}

/// Event script replayed by [`Scenario::run`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Shell layers, top to bottom
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Protocol error raised by a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepError {
    /// 1-based step number
    pub step: usize,
    pub error: ProtocolError,
}

/// Final state after a replay
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Layer list, top to bottom
    pub layers: Vec<String>,
    /// Surfaces rendered in the panel layer, most recent first
    pub render_list: Vec<SurfaceId>,
    /// Registered panel surfaces, most recent first
    pub registered: Vec<SurfaceId>,
    pub state: PanelState,
    pub stats: PanelStats,
    pub errors: Vec<StepError>,
    /// Rendering primitives issued to the host
    pub host_events: usize,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse scenario file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        Ok(scenario)
    }

    /// Replays the steps against a fresh headless compositor.
    ///
    /// The compositor is torn down through its destroy signal afterwards.
    pub fn run(&self, config: &InputPanelConfig) -> Result<ReplayReport> {
        let mut host = HeadlessHost::new();
        for output in &self.outputs {
            host.add_output(
                OutputId(output.id),
                OutputGeometry {
                    x: output.x,
                    y: output.y,
                    mode_width: output.width,
                    mode_height: output.height,
                },
            );
        }
        for surface in &self.surfaces {
            host.insert_surface(
                SurfaceId(surface.id),
                Rectangle::new(surface.x, surface.y, surface.width, surface.height),
            );
        }
        let mut layer_ids = HashMap::new();
        for name in &self.layers {
            if layer_ids.insert(name.clone(), host.add_layer()).is_some() {
                bail!("Duplicate layer name: {}", name);
            }
        }

        let signals = CompositorSignals::new();
        let panel = InputPanel::create(host, config, &signals);
        info!("▶️ Replaying {} steps", self.steps.len());

        let mut errors = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            debug!("▶️ Step {}: {:?}", index + 1, step);
            let outcome = apply(&panel, &signals, &layer_ids, step)
                .with_context(|| format!("Step {} ({}) failed", index + 1, step.name()))?;
            if let Err(error) = outcome {
                warn!("⚠️ Step {} ({}): protocol error: {}", index + 1, step.name(), error);
                errors.push(StepError { step: index + 1, error });
            }
        }

        let report = {
            let p = panel.borrow();
            let names: HashMap<LayerId, &str> = layer_ids.iter().map(|(n, id)| (*id, n.as_str())).collect();
            let panel_layer = p.layer().id;
            ReplayReport {
                layers: p
                    .host()
                    .layers()
                    .iter()
                    .map(|id| {
                        if *id == panel_layer {
                            PANEL_LAYER_NAME.to_string()
                        } else {
                            names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string())
                        }
                    })
                    .collect(),
                render_list: p.layer().surfaces().to_vec(),
                registered: p.registry().registered().to_vec(),
                state: p.state(),
                stats: p.stats(),
                errors,
                host_events: p.host().events().len(),
            }
        };

        signals.destroy.emit(&());
        info!("✅ Replay finished");
        Ok(report)
    }
}

/// Runs one step. The outer error is a broken script, the inner one a
/// protocol violation the compositor would post to the client.
fn apply(
    panel: &SharedInputPanel<HeadlessHost>,
    signals: &CompositorSignals,
    layers: &HashMap<String, LayerId>,
    step: &Step,
) -> Result<Result<(), ProtocolError>> {
    let layer = |name: &str| -> Result<LayerId> {
        layers
            .get(name)
            .copied()
            .with_context(|| format!("Unknown layer: {}", name))
    };

    let outcome = match step {
        Step::Bind { client } => panel.borrow_mut().bind(ClientId(*client)),
        Step::Unbind { client } => {
            if !panel.borrow_mut().unbind(ClientId(*client)) {
                debug!("▶️ Client {} did not hold the binding", client);
            }
            Ok(())
        }
        Step::GetPanelSurface { client, id, surface } => {
            panel
                .borrow_mut()
                .get_input_panel_surface(ClientId(*client), ResourceId(*id), SurfaceId(*surface))
        }
        Step::SetToplevel { resource, output, position } => {
            panel
                .borrow_mut()
                .set_toplevel(ResourceId(*resource), OutputId(*output), *position)
        }
        Step::SetPanel { resource } => panel.borrow_mut().set_overlay_panel(ResourceId(*resource)),
        Step::Commit { surface, width, height } => {
            let surface = SurfaceId(*surface);
            let mut p = panel.borrow_mut();
            if !p.host_mut().commit(surface, *width, *height) {
                bail!("Unknown surface: {}", surface);
            }
            if p.host().surface_role(surface) == SurfaceRole::InputPanel {
                p.configure(surface, 0, 0, *width, *height);
            }
            Ok(())
        }
        Step::Configure { surface, width, height } => {
            panel
                .borrow_mut()
                .configure(SurfaceId(*surface), 0, 0, *width, *height);
            Ok(())
        }
        Step::Show { surface } => {
            signals.show_input_panel.emit(&SurfaceId(*surface));
            Ok(())
        }
        Step::Hide => {
            signals.hide_input_panel.emit(&());
            Ok(())
        }
        Step::Cursor { x1, y1, x2, y2 } => {
            signals
                .update_input_panel
                .emit(&CursorRect::new(*x1, *y1, *x2, *y2));
            Ok(())
        }
        Step::ShowLayer { previous, next } => {
            let (previous, next) = (layer(previous)?, layer(next)?);
            panel.borrow_mut().show_layer(previous, next);
            Ok(())
        }
        Step::HideLayer => {
            panel.borrow_mut().hide_layer();
            Ok(())
        }
        Step::DestroySurface { surface } => {
            let surface = SurfaceId(*surface);
            let signal = panel.borrow_mut().host_mut().destroy_surface(surface);
            let Some(signal) = signal else {
                bail!("Unknown surface: {}", surface);
            };
            signal.emit(&surface);
            Ok(())
        }
        Step::DestroyResource { resource } => panel.borrow_mut().destroy_resource(ResourceId(*resource)),
    };
    Ok(outcome)
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layers (top to bottom):")?;
        for name in &self.layers {
            writeln!(f, "  {}", name)?;
        }

        let list = |surfaces: &[SurfaceId]| {
            if surfaces.is_empty() {
                "(empty)".to_string()
            } else {
                surfaces.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
            }
        };
        writeln!(f, "Render list: {}", list(&self.render_list))?;
        writeln!(f, "Registered:  {}", list(&self.registered))?;
        writeln!(f, "State:       {:?}", self.state)?;
        writeln!(
            f,
            "Stats:       {} shown, {} hidden, {} reveals, {} unmaps, {} surfaces created, {} destroyed",
            self.stats.show_transitions,
            self.stats.hide_transitions,
            self.stats.reveals,
            self.stats.unmaps,
            self.stats.surfaces_created,
            self.stats.surfaces_destroyed,
        )?;
        writeln!(f, "Host calls:  {}", self.host_events)?;

        if !self.errors.is_empty() {
            writeln!(f, "Protocol errors:")?;
            for e in &self.errors {
                writeln!(f, "  step {}: {} (code {})", e.step, e.error, e.error.code() as u32)?;
            }
        }
        Ok(())
    }
}
