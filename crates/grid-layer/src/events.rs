//! Layer change notifications.

use grid_common::AxisId;

/// Something observable happened to a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// A load of domain and range started.
    LoadStart,
    /// The load finished, successfully or not.
    LoadEnd { ok: bool },
    /// The layer finished its first load since being attached and is drawable.
    Added,
    /// The layer was detached.
    Removed,
    /// A pipeline stage failed.
    Error { cause: String },
    PaletteChanged,
    PaletteExtentChanged,
    /// The selected time (`T`) or vertical (`Z`) slice changed.
    AxisChanged { axis: AxisId },
    /// Tiles should be drawn again.
    Redraw,
}

impl LayerEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            LayerEvent::LoadStart => "load_start",
            LayerEvent::LoadEnd { .. } => "load_end",
            LayerEvent::Added => "added",
            LayerEvent::Removed => "removed",
            LayerEvent::Error { .. } => "error",
            LayerEvent::PaletteChanged => "palette_changed",
            LayerEvent::PaletteExtentChanged => "palette_extent_changed",
            LayerEvent::AxisChanged { .. } => "axis_changed",
            LayerEvent::Redraw => "redraw",
        }
    }
}
