mod control_panel;

pub use control_panel::{ControlPanel, PanelAction, PanelView};
