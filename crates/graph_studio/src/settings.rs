// Canvas settings: what the user may do and how the viewport reacts.

/// Interaction toggles of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsInteraction {
    pub dragging_enabled: bool,
    /// Shift-drag from one node to another creates an edge.
    pub connecting_enabled: bool,
    pub selection_enabled: bool,
    pub selection_multi_enabled: bool,
    /// Delete / Backspace remove the selection.
    pub deleting_enabled: bool,
    pub hover_enabled: bool,
}

impl SettingsInteraction {
    pub fn editable() -> Self {
        Self {
            dragging_enabled: true,
            connecting_enabled: true,
            selection_enabled: true,
            selection_multi_enabled: true,
            deleting_enabled: true,
            hover_enabled: true,
        }
    }

    /// Pan and zoom only.
    pub fn read_only() -> Self {
        Self {
            dragging_enabled: false,
            connecting_enabled: false,
            selection_enabled: false,
            selection_multi_enabled: false,
            deleting_enabled: false,
            hover_enabled: true,
        }
    }

    pub fn is_read_only(&self) -> bool {
        !(self.dragging_enabled
            || self.connecting_enabled
            || self.selection_enabled
            || self.deleting_enabled)
    }
}

impl Default for SettingsInteraction {
    fn default() -> Self {
        Self::read_only()
    }
}

// Navigation & viewport parameters. The canvas always fits on its first frame;
// `fit_to_screen_enabled` keeps it fitted on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsNavigation {
    pub fit_to_screen_enabled: bool,
    pub zoom_and_pan_enabled: bool,
    pub zoom_speed: f32,
    pub fit_to_screen_padding: f32,
}

impl Default for SettingsNavigation {
    fn default() -> Self {
        Self {
            fit_to_screen_enabled: false,
            zoom_and_pan_enabled: true,
            zoom_speed: 0.1,
            fit_to_screen_padding: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(SettingsInteraction::read_only().is_read_only());
        assert!(!SettingsInteraction::editable().is_read_only());
        assert_eq!(SettingsInteraction::default(), SettingsInteraction::read_only());
    }
}
