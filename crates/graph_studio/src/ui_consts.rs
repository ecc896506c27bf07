// Shared margins
pub const UI_MARGIN: f32 = 10.0;

// Common spacing between grouped controls
pub const SECTION_SPACING: f32 = 6.0;

// Modal sizing
pub const MODAL_WIDTH: f32 = 900.0;
pub const MODAL_HEIGHT: f32 = 620.0;
pub const CANVAS_HEIGHT: f32 = 440.0;

// Gallery cards
pub const CARD_WIDTH: f32 = 260.0;
pub const CARD_DESCRIPTION_CHARS: usize = 90;

// Side panel of the editing steps
pub const SIDE_PANEL_WIDTH: f32 = 240.0;

// Text sizes
pub const HEADING_TEXT_SIZE: f32 = 16.0;
pub const INFO_TEXT_SIZE: f32 = 11.0;

// Status toast
pub const TOAST_OFFSET: f32 = 16.0;
