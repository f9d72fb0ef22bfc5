use crate::modules::editor_store::TextPosition;

/// Where the overlay baseline sits relative to the stored text position.
pub const TEXT_ORIGIN: (f32, f32) = (350.0, 350.0);
/// Height of the box stroked around the overlay while it is dragged.
pub const DRAG_BOX_HEIGHT: f32 = 70.0;
/// Extra width added to the measured text for that box.
pub const DRAG_BOX_PADDING: f32 = 100.0;
pub const DRAG_BOX_LINE_WIDTH: f32 = 10.0;
pub const DRAG_BOX_COLOR: &str = "#ff6550";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { offset_x: f32, offset_y: f32 },
}

impl DragState {
    pub fn is_dragging(&self) -> bool { matches!(self, DragState::Dragging { .. }) }
}

/// Box the overlay occupies on the surface, for a text of `text_width` pixels.
pub fn text_box(position: TextPosition, text_width: f32) -> (f32, f32, f32, f32) {
    let x = position.x + TEXT_ORIGIN.0;
    let y = position.y + TEXT_ORIGIN.1;
    (x, y - DRAG_BOX_HEIGHT, text_width + DRAG_BOX_PADDING, DRAG_BOX_HEIGHT)
}

pub fn hit_text(position: TextPosition, text_width: f32, px: f32, py: f32) -> bool {
    let (x, y, w, h) = text_box(position, text_width);
    px >= x && px <= x + w && py >= y && py <= y + h
}

/// Pointer-down. With `require_hit` false the drag starts wherever the pointer lands.
pub fn pointer_down(position: TextPosition, px: f32, py: f32, hit: bool, require_hit: bool) -> DragState {
    if require_hit && !hit {
        return DragState::Idle;
    }
    DragState::Dragging { offset_x: px - position.x, offset_y: py - position.y }
}

/// Pointer-move. Returns the new text position while dragging.
pub fn pointer_move(state: DragState, px: f32, py: f32) -> Option<TextPosition> {
    match state {
        DragState::Dragging { offset_x, offset_y } => Some(TextPosition { x: px - offset_x, y: py - offset_y }),
        DragState::Idle => None,
    }
}

pub fn pointer_up(_state: DragState) -> DragState { DragState::Idle }
