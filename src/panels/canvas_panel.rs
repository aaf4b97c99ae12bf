use egui::{Align2, Color32, CursorIcon, FontId, Pos2, Rect};

use crate::input::{self, InputHandler};
use crate::texture::SurfaceTexture;
use crate::tool::CursorHint;
use crate::whiteboard::Whiteboard;

/// Paint the surface and route pointer input into the whiteboard
pub fn canvas_panel(
    ui: &mut egui::Ui,
    board: &mut Whiteboard,
    texture: &mut SurfaceTexture,
    input: &mut InputHandler,
) {
    let size = egui::vec2(board.surface().width() as f32, board.surface().height() as f32);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let rect = response.rect;

    input.set_canvas_rect(rect);
    let events = input.process_input(ui.ctx());
    input::dispatch(&events, board);

    // Transparent pixels show the page behind the surface
    painter.rect_filled(rect, 0.0, Color32::WHITE);
    let texture_id = texture.sync(ui.ctx(), board.surface());
    painter.image(
        texture_id,
        rect,
        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
        Color32::WHITE,
    );

    if let Some(pos) = response.hover_pos() {
        match board.cursor_hint() {
            CursorHint::Crosshair => ui.ctx().set_cursor_icon(CursorIcon::Crosshair),
            CursorHint::Icon(glyph) => {
                ui.ctx().set_cursor_icon(CursorIcon::None);
                painter.text(pos, Align2::CENTER_CENTER, glyph, FontId::proportional(20.0), Color32::BLACK);
            }
        }
    }
}
