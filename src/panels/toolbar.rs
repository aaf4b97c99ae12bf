use egui::color_picker::{self, Alpha};

use crate::components::ToolButton;
use crate::tool::{MAX_SIZE, MIN_SIZE, Tool};
use crate::whiteboard::Whiteboard;

/// Tool buttons, clear, paste, color and size inputs.
///
/// Returns `true` when the paste button was clicked.
pub fn toolbar(ui: &mut egui::Ui, board: &mut Whiteboard) -> bool {
    ui.horizontal(|ui| {
        let active = board.tools().tool;
        for tool in Tool::ALL {
            if ToolButton::new(tool, active == tool).show(ui).clicked() {
                board.select_tool(tool);
            }
        }

        ui.separator();
        if ui.button("🗑 Clear").clicked() {
            board.clear();
        }
        let paste_clicked = ui
            .button("📋 Paste")
            .on_hover_text("Paste the image on the clipboard")
            .clicked();
        ui.separator();

        ui.label("Color:");
        let mut color = board.tools().color;
        if color_picker::color_edit_button_srgba(ui, &mut color, Alpha::Opaque).changed() {
            board.set_color(color);
        }

        ui.label("Size:");
        let mut size = board.tools().size;
        if ui
            .add(egui::DragValue::new(&mut size).range(MIN_SIZE..=MAX_SIZE).speed(0.5))
            .changed()
        {
            board.set_size(size);
        }

        paste_clicked
    })
    .inner
}
