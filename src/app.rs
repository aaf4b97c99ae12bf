use crate::input::InputHandler;
use crate::panels;
use crate::compositor::ImageId;
use crate::paste::{ClipboardItem, ClipboardSource, SystemClipboard};
use crate::settings::Settings;
use crate::texture::SurfaceTexture;
use crate::whiteboard::Whiteboard;

/// We derive Deserialize/Serialize so we can persist tool settings on shutdown.
/// Drawing content is never persisted.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct WhiteboardApp {
    settings: Settings,
    // Created on the first frame, once the viewport size is known
    #[serde(skip)]
    board: Option<Whiteboard>,
    #[serde(skip)]
    texture: SurfaceTexture,
    #[serde(skip)]
    input: Option<InputHandler>,
}

impl Default for WhiteboardApp {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl WhiteboardApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        #[cfg(not(target_arch = "wasm32"))]
        match Settings::load_override() {
            Ok(Some(settings)) => app.settings = settings,
            Ok(None) => {}
            Err(err) => log::warn!("Ignoring settings override: {}", err),
        }

        if let Err(err) = app.settings.validate() {
            log::warn!("Stored settings are invalid, using defaults: {}", err);
            app.settings = Settings::default();
        }
        app
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            board: None,
            texture: SurfaceTexture::new(),
            input: None,
        }
    }

    pub fn board(&self) -> Option<&Whiteboard> {
        self.board.as_ref()
    }

    /// Queue this frame's pasted and dropped images and place finished decodes
    fn collect_pastes(ctx: &egui::Context, board: &mut Whiteboard, paste_clicked: bool) {
        let (events, dropped) = ctx.input(|i| (i.raw.events.clone(), i.raw.dropped_files.clone()));

        let mut clipboard = SystemClipboard;
        if paste_clicked {
            board.paste_from(&mut clipboard);
        }
        intake_pastes(board, &events, &dropped, &mut clipboard);

        board.place_ready_pastes();
        if board.pending_pastes() > 0 {
            ctx.request_repaint();
        }
    }
}

/// Outcome of one frame of paste intake
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PasteIntake {
    /// Clipboard images placed right away
    pub placed: Vec<ImageId>,
    /// Dropped files handed to the decoder
    pub decoding: usize,
}

/// Whether `event` asks for a paste. Backends that read the clipboard themselves
/// send `Paste`, others forward the raw shortcut.
fn is_paste_request(event: &egui::Event) -> bool {
    match event {
        egui::Event::Paste(_) => true,
        egui::Event::Key {
            key: egui::Key::V,
            pressed: true,
            modifiers,
            ..
        } => modifiers.command,
        _ => false,
    }
}

/// Feed one frame of input into the board.
///
/// A paste request places the image on `clipboard`; the text egui carries with
/// `Event::Paste` is never an image and is ignored. Dropped files are queued for
/// decoding and show up through [`Whiteboard::place_ready_pastes`].
pub fn intake_pastes(
    board: &mut Whiteboard,
    events: &[egui::Event],
    dropped: &[egui::DroppedFile],
    clipboard: &mut impl ClipboardSource,
) -> PasteIntake {
    let mut intake = PasteIntake::default();

    // One shortcut may arrive as both a key and a paste event
    if events.iter().any(is_paste_request) {
        intake.placed.extend(board.paste_from(clipboard));
    }

    if !dropped.is_empty() {
        intake.decoding = board.paste(dropped.iter().filter_map(ClipboardItem::from_dropped_file));
    }
    intake
}

impl eframe::App for WhiteboardApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(board) = &self.board {
            self.settings.tools = *board.tools();
        }
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (width, height) = self.settings.surface_size(ctx.screen_rect().size());
        let settings = &self.settings;
        let board = self
            .board
            .get_or_insert_with(|| Whiteboard::with_settings(width, height, settings));
        board.resize(width, height);

        let paste_clicked = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| panels::toolbar(ui, board))
            .inner;

        Self::collect_pastes(ctx, board, paste_clicked);

        egui::CentralPanel::default().show(ctx, |ui| {
            let input = self
                .input
                .get_or_insert_with(|| InputHandler::new(ui.max_rect()));
            panels::canvas_panel(ui, board, &mut self.texture, input);
        });

        if !ctx.input(|i| i.raw.hovered_files.is_empty()) {
            preview_files_being_dropped(ctx);
        }
    }
}

/// Dim the window while files are dragged over it
fn preview_files_being_dropped(ctx: &egui::Context) {
    use egui::{Align2, Color32, FontId, Id, LayerId, Order};

    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
    let screen_rect = ctx.screen_rect();
    painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
    painter.text(
        screen_rect.center(),
        Align2::CENTER_CENTER,
        "Drop images to paste them",
        FontId::proportional(24.0),
        Color32::WHITE,
    );
}
