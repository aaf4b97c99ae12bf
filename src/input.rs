use egui::{Context, Pos2, Rect};

use crate::whiteboard::Whiteboard;

/// Pointer events in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button was pressed over the canvas
    PointerDown { pos: Pos2 },
    /// Pointer moved over the canvas
    PointerMove { pos: Pos2 },
    /// Primary button was released
    PointerUp { pos: Pos2 },
    /// Pointer left the canvas
    PointerLeave,
}

/// The raw pointer facts of one frame, in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSnapshot {
    pub hover_pos: Option<Pos2>,
    pub pressed: bool,
    pub released: bool,
}

impl PointerSnapshot {
    pub fn from_context(ctx: &Context) -> Self {
        ctx.input(|input| Self {
            hover_pos: input.pointer.hover_pos(),
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
        })
    }
}

/// Handles converting raw egui input into whiteboard events
#[derive(Debug)]
pub struct InputHandler {
    // Last position seen inside the canvas, in screen coordinates
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    fn to_surface(&self, pos: Pos2) -> Pos2 {
        (pos - self.canvas_rect.min).to_pos2()
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        self.translate(PointerSnapshot::from_context(ctx))
    }

    pub fn translate(&mut self, snapshot: PointerSnapshot) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let inside = snapshot
            .hover_pos
            .filter(|pos| self.canvas_rect.contains(*pos));

        match inside {
            None => {
                if self.last_pointer_pos.take().is_some() {
                    events.push(InputEvent::PointerLeave);
                }
                // A release outside the canvas after leaving has nothing left to end
            }
            Some(pos) => {
                let pos_in_surface = self.to_surface(pos);
                if snapshot.pressed {
                    events.push(InputEvent::PointerDown { pos: pos_in_surface });
                } else if self.last_pointer_pos != Some(pos) {
                    events.push(InputEvent::PointerMove { pos: pos_in_surface });
                }
                if snapshot.released {
                    events.push(InputEvent::PointerUp { pos: pos_in_surface });
                }
                self.last_pointer_pos = Some(pos);
            }
        }

        events
    }
}

/// Feed events to the whiteboard in order
pub fn dispatch(events: &[InputEvent], board: &mut Whiteboard) {
    for event in events {
        match *event {
            InputEvent::PointerDown { pos } => board.pointer_down(pos),
            InputEvent::PointerMove { pos } => board.pointer_move(pos),
            InputEvent::PointerUp { pos } => board.pointer_up(pos),
            InputEvent::PointerLeave => board.pointer_leave(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> InputHandler {
        InputHandler::new(Rect::from_min_size(Pos2::new(20.0, 50.0), egui::vec2(100.0, 100.0)))
    }

    fn at(x: f32, y: f32) -> PointerSnapshot {
        PointerSnapshot {
            hover_pos: Some(Pos2::new(x, y)),
            ..Default::default()
        }
    }

    #[test]
    fn test_coordinates_are_surface_relative() {
        let mut input = handler();
        let events = input.translate(PointerSnapshot { pressed: true, ..at(30.0, 60.0) });
        assert_eq!(events, vec![InputEvent::PointerDown { pos: Pos2::new(10.0, 10.0) }]);
    }

    #[test]
    fn test_move_only_when_position_changes() {
        let mut input = handler();
        assert_eq!(input.translate(at(30.0, 60.0)).len(), 1);
        assert!(input.translate(at(30.0, 60.0)).is_empty());
        assert_eq!(
            input.translate(at(31.0, 60.0)),
            vec![InputEvent::PointerMove { pos: Pos2::new(11.0, 10.0) }]
        );
    }

    #[test]
    fn test_leaving_canvas_emits_leave_once() {
        let mut input = handler();
        input.translate(at(30.0, 60.0));
        assert_eq!(input.translate(at(5.0, 5.0)), vec![InputEvent::PointerLeave]);
        assert!(input.translate(PointerSnapshot::default()).is_empty());
    }

    #[test]
    fn test_click_without_motion() {
        let mut input = handler();
        input.translate(at(30.0, 60.0));
        let events = input.translate(PointerSnapshot {
            pressed: true,
            released: true,
            ..at(30.0, 60.0)
        });
        assert_eq!(
            events,
            vec![
                InputEvent::PointerDown { pos: Pos2::new(10.0, 10.0) },
                InputEvent::PointerUp { pos: Pos2::new(10.0, 10.0) },
            ]
        );
    }
}
