use iced::alignment::{Horizontal, Vertical};
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program};
use iced::{Color, Point, Rectangle, Renderer, Theme};
use std::time::{Duration, Instant};

use crate::state::layout::Layout;
use crate::state::selection::{nearest_marker, HIT_RADIUS};
use crate::Message;

/// Marker disc radius on the editing canvas, in pixels.
pub const MARKER_RADIUS: f32 = 5.0;
/// Vertical offset of labels above their marker.
const LABEL_OFFSET: f32 = 10.0;
/// Two presses within this window and slop count as a double click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const DOUBLE_CLICK_SLOP: f32 = 6.0;

/// Interactive marker overlay for the keyboard template.
///
/// The canvas is laid out 1:1 over the template image, so cursor positions
/// are already template-pixel coordinates. Gestures:
/// - left press on free canvas places a marker (when a label is pending)
/// - left press on the selected marker starts a drag
/// - double click selects the nearest marker within the hit radius
pub struct LayoutCanvas<'a> {
    pub layout: &'a Layout,
    pub selected: Option<&'a str>,
    /// Whether the toolbar holds a pending label; placement is disabled
    /// without one.
    pub can_place: bool,
}

impl<'a> Program<Message> for LayoutCanvas<'a> {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(pos) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };

                if state.register_press(pos) {
                    state.is_dragging = false;
                    return (canvas::event::Status::Captured, Some(Message::SelectAt(pos)));
                }

                let over = nearest_marker(self.layout, (pos.x, pos.y), HIT_RADIUS);
                match over {
                    Some(marker) if Some(marker.label.as_str()) == self.selected => {
                        state.is_dragging = true;
                        (canvas::event::Status::Captured, None)
                    }
                    // A press on an unselected marker neither places nor
                    // drags; selection requires a double click.
                    Some(_) => (canvas::event::Status::Captured, None),
                    None if self.can_place => (
                        canvas::event::Status::Captured,
                        Some(Message::PlaceMarker(pos)),
                    ),
                    None => (canvas::event::Status::Captured, None),
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    if let Some(pos) = cursor.position_in(bounds) {
                        return (canvas::event::Status::Captured, Some(Message::DragMoved(pos)));
                    }
                }
                (canvas::event::Status::Ignored, None)
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging {
                    state.is_dragging = false;
                    return (canvas::event::Status::Captured, None);
                }
                (canvas::event::Status::Ignored, None)
            }

            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        for marker in self.layout.markers() {
            let center = Point::new(marker.position.0, marker.position.1);
            let disc = canvas::Path::circle(center, MARKER_RADIUS);
            frame.fill(&disc, Color::from_rgb(1.0, 0.0, 0.0));

            if self.selected == Some(marker.label.as_str()) {
                frame.stroke(
                    &disc,
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.0, 0.0, 1.0))
                        .with_width(2.0),
                );
            }

            frame.fill_text(canvas::Text {
                content: marker.label.clone(),
                position: Point::new(center.x, center.y - LABEL_OFFSET),
                color: Color::BLACK,
                size: 14.0.into(),
                horizontal_alignment: Horizontal::Center,
                vertical_alignment: Vertical::Bottom,
                ..canvas::Text::default()
            });
        }

        // Live coordinate readout beside the marker being dragged
        if state.is_dragging {
            if let Some((x, y)) = self.selected.and_then(|l| self.layout.position_of(l)) {
                frame.fill_text(canvas::Text {
                    content: format!("({}, {})", x.round() as i32, y.round() as i32),
                    position: Point::new(x + 20.0, y),
                    color: Color::from_rgb(0.0, 0.0, 1.0),
                    size: 12.0.into(),
                    vertical_alignment: Vertical::Center,
                    ..canvas::Text::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging {
            return mouse::Interaction::Grabbing;
        }
        if let Some(pos) = cursor.position_in(bounds) {
            if nearest_marker(self.layout, (pos.x, pos.y), HIT_RADIUS).is_some() {
                return mouse::Interaction::Pointer;
            }
        }
        mouse::Interaction::default()
    }
}

/// State for pointer interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    last_press: Option<(Instant, Point)>,
}

impl DragState {
    /// Record a press; true when it completes a double click.
    fn register_press(&mut self, pos: Point) -> bool {
        let now = Instant::now();
        let double = matches!(
            self.last_press,
            Some((at, p))
                if now.duration_since(at) <= DOUBLE_CLICK_WINDOW
                    && p.distance(pos) <= DOUBLE_CLICK_SLOP
        );
        // A completed double click resets the chain so a triple click does
        // not count twice.
        self.last_press = if double { None } else { Some((now, pos)) };
        double
    }
}
