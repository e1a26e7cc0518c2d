use iced::{
    keyboard, mouse,
    time::{self, Instant},
    widget::canvas,
    window, Color, Element, Length, Point, Rectangle, Renderer, Size, Subscription, Task, Theme,
};

use crate::sim::{
    surface::TrailBuffer,
    universe::{Signal, Universe},
    vector::Vector2,
};

const BACKGROUND: Color = Color::from_rgb(25. / 255., 25. / 255., 25. / 255.);

pub(crate) struct Gui {
    universe: Universe<TrailBuffer>,
}

#[derive(Debug, Clone)]
pub(crate) enum Message {
    Tick(Instant),
    Signal(Signal),
}

impl Gui {
    pub(crate) fn new(mut universe: Universe<TrailBuffer>) -> (Self, Task<Message>) {
        universe.start();
        (Gui { universe }, Task::none())
    }

    pub(crate) fn update(&mut self, message: Message) {
        match message {
            Message::Tick(now) => {
                self.universe.frame(now);
            }
            Message::Signal(signal) => {
                self.universe.handle(signal);
            }
        }
    }

    pub(crate) fn view(&self) -> Element<'_, Message> {
        canvas(Scene {
            universe: &self.universe,
        })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    pub(crate) fn subscription(&self) -> Subscription<Message> {
        let ticks = if self.universe.is_running() {
            time::every(self.universe.frame_interval()).map(Message::Tick)
        } else {
            Subscription::none()
        };
        let resizes = window::resize_events().map(|(_id, size)| {
            Message::Signal(Signal::Resize {
                width: size.width,
                height: size.height,
            })
        });
        Subscription::batch([ticks, keyboard::on_key_press(key_signal), resizes])
    }
}

fn key_signal(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key {
        keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::Signal(Signal::Cancel)),
        _ => None,
    }
}

fn to_point(vector: Vector2) -> Point {
    Point::new(vector.x, vector.y)
}

/// The pointer events the horizon disc reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PointerEvent {
    Moved,
    Left,
    Pressed,
}

impl PointerEvent {
    fn from_canvas(event: &canvas::Event) -> Option<PointerEvent> {
        match event {
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => Some(PointerEvent::Moved),
            canvas::Event::Mouse(mouse::Event::CursorLeft) => Some(PointerEvent::Left),
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                Some(PointerEvent::Pressed)
            }
            _ => None,
        }
    }
}

/// Derives the signal for `event`, given whether the pointer was on the disc
/// before and whether it is on it now. Updates `inside`.
fn pointer_signal(inside: &mut bool, event: PointerEvent, on_horizon: bool) -> Option<Signal> {
    match event {
        PointerEvent::Moved | PointerEvent::Left => {
            let now_inside = on_horizon && event == PointerEvent::Moved;
            if now_inside == *inside {
                return None;
            }
            *inside = now_inside;
            Some(if now_inside {
                Signal::PointerEnter
            } else {
                Signal::PointerLeave
            })
        }
        PointerEvent::Pressed => on_horizon.then_some(Signal::Activate),
    }
}

fn trail_stroke(color: Color, scale_factor: f32) -> canvas::Stroke<'static> {
    // Drawn inside a frame scaled by 1 / scale_factor.
    canvas::Stroke::default()
        .with_color(color)
        .with_width(scale_factor)
}

struct Scene<'a> {
    universe: &'a Universe<TrailBuffer>,
}

#[derive(Default)]
struct Pointer {
    inside: bool,
}

impl canvas::Program<Message> for Scene<'_> {
    type State = Pointer;

    fn update(
        &self,
        pointer: &mut Pointer,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let Some(event) = PointerEvent::from_canvas(&event) else {
            return (canvas::event::Status::Ignored, None);
        };
        let on_horizon = cursor
            .position_in(bounds)
            .is_some_and(|point| self.universe.hits_horizon(Vector2::new(point.x, point.y)));
        match pointer_signal(&mut pointer.inside, event, on_horizon) {
            Some(signal) => (
                canvas::event::Status::Captured,
                Some(Message::Signal(signal)),
            ),
            None => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _pointer: &Pointer,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let trails = self.universe.surface();
        let scale_factor = trails.scale_factor();
        frame.with_save(|frame| {
            // Trails are kept in device pixels.
            frame.scale(1. / scale_factor);
            for segment in trails.segments() {
                let line = canvas::Path::line(to_point(segment.from), to_point(segment.to));
                frame.stroke(&line, trail_stroke(segment.color, scale_factor));
            }
        });

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        pointer: &Pointer,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if pointer.inside {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

pub(crate) fn window_size() -> Size {
    Size::new(1280., 800.)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(events: &[(PointerEvent, bool)]) -> Vec<Option<Signal>> {
        let mut inside = false;
        events
            .iter()
            .map(|(event, on_horizon)| pointer_signal(&mut inside, *event, *on_horizon))
            .collect()
    }

    #[test]
    fn moving_onto_and_off_the_horizon_enters_and_leaves() {
        let signals = replay(&[
            (PointerEvent::Moved, false),
            (PointerEvent::Moved, true),
            (PointerEvent::Moved, true),
            (PointerEvent::Moved, false),
        ]);
        assert_eq!(
            signals,
            vec![
                None,
                Some(Signal::PointerEnter),
                None,
                Some(Signal::PointerLeave)
            ]
        );
    }

    #[test]
    fn leaving_the_canvas_leaves_the_horizon() {
        let signals = replay(&[
            (PointerEvent::Moved, true),
            (PointerEvent::Left, true),
            (PointerEvent::Left, false),
        ]);
        assert_eq!(
            signals,
            vec![Some(Signal::PointerEnter), Some(Signal::PointerLeave), None]
        );
    }

    #[test]
    fn clicks_only_activate_on_the_horizon() {
        let signals = replay(&[
            (PointerEvent::Pressed, false),
            (PointerEvent::Pressed, true),
        ]);
        assert_eq!(signals, vec![None, Some(Signal::Activate)]);

        let mut inside = true;
        assert_eq!(
            pointer_signal(&mut inside, PointerEvent::Pressed, true),
            Some(Signal::Activate)
        );
        assert!(inside);
    }

    #[test]
    fn canvas_events_map_to_pointer_events() {
        let moved = canvas::Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(3., 4.),
        });
        let left = canvas::Event::Mouse(mouse::Event::CursorLeft);
        let pressed = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));
        let right = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right));
        assert_eq!(PointerEvent::from_canvas(&moved), Some(PointerEvent::Moved));
        assert_eq!(PointerEvent::from_canvas(&left), Some(PointerEvent::Left));
        assert_eq!(PointerEvent::from_canvas(&pressed), Some(PointerEvent::Pressed));
        assert_eq!(PointerEvent::from_canvas(&right), None);
    }

    #[test]
    fn trail_strokes_are_one_logical_pixel_wide() {
        assert_eq!(trail_stroke(Color::WHITE, 1.).width, 1.);
        assert_eq!(trail_stroke(Color::WHITE, 2.).width, 2.);
    }
}
