use std::time::Duration;

use iced::{
    Element, Length, Point, Rectangle, Size, Subscription, Task, Theme, mouse,
    widget::{canvas, column, container, text},
};
use iced_core::image::Image;
use tileview::{
    DrawTile, Geographic, MapConfig, MapDisplay, Projector, Viewport, Zoom,
    sources::{
        CartoVoyager, Layered, OpenStreetMap, OpenTopo, Scale, TileProvider, VirtualEarth,
        VirtualEarthStyle,
    },
};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Error)
        .filter_module("tileview", log::LevelFilter::Debug)
        .init();

    // Tile loading gets its own runtime, the display only needs a handle to it
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let handle = runtime.handle().clone();
    let source = std::env::args().nth(1).unwrap_or_default();

    iced::application(
        move || Application::boot(provider(&source), handle.clone()),
        Application::update,
        Application::view,
    )
    .title("Tileview")
    .theme(Theme::Dark)
    .subscription(Application::subscription)
    .run()
    .unwrap();
}

/// Pick the tile source by name, OpenStreetMap unless told otherwise.
fn provider(name: &str) -> Box<dyn TileProvider> {
    match name {
        "topo" => Box::new(OpenTopo),
        "carto" => Box::new(CartoVoyager(Scale::X2)),
        "aerial" => Box::new(VirtualEarth(VirtualEarthStyle::Aerial)),
        "rail" => Box::new(
            Layered::new(OpenStreetMap)
                .with_overlay("https://tiles.openrailwaymap.org/standard/{z}/{x}/{y}.png"),
        ),
        _ => Box::new(OpenStreetMap),
    }
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    Resized(Size),
    Pan(iced::Vector),
    Zoom { delta: f64, anchor: Point },
}

struct Application {
    display: MapDisplay,
    viewport: Viewport,
    size: Size,
    tiles: Vec<DrawTile>,
}

impl Application {
    pub fn boot(
        provider: Box<dyn TileProvider>,
        runtime: tokio::runtime::Handle,
    ) -> (Self, Task<Message>) {
        let config = MapConfig::default().with_grid_padding(1);
        let display = MapDisplay::with_runtime(provider, config, runtime).unwrap();
        let viewport = Viewport::looking_at(
            display.provider(),
            Geographic::new(2.35, 48.85),
            Zoom::try_from(12.0).unwrap(),
        );

        (
            Application {
                display,
                viewport,
                size: Size::ZERO,
                tiles: Vec::new(),
            },
            Task::none(),
        )
    }

    fn projector(&self) -> Projector {
        Projector::new(self.viewport, Rectangle::new(Point::ORIGIN, self.size))
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {}
            Message::Resized(size) => self.size = size,
            Message::Pan(delta) => self.viewport.pan_by(delta),
            Message::Zoom { delta, anchor } => {
                let provider = self.display.provider();
                let zoom = (self.viewport.zoom() + delta)
                    .clamp(provider.min_zoom() as f64, provider.max_zoom() as f64);
                if let Ok(zoom) = Zoom::try_from(zoom) {
                    let bounds = Rectangle::new(Point::ORIGIN, self.size);
                    self.viewport.zoom_around(zoom, anchor, bounds);
                }
            }
        }

        if self.size != Size::ZERO {
            self.tiles = self.display.frame(&self.projector());
        }

        Task::none()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::time::every(Duration::from_millis(50)).map(|_| Message::Tick)
    }

    pub fn view(&self) -> impl Into<Element<'_, Message>> {
        let attribution = self.display.attribution();
        let map = canvas(MapCanvas { tiles: &self.tiles })
            .width(Length::Fill)
            .height(Length::Fill);

        column![
            map,
            container(text(format!("{} ({})", attribution.text, attribution.url))).padding(5.0)
        ]
    }
}

struct MapCanvas<'a> {
    tiles: &'a [DrawTile],
}

#[derive(Debug, Default)]
struct CanvasState {
    size: Size,
    dragging_from: Option<Point>,
}

impl canvas::Program<Message> for MapCanvas<'_> {
    type State = CanvasState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if state.size != bounds.size() {
            state.size = bounds.size();
            return Some(canvas::Action::publish(Message::Resized(state.size)));
        }

        let canvas::Event::Mouse(event) = event else {
            return None;
        };

        match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                state.dragging_from = cursor.position_in(bounds);
                state.dragging_from.map(|_| canvas::Action::capture())
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                state.dragging_from = None;
                None
            }
            mouse::Event::CursorMoved { .. } => {
                let from = state.dragging_from?;
                let to = cursor.position_in(bounds)?;
                state.dragging_from = Some(to);
                Some(canvas::Action::publish(Message::Pan(to - from)).and_capture())
            }
            mouse::Event::WheelScrolled { delta } => {
                let anchor = cursor.position_in(bounds)?;
                let delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y as f64 * 0.5,
                    mouse::ScrollDelta::Pixels { y, .. } => *y as f64 * 0.01,
                };
                Some(canvas::Action::publish(Message::Zoom { delta, anchor }).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        for tile in self.tiles {
            frame.draw_image(tile.bounds, Image::new(tile.handle.clone()));
        }
        vec![frame.into_geometry()]
    }
}
