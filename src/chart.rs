use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Painter, Points, Shape};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

// Left margin of the canvas reserved for the y labels.
const PLOT_LEFT: f64 = 0.14;
const GRID_LEVELS: [f64; 3] = [0.25, 0.5, 0.75];
const DASH_ON: usize = 3;
const DASH_OFF: usize = 3;

/// Linear index-to-position mapping. A zero-span domain maps everything to the middle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    min: f64,
    max: f64,
}

impl AxisScale {
    pub fn new(min: f64, max: f64) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position in `[0, 1]`.
    pub fn position(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Splits a gappy series into connected runs of `(index, value)`, 1-based.
/// Non-finite values count as gaps.
pub fn polyline_segments(series: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(usize, f64)> = Vec::new();
    for (idx, value) in series.iter().enumerate() {
        match value.filter(|v| v.is_finite()) {
            Some(v) => current.push((idx + 1, v)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Solid-or-dashed line between two canvas points, rasterized in painter space.
#[derive(Debug, Clone, Copy)]
struct Stroke {
    from: (f64, f64),
    to: (f64, f64),
    color: Color,
    dashed: bool,
}

impl Shape for Stroke {
    fn draw(&self, painter: &mut Painter) {
        if !self.dashed {
            CanvasLine {
                x1: self.from.0,
                y1: self.from.1,
                x2: self.to.0,
                y2: self.to.1,
                color: self.color,
            }
            .draw(painter);
            return;
        }
        let (Some((ax, ay)), Some((bx, by))) = (
            painter.get_point(self.from.0, self.from.1),
            painter.get_point(self.to.0, self.to.1),
        ) else {
            return;
        };
        let steps = ax.abs_diff(bx).max(ay.abs_diff(by));
        for step in 0..=steps {
            if step % (DASH_ON + DASH_OFF) >= DASH_ON {
                continue;
            }
            let t = if steps == 0 {
                0.0
            } else {
                step as f64 / steps as f64
            };
            let x = ax as f64 + (bx as f64 - ax as f64) * t;
            let y = ay as f64 + (by as f64 - ay as f64) * t;
            painter.paint(x.round() as usize, y.round() as usize, self.color);
        }
    }
}

struct PlottedSeries {
    segments: Vec<Vec<(f64, f64)>>,
    color: Color,
    dashed: bool,
}

impl PlottedSeries {
    fn new(series: &[Option<f64>], scale: AxisScale, color: Color, dashed: bool) -> Self {
        let segments = polyline_segments(series)
            .into_iter()
            .map(|segment| {
                segment
                    .into_iter()
                    .map(|(idx, value)| {
                        let x = PLOT_LEFT + scale.position(idx as f64) * (1.0 - PLOT_LEFT);
                        (x, value.clamp(0.0, 1.0))
                    })
                    .collect()
            })
            .collect();
        Self {
            segments,
            color,
            dashed,
        }
    }

    fn strokes(&self) -> impl Iterator<Item = Stroke> + '_ {
        self.segments.iter().flat_map(move |segment| {
            segment.windows(2).map(move |pair| Stroke {
                from: pair[0],
                to: pair[1],
                color: self.color,
                dashed: self.dashed,
            })
        })
    }

    fn isolated_points(&self) -> Vec<(f64, f64)> {
        self.segments
            .iter()
            .filter(|segment| segment.len() == 1)
            .map(|segment| segment[0])
            .collect()
    }
}

/// One or two `[0, 1]` series over a shared index axis. Repaints fully on every render.
pub struct SeriesChart<'a> {
    primary: &'a [Option<f64>],
    secondary: Option<&'a [Option<f64>]>,
    title: &'a str,
    placeholder: &'a str,
}

impl<'a> SeriesChart<'a> {
    pub fn new(primary: &'a [Option<f64>]) -> Self {
        Self {
            primary,
            secondary: None,
            title: "",
            placeholder: "No data",
        }
    }

    pub fn secondary(mut self, series: &'a [Option<f64>]) -> Self {
        self.secondary = Some(series);
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }

    fn index_scale(&self) -> AxisScale {
        let len = self
            .primary
            .len()
            .max(self.secondary.map(<[_]>::len).unwrap_or(0));
        AxisScale::new(1.0, len.max(1) as f64)
    }
}

impl Widget for SeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.to_string());
        let inner = block.inner(area);
        if inner.width == 0 || inner.height == 0 {
            block.render(area, buf);
            return;
        }

        if self.primary.is_empty() {
            Paragraph::new(self.placeholder.to_string())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true })
                .block(block)
                .render(area, buf);
            return;
        }

        let scale = self.index_scale();
        let primary = PlottedSeries::new(self.primary, scale, Color::Cyan, false);
        let secondary = self
            .secondary
            .map(|series| PlottedSeries::new(series, scale, Color::Magenta, true));

        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, 1.0])
            .y_bounds([0.0, 1.0])
            .paint(|ctx| {
                for level in GRID_LEVELS {
                    ctx.draw(&CanvasLine {
                        x1: PLOT_LEFT,
                        y1: level,
                        x2: 1.0,
                        y2: level,
                        color: Color::DarkGray,
                    });
                }
                ctx.draw(&CanvasLine {
                    x1: PLOT_LEFT,
                    y1: 0.0,
                    x2: 1.0,
                    y2: 0.0,
                    color: Color::Gray,
                });
                ctx.draw(&CanvasLine {
                    x1: PLOT_LEFT,
                    y1: 0.0,
                    x2: PLOT_LEFT,
                    y2: 1.0,
                    color: Color::Gray,
                });
                ctx.layer();

                for series in std::iter::once(&primary).chain(secondary.as_ref()) {
                    for stroke in series.strokes() {
                        ctx.draw(&stroke);
                    }
                    let points = series.isolated_points();
                    if !points.is_empty() {
                        ctx.draw(&Points {
                            coords: &points,
                            color: series.color,
                        });
                    }
                }

                ctx.print(0.0, 1.0, "1.0");
                ctx.print(0.0, 0.5, "0.5");
                ctx.print(0.0, 0.0, "0.0");
            })
            .render(area, buf);
    }
}
