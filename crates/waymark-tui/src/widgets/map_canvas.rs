//! Map canvas: draws a [`Scene`] through a [`Camera`] onto a braille canvas.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as Segment, Map, MapResolution};

use waymark_core::{Bounds, Camera, LatLng, MarkerKind, Route, Scene};

use crate::theme;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;
const RING_SEGMENTS: usize = 72;

/// Geographic area shown in a canvas of `area` cells.
pub fn viewport(camera: &Camera, area: Rect) -> Bounds {
    let width = f64::from(area.width.max(1));
    let height = f64::from(area.height.max(1));
    camera.bounds(height * CELL_ASPECT / width)
}

pub fn render_map(frame: &mut Frame, area: Rect, camera: &Camera, scene: &Scene<'_>) {
    let bounds = viewport(camera, area);
    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .background_color(theme::BG_DARK)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| paint(ctx, scene));
    frame.render_widget(canvas, area);
}

fn paint(ctx: &mut Context<'_>, scene: &Scene<'_>) {
    ctx.draw(&Map {
        color: theme::LAND,
        resolution: MapResolution::High,
    });
    ctx.layer();

    for ring in &scene.rings {
        draw_path(ctx, &ring.outline(RING_SEGMENTS), theme::ring_color(ring.tone));
    }
    if let Some(route) = scene.route {
        draw_path(ctx, &route.path, theme::ROUTE);
    }
    ctx.layer();

    for marker in &scene.markers {
        let (glyph, color) = match marker.kind {
            MarkerKind::Person => ("◉", theme::USER_MARKER),
            MarkerKind::Pin => ("▼", theme::PIN_MARKER),
        };
        ctx.print(
            marker.position.lng,
            marker.position.lat,
            Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
    }
}

fn draw_path(ctx: &mut Context<'_>, path: &[LatLng], color: Color) {
    for pair in path.windows(2) {
        if let [a, b] = pair {
            ctx.draw(&Segment::new(a.lng, a.lat, b.lng, b.lat, color));
        }
    }
}

/// The marker drawn at (or one cell around) `position`, if any.
pub fn marker_at(
    area: Rect,
    bounds: &Bounds,
    scene: &Scene<'_>,
    position: Position,
) -> Option<MarkerKind> {
    if !area.contains(position) {
        return None;
    }
    let width = f64::from(area.width);
    let height = f64::from(area.height);
    let col = f64::from(position.x - area.x) + 0.5;
    let row = f64::from(position.y - area.y) + 0.5;

    let hits: Vec<MarkerKind> = scene
        .markers
        .iter()
        .filter(|m| {
            let (x, y) = bounds.project(m.position, width, height);
            (x - col).abs() <= 1.5 && (y - row).abs() <= 1.0
        })
        .map(|m| m.kind)
        .collect();

    // Person wins when both markers share a cell.
    if hits.contains(&MarkerKind::Person) {
        Some(MarkerKind::Person)
    } else {
        hits.first().copied()
    }
}

/// Footer under the map, e.g. "⟶ via Ring Rd · 5.4 km · 18m".
pub fn route_summary(route: &Route) -> Line<'static> {
    let mut spans = vec![Span::styled(" ⟶ ", Style::default().fg(theme::ROUTE))];
    if !route.summary.is_empty() {
        spans.push(Span::styled(
            format!("via {} · ", route.summary),
            Style::default().fg(theme::DIM_WHITE),
        ));
    }
    spans.push(Span::styled(
        format!(
            "{} · {}",
            route.distance_text,
            humantime::format_duration(route.duration)
        ),
        theme::title_style(),
    ));
    if let Some(warning) = route.warnings.first() {
        spans.push(Span::styled(
            format!("  ! {warning}"),
            Style::default().fg(theme::ELECTRIC_YELLOW),
        ));
    }
    Line::from(spans)
}
