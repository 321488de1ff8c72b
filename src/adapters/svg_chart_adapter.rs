//! SVG chart rendering.
//!
//! Charts are written as standalone SVG documents: plot frame, grid and
//! ticks, series clipped to the plot area, reference lines, annotations, a
//! legend, an optional statistics box and an optional notes panel below.

use std::fs;
use std::path::Path;

use crate::domain::chart::{Chart, Corner, Extent, Guide, LineStyle, Scale, Series};
use crate::domain::error::StatplotsError;
use crate::ports::chart_port::ChartPort;

const WIDTH: f64 = 1000.0;
const PLOT_HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 230.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const NOTE_LINE_HEIGHT: f64 = 20.0;
const BOX_LINE_HEIGHT: f64 = 18.0;
const MAX_TICKS: usize = 12;

pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartPort for SvgChartAdapter {
    fn write(&self, chart: &Chart, output_path: &Path) -> Result<(), StatplotsError> {
        let svg = render_svg(chart);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, svg)?;
        tracing::info!(path = %output_path.display(), "chart written");
        Ok(())
    }
}

/// Maps data coordinates onto the plot rectangle.
struct Frame {
    extent: Extent,
    scale: Scale,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(extent: Extent, scale: Scale) -> Self {
        Self {
            extent,
            scale,
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: PLOT_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn px(&self, x: f64) -> f64 {
        let e = &self.extent;
        self.left + (x - e.x_min) / (e.x_max - e.x_min) * self.width
    }

    /// `None` where the value cannot be placed (non-positive on a log axis).
    fn py(&self, y: f64) -> Option<f64> {
        let e = &self.extent;
        let frac = match self.scale {
            Scale::Linear => (y - e.y_min) / (e.y_max - e.y_min),
            Scale::Log => {
                if y <= 0.0 {
                    return None;
                }
                (y.log10() - e.y_min.log10()) / (e.y_max.log10() - e.y_min.log10())
            }
        };
        frac.is_finite().then(|| self.bottom() - frac * self.height)
    }
}

pub fn render_svg(chart: &Chart) -> String {
    let notes_height = if chart.notes.is_empty() {
        0.0
    } else {
        (chart.notes.len() as f64 + 1.0) * NOTE_LINE_HEIGHT + 20.0
    };
    let height = PLOT_HEIGHT + notes_height;

    let mut svg = String::new();
    push_line(
        &mut svg,
        &format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{height:.0}" viewBox="0 0 {WIDTH:.0} {height:.0}" font-family="sans-serif">"#),
    );
    push_line(&mut svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    push_line(
        &mut svg,
        &format!(
            r#"<text x="{:.1}" y="28" font-size="18" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
            escape_xml(&chart.title)
        ),
    );

    match chart.extent() {
        Some(extent) => {
            let frame = Frame::new(extent, chart.y_scale);
            write_axes(&mut svg, chart, &frame);
            write_series(&mut svg, chart, &frame);
            write_guides(&mut svg, chart, &frame);
            write_annotations(&mut svg, chart, &frame);
            let legend_bottom = write_legend(&mut svg, chart, &frame);
            write_text_box(&mut svg, chart, &frame, legend_bottom);
        }
        None => {
            push_line(
                &mut svg,
                &format!(
                    r#"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">No data available.</text>"#,
                    WIDTH / 2.0,
                    PLOT_HEIGHT / 2.0
                ),
            );
        }
    }

    write_notes(&mut svg, chart, PLOT_HEIGHT);
    svg.push_str("</svg>\n");
    svg
}

fn write_axes(svg: &mut String, chart: &Chart, frame: &Frame) {
    let e = frame.extent;
    push_line(
        svg,
        &format!(
            r#"<clipPath id="plot-area"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"/></clipPath>"#,
            frame.left,
            frame.top,
            frame.width,
            frame.height
        ),
    );

    for (x, label) in linear_ticks(e.x_min, e.x_max) {
        let px = frame.px(x);
        push_line(
            svg,
            &format!(
                r##"<line x1="{px:.1}" y1="{:.1}" x2="{px:.1}" y2="{:.1}" stroke="#dddddd" stroke-width="0.5"/>"##,
                frame.top,
                frame.bottom()
            ),
        );
        push_line(
            svg,
            &format!(
                r#"<text x="{px:.1}" y="{:.1}" font-size="11" text-anchor="middle">{label}</text>"#,
                frame.bottom() + 16.0
            ),
        );
    }

    let y_ticks = match chart.y_scale {
        Scale::Linear => linear_ticks(e.y_min, e.y_max),
        Scale::Log => log_ticks(e.y_min, e.y_max),
    };
    for (y, label) in y_ticks {
        if let Some(py) = frame.py(y) {
            push_line(
                svg,
                &format!(
                    r##"<line x1="{:.1}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="#dddddd" stroke-width="0.5"/>"##,
                    frame.left,
                    frame.right()
                ),
            );
            push_line(
                svg,
                &format!(
                    r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{label}</text>"#,
                    frame.left - 6.0,
                    py + 4.0
                ),
            );
        }
    }

    push_line(
        svg,
        &format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black" stroke-width="1"/>"#,
            frame.left,
            frame.top,
            frame.width,
            frame.height
        ),
    );
    push_line(
        svg,
        &format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle">{}</text>"#,
            frame.left + frame.width / 2.0,
            frame.bottom() + 40.0,
            escape_xml(&chart.x_label)
        ),
    );
    push_line(
        svg,
        &format!(
            r#"<text x="20" y="{:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 20 {:.1})">{}</text>"#,
            frame.top + frame.height / 2.0,
            frame.top + frame.height / 2.0,
            escape_xml(&chart.y_label)
        ),
    );
}

fn write_series(svg: &mut String, chart: &Chart, frame: &Frame) {
    push_line(svg, r#"<g clip-path="url(#plot-area)">"#);
    for series in &chart.series {
        match series {
            Series::Histogram {
                histogram,
                color,
                opacity,
                ..
            } => {
                for (l, r, d) in histogram.bars() {
                    let Some(top) = frame.py(d) else { continue };
                    let x = frame.px(l);
                    let w = (frame.px(r) - x).max(0.0);
                    let h = (frame.bottom() - top).max(0.0);
                    push_line(
                        svg,
                        &format!(r#"<rect x="{x:.2}" y="{top:.2}" width="{w:.2}" height="{h:.2}" fill="{color}" fill-opacity="{opacity}"/>"#),
                    );
                }
            }
            Series::Line {
                points,
                color,
                style,
                width,
                ..
            } => {
                for segment in segments(points, frame) {
                    push_line(
                        svg,
                        &format!(
                            r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="{width}"{}/>"#,
                            segment,
                            dash_attr(*style)
                        ),
                    );
                }
            }
            Series::Area {
                points,
                color,
                opacity,
                ..
            } => {
                let base = frame.py(0.0).unwrap_or(frame.bottom()).min(frame.bottom());
                for segment in segment_points(points, frame) {
                    let (Some(first), Some(last)) = (segment.first(), segment.last()) else {
                        continue;
                    };
                    let mut poly = format!("{:.2},{:.2}", first.0, base);
                    for (x, y) in &segment {
                        poly.push_str(&format!(" {x:.2},{y:.2}"));
                    }
                    poly.push_str(&format!(" {:.2},{:.2}", last.0, base));
                    push_line(
                        svg,
                        &format!(r#"<polygon points="{poly}" fill="{color}" fill-opacity="{opacity}" stroke="{color}" stroke-width="1.5"/>"#),
                    );
                }
            }
        }
    }
    push_line(svg, "</g>");
}

fn write_guides(svg: &mut String, chart: &Chart, frame: &Frame) {
    for guide in &chart.guides {
        match guide {
            Guide::Horizontal { y, color, style, .. } => {
                if let Some(py) = frame.py(*y) {
                    push_line(
                        svg,
                        &format!(
                            r#"<line x1="{:.1}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="{color}" stroke-width="1"{}/>"#,
                            frame.left,
                            frame.right(),
                            dash_attr(*style)
                        ),
                    );
                }
            }
            Guide::Vertical { x, color, style, .. } => {
                let px = frame.px(*x);
                push_line(
                    svg,
                    &format!(
                        r#"<line x1="{px:.1}" y1="{:.1}" x2="{px:.1}" y2="{:.1}" stroke="{color}" stroke-width="2"{}/>"#,
                        frame.top,
                        frame.bottom(),
                        dash_attr(*style)
                    ),
                );
            }
        }
    }
}

fn write_annotations(svg: &mut String, chart: &Chart, frame: &Frame) {
    for a in &chart.annotations {
        let Some(py) = frame.py(a.y) else { continue };
        let px = frame.px(a.x) + 10.0;
        push_line(
            svg,
            &format!(
                r#"<text x="{px:.1}" y="{:.1}" font-size="12" fill="{}">{}</text>"#,
                py + 4.0,
                a.color,
                escape_xml(&a.text)
            ),
        );
    }
}

/// Returns the y coordinate just below the legend (plot top when absent).
fn write_legend(svg: &mut String, chart: &Chart, frame: &Frame) -> f64 {
    if !chart.show_legend {
        return frame.top;
    }
    let mut entries: Vec<(&str, &str, LineStyle, bool)> = chart
        .series
        .iter()
        .filter_map(|s| {
            let filled = !matches!(s, Series::Line { .. });
            let style = match s {
                Series::Line { style, .. } => *style,
                _ => LineStyle::Solid,
            };
            s.label().map(|label| (label, s.color(), style, filled))
        })
        .collect();
    for guide in &chart.guides {
        let (Guide::Horizontal {
            label: Some(label),
            color,
            style,
            ..
        }
        | Guide::Vertical {
            label: Some(label),
            color,
            style,
            ..
        }) = guide
        else {
            continue;
        };
        entries.push((label.as_str(), color.as_str(), *style, false));
    }
    if entries.is_empty() {
        return frame.top;
    }

    let longest = entries.iter().map(|e| e.0.chars().count()).max().unwrap_or(0) as f64;
    let box_width = 40.0 + longest * 6.5;
    let box_height = entries.len() as f64 * BOX_LINE_HEIGHT + 10.0;
    let x = frame.right() - box_width - 8.0;
    let y = frame.top + 8.0;
    push_line(
        svg,
        &format!(r##"<rect x="{x:.1}" y="{y:.1}" width="{box_width:.1}" height="{box_height:.1}" fill="white" fill-opacity="0.85" stroke="#cccccc" rx="4"/>"##),
    );
    for (i, (label, color, style, filled)) in entries.iter().enumerate() {
        let row = y + 14.0 + i as f64 * BOX_LINE_HEIGHT;
        if *filled {
            push_line(
                svg,
                &format!(
                    r#"<rect x="{:.1}" y="{:.1}" width="20" height="10" fill="{color}" fill-opacity="0.7"/>"#,
                    x + 8.0,
                    row - 9.0
                ),
            );
        } else {
            push_line(
                svg,
                &format!(
                    r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{color}" stroke-width="2"{}/>"#,
                    x + 8.0,
                    row - 4.0,
                    x + 28.0,
                    row - 4.0,
                    dash_attr(*style)
                ),
            );
        }
        push_line(
            svg,
            &format!(
                r#"<text x="{:.1}" y="{row:.1}" font-size="11">{}</text>"#,
                x + 34.0,
                escape_xml(label)
            ),
        );
    }
    y + box_height
}

fn write_text_box(svg: &mut String, chart: &Chart, frame: &Frame, legend_bottom: f64) {
    let Some(text_box) = &chart.text_box else { return };
    if text_box.lines.is_empty() {
        return;
    }
    let longest = text_box
        .lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0) as f64;
    let box_width = 16.0 + longest * 7.0;
    let box_height = text_box.lines.len() as f64 * BOX_LINE_HEIGHT + 10.0;
    let (x, y) = match text_box.corner {
        Corner::TopLeft => (frame.left + 8.0, frame.top + 8.0),
        Corner::TopRight => (frame.right() - box_width - 8.0, legend_bottom + 8.0),
    };
    push_line(
        svg,
        &format!(r##"<rect x="{x:.1}" y="{y:.1}" width="{box_width:.1}" height="{box_height:.1}" fill="white" fill-opacity="0.8" stroke="#999999" rx="6"/>"##),
    );
    for (i, line) in text_box.lines.iter().enumerate() {
        push_line(
            svg,
            &format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="12" font-family="monospace">{}</text>"#,
                x + 8.0,
                y + 18.0 + i as f64 * BOX_LINE_HEIGHT,
                escape_xml(line)
            ),
        );
    }
}

fn write_notes(svg: &mut String, chart: &Chart, top: f64) {
    for (i, line) in chart.notes.iter().enumerate() {
        push_line(
            svg,
            &format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="13">{}</text>"#,
                MARGIN_LEFT,
                top + 20.0 + (i as f64 + 1.0) * NOTE_LINE_HEIGHT,
                escape_xml(line)
            ),
        );
    }
}

/// Pixel runs of placeable points, split wherever a point cannot be drawn.
fn segment_points(points: &[(f64, f64)], frame: &Frame) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        match frame.py(y) {
            Some(py) if x.is_finite() => current.push((frame.px(x), py)),
            _ => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}

fn segments(points: &[(f64, f64)], frame: &Frame) -> Vec<String> {
    segment_points(points, frame)
        .into_iter()
        .map(|run| {
            run.iter()
                .map(|(x, y)| format!("{x:.2},{y:.2}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn dash_attr(style: LineStyle) -> &'static str {
    match style {
        LineStyle::Solid => "",
        LineStyle::Dashed => r#" stroke-dasharray="6,4""#,
    }
}

/// Round-number ticks covering `[lo, hi]`.
pub fn linear_ticks(lo: f64, hi: f64) -> Vec<(f64, String)> {
    let span = hi - lo;
    if span <= 0.0 || !span.is_finite() {
        return Vec::new();
    }
    let raw = span / 6.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n < 1.5 => 1.0,
        n if n < 3.0 => 2.0,
        n if n < 7.0 => 5.0,
        _ => 10.0,
    } * magnitude;
    let decimals = (-step.log10().floor()).max(0.0) as usize;

    let first = (lo / step).ceil() * step;
    let mut ticks: Vec<(f64, String)> = Vec::new();
    for i in 0..MAX_TICKS {
        let v = first + i as f64 * step;
        if v > hi + step * 1e-9 {
            break;
        }
        let shown = if v.abs() < step * 1e-9 { 0.0 } else { v };
        // Steps below the precision of `v` collapse onto the same value.
        if ticks.last().is_some_and(|t| t.0 == shown) {
            continue;
        }
        ticks.push((shown, format!("{shown:.decimals$}")));
    }
    ticks
}

/// Powers of ten inside `[lo, hi]`; `lo` must be positive.
pub fn log_ticks(lo: f64, hi: f64) -> Vec<(f64, String)> {
    if lo <= 0.0 || hi <= lo || !hi.is_finite() {
        return Vec::new();
    }
    let first = lo.log10().ceil() as i32;
    let last = hi.log10().floor() as i32;
    (first..=last)
        .map(|e| {
            let label = if (0..=4).contains(&e) {
                format!("{}", 10i64.pow(e as u32))
            } else {
                format!("1e{e}")
            };
            (10f64.powi(e), label)
        })
        .collect()
}

fn push_line(svg: &mut String, line: &str) {
    svg.push_str(line);
    svg.push('\n');
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
