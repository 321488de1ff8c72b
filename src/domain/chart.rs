//! Renderer-independent description of a 2-D chart.

use crate::domain::histogram::DensityHistogram;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
}

/// Cycle used when a series does not name its own color.
pub const PALETTE: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Line {
        label: Option<String>,
        points: Vec<(f64, f64)>,
        color: String,
        style: LineStyle,
        width: f64,
    },
    Histogram {
        label: Option<String>,
        histogram: DensityHistogram,
        color: String,
        opacity: f64,
    },
    /// Curve filled down to y = 0.
    Area {
        label: Option<String>,
        points: Vec<(f64, f64)>,
        color: String,
        opacity: f64,
    },
}

impl Series {
    pub fn label(&self) -> Option<&str> {
        match self {
            Series::Line { label, .. }
            | Series::Histogram { label, .. }
            | Series::Area { label, .. } => label.as_deref(),
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Series::Line { color, .. }
            | Series::Histogram { color, .. }
            | Series::Area { color, .. } => color,
        }
    }

    fn extent(&self) -> Vec<(f64, f64)> {
        match self {
            Series::Line { points, .. } | Series::Area { points, .. } => points.clone(),
            Series::Histogram { histogram, .. } => histogram
                .bars()
                .flat_map(|(l, r, d)| [(l, d), (r, d)])
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Guide {
    Horizontal {
        y: f64,
        color: String,
        style: LineStyle,
        label: Option<String>,
    },
    Vertical {
        x: f64,
        color: String,
        style: LineStyle,
        label: Option<String>,
    },
}

/// Text placed just right of a data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub lines: Vec<String>,
    pub corner: Corner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_scale: Scale,
    pub x_range: Option<(f64, f64)>,
    pub series: Vec<Series>,
    pub guides: Vec<Guide>,
    pub annotations: Vec<Annotation>,
    pub text_box: Option<TextBox>,
    pub show_legend: bool,
    /// Free text rendered in a panel below the plot.
    pub notes: Vec<String>,
}

/// Axis limits in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Chart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            y_scale: Scale::Linear,
            x_range: None,
            series: Vec::new(),
            guides: Vec::new(),
            annotations: Vec::new(),
            text_box: None,
            show_legend: false,
            notes: Vec::new(),
        }
    }

    pub fn next_color(&self) -> String {
        PALETTE[self.series.len() % PALETTE.len()].to_string()
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_guide(mut self, guide: Guide) -> Self {
        self.guides.push(guide);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Data extent of everything drawable, honoring `x_range` and the y scale.
    ///
    /// Points outside `x_range` and, on a log axis, non-positive y values are
    /// ignored. Degenerate spans are widened so the extent is never empty.
    pub fn extent(&self) -> Option<Extent> {
        let in_x = |x: f64| match self.x_range {
            Some((lo, hi)) => x >= lo && x <= hi,
            None => true,
        };
        let usable_y = |y: f64| y.is_finite() && (self.y_scale == Scale::Linear || y > 0.0);

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (x, y) in self.series.iter().flat_map(Series::extent) {
            if x.is_finite() && in_x(x) {
                xs.push(x);
                if usable_y(y) {
                    ys.push(y);
                }
            }
        }
        for guide in &self.guides {
            match *guide {
                Guide::Horizontal { y, .. } if usable_y(y) => ys.push(y),
                Guide::Vertical { x, .. } if x.is_finite() && in_x(x) => xs.push(x),
                _ => {}
            }
        }
        if self.series.iter().any(|s| matches!(s, Series::Area { .. })) && self.y_scale == Scale::Linear {
            ys.push(0.0);
        }

        if xs.is_empty() || ys.is_empty() {
            return None;
        }

        let (mut x_min, mut x_max) = min_max(&xs);
        if let Some((lo, hi)) = self.x_range {
            x_min = lo;
            x_max = hi;
        }
        let (mut y_min, mut y_max) = min_max(&ys);

        if x_max <= x_min {
            x_min -= 0.5;
            x_max += 0.5;
        }
        if y_max <= y_min {
            match self.y_scale {
                Scale::Linear => {
                    y_min -= 0.5;
                    y_max += 0.5;
                }
                Scale::Log => {
                    y_min /= 10.0;
                    y_max *= 10.0;
                }
            }
        }

        Some(Extent {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
