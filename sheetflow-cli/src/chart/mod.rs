//! Chart descriptions built from summaries, rendered by [`view`]

pub mod view;

pub use self::view::show_charts;

use crate::table::Summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

/// A titled series of labelled values
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(String, f64)>,
}

impl ChartSpec {
    /// One bar per group of the summary
    pub fn bar(title: impl Into<String>, summary: &Summary) -> Self {
        Self::from_summary(ChartKind::Bar, title.into(), summary)
    }

    /// One point per group of the summary, joined in order
    pub fn line(title: impl Into<String>, summary: &Summary) -> Self {
        Self::from_summary(ChartKind::Line, title.into(), summary)
    }

    fn from_summary(kind: ChartKind, title: String, summary: &Summary) -> Self {
        Self {
            kind,
            title,
            x_label: summary.dimension.clone(),
            y_label: summary.measure.clone(),
            points: summary.groups.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest value, or 0 for an empty or all-negative series
    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    /// Bar heights in whole units; negative and non-finite values become 0
    pub fn bar_data(&self) -> Vec<(&str, u64)> {
        self.points
            .iter()
            .map(|(label, v)| {
                let height = if v.is_finite() && *v > 0.0 { v.round() as u64 } else { 0 };
                (label.as_str(), height)
            })
            .collect()
    }

    /// (x, y) pairs with x as the position in the series
    pub fn line_data(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (i as f64, if v.is_finite() { *v } else { 0.0 }))
            .collect()
    }
}
