//! Renderer boundary and Chart.js configuration

use crate::projector::ChartSpec;
use crate::report::Arch;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// A bar chart backend that can create a chart and later replace its data in place
pub trait ChartRenderer {
    /// Handle to a live chart
    type Chart;

    fn create(&mut self, target: &str, spec: &ChartSpec) -> Self::Chart;

    fn update(&mut self, chart: &mut Self::Chart, spec: &ChartSpec);
}

/// What `ChartBoard::render` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAction {
    Created,
    Updated,
}

/// Live charts keyed by their target container
///
/// A target is created once; every later render updates the same chart.
pub struct ChartBoard<R: ChartRenderer> {
    renderer: R,
    charts: HashMap<String, R::Chart>,
}

impl<R: ChartRenderer> ChartBoard<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            charts: HashMap::new(),
        }
    }

    pub fn render(&mut self, target: &str, spec: &ChartSpec) -> RenderAction {
        match self.charts.get_mut(target) {
            Some(chart) => {
                debug!("Updating chart {}", target);
                self.renderer.update(chart, spec);
                RenderAction::Updated
            }
            None => {
                debug!("Creating chart {}", target);
                let chart = self.renderer.create(target, spec);
                self.charts.insert(target.to_string(), chart);
                RenderAction::Created
            }
        }
    }

    pub fn chart(&self, target: &str) -> Option<&R::Chart> {
        self.charts.get(target)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

fn arch_colors(arch: Arch) -> (&'static str, &'static str) {
    match arch {
        Arch::Amd64 => ("rgba(255, 99, 132, 0.5)", "rgba(255, 99, 132, 1)"),
        Arch::Arm64 => ("rgba(54, 162, 235, 0.5)", "rgba(54, 162, 235, 1)"),
    }
}

/// `data` section of a Chart.js bar chart: two-line labels and one dataset per arch
pub fn chart_data(spec: &ChartSpec) -> Value {
    let labels: Vec<Value> = spec
        .categories
        .iter()
        .map(|c| json!([c.language, c.version]))
        .collect();

    let datasets: Vec<Value> = spec
        .series
        .iter()
        .map(|series| {
            let (background, border) = arch_colors(series.arch);
            json!({
                "label": series.arch.as_str(),
                "data": series.values,
                "versions": series.versions,
                "backgroundColor": background,
                "borderColor": border,
                "borderWidth": 1,
            })
        })
        .collect();

    json!({ "labels": labels, "datasets": datasets })
}

/// Full Chart.js configuration for a spec
pub fn chart_config(spec: &ChartSpec) -> Value {
    json!({
        "type": "bar",
        "data": chart_data(spec),
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "legend": {
                    "position": "top",
                    "align": "end",
                    "labels": { "boxWidth": 12, "padding": 20 }
                },
                "tooltip": {
                    "backgroundColor": "rgba(0, 0, 0, 0.8)",
                    "padding": 10
                }
            },
            "scales": {
                "x": { "grid": { "display": false } },
                "y": {
                    "beginAtZero": true,
                    "grid": { "color": "#e5e7eb" },
                    "title": { "display": true, "text": spec.y_axis_label }
                }
            }
        }
    })
}

/// A Chart.js chart held as its configuration object
#[derive(Debug, Clone, PartialEq)]
pub struct ChartJsChart {
    /// Stable identity; unchanged by updates
    pub id: u64,
    pub target: String,
    pub config: Value,
    pub updates: usize,
}

/// Renderer producing Chart.js configuration objects
#[derive(Debug, Default)]
pub struct ChartJsRenderer {
    next_id: u64,
}

impl ChartRenderer for ChartJsRenderer {
    type Chart = ChartJsChart;

    fn create(&mut self, target: &str, spec: &ChartSpec) -> ChartJsChart {
        self.next_id += 1;
        ChartJsChart {
            id: self.next_id,
            target: target.to_string(),
            config: chart_config(spec),
            updates: 0,
        }
    }

    fn update(&mut self, chart: &mut ChartJsChart, spec: &ChartSpec) {
        chart.config["data"] = chart_data(spec);
        chart.config["options"]["scales"]["y"]["title"]["text"] = json!(spec.y_axis_label);
        chart.updates += 1;
    }
}
