//! Static HTML dashboard generator with Chart.js

use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::projector::{project, ChartSpec};
use crate::report::{MetricKind, SelectorOption};
use crate::source::ReportSource;
use crate::store::ReportStore;
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// HTML template for the dashboard
const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: 'Inter', system-ui, -apple-system, sans-serif;
            background: #f9fafb;
            color: #1f2937;
            line-height: 1.6;
        }

        .container {
            max-width: 1200px;
            margin: 0 auto;
            padding: 2rem;
        }

        header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 2rem;
        }

        h1 {
            font-size: 1.75rem;
            font-weight: 600;
        }

        select {
            padding: 0.4rem 0.75rem;
            border: 1px solid #d1d5db;
            border-radius: 6px;
            background: white;
            font-size: 0.95rem;
        }

        .chart-card {
            background: white;
            border: 1px solid #e5e7eb;
            border-radius: 12px;
            margin-bottom: 2rem;
            padding: 1.5rem;
        }

        .chart-card h2 {
            font-size: 1.15rem;
            font-weight: 600;
            margin-bottom: 1rem;
        }

        .chart-container {
            height: 420px;
            position: relative;
        }

        .no-data {
            text-align: center;
            padding: 3rem;
            color: #6b7280;
        }

        footer {
            text-align: center;
            padding: 1rem;
            color: #6b7280;
            font-size: 0.85rem;
        }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{{ title }}</h1>
            <select id="timestamp-select">
                {% for option in options %}
                <option value="{{ option.value }}">{{ option.label }}</option>
                {% endfor %}
            </select>
        </header>

        {% if options %}
            {% for chart in charts %}
            <div class="chart-card">
                <h2>{{ chart.heading }}</h2>
                <div class="chart-container">
                    <canvas id="{{ chart.target }}"></canvas>
                </div>
            </div>
            {% endfor %}
        {% else %}
            <div class="no-data">
                <p>No reports available yet.</p>
            </div>
        {% endif %}

        <footer>
            <p>Generated {{ generated_at }}</p>
        </footer>
    </div>

    <script>
        window.FOOTPRINT_DATA = {{ dashboard_json | safe }};

        Chart.defaults.font.family = "'Inter', system-ui, -apple-system, sans-serif";
        Chart.defaults.color = '#4b5563';

        const colors = {
            amd64: ['rgba(255, 99, 132, 0.5)', 'rgba(255, 99, 132, 1)'],
            arm64: ['rgba(54, 162, 235, 0.5)', 'rgba(54, 162, 235, 1)']
        };
        const targets = {
            binary_size: 'binary-size-chart',
            memory_usage: 'memory-usage-chart'
        };
        const charts = {};

        function chartData(spec) {
            return {
                labels: spec.categories.map(c => [c.language, c.version]),
                datasets: spec.series.map(s => ({
                    label: s.arch,
                    data: s.values,
                    versions: s.versions,
                    backgroundColor: colors[s.arch][0],
                    borderColor: colors[s.arch][1],
                    borderWidth: 1
                }))
            };
        }

        function renderChart(metric, spec) {
            const existing = charts[metric];
            if (existing) {
                existing.$spec = spec;
                existing.data = chartData(spec);
                existing.options.scales.y.title.text = spec.y_axis_label;
                existing.update();
                return;
            }

            const canvas = document.getElementById(targets[metric]);
            if (!canvas) return;

            const chart = new Chart(canvas.getContext('2d'), {
                type: 'bar',
                data: chartData(spec),
                options: {
                    responsive: true,
                    maintainAspectRatio: false,
                    plugins: {
                        legend: {
                            position: 'top',
                            align: 'end',
                            labels: { boxWidth: 12, padding: 20 }
                        },
                        tooltip: {
                            backgroundColor: 'rgba(0, 0, 0, 0.8)',
                            padding: 10,
                            callbacks: {
                                title: function (context) {
                                    return chart.$spec.categories[context[0].dataIndex].language;
                                },
                                label: function (context) {
                                    let label = context.dataset.label + ': ';
                                    if (context.parsed.y !== null) {
                                        label += context.parsed.y.toFixed(1) + ' KB';
                                    }
                                    return label;
                                },
                                afterLabel: function (context) {
                                    const version = context.dataset.versions[context.dataIndex];
                                    return version !== null ? 'Version: ' + version : '';
                                }
                            }
                        }
                    },
                    scales: {
                        x: { grid: { display: false } },
                        y: {
                            beginAtZero: true,
                            grid: { color: '#e5e7eb' },
                            title: { display: true, text: spec.y_axis_label }
                        }
                    }
                }
            });
            chart.$spec = spec;
            charts[metric] = chart;
        }

        function renderSelection() {
            const select = document.getElementById('timestamp-select');
            const report = window.FOOTPRINT_DATA.snapshots[select.value];
            if (!report) {
                console.error('No data for timestamp: ' + select.value);
                return;
            }

            Object.keys(targets).forEach(metric => {
                if (!report[metric]) {
                    console.error('No data for metric: ' + metric);
                    return;
                }
                renderChart(metric, report[metric]);
            });
        }

        document.addEventListener('DOMContentLoaded', function () {
            document.getElementById('timestamp-select').addEventListener('change', renderSelection);
            renderSelection();
        });
    </script>
</body>
</html>
"#;

/// Everything the static page needs: selector options and projected charts per key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    pub generated_at: DateTime<Utc>,
    pub options: Vec<SelectorOption>,
    pub snapshots: BTreeMap<String, BTreeMap<MetricKind, ChartSpec>>,
}

/// Chart card data for template rendering
#[derive(Debug, Clone, Serialize)]
struct ChartCard {
    heading: &'static str,
    target: &'static str,
}

/// Resolve every selectable snapshot of an initialized store and project its metrics.
///
/// Snapshots that fail to resolve are logged and left out of the selector.
pub async fn collect_dashboard<S: ReportSource>(store: &ReportStore<S>) -> Result<DashboardData> {
    let all_options = store.options();
    if all_options.is_empty() {
        return Err(Error::NotInitialized);
    }

    let mut options = Vec::new();
    let mut snapshots = BTreeMap::new();

    for option in all_options {
        let snapshot = match store.resolve(&option.value).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Skipping {}: {}", option.value, e);
                continue;
            }
        };

        let mut charts = BTreeMap::new();
        for metric in MetricKind::ALL {
            match snapshot.metric(metric) {
                Some(samples) => {
                    charts.insert(metric, project(samples, metric));
                }
                None => warn!("Snapshot {} has no {} data", option.value, metric),
            }
        }

        snapshots.insert(option.value.clone(), charts);
        options.push(option);
    }

    Ok(DashboardData {
        generated_at: Utc::now(),
        options,
        snapshots,
    })
}

fn heading(metric: MetricKind) -> &'static str {
    match metric {
        MetricKind::BinarySize => "Binary Size",
        MetricKind::MemoryUsage => "Memory Usage",
    }
}

/// Generate the HTML dashboard
pub fn generate_dashboard(data: &DashboardData, config: &DashboardConfig) -> Result<String> {
    let mut env = Environment::new();
    // The .html suffix turns on minijinja's HTML autoescaping
    env.add_template("dashboard.html", DASHBOARD_TEMPLATE)?;

    let template = env.get_template("dashboard.html")?;

    let charts: Vec<ChartCard> = MetricKind::ALL
        .iter()
        .map(|metric| ChartCard {
            heading: heading(*metric),
            target: metric.chart_target(),
        })
        .collect();

    // Markup characters inside JSON strings must not reach the script element raw
    let dashboard_json = serde_json::to_string(data)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");

    let html = template.render(context! {
        title => &config.title,
        generated_at => data.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        options => &data.options,
        charts => charts,
        dashboard_json => dashboard_json,
    })?;

    Ok(html)
}

/// Write `index.html` and `data.json` into the configured output directory
pub fn write_dashboard(data: &DashboardData, config: &DashboardConfig, base_path: &Path) -> Result<()> {
    let output_dir = base_path.join(&config.output_dir);
    std::fs::create_dir_all(&output_dir).map_err(|e| Error::FileWriteError {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let html = generate_dashboard(data, config)?;
    let index_path = output_dir.join("index.html");
    std::fs::write(&index_path, html).map_err(|e| Error::FileWriteError {
        path: index_path.display().to_string(),
        source: e,
    })?;

    let data_path = output_dir.join("data.json");
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&data_path, json).map_err(|e| Error::FileWriteError {
        path: data_path.display().to_string(),
        source: e,
    })?;

    info!("Wrote dashboard to {}", output_dir.display());
    Ok(())
}
