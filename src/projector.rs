//! Projection of raw samples into renderer-agnostic bar chart input
//!
//! Categories are languages ordered by their smallest value across all
//! architectures (ties broken by name), and every architecture gets one value
//! per category. A language/architecture pair without a sample is `None`, so
//! renderers draw a gap instead of a zero-height bar.

use crate::report::{Arch, MetricKind, Sample};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One x-axis category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub language: String,
    /// Version of the first sample seen for this language
    pub version: String,
}

/// Values of one architecture, aligned with the categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub arch: Arch,
    pub values: Vec<Option<f64>>,
    /// `Some` exactly where a sample exists for the pair
    pub versions: Vec<Option<String>>,
}

/// Bar chart input for one metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub metric: MetricKind,
    pub y_axis_label: String,
    pub categories: Vec<Category>,
    pub series: Vec<Series>,
}

/// Everything a tooltip shows for one data point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointTooltip {
    pub language: String,
    pub arch: Arch,
    pub value: Option<f64>,
    pub version: Option<String>,
}

impl PointTooltip {
    /// Value with one decimal and unit, if the point has one
    pub fn value_label(&self) -> Option<String> {
        self.value.map(format_kb)
    }

    /// Title, label and optional version line, in display order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.language.clone(),
            format!(
                "{}: {}",
                self.arch,
                self.value_label().unwrap_or_default()
            ),
        ];
        if let Some(version) = &self.version {
            lines.push(format!("Version: {}", version));
        }
        lines
    }
}

/// Format a KB measurement for display
pub fn format_kb(value: f64) -> String {
    format!("{:.1} KB", value)
}

/// Build the chart input for one metric's samples
pub fn project(samples: &[Sample], metric: MetricKind) -> ChartSpec {
    // Languages in first-seen order with their rank key
    let mut ranked: Vec<(&str, Option<f64>)> = Vec::new();
    for sample in samples {
        let idx = match ranked.iter().position(|(lang, _)| *lang == sample.language) {
            Some(idx) => idx,
            None => {
                ranked.push((sample.language.as_str(), None));
                ranked.len() - 1
            }
        };
        let entry = &mut ranked[idx];
        if let Some(value) = sample.value {
            entry.1 = Some(entry.1.map_or(value, |min| min.min(value)));
        }
    }

    ranked.sort_by(|(a_lang, a_min), (b_lang, b_min)| {
        compare_rank(*a_min, *b_min).then_with(|| a_lang.cmp(b_lang))
    });

    let categories: Vec<Category> = ranked
        .iter()
        .map(|(lang, _)| Category {
            language: lang.to_string(),
            version: samples
                .iter()
                .find(|s| s.language == *lang)
                .map(|s| s.version.clone())
                .unwrap_or_default(),
        })
        .collect();

    let series = Arch::ALL
        .iter()
        .map(|&arch| {
            let hits: Vec<Option<&Sample>> = categories
                .iter()
                .map(|c| {
                    samples
                        .iter()
                        .find(|s| s.language == c.language && s.arch == arch)
                })
                .collect();

            Series {
                arch,
                values: hits.iter().map(|hit| hit.and_then(|s| s.value)).collect(),
                versions: hits
                    .iter()
                    .map(|hit| hit.map(|s| s.version.clone()))
                    .collect(),
            }
        })
        .collect();

    ChartSpec {
        metric,
        y_axis_label: metric.axis_label().to_string(),
        categories,
        series,
    }
}

/// Languages without any value rank after all others
fn compare_rank(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY).total_cmp(&b.unwrap_or(f64::INFINITY))
}

impl ChartSpec {
    /// Category languages in axis order
    pub fn languages(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.language.as_str()).collect()
    }

    pub fn series_for(&self, arch: Arch) -> Option<&Series> {
        self.series.iter().find(|s| s.arch == arch)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Tooltip contents for the point at `category` in series `series`
    pub fn tooltip(&self, category: usize, series: usize) -> Option<PointTooltip> {
        let cat = self.categories.get(category)?;
        let series = self.series.get(series)?;

        Some(PointTooltip {
            language: cat.language.clone(),
            arch: series.arch,
            value: series.values.get(category).copied().flatten(),
            version: series.versions.get(category).cloned().flatten(),
        })
    }

    /// One line per category, e.g. `rust (1.78): amd64 900.0 KB, arm64 -`
    pub fn summary_lines(&self) -> Vec<String> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                let values: Vec<String> = self
                    .series
                    .iter()
                    .map(|s| {
                        let value = s.values[i].map(format_kb).unwrap_or_else(|| "-".to_string());
                        format!("{} {}", s.arch, value)
                    })
                    .collect();

                if cat.version.is_empty() {
                    format!("{}: {}", cat.language, values.join(", "))
                } else {
                    format!("{} ({}): {}", cat.language, cat.version, values.join(", "))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(language: &str, arch: Arch, version: &str, value: Option<f64>) -> Sample {
        Sample {
            language: language.to_string(),
            arch,
            version: version.to_string(),
            value,
        }
    }

    fn go_rust() -> Vec<Sample> {
        vec![
            sample("go", Arch::Amd64, "1.22", Some(1800.0)),
            sample("go", Arch::Arm64, "1.22", Some(1700.0)),
            sample("rust", Arch::Amd64, "1.78", Some(900.0)),
        ]
    }

    #[test]
    fn test_orders_by_minimum_value() {
        let spec = project(&go_rust(), MetricKind::BinarySize);

        assert_eq!(spec.languages(), vec!["rust", "go"]);
        assert_eq!(
            spec.series_for(Arch::Amd64).unwrap().values,
            vec![Some(900.0), Some(1800.0)]
        );
        assert_eq!(
            spec.series_for(Arch::Arm64).unwrap().values,
            vec![None, Some(1700.0)]
        );
        assert_eq!(spec.y_axis_label, "Binary Size (KB)");
    }

    #[test]
    fn test_tie_broken_alphabetically() {
        let samples = vec![
            sample("c", Arch::Amd64, "", Some(500.0)),
            sample("b", Arch::Arm64, "", Some(500.0)),
        ];
        let spec = project(&samples, MetricKind::MemoryUsage);
        assert_eq!(spec.languages(), vec!["b", "c"]);
    }

    #[test]
    fn test_tie_break_is_case_sensitive() {
        let samples = vec![
            sample("asm", Arch::Amd64, "", Some(1.0)),
            sample("Zig", Arch::Amd64, "", Some(1.0)),
        ];
        let spec = project(&samples, MetricKind::BinarySize);
        assert_eq!(spec.languages(), vec!["Zig", "asm"]);
    }

    #[test]
    fn test_missing_pairs_are_none_not_zero() {
        let samples = vec![
            sample("asm", Arch::Amd64, "nasm", Some(0.5)),
            sample("java", Arch::Arm64, "21", Some(40000.0)),
            sample("c", Arch::Amd64, "gcc", None),
        ];
        let spec = project(&samples, MetricKind::BinarySize);

        assert_eq!(spec.languages(), vec!["asm", "java", "c"]);
        for series in &spec.series {
            assert_eq!(series.values.len(), spec.categories.len());
            assert_eq!(series.versions.len(), spec.categories.len());
        }

        let amd64 = spec.series_for(Arch::Amd64).unwrap();
        assert_eq!(amd64.values, vec![Some(0.5), None, None]);
        assert_eq!(
            amd64.versions,
            vec![Some("nasm".to_string()), None, Some("gcc".to_string())]
        );
    }

    #[test]
    fn test_category_version_from_first_sample() {
        let samples = vec![
            sample("python", Arch::Arm64, "3.12-arm", Some(9000.0)),
            sample("python", Arch::Amd64, "3.12", Some(8000.0)),
        ];
        let spec = project(&samples, MetricKind::MemoryUsage);
        assert_eq!(spec.categories[0].version, "3.12-arm");

        let tip = spec.tooltip(0, 0).unwrap();
        assert_eq!(tip.arch, Arch::Amd64);
        assert_eq!(tip.version.as_deref(), Some("3.12"));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let mut samples = go_rust();
        samples.push(sample("c", Arch::Arm64, "gcc 13", Some(1700.0)));
        let a = project(&samples, MetricKind::BinarySize);
        let b = project(&samples, MetricKind::BinarySize);
        assert_eq!(a, b);
        assert_eq!(a.languages(), vec!["rust", "c", "go"]);
    }

    #[test]
    fn test_order_is_permutation_of_languages() {
        let samples: Vec<Sample> = (0..40)
            .map(|i| {
                let lang = format!("lang{}", i % 13);
                let arch = if i % 2 == 0 { Arch::Amd64 } else { Arch::Arm64 };
                sample(&lang, arch, "", Some(((i * 37) % 11) as f64))
            })
            .collect();
        let spec = project(&samples, MetricKind::BinarySize);

        let mut expected: Vec<(f64, String)> = Vec::new();
        for s in &samples {
            let v = s.value.unwrap();
            match expected.iter_mut().find(|(_, l)| *l == s.language) {
                Some(e) => e.0 = e.0.min(v),
                None => expected.push((v, s.language.clone())),
            }
        }
        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let expected: Vec<&str> = expected.iter().map(|(_, l)| l.as_str()).collect();

        assert_eq!(spec.languages(), expected);
    }

    #[test]
    fn test_empty_input() {
        let spec = project(&[], MetricKind::MemoryUsage);
        assert!(spec.is_empty());
        assert_eq!(spec.series.len(), Arch::ALL.len());
        assert!(spec.series.iter().all(|s| s.values.is_empty()));
        assert_eq!(spec.y_axis_label, "Resident Set Size (KB)");
    }

    #[test]
    fn test_tooltip_lines() {
        let spec = project(&go_rust(), MetricKind::BinarySize);

        let tip = spec.tooltip(0, 0).unwrap();
        assert_eq!(
            tip.lines(),
            vec!["rust", "amd64: 900.0 KB", "Version: 1.78"]
        );

        let gap = spec.tooltip(0, 1).unwrap();
        assert_eq!(gap.value_label(), None);
        assert_eq!(gap.lines(), vec!["rust", "arm64: "]);

        assert!(spec.tooltip(2, 0).is_none());
        assert!(spec.tooltip(0, 2).is_none());
    }

    #[test]
    fn test_format_kb_rounds_to_one_decimal() {
        assert_eq!(format_kb(16.04), "16.0 KB");
        assert_eq!(format_kb(1234.56), "1234.6 KB");
    }

    #[test]
    fn test_summary_lines() {
        let spec = project(&go_rust(), MetricKind::BinarySize);
        assert_eq!(
            spec.summary_lines(),
            vec![
                "rust (1.78): amd64 900.0 KB, arm64 -",
                "go (1.22): amd64 1800.0 KB, arm64 1700.0 KB",
            ]
        );
    }
}
