//! Renderer-agnostic chart datasets built from report series

use crate::model::{AgeBand, ComparisonSeries, CumulativeSeriesPoint};
use chrono::NaiveDate;
use parkview_common::format_wire_date;
use parkview_config::ChartConfig;
use serde::Serialize;
use std::fmt::Write;

/// One labelled series of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset<T> {
    pub label: String,
    pub color: String,
    pub data: Vec<T>,
}

/// X-axis labels plus datasets aligned with them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData<T> {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset<T>>,
}

fn date_label(date: NaiveDate, format: &str) -> String {
    let mut label = String::new();
    // chrono reports bad patterns as fmt errors
    if write!(label, "{}", date.format(format)).is_err() {
        return format_wire_date(date);
    }
    label
}

fn band_color(band: AgeBand, config: &ChartConfig) -> &str {
    match band {
        AgeBand::Under19 => &config.band_0_18_color,
        AgeBand::From19To30 => &config.band_0_30_color,
        AgeBand::From31To50 => &config.band_0_50_color,
        AgeBand::Over50 => &config.all_ages_color,
    }
}

/// Stacked timeline: one dataset per cumulative band, youngest first
pub fn timeline_chart(points: &[CumulativeSeriesPoint], config: &ChartConfig) -> ChartData<u64> {
    let labels = points
        .iter()
        .map(|p| date_label(p.date, &config.date_label_format))
        .collect();

    let datasets = AgeBand::ALL
        .iter()
        .map(|band| ChartDataset {
            label: band.cumulative_label().to_string(),
            color: band_color(*band, config).to_string(),
            data: points.iter().map(|p| p.stacked(*band)).collect(),
        })
        .collect();

    ChartData { labels, datasets }
}

/// Bars of average and maximum attendance per ride
pub fn comparison_chart(series: &ComparisonSeries, config: &ChartConfig) -> ChartData<f64> {
    ChartData {
        labels: series.ride_names.clone(),
        datasets: vec![
            ChartDataset {
                label: "Average".to_string(),
                color: config.average_color.clone(),
                data: series.averages.clone(),
            },
            ChartDataset {
                label: "Max".to_string(),
                color: config.max_color.clone(),
                data: series.maxes.iter().map(|m| *m as f64).collect(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkview_common::test_utils::mock_date;

    fn point(day: u32, stacked: [u64; 4]) -> CumulativeSeriesPoint {
        CumulativeSeriesPoint {
            date: mock_date(2024, 1, day),
            band1: stacked[0],
            band1_plus2: stacked[1],
            band1_plus2_plus3: stacked[2],
            all_bands: stacked[3],
        }
    }

    #[test]
    fn test_timeline_chart_layout() {
        let chart = timeline_chart(
            &[point(1, [2, 5, 6, 6]), point(2, [1, 2, 3, 4])],
            &ChartConfig::default(),
        );

        assert_eq!(chart.labels, vec!["01-01", "01-02"]);
        let labels: Vec<_> = chart.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["0-18", "0-30", "0-50", "All Age Groups"]);
        assert_eq!(chart.datasets[1].data, vec![5, 2]);
        assert_eq!(chart.datasets[3].data, vec![6, 4]);
        assert_eq!(chart.datasets[3].color, "#FF6384");
    }

    #[test]
    fn test_custom_and_broken_label_format() {
        let mut config = ChartConfig::default();
        config.date_label_format = "%d %b".to_string();
        let chart = timeline_chart(&[point(5, [0, 0, 0, 0])], &config);
        assert_eq!(chart.labels, vec!["05 Jan"]);

        config.date_label_format = "%Q".to_string();
        let chart = timeline_chart(&[point(5, [0, 0, 0, 0])], &config);
        assert_eq!(chart.labels, vec!["2024-01-05"]);
    }

    #[test]
    fn test_comparison_chart() {
        let mut series = ComparisonSeries::default();
        series.push("Thunder Run", 5.0, 6);
        series.push("Lazy River", 3.0, 3);

        let chart = comparison_chart(&series, &ChartConfig::default());
        assert_eq!(chart.labels, vec!["Thunder Run", "Lazy River"]);
        assert_eq!(chart.datasets[0].label, "Average");
        assert_eq!(chart.datasets[0].data, vec![5.0, 3.0]);
        assert_eq!(chart.datasets[1].label, "Max");
        assert_eq!(chart.datasets[1].data, vec![6.0, 3.0]);
        assert_eq!(chart.datasets[1].color, "#BF69F0");
    }

    #[test]
    fn test_empty_series_yield_empty_charts() {
        let chart = timeline_chart(&[], &ChartConfig::default());
        assert!(chart.labels.is_empty());
        assert_eq!(chart.datasets.len(), 4);
        assert!(chart.datasets.iter().all(|d| d.data.is_empty()));
    }
}
