//! Chart-ready payloads. The page draws these as SVG; everything here is
//! shaping of aggregates, no counting of its own.

use crate::aggregate::{
    color_at, count_by_author, count_by_date_and_group, count_by_source, cross_tab,
    truncate_label, RadiusScale, Tally,
};
use crate::models::Article;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartKind {
    #[default]
    #[serde(rename = "main")]
    Dashboard,
    #[serde(rename = "bar")]
    Bar,
    #[serde(rename = "stackedBar")]
    StackedBar,
    #[serde(rename = "pie")]
    Pie,
    #[serde(rename = "doughnut")]
    Doughnut,
    #[serde(rename = "polar")]
    Polar,
    #[serde(rename = "bubble")]
    Bubble,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Dashboard,
        ChartKind::Bar,
        ChartKind::StackedBar,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Polar,
        ChartKind::Bubble,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChartKind::Dashboard => "main",
            ChartKind::Bar => "bar",
            ChartKind::StackedBar => "stackedBar",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Polar => "polar",
            ChartKind::Bubble => "bubble",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Dashboard => "Dashboard",
            ChartKind::Bar => "Bar Chart",
            ChartKind::StackedBar => "Stacked Bar",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Doughnut => "Doughnut",
            ChartKind::Polar => "Polar Area",
            ChartKind::Bubble => "Bubble Chart",
        }
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.key() == value)
            .ok_or_else(|| format!("unknown chart type '{value}'"))
    }
}

/// Presentation knobs for chart payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSettings {
    pub author_label_len: usize,
    pub series_label_len: usize,
    pub radius: RadiusScale,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            author_label_len: 10,
            series_label_len: 14,
            radius: RadiusScale::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartItem {
    pub label: String,
    pub full_label: String,
    pub value: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub label: String,
    pub full_label: String,
    pub values: Vec<usize>,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BubblePoint {
    pub x: usize,
    pub y: usize,
    pub r: f64,
    pub label: String,
    pub full_label: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Timeline {
    pub dates: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Stacked {
    pub labels: Vec<String>,
    pub full_labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Chart {
    #[serde(rename = "main")]
    Dashboard {
        bar: Vec<ChartItem>,
        pie: Vec<ChartItem>,
        bubble: Vec<BubblePoint>,
        timeline: Timeline,
    },
    Bar {
        items: Vec<ChartItem>,
    },
    StackedBar {
        stacked: Stacked,
    },
    Pie {
        items: Vec<ChartItem>,
    },
    Doughnut {
        items: Vec<ChartItem>,
    },
    Polar {
        items: Vec<ChartItem>,
    },
    Bubble {
        points: Vec<BubblePoint>,
        max_x: usize,
    },
}

pub fn build_chart(kind: ChartKind, articles: &[Article], settings: &ChartSettings) -> Chart {
    match kind {
        ChartKind::Dashboard => Chart::Dashboard {
            bar: items(&count_by_author(articles), settings.author_label_len),
            pie: items(&count_by_source(articles), settings.series_label_len),
            bubble: bubbles(&count_by_author(articles), settings),
            timeline: timeline(articles, settings),
        },
        ChartKind::Bar => Chart::Bar {
            items: items(&count_by_author(articles), settings.author_label_len),
        },
        ChartKind::StackedBar => Chart::StackedBar {
            stacked: stacked(articles, settings),
        },
        ChartKind::Pie => Chart::Pie {
            items: items(&count_by_source(articles), settings.series_label_len),
        },
        ChartKind::Doughnut => Chart::Doughnut {
            items: items(&count_by_author(articles), settings.author_label_len),
        },
        ChartKind::Polar => Chart::Polar {
            items: items(&count_by_source(articles), settings.series_label_len),
        },
        ChartKind::Bubble => {
            let authors = count_by_author(articles);
            Chart::Bubble {
                max_x: authors.len() + 1,
                points: bubbles(&authors, settings),
            }
        }
    }
}

fn items(tally: &Tally, label_len: usize) -> Vec<ChartItem> {
    tally
        .iter()
        .enumerate()
        .map(|(i, (key, count))| ChartItem {
            label: truncate_label(key, label_len),
            full_label: key.to_string(),
            value: count,
            color: color_at(i),
        })
        .collect()
}

fn bubbles(authors: &Tally, settings: &ChartSettings) -> Vec<BubblePoint> {
    authors
        .iter()
        .enumerate()
        .map(|(i, (author, count))| BubblePoint {
            x: i + 1,
            y: count,
            r: settings.radius.radius(count),
            label: truncate_label(author, settings.author_label_len),
            full_label: author.to_string(),
            color: color_at(i),
        })
        .collect()
}

fn timeline(articles: &[Article], settings: &ChartSettings) -> Timeline {
    let tab = count_by_date_and_group(articles, |a| a.source.as_str());
    let series = tab
        .groups
        .iter()
        .zip(&tab.matrix)
        .enumerate()
        .map(|(i, (source, values))| Series {
            label: truncate_label(source, settings.series_label_len),
            full_label: source.clone(),
            values: values.clone(),
            color: color_at(i),
        })
        .collect();

    Timeline {
        dates: tab.columns,
        series,
    }
}

fn stacked(articles: &[Article], settings: &ChartSettings) -> Stacked {
    let tab = cross_tab(articles, |a| a.author.as_str(), |a| a.source.as_str());
    let series = tab
        .columns
        .iter()
        .enumerate()
        .map(|(col, source)| Series {
            label: truncate_label(source, settings.series_label_len),
            full_label: source.clone(),
            values: tab.matrix.iter().map(|row| row[col]).collect(),
            color: color_at(col),
        })
        .collect();

    Stacked {
        labels: tab
            .groups
            .iter()
            .map(|author| truncate_label(author, settings.author_label_len))
            .collect(),
        full_labels: tab.groups,
        series,
    }
}
