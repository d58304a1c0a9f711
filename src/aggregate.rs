use crate::models::Article;
use serde::Serialize;
use std::collections::HashMap;

/// Fixed chart palette. Entries repeat on purpose once keys outnumber it.
pub const PALETTE: [&str; 20] = [
    "#60a5fa", "#f87171", "#34d399", "#fbbf24", "#a78bfa", "#f472b6", "#38bdf8", "#facc15",
    "#4ade80", "#fb7185", "#818cf8", "#f59e42", "#2dd4bf", "#c084fc", "#fcd34d", "#fca5a5",
    "#a3e635", "#fda4af", "#f472b6", "#fbbf24",
];

pub const ELLIPSIS: char = '…';

/// Name → count mapping that remembers first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

pub fn count_by<F>(articles: &[Article], key: F) -> Tally
where
    F: Fn(&Article) -> &str,
{
    let mut tally = Tally::default();
    for article in articles {
        tally.add(key(article));
    }
    tally
}

pub fn count_by_author(articles: &[Article]) -> Tally {
    count_by(articles, |a| a.author.as_str())
}

pub fn count_by_source(articles: &[Article]) -> Tally {
    count_by(articles, |a| a.source.as_str())
}

/// Counts per (row, column) pair. Rows keep first-seen order, columns are
/// sorted ascending, and every cell is present.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CrossTab {
    pub groups: Vec<String>,
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<usize>>,
}

#[cfg(test)]
impl CrossTab {
    fn get(&self, group: &str, column: &str) -> Option<usize> {
        let row = self.groups.iter().position(|g| g == group)?;
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.matrix[row][col])
    }

    fn row(&self, group: &str) -> Option<&[usize]> {
        let row = self.groups.iter().position(|g| g == group)?;
        Some(&self.matrix[row])
    }
}

pub fn cross_tab<G, C>(articles: &[Article], group: G, column: C) -> CrossTab
where
    G: Fn(&Article) -> &str,
    C: Fn(&Article) -> &str,
{
    let groups: Vec<String> = count_by(articles, &group).keys().map(str::to_string).collect();
    let mut columns: Vec<String> = articles.iter().map(|a| column(a).to_string()).collect();
    columns.sort();
    columns.dedup();

    let group_pos: HashMap<&str, usize> =
        groups.iter().enumerate().map(|(i, g)| (g.as_str(), i)).collect();
    let column_pos: HashMap<&str, usize> =
        columns.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();

    let mut matrix = vec![vec![0usize; columns.len()]; groups.len()];
    for article in articles {
        let row = group_pos[group(article)];
        let col = column_pos[column(article)];
        matrix[row][col] += 1;
    }

    CrossTab {
        groups,
        columns,
        matrix,
    }
}

/// Per-day counts for each group. Dates are the ten-character timestamp
/// prefix, or "Unknown".
pub fn count_by_date_and_group<G>(articles: &[Article], group: G) -> CrossTab
where
    G: Fn(&Article) -> &str,
{
    cross_tab(articles, group, Article::date_key)
}

pub fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        return label.to_string();
    }
    let mut truncated: String = label.chars().take(max_len).collect();
    truncated.push(ELLIPSIS);
    truncated
}

pub fn color_at(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

pub fn colors_for(tally: &Tally) -> Vec<&'static str> {
    (0..tally.len()).map(color_at).collect()
}

/// Bubble radius as a clamped multiple of the count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusScale {
    pub scale_factor: f64,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self {
            scale_factor: 8.0,
            min_radius: 8.0,
            max_radius: 30.0,
        }
    }
}

impl RadiusScale {
    pub fn radius(&self, count: usize) -> f64 {
        (count as f64 * self.scale_factor)
            .min(self.max_radius)
            .max(self.min_radius)
    }
}
