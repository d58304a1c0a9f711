use crate::models::{Article, FilterSpec};

/// Returns the articles that satisfy every non-empty field of `filters`, keeping
/// their input order.
pub fn filter_articles(articles: &[Article], filters: &FilterSpec) -> Vec<Article> {
    let predicate = Predicate::new(filters);
    articles
        .iter()
        .filter(|article| predicate.matches(article))
        .cloned()
        .collect()
}

struct Predicate {
    author: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    source: Option<String>,
    keyword: Option<String>,
}

impl Predicate {
    fn new(filters: &FilterSpec) -> Self {
        Self {
            author: lowered(&filters.author),
            date_from: trimmed(&filters.date_from),
            date_to: trimmed(&filters.date_to),
            source: lowered(&filters.source),
            keyword: lowered(&filters.keyword),
        }
    }

    fn matches(&self, article: &Article) -> bool {
        if let Some(author) = &self.author {
            if !article.author.to_lowercase().contains(author.as_str()) {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = article.date() else {
                return false;
            };
            if self.date_from.as_deref().is_some_and(|from| date < from) {
                return false;
            }
            if self.date_to.as_deref().is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(source) = &self.source {
            if !article.source.to_lowercase().contains(source.as_str()) {
                return false;
            }
        }

        if let Some(keyword) = &self.keyword {
            let haystack =
                format!("{}{}{}", article.title, article.description, article.content).to_lowercase();
            if !haystack.contains(keyword.as_str()) {
                return false;
            }
        }

        true
    }
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn lowered(value: &str) -> Option<String> {
    trimmed(value).map(|value| value.to_lowercase())
}

/// Sorted distinct values of `key` over the full list, for the filter dropdowns.
pub fn distinct_sorted<F>(articles: &[Article], key: F) -> Vec<String>
where
    F: Fn(&Article) -> &str,
{
    let mut values: Vec<String> = articles.iter().map(|a| key(a).to_string()).collect();
    values.sort();
    values.dedup();
    values
}
