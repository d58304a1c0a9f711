//! CSV and PDF downloads of the filtered article list and the payout table.

use crate::models::Article;
use crate::payout::PayoutRow;
use genpdf::elements::{Break, Paragraph};
use genpdf::style::Style;
use genpdf::{Document, Element, SimplePageDecorator};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fonts unavailable in {dir}: {reason}")]
    FontsUnavailable { dir: String, reason: String },

    #[error("PDF error: {0}")]
    Pdf(#[from] genpdf::error::Error),
}

/// How PDF output lays out each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfLines {
    /// `1. <first column>`
    Numbered,
    /// All cells joined with ` | `.
    Joined,
}

/// A titled table whose rows line up with `headers`.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub file_stem: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Option<Vec<String>>,
    pub pdf_lines: PdfLines,
}

impl Report {
    fn footer_text(&self) -> Option<String> {
        let cells: Vec<&str> = self
            .footer
            .as_ref()?
            .iter()
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
            .collect();
        Some(cells.join(": "))
    }

    fn pdf_line(&self, index: usize, row: &[String]) -> String {
        match self.pdf_lines {
            PdfLines::Numbered => format!("{}. {}", index + 1, row.first().map_or("", String::as_str)),
            PdfLines::Joined => row.join(" | "),
        }
    }
}

pub const ARTICLE_HEADERS: [&str; 7] = [
    "Title",
    "Author",
    "Source",
    "Published At",
    "Description",
    "Content",
    "URL",
];

pub const PAYOUT_HEADERS: [&str; 4] = ["Author", "Articles", "Payout Rate", "Total Payout"];

pub fn articles_report(articles: &[Article]) -> Report {
    Report {
        title: "News Report".to_string(),
        file_stem: "report",
        headers: ARTICLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: articles
            .iter()
            .map(|a| {
                vec![
                    a.title.clone(),
                    a.author.clone(),
                    a.source.clone(),
                    a.published_at.clone().unwrap_or_default(),
                    a.description.clone(),
                    a.content.clone(),
                    a.url.clone().unwrap_or_default(),
                ]
            })
            .collect(),
        footer: None,
        pdf_lines: PdfLines::Numbered,
    }
}

pub fn payout_report(rows: &[PayoutRow], total_payout: f64) -> Report {
    Report {
        title: "Payout Report".to_string(),
        file_stem: "payouts",
        headers: PAYOUT_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.author.clone(),
                    row.count.to_string(),
                    row.rate.to_string(),
                    row.total.to_string(),
                ]
            })
            .collect(),
        footer: Some(vec![
            String::new(),
            String::new(),
            "Total".to_string(),
            total_payout.to_string(),
        ]),
        pdf_lines: PdfLines::Joined,
    }
}

/// Serializes a report into a downloadable document.
pub trait Exporter: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
    fn export(&self, report: &Report) -> Result<Vec<u8>, ExportError>;

    fn file_name(&self, report: &Report) -> String {
        format!("{}.{}", report.file_stem, self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn export(&self, report: &Report) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&report.headers)?;
        for row in &report.rows {
            writer.write_record(row)?;
        }
        if let Some(footer) = &report.footer {
            writer.write_record(footer)?;
        }
        writer.into_inner().map_err(|err| ExportError::Io(err.into_error()))
    }
}

pub struct PdfExporter {
    pub font_dir: PathBuf,
    pub font_family: String,
}

impl PdfExporter {
    fn document(&self, title: &str) -> Result<Document, ExportError> {
        let family = genpdf::fonts::from_files(&self.font_dir, &self.font_family, None).map_err(|err| {
            ExportError::FontsUnavailable {
                dir: self.font_dir.display().to_string(),
                reason: err.to_string(),
            }
        })?;

        let mut doc = Document::new(family);
        doc.set_title(title);
        doc.set_font_size(10);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

impl Exporter for PdfExporter {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn export(&self, report: &Report) -> Result<Vec<u8>, ExportError> {
        let mut doc = self.document(&report.title)?;
        doc.push(Paragraph::new(report.title.as_str()).styled(Style::new().bold().with_font_size(14)));
        doc.push(Break::new(1));

        for (index, row) in report.rows.iter().enumerate() {
            doc.push(Paragraph::new(report.pdf_line(index, row)));
        }

        if let Some(footer) = report.footer_text() {
            doc.push(Break::new(1));
            doc.push(Paragraph::new(footer).styled(Style::new().bold()));
        }

        let mut bytes = Vec::new();
        doc.render(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawArticle, RawSource};

    fn rows() -> Vec<PayoutRow> {
        vec![
            PayoutRow {
                author: "Ann".to_string(),
                count: 2,
                rate: 10.0,
                total: 20.0,
            },
            PayoutRow {
                author: "Smith, Bob".to_string(),
                count: 1,
                rate: 2.5,
                total: 2.5,
            },
        ]
    }

    #[test]
    fn payout_csv_has_headers_rows_and_total() {
        let report = payout_report(&rows(), 22.5);
        let csv = String::from_utf8(CsvExporter.export(&report).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "Author,Articles,Payout Rate,Total Payout",
                "Ann,2,10,20",
                "\"Smith, Bob\",1,2.5,2.5",
                ",,Total,22.5",
            ]
        );
        assert_eq!(CsvExporter.file_name(&report), "payouts.csv");
    }

    #[test]
    fn article_rows_match_header_width() {
        let articles = vec![Article::from(RawArticle {
            title: Some("Headline".to_string()),
            source: Some(RawSource {
                name: Some("Wire".to_string()),
            }),
            ..RawArticle::default()
        })];
        let report = articles_report(&articles);
        assert!(report.rows.iter().all(|row| row.len() == report.headers.len()));
        assert_eq!(report.rows[0][1], "Unknown");
        assert_eq!(report.rows[0][2], "Wire");

        let csv = String::from_utf8(CsvExporter.export(&report).unwrap()).unwrap();
        assert_eq!(
            csv.lines().next(),
            Some("Title,Author,Source,Published At,Description,Content,URL")
        );
        assert_eq!(CsvExporter.file_name(&report), "report.csv");
    }

    #[test]
    fn pdf_lines_follow_report_kind() {
        let articles = articles_report(&[Article::from(RawArticle {
            title: Some("First".to_string()),
            ..RawArticle::default()
        })]);
        assert_eq!(articles.pdf_line(0, &articles.rows[0]), "1. First");

        let payouts = payout_report(&rows(), 22.5);
        assert_eq!(payouts.pdf_line(0, &payouts.rows[0]), "Ann | 2 | 10 | 20");
        assert_eq!(payouts.footer_text().as_deref(), Some("Total: 22.5"));
    }

    #[test]
    fn pdf_without_fonts_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter {
            font_dir: dir.path().to_path_buf(),
            font_family: "LiberationSans".to_string(),
        };
        let err = exporter.export(&payout_report(&rows(), 22.5)).unwrap_err();
        assert!(matches!(err, ExportError::FontsUnavailable { .. }));
    }

    const SYSTEM_FONTS: &str = "/usr/share/fonts/truetype/dejavu";

    /// Copies the DejaVu Serif faces into `<dir>/LiberationSans-*.ttf`, or
    /// returns `None` when the system fonts are not installed.
    fn font_fixture() -> Option<tempfile::TempDir> {
        let dir = tempfile::tempdir().unwrap();
        let faces = [
            ("DejaVuSerif.ttf", "Regular"),
            ("DejaVuSerif-Bold.ttf", "Bold"),
            ("DejaVuSerif-Italic.ttf", "Italic"),
            ("DejaVuSerif-BoldItalic.ttf", "BoldItalic"),
        ];
        for (source, style) in faces {
            let target = dir.path().join(format!("LiberationSans-{style}.ttf"));
            std::fs::copy(std::path::Path::new(SYSTEM_FONTS).join(source), target).ok()?;
        }
        Some(dir)
    }

    #[test]
    fn pdf_renders_both_reports() {
        let Some(fonts) = font_fixture() else {
            eprintln!("skipping: no fonts under {SYSTEM_FONTS}");
            return;
        };
        let exporter = PdfExporter {
            font_dir: fonts.path().to_path_buf(),
            font_family: "LiberationSans".to_string(),
        };
        let articles: Vec<Article> = (0..25)
            .map(|i| {
                Article::from(RawArticle {
                    title: Some(format!("Headline {i}")),
                    ..RawArticle::default()
                })
            })
            .collect();

        for report in [
            articles_report(&[]),
            articles_report(&articles),
            payout_report(&[], 0.0),
            payout_report(&rows(), 22.5),
        ] {
            let bytes = exporter.export(&report).unwrap();
            assert!(bytes.starts_with(b"%PDF"), "{} with {} rows", report.title, report.rows.len());
        }
        assert_eq!(exporter.file_name(&payout_report(&rows(), 22.5)), "payouts.pdf");
    }

    #[test]
    fn export_format_parses() {
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("pdf".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
