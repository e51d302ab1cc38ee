use crate::domain::model::{CertificateText, CustomEntry, ParticipantSummary};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WRAP_WIDTH: usize = 80;
pub const DEFAULT_ACTIVITY_THRESHOLD: usize = 100;
pub const DEFAULT_TITLE: &str = "CERTIFICADO";
pub const DEFAULT_SALUTATION: &str = "Certificamos que";
pub const DEFAULT_ORGANIZATION: &str = "Associação Allos";
pub const DEFAULT_LOCATION: &str = "Belo Horizonte";

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Phrasing of the presence certificate body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStyle {
    /// Period and total hours only.
    #[default]
    Summary,
    /// Lists the activities when they fit under the threshold.
    Detailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceDetails {
    pub organization: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub issue_date: String,
    pub style: BodyStyle,
    pub activity_threshold: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomTemplate {
    pub template: Option<String>,
    pub placeholders: Vec<String>,
    pub footer: Option<String>,
}

impl CustomTemplate {
    pub fn new(template: Option<String>) -> Self {
        Self {
            template,
            placeholders: default_placeholders(),
            footer: None,
        }
    }

    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer.filter(|f| !f.trim().is_empty());
        self
    }

    /// Override text is used verbatim; otherwise every placeholder in the
    /// template is replaced by the name in a single pass, so placeholder
    /// tokens inside the name are left alone.
    pub fn body_for(&self, entry: &CustomEntry) -> String {
        if let Some(text) = &entry.override_text {
            return text.clone();
        }
        let Some(template) = &self.template else {
            return String::new();
        };
        match self.pattern() {
            Some(pattern) => pattern
                .replace_all(template, regex::NoExpand(&entry.name))
                .into_owned(),
            None => template.clone(),
        }
    }

    fn pattern(&self) -> Option<Regex> {
        let mut placeholders: Vec<&str> = self
            .placeholders
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();
        if placeholders.is_empty() {
            return None;
        }
        // longest first, so `{nome_completo}` wins over `{nome}`
        placeholders.sort_by_key(|p| std::cmp::Reverse(p.len()));
        let alternation = placeholders
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation)
            .map_err(|e| tracing::warn!("⚠️ Unusable placeholders, template kept as-is: {}", e))
            .ok()
    }
}

pub fn default_placeholders() -> Vec<String> {
    vec!["{name}".to_string(), "{nome}".to_string()]
}

#[derive(Debug, Clone)]
pub struct CertificateComposer {
    title: String,
    salutation: String,
    wrap_width: usize,
}

impl Default for CertificateComposer {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_SALUTATION, DEFAULT_WRAP_WIDTH)
    }
}

impl CertificateComposer {
    pub fn new(title: &str, salutation: &str, wrap_width: usize) -> Self {
        Self {
            title: title.to_string(),
            salutation: salutation.to_string(),
            wrap_width,
        }
    }

    pub fn compose_presence(
        &self,
        summary: &ParticipantSummary,
        details: &PresenceDetails,
    ) -> CertificateText {
        let body = presence_body(summary, details);
        let footer = match (details.location.trim(), details.issue_date.trim()) {
            ("", "") => None,
            ("", date) => Some(date.to_string()),
            (location, "") => Some(location.to_string()),
            (location, date) => Some(format!("{}, {}", location, date)),
        };
        self.assemble(&summary.name, &body, footer)
    }

    pub fn compose_custom(&self, entry: &CustomEntry, template: &CustomTemplate) -> CertificateText {
        let body = template.body_for(entry);
        self.assemble(&entry.name, &body, template.footer.clone())
    }

    fn assemble(&self, name: &str, body: &str, footer: Option<String>) -> CertificateText {
        CertificateText {
            name: name.to_string(),
            title: self.title.clone(),
            salutation: self.salutation.clone(),
            body_lines: wrap_text(body, self.wrap_width),
            footer,
        }
    }
}

pub fn presence_body(summary: &ParticipantSummary, details: &PresenceDetails) -> String {
    let hours = summary.whole_hours();
    let organization = &details.organization;
    match details.style {
        BodyStyle::Summary => format!(
            "Participou das atividades realizadas pela {} no período de {} a {}, com carga horária total de {} horas.",
            organization, details.start, details.end, hours
        ),
        BodyStyle::Detailed => {
            let activities = summary.activities_text();
            if !activities.is_empty() && activities.chars().count() <= details.activity_threshold {
                format!(
                    "Participou das seguintes atividades ministradas pela {}: {}, realizadas de {} a {}, totalizando carga horária de {} horas.",
                    organization, activities, details.start, details.end, hours
                )
            } else {
                format!(
                    "Participou de atividades de formação ministradas pela {}, realizadas de {} a {}, totalizando carga horária de {} horas.",
                    organization, details.start, details.end, hours
                )
            }
        }
    }
}

/// Greedy word wrap by character count.
///
/// Words are never split, so a word longer than `max_chars` ends up alone on
/// an overflowing line. Line breaks in the input start a new line; blank
/// lines are dropped.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// `YYYY-MM-DD` becomes `dd/mm/YYYY`; anything else is kept as typed.
pub fn format_period_date(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => value.trim().to_string(),
    }
}

/// Long-form Portuguese date, e.g. `14 de outubro de 2026`.
pub fn format_issue_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}
