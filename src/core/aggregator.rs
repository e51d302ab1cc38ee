use crate::domain::model::{
    ColumnRef, ColumnResolution, CustomEntry, ParticipantSummary, RoleSource, Table,
};
use crate::utils::error::{CertificateError, Result};
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_HOURS_PER_RECORD: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct ParticipationAggregator {
    hours_per_record: f64,
    normalize_names: bool,
}

impl Default for ParticipationAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_HOURS_PER_RECORD)
    }
}

impl ParticipationAggregator {
    pub fn new(hours_per_record: f64) -> Self {
        Self {
            hours_per_record,
            normalize_names: false,
        }
    }

    /// Trim names before grouping. Case is always kept as-is.
    pub fn with_normalized_names(mut self, normalize: bool) -> Self {
        self.normalize_names = normalize;
        self
    }

    /// One summary per distinct name, in first-occurrence order.
    ///
    /// Rows with a missing name are dropped. Every remaining row adds
    /// `hours_per_record` to its participant; the email is taken from the
    /// participant's first row and activities are collected as a set.
    pub fn aggregate(
        &self,
        table: &Table,
        resolution: &ColumnResolution,
    ) -> Result<Vec<ParticipantSummary>> {
        let roles = &resolution.roles;
        let rows = identity_rows(table, &roles.name, self.normalize_names);

        if rows.is_empty()
            && !table.is_empty()
            && resolution.name_source == RoleSource::Positional
        {
            return Err(CertificateError::MissingIdentityColumn {
                column: roles.name.header.clone(),
            });
        }

        let mut summaries: Vec<ParticipantSummary> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (row, name) in rows {
            let position = match positions.get(&name) {
                Some(&position) => position,
                None => {
                    let email = roles
                        .email
                        .as_ref()
                        .and_then(|c| table.cell(row, c.index).as_text());
                    summaries.push(ParticipantSummary {
                        name: name.clone(),
                        total_hours: 0.0,
                        email,
                        activities: BTreeSet::new(),
                        records: 0,
                    });
                    positions.insert(name, summaries.len() - 1);
                    summaries.len() - 1
                }
            };

            let summary = &mut summaries[position];
            summary.records += 1;
            if let Some(activity) = roles
                .activity
                .as_ref()
                .and_then(|c| table.cell(row, c.index).as_text())
            {
                summary.activities.insert(activity);
            }
        }

        for summary in summaries.iter_mut() {
            summary.total_hours = summary.records as f64 * self.hours_per_record;
        }

        tracing::debug!(
            "Aggregated {} rows into {} participants",
            summaries.iter().map(|s| s.records).sum::<usize>(),
            summaries.len()
        );
        Ok(summaries)
    }
}

/// Rows of a custom-text batch: every row with a name, in table order. Names
/// are trimmed; `text_column` cells replace the template when present.
pub fn custom_entries(
    table: &Table,
    name: &ColumnRef,
    text_column: Option<&ColumnRef>,
) -> Vec<CustomEntry> {
    identity_rows(table, name, true)
        .into_iter()
        .map(|(row, name)| CustomEntry {
            name,
            override_text: text_column.and_then(|c| table.cell(row, c.index).as_text()),
        })
        .collect()
}

fn identity_rows(table: &Table, name: &ColumnRef, trim: bool) -> Vec<(usize, String)> {
    (0..table.row_count())
        .filter_map(|row| {
            table.cell(row, name.index).as_text().map(|text| {
                if trim {
                    (row, text.trim().to_string())
                } else {
                    (row, text)
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::column_resolver::ColumnResolver;
    use crate::domain::model::CellValue;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
                .collect(),
        )
    }

    fn summarize(table: &Table) -> Result<Vec<ParticipantSummary>> {
        let resolution = ColumnResolver::default().resolve(&table.headers())?;
        ParticipationAggregator::default().aggregate(table, &resolution)
    }

    #[test]
    fn test_groups_repeated_attendance() {
        let table = table(
            &["Full Name", "E-mail", "Atividade"],
            &[
                &["Ana Silva", "ana@example.com", "Workshop A"],
                &["Bruno", "bruno@example.com", ""],
                &["Ana Silva", "ana.other@example.com", "Workshop A"],
            ],
        );
        let summaries = summarize(&table).unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Ana Silva");
        assert_eq!(summaries[0].total_hours, 4.0);
        assert_eq!(summaries[0].email.as_deref(), Some("ana@example.com"));
        assert_eq!(summaries[0].activities_text(), "Workshop A");
        assert_eq!(summaries[1].name, "Bruno");
        assert_eq!(summaries[1].total_hours, 2.0);
        assert_eq!(summaries[1].activities_text(), "");
    }

    #[test]
    fn test_hours_invariant_and_partition() {
        let table = table(
            &["Nome completo", "Curso"],
            &[
                &["Carla", "B"],
                &["", "A"],
                &["Davi", "A"],
                &["Carla", "A"],
                &["Carla", "B"],
                &["  ", "C"],
            ],
        );
        let resolution = ColumnResolver::default().resolve(&table.headers()).unwrap();
        let summaries = ParticipationAggregator::new(1.5)
            .aggregate(&table, &resolution)
            .unwrap();

        let filtered_rows = 4;
        let total: f64 = summaries.iter().map(|s| s.total_hours).sum();
        assert_eq!(total, filtered_rows as f64 * 1.5);
        assert_eq!(summaries.iter().map(|s| s.records).sum::<usize>(), filtered_rows);
        assert!(summaries.iter().all(|s| s.records >= 1));
        assert_eq!(summaries[0].activities_text(), "A, B");
    }

    #[test]
    fn test_activity_rendering_ignores_input_order() {
        let forward = table(
            &["Name", "Evento"],
            &[&["Eva", "Zeta"], &["Eva", "Alfa"], &["Eva", "Meio"]],
        );
        let backward = table(
            &["Name", "Evento"],
            &[&["Eva", "Meio"], &["Eva", "Alfa"], &["Eva", "Zeta"], &["Eva", "Alfa"]],
        );
        assert_eq!(
            summarize(&forward).unwrap()[0].activities_text(),
            summarize(&backward).unwrap()[0].activities_text()
        );
        assert_eq!(summarize(&forward).unwrap()[0].activities_text(), "Alfa, Meio, Zeta");
    }

    #[test]
    fn test_exact_name_grouping_by_default() {
        let table = table(&["Name"], &[&["Ana"], &["ana"], &["Ana "]]);
        assert_eq!(summarize(&table).unwrap().len(), 3);

        let resolution = ColumnResolver::default().resolve(&table.headers()).unwrap();
        let trimmed = ParticipationAggregator::default()
            .with_normalized_names(true)
            .aggregate(&table, &resolution)
            .unwrap();
        assert_eq!(trimmed.len(), 2);
    }

    #[test]
    fn test_empty_table_yields_no_summaries() {
        let table = table(&["Full Name", "E-mail"], &[]);
        assert!(summarize(&table).unwrap().is_empty());
    }

    #[test]
    fn test_all_blank_fallback_column_is_missing_identity() {
        let table = table(&["x", "y"], &[&["", "1"], &["", "2"]]);
        assert!(matches!(
            summarize(&table),
            Err(CertificateError::MissingIdentityColumn { .. })
        ));
    }

    #[test]
    fn test_custom_entries_trim_and_override() {
        let table = table(
            &["Aluno", "Texto"],
            &[&[" Ana ", ""], &["", "ignored"], &["Bruno", "Texto próprio"]],
        );
        let name = ColumnRef {
            index: 0,
            header: "Aluno".to_string(),
        };
        let text = ColumnRef {
            index: 1,
            header: "Texto".to_string(),
        };
        let entries = custom_entries(&table, &name, Some(&text));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Ana");
        assert_eq!(entries[0].override_text, None);
        assert_eq!(entries[1].override_text.as_deref(), Some("Texto próprio"));
    }
}
