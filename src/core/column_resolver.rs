use crate::domain::model::{ColumnRef, ColumnResolution, ColumnRoles, RoleSource};
use crate::utils::error::{CertificateError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Name,
    Email,
    Activity,
}

impl Role {
    // priority order used when a header matches several keyword sets
    const PRIORITY: [Role; 3] = [Role::Name, Role::Email, Role::Activity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Name => "name",
            Role::Email => "email",
            Role::Activity => "activity",
        }
    }
}

/// Lower-case substrings that identify each role in a header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSets {
    pub name: Vec<String>,
    pub email: Vec<String>,
    pub activity: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            name: owned(&["nome completo", "name", "participante", "ultimo nome"]),
            email: owned(&["e-mail", "email", "mail"]),
            activity: owned(&["atividade", "evento", "workshop", "curso"]),
        }
    }
}

impl KeywordSets {
    fn for_role(&self, role: Role) -> &[String] {
        match role {
            Role::Name => &self.name,
            Role::Email => &self.email,
            Role::Activity => &self.activity,
        }
    }

    fn matches(&self, role: Role, lowered_header: &str) -> bool {
        self.for_role(role)
            .iter()
            .any(|keyword| lowered_header.contains(&keyword.to_lowercase()))
    }
}

/// Headers chosen by the user; each must exist in the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnOverrides {
    pub name: Option<String>,
    pub email: Option<String>,
    pub activity: Option<String>,
}

/// Last-resort column positions, used only when no header matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalFallback {
    pub name: usize,
    pub email: Option<usize>,
    pub activity: Option<usize>,
}

impl Default for PositionalFallback {
    fn default() -> Self {
        Self {
            name: 0,
            email: None,
            activity: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    keywords: KeywordSets,
    overrides: ColumnOverrides,
    fallback: PositionalFallback,
}

#[derive(Default)]
struct Slots {
    name: Option<(usize, RoleSource)>,
    email: Option<(usize, RoleSource)>,
    activity: Option<(usize, RoleSource)>,
}

impl Slots {
    fn get_mut(&mut self, role: Role) -> &mut Option<(usize, RoleSource)> {
        match role {
            Role::Name => &mut self.name,
            Role::Email => &mut self.email,
            Role::Activity => &mut self.activity,
        }
    }

    fn binds(&self, index: usize) -> bool {
        [self.name, self.email, self.activity]
            .iter()
            .flatten()
            .any(|(bound, _)| *bound == index)
    }
}

impl ColumnResolver {
    pub fn new(
        keywords: KeywordSets,
        overrides: ColumnOverrides,
        fallback: PositionalFallback,
    ) -> Self {
        Self {
            keywords,
            overrides,
            fallback,
        }
    }

    /// Assigns the name, email and activity roles to columns.
    ///
    /// Explicit overrides are bound first. The remaining columns are scanned
    /// left to right; each one is classified by the first role (in
    /// name → email → activity order) whose keywords occur in its lower-cased
    /// header, and takes that role only if it is still unassigned. A header
    /// classified as a filled role is ignored, never tried against the next
    /// role. When nothing matched the name role, the configured fallback
    /// position is used and a warning is logged.
    pub fn resolve(&self, headers: &[&str]) -> Result<ColumnResolution> {
        if headers.is_empty() {
            return Err(CertificateError::UnresolvableSchema {
                message: "table has no columns".to_string(),
            });
        }

        let mut slots = Slots::default();
        self.bind_explicit(headers, &mut slots)?;

        for (index, header) in headers.iter().enumerate() {
            if slots.binds(index) {
                continue;
            }
            let lowered = header.to_lowercase();
            let Some(role) = Role::PRIORITY
                .into_iter()
                .find(|role| self.keywords.matches(*role, &lowered))
            else {
                continue;
            };
            let slot = slots.get_mut(role);
            if slot.is_none() {
                tracing::debug!("Column '{}' detected as {}", header, role.as_str());
                *slot = Some((index, RoleSource::Keyword));
            }
        }

        if slots.name.is_none() {
            let index = self.fallback.name;
            if index >= headers.len() {
                return Err(CertificateError::UnresolvableSchema {
                    message: format!(
                        "no name column detected and fallback position {} is outside the {} columns",
                        index,
                        headers.len()
                    ),
                });
            }
            tracing::warn!(
                "⚠️ No name column detected, falling back to column {} ('{}')",
                index,
                headers[index]
            );
            slots.name = Some((index, RoleSource::Positional));
        }

        for (role, position) in [
            (Role::Email, self.fallback.email),
            (Role::Activity, self.fallback.activity),
        ] {
            let Some(index) = position else { continue };
            let slot = slots.get_mut(role);
            if slot.is_some() {
                continue;
            }
            if index < headers.len() {
                tracing::warn!(
                    "⚠️ No {} column detected, falling back to column {} ('{}')",
                    role.as_str(),
                    index,
                    headers[index]
                );
                *slot = Some((index, RoleSource::Positional));
            } else {
                tracing::warn!(
                    "⚠️ Fallback position {} for {} is outside the {} columns, ignoring",
                    index,
                    role.as_str(),
                    headers.len()
                );
            }
        }

        let column_ref = |index: usize| ColumnRef {
            index,
            header: headers[index].to_string(),
        };
        let (name_index, name_source) = slots.name.ok_or_else(|| {
            CertificateError::UnresolvableSchema {
                message: "no name column".to_string(),
            }
        })?;

        Ok(ColumnResolution {
            roles: ColumnRoles {
                name: column_ref(name_index),
                email: slots.email.map(|(i, _)| column_ref(i)),
                activity: slots.activity.map(|(i, _)| column_ref(i)),
            },
            name_source,
            email_source: slots.email.map(|(_, source)| source),
            activity_source: slots.activity.map(|(_, source)| source),
        })
    }

    fn bind_explicit(&self, headers: &[&str], slots: &mut Slots) -> Result<()> {
        for (role, wanted) in [
            (Role::Name, &self.overrides.name),
            (Role::Email, &self.overrides.email),
            (Role::Activity, &self.overrides.activity),
        ] {
            let Some(wanted) = wanted.as_deref().filter(|w| !w.is_empty()) else {
                continue;
            };
            let index = headers.iter().position(|h| *h == wanted).ok_or_else(|| {
                CertificateError::ColumnNotFound {
                    role: role.as_str().to_string(),
                    column: wanted.to_string(),
                }
            })?;
            *slots.get_mut(role) = Some((index, RoleSource::Explicit));
        }
        Ok(())
    }
}

/// Finds an optional column by exact header, failing if it was named but is absent.
pub fn find_column(headers: &[&str], role: &str, wanted: Option<&str>) -> Result<Option<ColumnRef>> {
    match wanted.filter(|w| !w.is_empty()) {
        None => Ok(None),
        Some(wanted) => headers
            .iter()
            .position(|h| *h == wanted)
            .map(|index| {
                Some(ColumnRef {
                    index,
                    header: wanted.to_string(),
                })
            })
            .ok_or_else(|| CertificateError::ColumnNotFound {
                role: role.to_string(),
                column: wanted.to_string(),
            }),
    }
}
