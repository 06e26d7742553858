use anyhow::Context;
use diesel_async::AsyncPgConnection;

use rsvp_core::config::SeedConfig;
use rsvp_db::db::query::category as query;
use rsvp_service::category::{self as service, CategoryDraft};

use super::Seeder;

/// Makes sure every configured category exists and is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySeeder {
    names: Vec<String>,
}

impl CategorySeeder {
    /// Blank names are skipped and names differing only in case are kept once.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        let mut folded: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            let key = name.to_lowercase();
            if name.is_empty() || folded.contains(&key) {
                continue;
            }
            folded.push(key);
            unique.push(name);
        }
        Self { names: unique }
    }

    #[must_use]
    pub fn from_config(config: &SeedConfig) -> Self {
        Self::new(config.categories.iter().map(String::as_str))
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Seeder for CategorySeeder {
    async fn seed(&self, conn: &mut AsyncPgConnection) -> anyhow::Result<usize> {
        let mut written = 0;

        for name in &self.names {
            match query::find_by_name(conn, name).await? {
                Some(category) if category.active => {
                    tracing::debug!(category_id = category.id, %name, "Category already seeded");
                }
                Some(category) => {
                    service::set_category_active(conn, category.id, true)
                        .await
                        .with_context(|| format!("failed to reactivate category {name:?}"))?;
                    tracing::info!(category_id = category.id, %name, "Reactivated category");
                    written += 1;
                }
                None => {
                    let category = service::create_category(conn, &CategoryDraft::new(name, true))
                        .await
                        .with_context(|| format!("failed to seed category {name:?}"))?;
                    tracing::info!(category_id = category.id, %name, "Seeded category");
                    written += 1;
                }
            }
        }

        Ok(written)
    }
}
