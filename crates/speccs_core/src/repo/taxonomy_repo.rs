//! Taxonomy registry persistence.
//!
//! Tags live in `taxonomy_terms`, so new asset types, connection types and
//! journal actions are added as rows without schema changes.

use crate::model::taxonomy::TaxonomyCategory;
use crate::repo::error::{ConstraintViolation, StoreError, StoreResult};
use crate::repo::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// One registered tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyTerm {
    pub category: TaxonomyCategory,
    pub tag: String,
    pub description: String,
    /// Seeded by migration; cannot be re-registered.
    pub is_builtin: bool,
    pub created_at: i64,
}

/// Repository interface for the taxonomy registry.
pub trait TaxonomyRepository {
    fn register_term(
        &self,
        category: TaxonomyCategory,
        tag: &str,
        description: &str,
    ) -> StoreResult<TaxonomyTerm>;
    fn list_terms(&self, category: TaxonomyCategory) -> StoreResult<Vec<TaxonomyTerm>>;
    fn is_registered(&self, category: TaxonomyCategory, tag: &str) -> StoreResult<bool>;
}

/// SQLite-backed taxonomy registry.
pub struct SqliteTaxonomyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaxonomyRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_term(&self, category: TaxonomyCategory, tag: &str) -> StoreResult<Option<TaxonomyTerm>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, tag, description, is_builtin, created_at
             FROM taxonomy_terms
             WHERE category = ?1 AND tag = ?2;",
        )?;
        let mut rows = stmt.query(params![category.as_str(), tag])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_term_row(row)?));
        }
        Ok(None)
    }
}

impl TaxonomyRepository for SqliteTaxonomyRepository<'_> {
    fn register_term(
        &self,
        category: TaxonomyCategory,
        tag: &str,
        description: &str,
    ) -> StoreResult<TaxonomyTerm> {
        let tag = tag.trim();
        category.validate_tag(tag)?;

        if self.is_registered(category, tag)? {
            return Err(ConstraintViolation::DuplicateTerm {
                category,
                tag: tag.to_string(),
            }
            .into());
        }

        self.conn.execute(
            "INSERT INTO taxonomy_terms (category, tag, description, is_builtin)
             VALUES (?1, ?2, ?3, 0);",
            params![category.as_str(), tag, description.trim()],
        )?;

        self.get_term(category, tag)?.ok_or_else(|| {
            StoreError::InvalidData(format!("registered term `{tag}` could not be read back"))
        })
    }

    fn list_terms(&self, category: TaxonomyCategory) -> StoreResult<Vec<TaxonomyTerm>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, tag, description, is_builtin, created_at
             FROM taxonomy_terms
             WHERE category = ?1
             ORDER BY is_builtin DESC, tag ASC;",
        )?;
        let mut rows = stmt.query([category.as_str()])?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next()? {
            terms.push(parse_term_row(row)?);
        }
        Ok(terms)
    }

    fn is_registered(&self, category: TaxonomyCategory, tag: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM taxonomy_terms WHERE category = ?1 AND tag = ?2;",
                params![category.as_str(), tag.trim()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn parse_term_row(row: &Row<'_>) -> StoreResult<TaxonomyTerm> {
    let category_text: String = row.get("category")?;
    let category = TaxonomyCategory::parse(&category_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in taxonomy_terms.category"
        ))
    })?;
    let is_builtin = match row.get::<_, i64>("is_builtin")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_builtin value `{other}` in taxonomy_terms.is_builtin"
            )));
        }
    };
    Ok(TaxonomyTerm {
        category,
        tag: row.get("tag")?,
        description: row.get("description")?,
        is_builtin,
        created_at: row.get("created_at")?,
    })
}
