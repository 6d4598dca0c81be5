//! Parameterized "changed since" query templates.

use std::path::Path;

use catalog_sync_shared::EntityKind;

use crate::errors::SourceError;

const LOAD_FILM_WORKS_SQL: &str = include_str!("../../queries/load_film_works.sql");
const LOAD_GENRES_SQL: &str = include_str!("../../queries/load_genres.sql");
const LOAD_PERSONS_SQL: &str = include_str!("../../queries/load_persons.sql");

/// A fixed query template with a single `dttm` parameter bound to `$1`.
///
/// Templates must select `id` and `modified`, filter on `modified > $1` and
/// order by `modified, id`. The reader appends the page bound itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefinition {
    name: String,
    sql: String,
}

impl QueryDefinition {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// The template shipped with the crate for `kind`.
    pub fn builtin(kind: EntityKind) -> Self {
        let sql = match kind {
            EntityKind::Film => LOAD_FILM_WORKS_SQL,
            EntityKind::Genre => LOAD_GENRES_SQL,
            EntityKind::Person => LOAD_PERSONS_SQL,
        };
        Self::new(format!("load_{}", kind.as_str()), sql)
    }

    /// File name of the template for `kind`, used to look up overrides.
    pub fn template_file_name(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Film => "load_film_works.sql",
            EntityKind::Genre => "load_genres.sql",
            EntityKind::Person => "load_persons.sql",
        }
    }

    /// Load a template from a `.sql` file; the file stem becomes its name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let sql = std::fs::read_to_string(path)
            .map_err(|e| SourceError::query(format!("Failed to read {}: {}", path.display(), e)))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, sql))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The statement actually executed: the template bounded by `$2` rows,
    /// each row rendered as one JSON object.
    pub fn bounded_sql(&self) -> String {
        let template = self.sql.trim().trim_end_matches(';').trim_end();
        format!(
            "SELECT to_jsonb(batch) AS row FROM ({}\nLIMIT $2) AS batch ORDER BY batch.modified, batch.id",
            template
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_templates_filter_and_order_by_modified() {
        for kind in EntityKind::ALL {
            let query = QueryDefinition::builtin(kind);
            assert!(query.sql().contains("modified > $1"), "{}", query.name());
            assert!(query.sql().contains("modified,"), "{}", query.name());
        }
        assert_eq!(QueryDefinition::builtin(EntityKind::Film).name(), "load_film_work");
    }

    #[test]
    fn test_bounded_sql_strips_trailing_semicolon() {
        let query = QueryDefinition::new(
            "genres",
            "SELECT id, modified FROM genre WHERE modified > $1 ORDER BY modified, id;\n",
        );

        let sql = query.bounded_sql();
        assert!(sql.starts_with("SELECT to_jsonb(batch) AS row FROM (SELECT id"));
        assert!(sql.contains("ORDER BY modified, id\nLIMIT $2) AS batch"));
        assert!(!sql.contains(';'));
    }

    #[test]
    fn test_from_file_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("load_custom.sql");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "SELECT id, modified FROM t WHERE modified > $1").unwrap();

        let query = QueryDefinition::from_file(&path).unwrap();
        assert_eq!(query.name(), "load_custom");
        assert!(query.sql().contains("FROM t"));
    }

    #[test]
    fn test_from_missing_file_is_query_error() {
        let result = QueryDefinition::from_file("/nonexistent/load.sql");
        assert!(matches!(result, Err(SourceError::QueryError(_))));
    }
}
