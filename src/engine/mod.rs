//! The engine: owns the catalog, drives statements through the parser and
//! evaluator, and persists whole-file on every mutation (§5, §6).

pub mod config;

pub use config::{Config, LogLevel};

use std::path::PathBuf;

use tracing::debug;

use crate::catalog::Catalog;
use crate::codec;
use crate::format::format_result;
use crate::parser::ast::Statement;
use crate::parser::parse_statement;
use crate::query::{evaluate, EvalResult};

/// Single-threaded, synchronous embedded engine (§5). No `async`, no shared
/// ownership: `execute` takes `&mut self` directly and a mutating statement
/// blocks the caller on a full file rewrite when a file path is configured.
pub struct Engine {
    catalog: Catalog,
    config: Config,
}

impl Engine {
    /// Loads `config.file_path` if it exists; otherwise starts with an empty
    /// catalog, persisting to that path on first save (§6 "Engine
    /// construction"). With no file path configured, the engine is
    /// in-memory only.
    pub fn new(config: Config) -> crate::error::SqlResult<Self> {
        config.validate()?;
        let catalog = match &config.file_path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading existing database file");
                codec::load_from_path(path, config.btree_order)?
            }
            _ => Catalog::new(config.btree_order),
        };
        Ok(Engine { catalog, config })
    }

    pub fn in_memory(btree_order: usize) -> crate::error::SqlResult<Self> {
        Engine::new(Config {
            btree_order,
            ..Config::default()
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        self.config.file_path.as_ref()
    }

    /// Parses, evaluates, and formats `sql` (§6 "Query entry point"). Any
    /// failure anywhere in the pipeline is caught here and rendered as
    /// `"Error: <message>"` rather than propagated to the caller.
    pub fn execute(&mut self, sql: &str) -> String {
        match self.execute_inner(sql) {
            Ok(result) => format_result(&result),
            Err(e) => format!("Error: {e}"),
        }
    }

    fn execute_inner(&mut self, sql: &str) -> crate::error::SqlResult<EvalResult> {
        let statement = parse_statement(sql, &self.catalog)?;
        let result = evaluate(&statement, &mut self.catalog)?;
        if is_mutating(&statement) {
            self.persist()?;
        }
        Ok(result)
    }

    fn persist(&self) -> crate::error::SqlResult<()> {
        if let Some(path) = &self.config.file_path {
            debug!(path = %path.display(), "rewriting database file");
            codec::save_to_path(&self.catalog, path)?;
        }
        Ok(())
    }
}

/// SELECT is read-only; every other statement kind mutates the catalog and
/// triggers a whole-file rewrite when persistence is configured (§4.2).
fn is_mutating(statement: &Statement) -> bool {
    !matches!(statement, Statement::Select(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_engine_round_trips_a_table() {
        let mut engine = Engine::in_memory(4).unwrap();
        engine.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR)");
        engine.execute("INSERT INTO users VALUES (1, 'Alice')");
        let out = engine.execute("SELECT name FROM users WHERE id = 1");
        assert!(out.contains("Alice"));
    }

    #[test]
    fn errors_are_rendered_as_error_strings() {
        let mut engine = Engine::in_memory(4).unwrap();
        let out = engine.execute("SELECT * FROM ghost");
        assert!(out.starts_with("Error:"));
    }

    #[test]
    fn mutations_persist_across_engine_instances() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut engine = Engine::new(Config {
            file_path: Some(path.clone()),
            ..Config::default()
        })
        .unwrap();
        engine.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR)");
        engine.execute("INSERT INTO users VALUES (1, 'Alice')");
        drop(engine);

        let mut reopened = Engine::new(Config {
            file_path: Some(path),
            ..Config::default()
        })
        .unwrap();
        let out = reopened.execute("SELECT name FROM users WHERE id = 1");
        assert!(out.contains("Alice"));
    }

    #[test]
    fn select_does_not_trigger_a_rewrite_without_a_path() {
        let mut engine = Engine::in_memory(4).unwrap();
        engine.execute("CREATE TABLE t (id INT PRIMARY KEY)");
        assert!(engine.execute("SELECT * FROM t").contains("No rows returned"));
    }
}
