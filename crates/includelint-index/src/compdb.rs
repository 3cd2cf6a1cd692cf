//! Compilation database
//!
//! Loads `compile_commands.json` and answers which compile command candidates
//! exist for a source file.

use includelint_core::{paths, CompileCommand, Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One entry of `compile_commands.json`
#[derive(Debug, Deserialize)]
struct Entry {
    directory: PathBuf,
    file: String,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    command: Option<String>,
}

impl Entry {
    fn into_command(self, base: &Path) -> Result<CompileCommand> {
        let arguments = match (self.arguments, self.command) {
            (Some(arguments), _) => arguments,
            (None, Some(command)) => shell_words::split(&command).map_err(|e| {
                Error::Config(format!("cannot split command for \"{}\": {}", self.file, e))
            })?,
            (None, None) => {
                return Err(Error::Config(format!(
                    "entry for \"{}\" has neither \"arguments\" nor \"command\"",
                    self.file
                )))
            }
        };

        let directory = if self.directory.is_absolute() {
            self.directory
        } else {
            paths::absolutize(base, &self.directory)
        };

        Ok(CompileCommand::new(directory, self.file, arguments))
    }
}

/// Compile command candidates indexed by absolute source path
#[derive(Debug, Default)]
pub struct CompilationDatabase {
    commands: HashMap<PathBuf, Vec<CompileCommand>>,
}

impl CompilationDatabase {
    /// Conventional file name of a compilation database
    pub const FILE_NAME: &'static str = "compile_commands.json";

    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from a `compile_commands.json` file or the directory holding one
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = if path.is_dir() {
            path.join(Self::FILE_NAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&file).map_err(|e| Error::config(&file, e))?;
        let base = paths::absolutize(
            &std::env::current_dir()?,
            file.parent().unwrap_or_else(|| Path::new(".")),
        );

        let database = Self::parse(&content, &base).map_err(|e| Error::config(&file, e))?;
        debug!("Loaded {} sources from {:?}", database.len(), file);
        Ok(database)
    }

    /// Parse database JSON; relative entry directories are resolved against `base`
    pub fn parse(json: &str, base: &Path) -> Result<Self> {
        let entries: Vec<Entry> = serde_json::from_str(json)?;

        let mut database = Self::new();
        for entry in entries {
            database.insert(entry.into_command(base)?);
        }

        Ok(database)
    }

    /// Build a database from already constructed commands
    pub fn from_commands(commands: impl IntoIterator<Item = CompileCommand>) -> Self {
        let mut database = Self::new();
        for command in commands {
            database.insert(command);
        }
        database
    }

    /// Add a candidate after those already recorded for its source
    pub fn insert(&mut self, command: CompileCommand) {
        self.commands
            .entry(command.source_path())
            .or_default()
            .push(command);
    }

    /// All candidates for an absolute source path, in database order
    pub fn commands_for(&self, source: &Path) -> &[CompileCommand] {
        self.commands
            .get(&paths::normalize(source))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct sources
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the database holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
