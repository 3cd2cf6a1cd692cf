//! Core type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths;

/// One recorded compiler invocation for a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// Working directory of the invocation
    pub directory: PathBuf,
    /// Source filename exactly as recorded (may be relative to `directory`)
    pub filename: String,
    /// Full argument vector, program name first
    pub arguments: Vec<String>,
}

impl CompileCommand {
    /// Create a new compile command
    pub fn new(
        directory: impl Into<PathBuf>,
        filename: impl Into<String>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            arguments,
        }
    }

    /// Absolute, normalized path of the compiled source
    pub fn source_path(&self) -> PathBuf {
        paths::absolutize(&self.directory, &self.filename)
    }

    /// Arguments with every occurrence of the source filename removed
    pub fn arguments_without_source(&self) -> impl Iterator<Item = &String> {
        self.arguments.iter().filter(move |arg| **arg != self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_path_is_resolved_against_directory() {
        let command = CompileCommand::new(
            "/work/out",
            "../src/main.c",
            vec!["clang".into(), "-c".into(), "../src/main.c".into()],
        );

        assert_eq!(command.source_path(), PathBuf::from("/work/src/main.c"));
    }

    #[test]
    fn test_arguments_without_source() {
        let command = CompileCommand::new(
            "/work",
            "main.c",
            vec!["cc".into(), "-c".into(), "main.c".into(), "-o".into(), "main.o".into()],
        );

        let args: Vec<_> = command.arguments_without_source().cloned().collect();
        assert_eq!(args, vec!["cc", "-c", "-o", "main.o"]);
    }
}
