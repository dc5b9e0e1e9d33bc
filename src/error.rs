use std::path::PathBuf;

use thiserror::Error;

/// Netlist read and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlifError {
    #[error("file {0} does not exist")]
    FileNotFound(PathBuf),
    #[error("file {0} is not accessible: {1}")]
    FileNotAccessible(PathBuf, String),
    #[error("file {0} is empty")]
    FileEmpty(PathBuf),
    #[error("neither .inputs nor .outputs found")]
    MissingDirective,
    #[error(".inputs and .outputs are both empty")]
    EmptyDeclaration,
    #[error("duplicate name {name} in {directive}")]
    DuplicateDeclaredName { directive: String, name: String },
    #[error("{0} is declared both in .inputs and .outputs")]
    DeclarationOverlap(String),
    #[error("incomplete cell {directive}: {reason} (near '{near}')")]
    IncompleteCell {
        directive: String,
        reason: String,
        near: String,
    },
    #[error("no cells could be derived from the netlist")]
    IncompleteDesign,
    #[error("input port {0} is driven by a fabric cell")]
    InputContactsFabricDriver(String),
    #[error("output port {0} is consumed as a fabric cell input")]
    OutputContactsFabricInput(String),
    #[error("output {0} of fabric cell is not consumed")]
    DanglingCellOutput(String),
    #[error("input port {0} is not consumed")]
    DanglingInputPort(String),
    #[error("output port {0} is not driven")]
    UndrivenOutputPort(String),
}

/// An error at a logical line of the netlist being read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {error}")]
pub struct LineError {
    /// 0 when the error has no line
    pub line: usize,
    pub error: BlifError,
}

impl LineError {
    pub fn new(line: usize, error: BlifError) -> Self {
        Self { line, error }
    }

    pub fn in_file(self, file: impl Into<PathBuf>) -> Diagnostic {
        Diagnostic::new(file, self.line, self.error)
    }
}

impl From<BlifError> for LineError {
    fn from(error: BlifError) -> Self {
        Self::new(0, error)
    }
}

/// A located error, as surfaced to the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}:{line}: {error}", .file.display())]
pub struct Diagnostic {
    pub file: PathBuf,
    /// Logical line number, 0 when the error has no line
    pub line: usize,
    pub error: BlifError,
}

impl Diagnostic {
    pub fn new(file: impl Into<PathBuf>, line: usize, error: BlifError) -> Self {
        Self {
            file: file.into(),
            line,
            error,
        }
    }
}
