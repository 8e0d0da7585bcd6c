use super::symbol::{Location, Span, Symbol};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Syntactic shape of a local member reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceForm {
    /// `receiver.name` or a bare identifier occurrence
    Access,
    /// `receiver.name(...)`
    Call,
    /// `receiver.name = ...`
    Assignment,
}

/// Evidence that a symbol is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reference {
    /// Occurrence inside the declaring file
    Local {
        span: Span,
        location: Location,
        form: ReferenceForm,
    },
    /// Another file that imports or accesses the symbol
    External { file: PathBuf },
}

impl Reference {
    pub fn external_file(&self) -> Option<&Path> {
        match self {
            Reference::External { file } => Some(file),
            Reference::Local { .. } => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Reference::Local { .. })
    }
}

/// Outcome of the project-wide phase for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExternalPhase {
    /// Local evidence was found, project search not needed
    Skipped,
    /// Visibility does not allow references from other files
    NotApplicable,
    /// Search ran; `matches` other files were found
    Searched { matches: usize },
    /// The search provider failed; verdict relies on local evidence only
    Degraded,
}

/// Used/unused determination for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct UsageVerdict {
    pub symbol: Symbol,
    pub references: Vec<Reference>,
    pub external: ExternalPhase,
    pub is_used: bool,
}

impl UsageVerdict {
    pub fn local(symbol: Symbol, references: Vec<Reference>, external: ExternalPhase) -> Self {
        let is_used = !references.is_empty();
        Self {
            symbol,
            references,
            external,
            is_used,
        }
    }

    /// Cross-file evidence supersedes local detail
    pub fn external(symbol: Symbol, files: Vec<PathBuf>) -> Self {
        let matches = files.len();
        let references: Vec<Reference> = files
            .into_iter()
            .map(|file| Reference::External { file })
            .collect();
        Self {
            symbol,
            is_used: matches > 0,
            references,
            external: ExternalPhase::Searched { matches },
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.external == ExternalPhase::Degraded
    }

    /// True when any external reference points at `file`
    pub fn references_file(&self, file: &Path) -> bool {
        self.references
            .iter()
            .filter_map(Reference::external_file)
            .any(|f| f == file)
    }

    pub fn local_references(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.is_local())
    }
}

/// Which analysis produced an unused item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Export,
    Member,
}

/// Record handed to the presentation layer for each unused symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedItem {
    pub category: ItemCategory,
    pub name: String,
    pub file: PathBuf,
    pub span: Span,
    pub location: Location,
    pub detail: String,
}

impl UnusedItem {
    pub fn from_verdict(verdict: &UsageVerdict) -> Self {
        let symbol = &verdict.symbol;
        Self {
            category: if symbol.is_member() {
                ItemCategory::Member
            } else {
                ItemCategory::Export
            },
            name: symbol.name.clone(),
            file: symbol.file.clone(),
            span: symbol.span,
            location: symbol.location,
            detail: symbol.detail(),
        }
    }
}
