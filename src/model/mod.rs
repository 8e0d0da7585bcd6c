mod symbol;
mod verdict;

pub use symbol::{AccessLevel, Location, Origin, Span, Symbol, SymbolKind};
pub use verdict::{ExternalPhase, ItemCategory, Reference, ReferenceForm, UnusedItem, UsageVerdict};
