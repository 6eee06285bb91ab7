//! Rule-based Portuguese criteria extraction.
//!
//! The triage engine normally receives structured field updates from the
//! language layer alongside each turn. When a turn arrives without them,
//! this crate recovers what it can from the raw utterance: intent keywords,
//! counts, money mentions, known place names, and a handful of preference
//! lexicons. All matching happens on accent-folded lowercase text so
//! "Manaíra" and "manaira" behave the same.

pub mod money;
pub mod rules;
pub mod text;

pub use money::{parse_budget_range, BudgetRange};
pub use rules::RuleBasedExtractor;
pub use text::{fold, normalize};
