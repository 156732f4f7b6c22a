//! Digit analysis for private telephony dial plans.
//!
//! A dial plan is a set of [`Pattern`]s (directory numbers, translation
//! rules, route patterns), each living in a partition. [`DaTree`] indexes the
//! patterns in a trie of digit classes and answers two questions:
//!
//! - [`DaTree::lookup`]: which pattern does a caller with a given
//!   [`Visibility`] reach when dialing these digits? Translation rules are
//!   applied along the way.
//! - [`DaTree::find_leaves`]: which dial strings can that caller reach at all?
//!
//! ```
//! use dialwise::{DaTree, Pattern, TranslationRule, Visibility};
//!
//! let tree = DaTree::from_patterns([
//!     Pattern::directory_number("\\+14085551001", "DN"),
//!     Pattern::translation(
//!         "10XX",
//!         "SJC",
//!         TranslationRule { use_originator_visibility: true, mask: "+14085551XXX".into(), ..Default::default() },
//!     ),
//! ])
//! .unwrap();
//!
//! let found = tree.lookup("1001", &Visibility::parse("DN:SJC")).unwrap();
//! assert_eq!(found.patterns[0].text, "\\+14085551001");
//! ```

#[macro_use]
mod macros;
mod api;
mod digits;
pub mod engine;
mod error;
pub mod loader;
mod pattern;
mod translate;
mod visibility;

pub use api::{
    ANALYSIS_DEPTH, AbbreviatedDial, BuildOptions, BuildResult, InvalidPatternPolicy, LookupOptions,
    MAX_TRANSLATION_DEPTH, abbreviated_dialing, build,
};
pub use digits::{DigitClass, DigitCursor, DigitSet, parse_pattern};
pub use engine::{
    BuildMetrics, DaNode, DaTree, Descend, Leaf, LeafQuery, LookupResult, NodeId, NodeMatch, PatternId,
    TranslationFailure, TranslationHop,
};
pub use error::DialPlanError;
pub use pattern::{Pattern, PatternBody, PatternKind, PatternKinds, TranslationRule};
pub use translate::Translation;
pub use visibility::{NONE_PARTITION, Visibility};
