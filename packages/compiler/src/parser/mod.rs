//! Feature file parsing.
//!
//! Turns Gherkin text into `Feature` values whose scenario templates are
//! already expanded against their example tables.

mod feature;
pub mod outline;

pub use feature::{
    filter_by_tags, find_feature_files, parse_all_features, parse_feature, parse_feature_file,
    parse_target,
};
pub use outline::{substitute, substitute_step};
