pub mod matcher;
pub mod search;
pub mod types;

pub use matcher::{aspects_for_positions, match_aspect, BodyLongitude, PairAspect};
pub use search::{
    multi_body_search, search_range, summarize, PairSummary, SearchSummary, Timeline, TimelineSample,
};
pub use types::{AspectDefinition, AspectKind, AspectMatch, AspectTable, OrbTable};
