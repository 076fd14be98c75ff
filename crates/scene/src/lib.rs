//! Globe-side view state: hover/selection, picking, search and the info panel.

pub mod info_panel;
pub mod interaction;
pub mod picking;
pub mod search;

pub use info_panel::{InfoPanel, NOT_AVAILABLE, group_thousands};
pub use interaction::{
    Highlight, InteractionEvent, InteractionMode, InteractionState, InteractionUpdate,
};
pub use picking::PickIndex;
pub use search::search_countries;
