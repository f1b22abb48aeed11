pub mod deck;
pub mod picker;
pub mod view;

pub use deck::{Deck, DeckState};
pub use picker::TagPicker;
pub use view::{DeckView, Status, StatusKind};
