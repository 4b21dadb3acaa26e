pub mod suggestion;

pub use suggestion::TagSuggester;
