mod element;

pub use element::ElementSource;
