pub mod debounce;
pub mod dictionary;
pub mod encoding;
pub mod qa;
pub mod source;
