//! Data models shared between the layout editor and the label generators

pub mod label_layout;

pub use label_layout::*;
