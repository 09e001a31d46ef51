pub mod defaults;
pub mod labels;
pub mod manifest;
