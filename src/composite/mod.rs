pub mod background;
pub mod blend;
pub mod plan;
