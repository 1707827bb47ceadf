pub mod ear;
pub mod frequency;
pub mod tri_state;
