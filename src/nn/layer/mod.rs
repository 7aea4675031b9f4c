mod batch_norm;
mod gru_cell;
mod linear;

pub use batch_norm::BatchNorm;
pub use gru_cell::GruCell;
pub use linear::Linear;
