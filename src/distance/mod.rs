//! Great-circle distance matrix over depot and dispenser locations.

mod matrix;

pub use matrix::DistanceMatrix;
