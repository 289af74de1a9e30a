// Module: index
// Distance matrix database and its checkpoint

pub mod database;

pub use database::DistanceMatrixDatabase;
