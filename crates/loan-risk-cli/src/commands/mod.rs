pub mod reconcile;
pub mod score;
