//! Cost model and cost matrix.
//!
//! [`CostModel`] scores one soldier/billet pair from weighted penalty and
//! bonus terms; [`CostModel::build_matrix`] produces the dense matrix the
//! penalty pipeline and solvers consume.
//!
//! The matrix is rebuilt on every pipeline invocation. Nothing is cached
//! across policy changes.

mod matrix;
mod model;
mod transfer;

pub use matrix::CostMatrix;
pub use model::{CostModel, HIGH_PRIORITY_MOS_FACTOR, LOW_PRIORITY_MOS_FACTOR};
pub use transfer::{
    TransferCostTable, DEFAULT_MILES, DEFAULT_TRANSFER_COST, FLAT_TRANSFER_COST, RATE_PER_MILE,
};
