// SPDX-License-Identifier: Apache-2.0

//! Core domain types for allowance scanning.

mod approval;
mod chunk;
mod token;

pub use approval::{AllowanceInfo, ApprovalEvent, ScanOptions, TokenApprovalSet};
pub use chunk::{BlockChunks, ChunkSize};
pub use token::{TokenDecimals, TokenInfo};
