// File: mod.rs
// Author: Hyunbin Kim (khb7840@gmail.com)
// Description:
//    window comparison, result handling and the search driver

pub mod comparator;
pub mod metric;
pub mod result;
pub mod search;
