pub mod apply;
pub mod propose;
pub mod serve;
