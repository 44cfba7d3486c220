pub mod quantity;
pub mod report;
