pub mod dataset;
pub mod evaluate;
pub mod preprocess;
pub mod report;
