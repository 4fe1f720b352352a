pub mod catalog;
pub mod classification;
pub mod detection;
pub mod export;
pub mod training;
