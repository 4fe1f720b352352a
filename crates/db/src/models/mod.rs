pub mod classification;
pub mod detection_record;
