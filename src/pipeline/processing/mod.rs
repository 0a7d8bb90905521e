// Pipeline processing: text normalization, qualification parsing, and reference collection

pub mod collector;
pub mod normalize;
pub mod parser;
