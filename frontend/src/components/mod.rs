pub mod campaigns;
pub mod data_sources;
