pub mod chart;
pub mod region;
pub mod track;
