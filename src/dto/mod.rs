pub mod bill_dto;
pub mod user_dto;
pub mod stats_dto;
