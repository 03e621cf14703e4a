pub mod bundle_dto;
pub mod engine_dto;
