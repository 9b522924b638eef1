pub mod instance_dto;
