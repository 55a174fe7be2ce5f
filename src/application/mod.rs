pub mod task_repository;
pub mod task_service;
pub mod theme;
