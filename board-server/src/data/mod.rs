pub mod board_repository;
