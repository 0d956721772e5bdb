pub mod board_service;
pub mod rate_limit;
pub mod view_counter;
