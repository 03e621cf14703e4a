pub mod engine_service;
pub mod grading_service;
pub mod quiz_source;
pub mod result_service;
pub mod runner_service;
pub mod scoring_service;
pub mod session_service;
pub mod timer_service;
