pub mod capture;
pub mod detection;
pub mod pipeline;
pub mod presentation;
pub mod shared;
