pub mod activity;
pub mod pipeline;
pub mod resource;
pub mod workout;
