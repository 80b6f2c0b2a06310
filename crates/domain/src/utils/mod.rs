//! Domain utility functions

pub mod datetime;
pub mod event_builder;
pub mod event_mapper;
