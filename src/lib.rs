//! Search, filter, select and batch-moderate the admin collections of a blog
//! backend (users, comments, posts).

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
