// src/models/mod.rs

pub mod score;
pub mod user;
