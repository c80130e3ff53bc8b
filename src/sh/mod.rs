// Copyright @yucwang 2026

pub mod basis;
pub mod projection;
pub mod rotation;
pub mod samples;
