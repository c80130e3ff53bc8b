// Copyright @yucwang 2021

pub mod accumulation;
pub mod path_tracing;
pub mod renderer;
pub mod sh_lighting;
