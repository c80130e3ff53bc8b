// Copyright @yucwang 2021

pub mod bvh;
pub mod config;
pub mod error;
pub mod integrator;
pub mod interaction;
pub mod resources;
pub mod rng;
pub mod scene;
pub mod scene_loader;
