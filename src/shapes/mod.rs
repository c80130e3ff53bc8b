// Copyright @yucwang 2021

pub mod sphere;
pub mod triangle;
pub mod triangle_mesh;
