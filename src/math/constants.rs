/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Vector4f = na::Vector4<Float>;
pub type Matrix3f = na::Matrix3<Float>;
pub type Matrix4f = na::Matrix4<Float>;
pub type MatrixXF = na::DMatrix<Float>;
pub type Quaternionf = na::UnitQuaternion<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const FOUR_PI: Float = 4.0 * std::f32::consts::PI;
pub const FLOAT_MAX: Float = std::f32::MAX;
pub const FLOAT_MIN: Float = std::f32::MIN;
pub const INV_GAMMA: Float = 1.0 / 2.2;
