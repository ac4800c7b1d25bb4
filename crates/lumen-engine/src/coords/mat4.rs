use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, Rad, Vector3, Vector4};
use std::ops::Mul;

use super::Vec3;

/// Remaps cgmath's GL clip depth (-1..1) to wgpu's (0..1). Column-major.
#[rustfmt::skip]
const OPENGL_TO_WGPU_MATRIX: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.5, 0.0],
    [0.0, 0.0, 0.5, 1.0],
];

/// Column-major 4x4 float matrix, laid out exactly as WGSL `mat4x4<f32>`.
///
/// Math is done with [`cgmath::Matrix4`]; this type only fixes the byte
/// layout uploaded as a uniform. The chaining helpers (`translate`, `rotate`,
/// `scale`) post-multiply, so `Mat4::IDENTITY.translate(t).rotate(a, axis)`
/// applied to a point rotates it first and translates it second, the same
/// order as the GLM calls in the tutorials.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Matrix4<f32>> for Mat4 {
    fn from(m: Matrix4<f32>) -> Self {
        Self { cols: m.into() }
    }
}

impl From<Mat4> for Matrix4<f32> {
    fn from(m: Mat4) -> Self {
        m.cols.into()
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    pub fn translation(t: Vec3) -> Self {
        Matrix4::from_translation(t.into()).into()
    }

    pub fn scaling(s: Vec3) -> Self {
        Matrix4::from_nonuniform_scale(s.x, s.y, s.z).into()
    }

    /// Rotation of `angle` radians counter-clockwise around `axis`.
    ///
    /// The axis is normalized; a zero axis yields the identity.
    pub fn rotation(angle: f32, axis: Vec3) -> Self {
        let axis = axis.normalized();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        Matrix4::from_axis_angle(Vector3::from(axis), Rad(angle)).into()
    }

    /// Right-handed perspective projection with clip depth in 0..1.
    ///
    /// `fov_y` is in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let gl = cgmath::perspective(Rad(fov_y), aspect, near, far);
        (Matrix4::from(OPENGL_TO_WGPU_MATRIX) * gl).into()
    }

    /// Right-handed orthographic projection with clip depth in 0..1.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let gl = cgmath::ortho(left, right, bottom, top, near, far);
        (Matrix4::from(OPENGL_TO_WGPU_MATRIX) * gl).into()
    }

    #[inline]
    pub fn translate(self, t: Vec3) -> Self {
        self * Self::translation(t)
    }

    #[inline]
    pub fn rotate(self, angle: f32, axis: Vec3) -> Self {
        self * Self::rotation(angle, axis)
    }

    #[inline]
    pub fn scale(self, s: Vec3) -> Self {
        self * Self::scaling(s)
    }

    /// Transforms a homogeneous `[x, y, z, w]` vector.
    pub fn transform(self, v: [f32; 4]) -> [f32; 4] {
        (Matrix4::from(self) * Vector4::from(v)).into()
    }

    /// Transforms a point (w = 1) and performs the perspective divide.
    pub fn transform_point(self, p: Vec3) -> Vec3 {
        let [x, y, z, w] = self.transform([p.x, p.y, p.z, 1.0]);
        if w.abs() <= f32::EPSILON {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(x / w, y / w, z / w)
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        (Matrix4::from(self) * Matrix4::from(rhs)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::IDENTITY * m, m);
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::from(Matrix4::<f32>::identity()), Mat4::IDENTITY);
    }

    #[test]
    fn translation_moves_points() {
        let p = Mat4::translation(Vec3::new(0.5, -0.5, 0.0)).transform_point(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.5, -0.5, 0.0));
    }

    #[test]
    fn rotation_about_z_is_counter_clockwise() {
        let p = Mat4::rotation(FRAC_PI_2, Vec3::Z).transform_point(Vec3::X);
        assert!(approx(p, Vec3::Y));
    }

    #[test]
    fn rotation_axis_need_not_be_unit_length() {
        let a = Mat4::rotation(FRAC_PI_4, Vec3::new(0.0, 0.0, 5.0));
        let b = Mat4::rotation(FRAC_PI_4, Vec3::Z);
        assert!(approx(a.transform_point(Vec3::X), b.transform_point(Vec3::X)));
    }

    #[test]
    fn chained_translate_then_rotate_rotates_first() {
        // GLM order: trans = translate(I, t); trans = rotate(trans, a, z)
        let m = Mat4::IDENTITY
            .translate(Vec3::new(0.5, -0.5, 0.0))
            .rotate(FRAC_PI_2, Vec3::Z);
        let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(p, Vec3::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn scaling_scales_each_axis() {
        let p = Mat4::scaling(Vec3::new(2.0, 3.0, 4.0)).transform_point(Vec3::splat(1.0));
        assert_eq!(p, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn zero_axis_rotation_is_identity() {
        assert_eq!(Mat4::rotation(1.0, Vec3::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn perspective_maps_near_and_far_to_zero_and_one() {
        let m = Mat4::perspective(FRAC_PI_4, 800.0 / 600.0, 0.1, 100.0);
        let near = m.transform_point(Vec3::new(0.0, 0.0, -0.1));
        let far = m.transform_point(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orthographic_maps_box_to_ndc() {
        let m = Mat4::orthographic(0.0, 800.0, 0.0, 600.0, 0.1, 100.0);
        let lo = m.transform_point(Vec3::new(0.0, 0.0, -0.1));
        let hi = m.transform_point(Vec3::new(800.0, 600.0, -100.0));
        assert!(approx(lo, Vec3::new(-1.0, -1.0, 0.0)));
        assert!(approx(hi, Vec3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn byte_layout_is_column_major() {
        let m = Mat4::translation(Vec3::new(7.0, 8.0, 9.0));
        let floats: &[f32] = bytemuck::cast_slice(m.as_bytes());
        assert_eq!(floats.len(), 16);
        assert_eq!(&floats[12..15], &[7.0, 8.0, 9.0]);
    }
}
