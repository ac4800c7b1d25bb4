//! Vertex tables shared by the lessons.
//!
//! Positions are in normalized device coordinates unless a lesson transforms
//! them. Rows are one vertex each; the layout is noted per table.

/// One triangle. Layout `[3]`.
#[rustfmt::skip]
pub const TRIANGLE: [f32; 9] = [
    -0.5, -0.5, 0.0, // bottom left
     0.5, -0.5, 0.0, // bottom right
     0.0,  0.5, 0.0, // top
];

/// Four corners of a centered square. Layout `[3]`, drawn with [`QUAD_INDICES`].
#[rustfmt::skip]
pub const RECTANGLE: [f32; 12] = [
     0.5,  0.5, 0.0, // top right
     0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5,  0.5, 0.0, // top left
];

/// Two triangles sharing the bottom-left and top-right corners.
pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 3, // first triangle
    1, 2, 3, // second triangle
];

/// Two triangles side by side in one array. Layout `[3]`.
#[rustfmt::skip]
pub const TWO_TRIANGLES: [f32; 18] = [
    -0.45,  0.5, 0.0,
    -0.8,  -0.5, 0.0,
    -0.1,  -0.5, 0.0,
     0.45,  0.5, 0.0,
     0.1,  -0.5, 0.0,
     0.8,  -0.5, 0.0,
];

/// Left half of [`TWO_TRIANGLES`]. Layout `[3]`.
#[rustfmt::skip]
pub const LEFT_TRIANGLE: [f32; 9] = [
    -0.45,  0.5, 0.0, // top
    -0.8,  -0.5, 0.0, // bottom left
    -0.1,  -0.5, 0.0, // bottom right
];

/// Right half of [`TWO_TRIANGLES`]. Layout `[3]`.
#[rustfmt::skip]
pub const RIGHT_TRIANGLE: [f32; 9] = [
    0.45,  0.5, 0.0, // top
    0.1,  -0.5, 0.0, // bottom left
    0.8,  -0.5, 0.0, // bottom right
];

/// Triangle with a color per corner. Layout `[3, 3]`: position, color.
#[rustfmt::skip]
pub const COLORED_TRIANGLE: [f32; 18] = [
     0.5, -0.5, 0.0,   1.0, 0.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,   0.0, 1.0, 0.0, // bottom left
     0.0,  0.5, 0.0,   0.0, 0.0, 1.0, // top
];

/// Textured square. Layout `[3, 3, 2]`: position, color, texture coordinate.
/// Drawn with [`QUAD_INDICES`].
#[rustfmt::skip]
pub const TEXTURED_QUAD: [f32; 32] = [
     0.5,  0.5, 0.0,   1.0, 0.0, 0.0,   1.0, 1.0, // top right
     0.5, -0.5, 0.0,   0.0, 1.0, 0.0,   1.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,   0.0, 0.0, 1.0,   0.0, 0.0, // bottom left
    -0.5,  0.5, 0.0,   1.0, 1.0, 0.0,   0.0, 1.0, // top left
];

/// Component counts of the tables above, in attribute-location order.
pub const POSITION: &[u8] = &[3];
pub const POSITION_COLOR: &[u8] = &[3, 3];
pub const POSITION_COLOR_UV: &[u8] = &[3, 3, 2];
