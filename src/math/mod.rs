mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::{intersect_aabb, intersect_triangle, Ray, TriangleHit};

/// Converts a packed `0xRRGGBB` color to float RGB.
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}
