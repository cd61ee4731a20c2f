use glam::Vec3;

/// World-space ray with a normalized direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize(),
        }
    }

    /// Point along the ray at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Result of a ray-triangle intersection test.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
    pub normal: Vec3,
}

/// Slab-method ray/AABB test. Returns the entry distance, or the exit
/// distance when the origin is inside the box; `None` on a miss.
pub fn intersect_aabb(ray: &Ray, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    // Clamp near-zero direction components so the inverse stays finite
    let inv_dir = Vec3::new(
        if ray.dir.x.abs() < EPSILON { 1.0 / EPSILON.copysign(ray.dir.x) } else { 1.0 / ray.dir.x },
        if ray.dir.y.abs() < EPSILON { 1.0 / EPSILON.copysign(ray.dir.y) } else { 1.0 / ray.dir.y },
        if ray.dir.z.abs() < EPSILON { 1.0 / EPSILON.copysign(ray.dir.z) } else { 1.0 / ray.dir.z },
    );

    let t_min = (box_min - ray.origin) * inv_dir;
    let t_max = (box_max - ray.origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near < 0.0 {
        if t_far > 0.001 {
            Some(t_far)
        } else {
            None
        }
    } else {
        Some(t_near)
    }
}

/// Möller-Trumbore ray-triangle intersection.
pub fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    const EPSILON: f32 = 1e-6;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.dir.cross(edge2);
    let a = edge1.dot(h);

    // Ray parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.dir.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection behind the origin
    if t < EPSILON {
        return None;
    }

    let normal = edge1.cross(edge2).normalize();

    Some(TriangleHit { t, u, v, normal })
}
