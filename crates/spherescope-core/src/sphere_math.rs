//! Weighted-sphere primitive math.
//!
//! A weighted sphere is packed into a [`Vec4`] as `(cx, cy, cz, r)`. Two
//! spheres blend into a *pill* (the convex hull of the pair) and three
//! spheres blend into a *wedge* (the triangular slab tangent to all three).
//!
//! Every function here is pure. Geometry that cannot be evaluated (coincident
//! centers, nested spheres, collinear skeletons) is reported as a
//! [`GeometryError`] instead of producing NaN.

use glam::{Vec3, Vec4};

use crate::error::{GeometryError, GeometryResult};

/// Distance below which two sphere centers are treated as the same point.
pub const EPSILON: f32 = 1e-6;

/// Relative area tolerance for skeleton and tangent triangles.
const AREA_EPSILON: f32 = 1e-6;

/// Replaces NaN and infinities with zero.
#[inline]
pub fn stop_nan(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Clamps to `[0, 1]` after discarding non-finite values.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    stop_nan(x).clamp(0.0, 1.0)
}

/// `asin` with its argument clamped into the valid domain.
#[inline]
pub fn safe_asin(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0).asin()
    }
}

/// Center of a weighted sphere.
#[inline]
pub fn center(sphere: Vec4) -> Vec3 {
    sphere.truncate()
}

/// Checks that a sphere is finite with a non-negative radius.
pub fn check_sphere(sphere: Vec4) -> GeometryResult<()> {
    if !sphere.is_finite() {
        Err(GeometryError::NonFinite)
    } else if sphere.w < 0.0 {
        Err(GeometryError::NegativeRadius)
    } else {
        Ok(())
    }
}

/// Closest point on a primitive surface together with its signed distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Closest point on the surface.
    pub point: Vec3,
    /// Signed distance of the query point, negative inside.
    pub sdf: f32,
}

/// Tangent parameters of the cone joining two spheres.
///
/// `beta` is the cosine of the cone's half opening and `alpha` its sine, so
/// `beta^2 + alpha^2 == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillTangent {
    pub beta: f32,
    pub alpha: f32,
}

/// Computes the tangent parameters of the pill between `s0` and `s1`.
///
/// With `d` the center distance and `dr = r1 - r0`,
/// `beta = sqrt(d^2 - dr^2) / d` and `alpha = sqrt(1 - beta^2)`.
pub fn pill_tangent(s0: Vec4, s1: Vec4) -> GeometryResult<PillTangent> {
    let d = (center(s1) - center(s0)).length();
    if d <= EPSILON {
        return Err(GeometryError::CoincidentCenters);
    }
    let dr = s1.w - s0.w;
    if dr.abs() >= d {
        return Err(GeometryError::NestedSpheres);
    }

    let beta = (d * d - dr * dr).sqrt() / d;
    let alpha = (1.0 - beta * beta).max(0.0).sqrt();
    Ok(PillTangent { beta, alpha })
}

/// Barycentric coordinates of `p` with respect to triangle `(v0, v1, v2)`.
///
/// Points off the triangle's plane are implicitly projected onto it. The
/// three weights always sum to one.
pub fn get_barycentric(v0: Vec3, v1: Vec3, v2: Vec3, p: Vec3) -> GeometryResult<Vec3> {
    let n = (v1 - v0).cross(v2 - v0);
    let denom = n.length_squared();
    let scale = (v1 - v0).length_squared() * (v2 - v0).length_squared();
    if denom <= AREA_EPSILON * AREA_EPSILON * scale || denom <= f32::MIN_POSITIVE {
        return Err(GeometryError::CollinearCenters);
    }

    let u = (v1 - p).cross(v2 - p).dot(n) / denom;
    let v = (v2 - p).cross(v0 - p).dot(n) / denom;
    if !u.is_finite() || !v.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    Ok(Vec3::new(u, v, 1.0 - (u + v)))
}

/// Unit normal of the plane tangent to all three spheres.
///
/// The normal lies on the side of the skeleton normal `(c1 - c0) x (c2 - c0)`;
/// swapping `s1` and `s2` yields the plane on the opposite side. The result
/// satisfies `n . (cj - c0) == r0 - rj` for `j = 1, 2`.
pub fn wedge_normal(s0: Vec4, s1: Vec4, s2: Vec4) -> GeometryResult<Vec3> {
    wedge_normal_on_side(s0, s1, s2, 1.0)
}

/// Like [`wedge_normal`], choosing the tangent plane on the side of `p`.
///
/// Points lying on the skeleton plane resolve to the positive side.
pub fn wedge_normal_toward(s0: Vec4, s1: Vec4, s2: Vec4, p: Vec3) -> GeometryResult<Vec3> {
    let c0 = center(s0);
    let skeleton_normal = (center(s1) - c0).cross(center(s2) - c0);
    let side = if (p - c0).dot(skeleton_normal) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    wedge_normal_on_side(s0, s1, s2, side)
}

fn wedge_normal_on_side(s0: Vec4, s1: Vec4, s2: Vec4, side: f32) -> GeometryResult<Vec3> {
    let c0 = center(s0);
    let d0 = center(s1) - c0;
    let d1 = center(s2) - c0;
    let l0 = d0.length();
    let l1 = d1.length();
    if l0 <= EPSILON || l1 <= EPSILON || (center(s2) - center(s1)).length() <= EPSILON {
        return Err(GeometryError::CoincidentCenters);
    }

    let skeleton_normal = d0.cross(d1);
    if skeleton_normal.length() <= AREA_EPSILON * l0 * l1 {
        return Err(GeometryError::CollinearCenters);
    }
    let tri_normal = skeleton_normal.normalize() * side;

    let dr = s2.w - s0.w;
    if dr.abs() >= l1 {
        return Err(GeometryError::NestedSpheres);
    }
    let beta = safe_asin(dr / l1);
    let (sin_b, cos_b) = beta.sin_cos();

    // In-plane frame: `a` runs from c2 back towards c0, `s` completes it.
    let a = -d1 / l1;
    let s = a.cross(tri_normal);

    let denom = cos_b * d0.dot(s);
    if denom.abs() <= EPSILON * l0 {
        return Err(GeometryError::CollinearCenters);
    }
    let sin_a_arg = (s0.w - s1.w - sin_b * d0.dot(a)) / denom;
    if !sin_a_arg.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    if sin_a_arg.abs() > 1.0 {
        // No plane touches all three spheres from outside.
        return Err(GeometryError::NestedSpheres);
    }
    let (sin_a, cos_a) = safe_asin(sin_a_arg).sin_cos();

    let n = a * sin_b + (tri_normal * cos_a + s * sin_a) * cos_b;
    n.try_normalize().ok_or(GeometryError::NonFinite)
}

/// Projects `p` onto the surface of a single sphere.
///
/// A query at the exact center projects along `+x`.
pub fn sphere_project(p: Vec3, sphere: Vec4) -> Projection {
    project_onto_sphere(p, sphere, Vec3::X)
}

fn project_onto_sphere(p: Vec3, sphere: Vec4, fallback: Vec3) -> Projection {
    let c = center(sphere);
    let delta = p - c;
    let dir = delta.try_normalize().unwrap_or(fallback);
    Projection {
        point: c + dir * sphere.w,
        sdf: delta.length() - sphere.w,
    }
}

/// Axial parameter in `[0, 1]` of the sphere on the pill `(s0, s1)` that
/// supports the closest point to `p`.
///
/// The raw parameter `(an . (p - c0) + |p_perp| tan(beta)) / d` accounts for
/// the cone's slope, so on a tapered pill the contact sphere is not simply the
/// orthogonal foot of `p` on the axis.
pub fn pill_parameter(p: Vec3, s0: Vec4, s1: Vec4) -> GeometryResult<f32> {
    let c0 = center(s0);
    let axis = center(s1) - c0;
    let length = axis.length();
    if length <= EPSILON {
        return Err(GeometryError::CoincidentCenters);
    }
    let dr = s1.w - s0.w;
    if dr.abs() >= length {
        return Err(GeometryError::NestedSpheres);
    }

    let an = axis / length;
    let offset = p - c0;
    let along = an.dot(offset);
    let perp = (offset - an * along).length();
    let beta = safe_asin(dr / length);
    Ok(clamp01((along + perp * beta.tan()) / length))
}

/// Interpolated sphere on the pill `(s0, s1)` that touches the projection of `p`.
pub fn pill_contact_sphere(p: Vec3, s0: Vec4, s1: Vec4) -> GeometryResult<Vec4> {
    let t = pill_parameter(p, s0, s1)?;
    Ok(s0.lerp(s1, t))
}

/// Projects `p` onto the pill blending `s0` and `s1`.
///
/// Queries on the axis project along a direction perpendicular to it.
pub fn pill_project(p: Vec3, s0: Vec4, s1: Vec4) -> GeometryResult<Projection> {
    let contact = pill_contact_sphere(p, s0, s1)?;
    let axis = (center(s1) - center(s0)).normalize();
    Ok(project_onto_sphere(p, contact, axis.any_orthonormal_vector()))
}

/// Where a query lands relative to a wedge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WedgeRegion {
    /// The query projects inside the tangent triangle.
    Interior {
        /// Barycentric weights of the projected point.
        weights: Vec3,
        /// Blended sphere supporting the projected point.
        sphere: Vec4,
        /// Tangent plane normal facing the query.
        normal: Vec3,
    },
    /// The query falls outside the triangle; this is the nearest sub-pill.
    Edge { s0: Vec4, s1: Vec4 },
}

/// Classifies `p` against the wedge `(s0, s1, s2)`.
///
/// `p` is dropped along the tangent normal onto the plane through the three
/// tangent points. Inside the tangent triangle the weighted blend of the
/// spheres supports the projection. Outside it, the nearest of the three
/// bounding pills `(s0, s1)`, `(s1, s2)`, `(s0, s2)` is responsible; ties keep
/// the earlier pill and pills with no tangent cone are skipped.
pub fn wedge_region(p: Vec3, s0: Vec4, s1: Vec4, s2: Vec4) -> GeometryResult<WedgeRegion> {
    let normal = wedge_normal_toward(s0, s1, s2, p)?;
    let spheres = [s0, s1, s2];
    let [t0, t1, t2] = spheres.map(|s| center(s) + normal * s.w);

    let on_plane = p - normal * normal.dot(p - t0);
    let weights = get_barycentric(t0, t1, t2, on_plane)?;

    if weights.min_element() >= 0.0 {
        let sphere = s0 * weights.x + s1 * weights.y + s2 * weights.z;
        return Ok(WedgeRegion::Interior {
            weights,
            sphere,
            normal,
        });
    }

    let pills = [(s0, s1), (s1, s2), (s0, s2)];
    let mut nearest: Option<((Vec4, Vec4), f32)> = None;
    let mut first_err = None;
    for (a, b) in pills {
        match pill_project(p, a, b) {
            Ok(proj) => {
                let dist = (proj.point - p).length();
                if nearest.is_none_or(|(_, best)| dist < best) {
                    nearest = Some(((a, b), dist));
                }
            }
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }
    match nearest {
        Some(((s0, s1), _)) => Ok(WedgeRegion::Edge { s0, s1 }),
        None => Err(first_err.unwrap_or(GeometryError::NonFinite)),
    }
}

/// Projects `p` onto the wedge blending `s0`, `s1` and `s2`.
pub fn wedge_project(p: Vec3, s0: Vec4, s1: Vec4, s2: Vec4) -> GeometryResult<Projection> {
    match wedge_region(p, s0, s1, s2)? {
        WedgeRegion::Interior { sphere, normal, .. } => {
            let c = center(sphere);
            Ok(Projection {
                point: c + normal * sphere.w,
                sdf: (p - c).dot(normal) - sphere.w,
            })
        }
        WedgeRegion::Edge { s0, s1 } => pill_project(p, s0, s1),
    }
}

/// The sub-pill of the wedge responsible for `p`, or `None` when `p`
/// projects inside the tangent triangle.
pub fn wedge_subpill(
    p: Vec3,
    s0: Vec4,
    s1: Vec4,
    s2: Vec4,
) -> GeometryResult<Option<(Vec4, Vec4)>> {
    Ok(match wedge_region(p, s0, s1, s2)? {
        WedgeRegion::Interior { .. } => None,
        WedgeRegion::Edge { s0, s1 } => Some((s0, s1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_vec3_near(a: Vec3, b: Vec3, tol: f32) {
        assert!((a - b).length() < tol, "{a:?} != {b:?}");
    }

    #[test]
    fn test_stop_nan_and_clamp01() {
        assert_eq!(stop_nan(f32::NAN), 0.0);
        assert_eq!(stop_nan(f32::INFINITY), 0.0);
        assert_eq!(stop_nan(-2.5), -2.5);
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn test_check_sphere() {
        assert_eq!(check_sphere(Vec4::new(1.0, 2.0, 3.0, 0.0)), Ok(()));
        assert_eq!(
            check_sphere(Vec4::new(0.0, 0.0, 0.0, -2.0)),
            Err(GeometryError::NegativeRadius)
        );
        assert_eq!(
            check_sphere(Vec4::new(f32::NAN, 0.0, 0.0, 1.0)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(
            check_sphere(Vec4::new(0.0, 0.0, 0.0, f32::INFINITY)),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn test_safe_asin_clamps_domain() {
        assert!((safe_asin(2.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((safe_asin(-2.0) + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(safe_asin(f32::NAN), 0.0);
    }

    #[test]
    fn test_sphere_project() {
        let proj = sphere_project(Vec3::new(5.0, 0.0, 0.0), Vec4::new(0.0, 0.0, 0.0, 2.0));
        assert_vec3_near(proj.point, Vec3::new(2.0, 0.0, 0.0), 1e-6);
        assert!((proj.sdf - 3.0).abs() < 1e-6);

        let inside = sphere_project(Vec3::new(0.5, 0.0, 0.0), Vec4::new(0.0, 0.0, 0.0, 2.0));
        assert!((inside.sdf + 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_project_at_center() {
        let proj = sphere_project(Vec3::new(1.0, 1.0, 1.0), Vec4::new(1.0, 1.0, 1.0, 0.5));
        assert!((proj.sdf + 0.5).abs() < 1e-6);
        assert!(((proj.point - Vec3::ONE).length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pill_tangent_equal_radii() {
        let t = pill_tangent(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(3.0, 0.0, 0.0, 1.0))
            .unwrap();
        assert!((t.beta - 1.0).abs() < 1e-6);
        assert!(t.alpha.abs() < 1e-6);
    }

    #[test]
    fn test_pill_tangent_tapered() {
        let t = pill_tangent(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(4.0, 0.0, 0.0, 3.0))
            .unwrap();
        assert!((t.alpha - 0.5).abs() < 1e-6);
        assert!((t.beta * t.beta + t.alpha * t.alpha - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pill_tangent_degenerate() {
        let nested = pill_tangent(Vec4::new(0.0, 0.0, 0.0, 3.0), Vec4::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(nested, Err(GeometryError::NestedSpheres));

        let touching = pill_tangent(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(2.0, 0.0, 0.0, 3.0));
        assert_eq!(touching, Err(GeometryError::NestedSpheres));

        let coincident =
            pill_tangent(Vec4::new(1.0, 1.0, 1.0, 1.0), Vec4::new(1.0, 1.0, 1.0, 2.0));
        assert_eq!(coincident, Err(GeometryError::CoincidentCenters));
    }

    #[test]
    fn test_pill_project_perpendicular() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let proj = pill_project(Vec3::new(1.5, 2.0, 0.0), s0, s1).unwrap();
        assert_vec3_near(proj.point, Vec3::new(1.5, 1.0, 0.0), 1e-5);
        assert!((proj.sdf - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pill_project_on_axis() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let p = Vec3::new(1.5, 0.0, 0.0);
        let proj = pill_project(p, s0, s1).unwrap();
        assert!(((proj.point - p).length() - 1.0).abs() < 1e-5);
        assert!((proj.point.x - 1.5).abs() < 1e-5);
        assert!((proj.sdf + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pill_project_beyond_end_cap() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let proj = pill_project(Vec3::new(6.0, 0.0, 0.0), s0, s1).unwrap();
        assert_vec3_near(proj.point, Vec3::new(4.0, 0.0, 0.0), 1e-5);
        assert_eq!(pill_parameter(Vec3::new(6.0, 0.0, 0.0), s0, s1), Ok(1.0));
        assert_eq!(pill_parameter(Vec3::new(-6.0, 0.0, 0.0), s0, s1), Ok(0.0));
    }

    #[test]
    fn test_pill_project_tapered_lands_on_tangent_line() {
        // Cone from r=1 at the origin to r=2 at x=4; the surface line leans by alpha.
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(4.0, 0.0, 0.0, 2.0);
        let p = Vec3::new(2.0, 5.0, 0.0);
        let contact = pill_contact_sphere(p, s0, s1).unwrap();
        let proj = pill_project(p, s0, s1).unwrap();
        // The projected point lies on the contact sphere.
        assert!(((proj.point - center(contact)).length() - contact.w).abs() < 1e-4);
        // The surface normal leans back towards the smaller sphere by asin(dr / d).
        let dir = (proj.point - center(contact)).normalize();
        assert!((dir.x + 0.25).abs() < 1e-4);
        assert!(contact.x > 2.0);
        assert!(proj.sdf > 0.0);
    }

    #[test]
    fn test_pill_contact_sphere_interpolates() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(4.0, 0.0, 0.0, 1.0);
        let contact = pill_contact_sphere(Vec3::new(1.0, 3.0, 0.0), s0, s1).unwrap();
        assert!((contact - Vec4::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_get_barycentric_vertices_and_centroid() {
        let v0 = Vec3::ZERO;
        let v1 = Vec3::new(3.0, 0.0, 0.0);
        let v2 = Vec3::new(0.0, 3.0, 0.0);
        let w = get_barycentric(v0, v1, v2, v1).unwrap();
        assert!((w - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        let w = get_barycentric(v0, v1, v2, Vec3::new(1.0, 1.0, 7.0)).unwrap();
        assert!((w - Vec3::splat(1.0 / 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_get_barycentric_collinear() {
        let result = get_barycentric(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
        );
        assert_eq!(result, Err(GeometryError::CollinearCenters));
    }

    #[test]
    fn test_wedge_normal_equal_radii() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(0.0, 3.0, 0.0, 1.0);
        assert_vec3_near(wedge_normal(s0, s1, s2).unwrap(), Vec3::Z, 1e-6);
        assert_vec3_near(wedge_normal(s0, s2, s1).unwrap(), -Vec3::Z, 1e-6);
        let below = wedge_normal_toward(s0, s1, s2, Vec3::new(1.0, 1.0, -4.0)).unwrap();
        assert_vec3_near(below, -Vec3::Z, 1e-6);
    }

    #[test]
    fn test_wedge_normal_tangency_varied_radii() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 0.5);
        let s1 = Vec4::new(4.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(1.0, 3.0, 0.5, 0.8);
        let n = wedge_normal(s0, s1, s2).unwrap();
        assert!((n.length() - 1.0).abs() < 1e-5);
        for s in [s1, s2] {
            let lhs = n.dot(center(s) - center(s0));
            assert!((lhs - (s0.w - s.w)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_wedge_normal_degenerate() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(2.0, 0.0, 0.0, 1.0);
        assert_eq!(
            wedge_normal(s0, s1, s2),
            Err(GeometryError::CollinearCenters)
        );
        assert_eq!(
            wedge_normal(s0, s0, s2),
            Err(GeometryError::CoincidentCenters)
        );
        let huge = Vec4::new(0.0, 1.0, 0.0, 5.0);
        assert_eq!(wedge_normal(s0, s1, huge), Err(GeometryError::NestedSpheres));
    }

    #[test]
    fn test_wedge_project_interior() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(0.0, 3.0, 0.0, 1.0);
        let proj = wedge_project(Vec3::new(1.0, 1.0, 4.0), s0, s1, s2).unwrap();
        assert_vec3_near(proj.point, Vec3::new(1.0, 1.0, 1.0), 1e-5);
        assert!((proj.sdf - 3.0).abs() < 1e-5);

        let below = wedge_project(Vec3::new(1.0, 1.0, -2.0), s0, s1, s2).unwrap();
        assert_vec3_near(below.point, Vec3::new(1.0, 1.0, -1.0), 1e-5);
        assert_eq!(wedge_subpill(Vec3::new(1.0, 1.0, 4.0), s0, s1, s2), Ok(None));
    }

    #[test]
    fn test_wedge_project_outside_uses_subpill() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(0.0, 3.0, 0.0, 1.0);
        let p = Vec3::new(1.5, -3.0, 0.5);

        let pill = wedge_subpill(p, s0, s1, s2).unwrap();
        assert_eq!(pill, Some((s0, s1)));

        let via_wedge = wedge_project(p, s0, s1, s2).unwrap();
        let via_pill = pill_project(p, s0, s1).unwrap();
        assert_vec3_near(via_wedge.point, via_pill.point, 1e-6);
    }

    #[test]
    fn test_wedge_outside_obtuse_picks_nearest_pill() {
        // The largest barycentric weights point at (s1, s2), but (s0, s2)
        // is closer to the query.
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(10.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(2.0, 0.5, 0.0, 1.0);
        let p = Vec3::new(0.0, 3.0, 0.0);

        assert_eq!(wedge_subpill(p, s0, s1, s2).unwrap(), Some((s0, s2)));

        let wedge = wedge_project(p, s0, s1, s2).unwrap();
        let dist = (wedge.point - p).length();
        assert!((dist - 1.9104).abs() < 1e-3, "distance {dist}");
        for (a, b) in [(s0, s1), (s1, s2), (s0, s2)] {
            let pill = pill_project(p, a, b).unwrap();
            assert!(dist <= (pill.point - p).length() + 1e-6);
        }
    }

    #[test]
    fn test_wedge_interior_sdf_is_signed_plane_distance() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 0.5);
        let s1 = Vec4::new(4.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(0.0, 4.0, 0.0, 1.5);
        let n = wedge_normal(s0, s1, s2).unwrap();
        let t0 = center(s0) + n * s0.w;

        // One point above the tangent plane, one between it and the skeleton.
        for height in [3.0, 0.4] {
            let p = Vec3::new(1.2, 1.0, height);
            let region = wedge_region(p, s0, s1, s2).unwrap();
            assert!(matches!(region, WedgeRegion::Interior { .. }));
            let proj = wedge_project(p, s0, s1, s2).unwrap();
            assert!((proj.sdf - n.dot(p - t0)).abs() < 1e-4);
        }
        let inside = wedge_project(Vec3::new(1.2, 1.0, 0.4), s0, s1, s2).unwrap();
        assert!(inside.sdf < 0.0);
    }

    #[test]
    fn test_wedge_region_interior_weights() {
        let s0 = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let s1 = Vec4::new(3.0, 0.0, 0.0, 1.0);
        let s2 = Vec4::new(0.0, 3.0, 0.0, 1.0);
        match wedge_region(Vec3::new(1.0, 1.0, 2.0), s0, s1, s2).unwrap() {
            WedgeRegion::Interior { weights, sphere, .. } => {
                assert!((weights - Vec3::splat(1.0 / 3.0)).length() < 1e-5);
                assert!((sphere - Vec4::new(1.0, 1.0, 0.0, 1.0)).length() < 1e-5);
            }
            WedgeRegion::Edge { .. } => panic!("expected interior region"),
        }
    }

    #[test]
    fn test_sphere_surface_round_trip() {
        let s = Vec4::new(1.0, -2.0, 0.5, 1.5);
        let dir = Vec3::new(0.3, -0.4, 0.866).normalize();
        let on_surface = center(s) + dir * s.w;
        let proj = sphere_project(on_surface, s);
        assert!(proj.sdf.abs() < 1e-4);
        assert_vec3_near(proj.point, on_surface, 1e-4);
    }

    proptest! {
        #[test]
        fn prop_barycentric_sums_to_one(
            v0 in prop::array::uniform3(-10.0f32..10.0),
            e1 in prop::array::uniform3(-10.0f32..10.0),
            e2 in prop::array::uniform3(-10.0f32..10.0),
            a in -1.0f32..2.0,
            b in -1.0f32..2.0,
            lift in -5.0f32..5.0,
        ) {
            let v0 = Vec3::from(v0);
            let v1 = v0 + Vec3::from(e1);
            let v2 = v0 + Vec3::from(e2);
            let n = (v1 - v0).cross(v2 - v0);
            prop_assume!(n.length() > 1.0);

            let p = v0 + (v1 - v0) * a + (v2 - v0) * b + n.normalize() * lift;
            let w = get_barycentric(v0, v1, v2, p).unwrap();
            prop_assert!((w.x + w.y + w.z - 1.0).abs() < 1e-5);
        }

        #[test]
        fn prop_pill_tangent_degenerate_when_nested(
            d in 0.1f32..5.0,
            r0 in 0.1f32..3.0,
            extra in 0.0f32..3.0,
        ) {
            let s0 = Vec4::new(0.0, 0.0, 0.0, r0);
            let s1 = Vec4::new(d, 0.0, 0.0, r0 + d + extra);
            prop_assert_eq!(pill_tangent(s0, s1), Err(GeometryError::NestedSpheres));
        }

        #[test]
        fn prop_wedge_normal_is_tangent(
            a in 2.0f32..5.0,
            b in -2.0f32..5.0,
            c in 2.0f32..5.0,
            r in prop::array::uniform3(0.1f32..0.9),
        ) {
            let s0 = Vec4::new(0.0, 0.0, 0.0, r[0]);
            let s1 = Vec4::new(a, 0.0, 0.0, r[1]);
            let s2 = Vec4::new(b, c, 0.0, r[2]);
            if let Ok(n) = wedge_normal(s0, s1, s2) {
                prop_assert!((n.length() - 1.0).abs() < 1e-4);
                prop_assert!((n.dot(center(s1)) - (r[0] - r[1])).abs() < 1e-4);
                prop_assert!((n.dot(center(s2)) - (r[0] - r[2])).abs() < 1e-4);
            }
        }

        #[test]
        fn prop_wedge_interior_no_farther_than_parts(
            jitter in prop::array::uniform3(-0.3f32..0.3),
            r in prop::array::uniform3(0.5f32..1.0),
            u in 0.2f32..0.6,
            v in 0.2f32..0.6,
            height in 1.5f32..6.0,
        ) {
            let s0 = Vec4::new(jitter[0], 0.0, 0.0, r[0]);
            let s1 = Vec4::new(4.0, jitter[1], 0.0, r[1]);
            let s2 = Vec4::new(0.0, 4.0, jitter[2], r[2]);
            let base = center(s0) * (1.0 - u - v) + center(s1) * u + center(s2) * v;
            let p = base + Vec3::Z * height;

            let region = wedge_region(p, s0, s1, s2).unwrap();
            prop_assume!(matches!(region, WedgeRegion::Interior { .. }));

            let wedge = wedge_project(p, s0, s1, s2).unwrap();
            for (a, b) in [(s0, s1), (s1, s2), (s0, s2)] {
                let pill = pill_project(p, a, b).unwrap();
                prop_assert!(wedge.sdf <= pill.sdf + 1e-3);
            }
            for s in [s0, s1, s2] {
                prop_assert!(wedge.sdf <= sphere_project(p, s).sdf + 1e-3);
            }
        }

        #[test]
        fn prop_wedge_no_farther_than_parts_anywhere(
            c1 in prop::array::uniform3(-6.0f32..6.0),
            c2 in prop::array::uniform3(-6.0f32..6.0),
            r in prop::array::uniform3(0.2f32..1.0),
            q in prop::array::uniform3(-10.0f32..10.0),
        ) {
            let s0 = Vec4::new(0.0, 0.0, 0.0, r[0]);
            let s1 = Vec4::new(c1[0], c1[1], c1[2], r[1]);
            let s2 = Vec4::new(c2[0], c2[1], c2[2], r[2]);
            let (d0, d1) = (center(s1), center(s2));
            let longest = d0.length().max(d1.length()).max((d1 - d0).length());
            prop_assume!(longest > 2.0 && d0.cross(d1).length() > 0.1 * longest * longest);
            let p = Vec3::from(q);

            let region = wedge_region(p, s0, s1, s2);
            prop_assume!(region.is_ok());
            let wedge = wedge_project(p, s0, s1, s2).unwrap();
            let dist = (wedge.point - p).length();

            let mut pills = Vec::new();
            for (a, b) in [(s0, s1), (s1, s2), (s0, s2)] {
                if let Ok(pill) = pill_project(p, a, b) {
                    pills.push(pill);
                }
            }
            prop_assume!(!pills.is_empty());

            if matches!(region, Ok(WedgeRegion::Edge { .. })) {
                for pill in &pills {
                    prop_assert!(dist <= (pill.point - p).length() + 1e-4);
                }
            }

            // Outside the whole wedge, nothing inside it can be closer.
            let outside = wedge.sdf > 0.0 && pills.iter().all(|pill| pill.sdf > 0.0);
            if outside {
                let tol = 1e-3 * (1.0 + dist);
                for pill in &pills {
                    prop_assert!(dist <= (pill.point - p).length() + tol);
                }
                for s in [s0, s1, s2] {
                    prop_assert!(dist <= sphere_project(p, s).sdf + tol);
                }
            }
        }

        #[test]
        fn prop_sphere_surface_round_trip(
            c in prop::array::uniform3(-10.0f32..10.0),
            r in 0.1f32..5.0,
            theta in 0.0f32..std::f32::consts::TAU,
            z in -1.0f32..1.0,
        ) {
            let s = Vec4::new(c[0], c[1], c[2], r);
            let ring = (1.0 - z * z).sqrt();
            let dir = Vec3::new(ring * theta.cos(), ring * theta.sin(), z);
            let proj = sphere_project(center(s) + dir * r, s);
            prop_assert!(proj.sdf.abs() < 1e-4);
        }
    }
}
