use std::path::PathBuf;
use cgmath::{InnerSpace, Matrix4, Rad, Vector3};

/// Declarative placement of one model in the campus.
///
/// Created once while the scene is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPlacement {
    pub mesh: PathBuf,
    pub texture: PathBuf,
    pub scale: [f32; 3],
    pub rotation_axis: [f32; 3],
    /// Rotation around `rotation_axis` in radians.
    pub rotation_angle: f32,
    pub translation: [f32; 3],
}

impl ModelPlacement {
    pub fn world_transform(&self) -> Matrix4<f32> {
        resolve(self)
    }
}

/// Resolves a placement into its world transform.
///
/// A vertex `v` is mapped to `translate * rotate * scale * v`. The rotation axis is normalized here;
/// a zero angle or a zero length axis produces no rotation.
pub fn resolve(placement: &ModelPlacement) -> Matrix4<f32> {
    let [sx, sy, sz] = placement.scale;
    let scale = Matrix4::from_nonuniform_scale(sx, sy, sz);

    let axis = Vector3::from(placement.rotation_axis);
    let rotation = if placement.rotation_angle == 0.0 || axis.magnitude2() == 0.0 {
        Matrix4::from_scale(1.0)
    } else {
        Matrix4::from_axis_angle(axis.normalize(), Rad(placement.rotation_angle))
    };

    let translation = Matrix4::from_translation(Vector3::from(placement.translation));

    translation * rotation * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, SquareMatrix};
    use std::f32::consts::FRAC_PI_2;

    fn placement(scale: [f32; 3], axis: [f32; 3], angle: f32, translation: [f32; 3]) -> ModelPlacement {
        ModelPlacement {
            mesh: PathBuf::from("building.obj"),
            texture: PathBuf::from("building.bmp"),
            scale,
            rotation_axis: axis,
            rotation_angle: angle,
            translation,
        }
    }

    fn assert_close(a: Vector4<f32>, b: Vector4<f32>) {
        assert!((a - b).magnitude() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_scale_then_translate() {
        let m = resolve(&placement([2.0, 1.0, 1.0], [0.0, 1.0, 0.0], 0.0, [5.0, 0.0, 0.0]));
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(7.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rotation_applied_after_scale() {
        // Quarter turn about +y takes +x to -z
        let m = resolve(&placement([2.0, 1.0, 1.0], [0.0, 1.0, 0.0], FRAC_PI_2, [0.0, 0.0, 0.0]));
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_close(p, Vector4::new(0.0, 0.0, -2.0, 1.0));
    }

    #[test]
    fn test_translation_outermost() {
        let m = resolve(&placement([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], FRAC_PI_2, [0.0, 0.0, 3.0]));
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_close(p, Vector4::new(0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn test_axis_is_normalized() {
        let unit = resolve(&placement([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], 0.7, [1.0, 2.0, 3.0]));
        let long = resolve(&placement([1.0, 1.0, 1.0], [0.0, 10.0, 0.0], 0.7, [1.0, 2.0, 3.0]));
        let v = Vector4::new(0.3, -1.0, 2.0, 1.0);
        assert_close(unit * v, long * v);
    }

    #[test]
    fn test_zero_axis_is_identity_rotation() {
        let m = resolve(&placement([1.0, 1.0, 1.0], [0.0, 0.0, 0.0], 1.0, [0.0, 0.0, 0.0]));
        assert_eq!(m, Matrix4::identity());
    }

    #[test]
    fn test_resolve_deterministic() {
        let p = placement([1.5, 0.5, 2.0], [1.0, 1.0, 0.0], 0.3, [-4.0, 0.0, 12.5]);
        let a = resolve(&p);
        let b = p.world_transform();
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()));
    }
}
