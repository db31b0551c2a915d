//! Collision and visual geometry attached to links.
//!
//! Shapes are opaque to the kinematics: they are carried by the link and placed by its
//! pose. Each shape has a local transform (`base`) relative to the link frame and can
//! report its axis-aligned bounding box in that frame.

use nalgebra::{Point3, Vector3};
use crate::errors::StructuralError;
use crate::kinematic_traits::Pose;

#[cfg(feature = "collisions")]
use nalgebra::{Isometry3, UnitQuaternion, Translation3};
#[cfg(feature = "collisions")]
use parry3d::bounding_volume::{Aabb, BoundingVolume};
#[cfg(feature = "collisions")]
use parry3d::shape::SharedShape;

/// Geometric primitive. Dimensions are full extents, cylinders run along z.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Box { x: f64, y: f64, z: f64 },
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
    /// Mesh file reference. The mesh is not loaded, so it has no known bounds.
    Mesh { filename: String, scale: Vector3<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    /// Placement of the shape in the link frame.
    pub base: Pose,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub mins: Point3<f64>,
    pub maxs: Point3<f64>,
}

impl Bounds {
    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    pub fn extents(&self) -> Vector3<f64> {
        self.maxs - self.mins
    }
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Shape { kind, base: Pose::identity() }
    }

    pub fn cuboid(x: f64, y: f64, z: f64) -> Self {
        Self::new(ShapeKind::Box { x, y, z })
    }

    pub fn cylinder(radius: f64, length: f64) -> Self {
        Self::new(ShapeKind::Cylinder { radius, length })
    }

    pub fn sphere(radius: f64) -> Self {
        Self::new(ShapeKind::Sphere { radius })
    }

    pub fn mesh(filename: &str) -> Self {
        Self::new(ShapeKind::Mesh { filename: filename.to_string(), scale: Vector3::repeat(1.0) })
    }

    pub fn with_base(mut self, base: Pose) -> Self {
        self.base = base;
        self
    }

    /// Build a shape from a type name and its parameters, as found in description files:
    /// `box [x, y, z]`, `cylinder [radius, length]`, `sphere [radius]`.
    pub fn from_parameters(kind: &str, parameters: &[f64]) -> Result<Self, StructuralError> {
        let invalid = || StructuralError::InvalidGeometry(format!("{} {:?}", kind, parameters));
        if parameters.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(invalid());
        }
        match (kind.to_ascii_lowercase().as_str(), parameters) {
            ("box", [x, y, z]) => Ok(Self::cuboid(*x, *y, *z)),
            ("cylinder", [radius, length]) => Ok(Self::cylinder(*radius, *length)),
            ("sphere", [radius]) => Ok(Self::sphere(*radius)),
            _ => Err(invalid()),
        }
    }

    /// Half extents about the shape's own centre, `None` for meshes.
    fn half_extents(&self) -> Option<Vector3<f64>> {
        match self.kind {
            ShapeKind::Box { x, y, z } => Some(Vector3::new(x, y, z) * 0.5),
            ShapeKind::Cylinder { radius, length } => Some(Vector3::new(radius, radius, 0.5 * length)),
            ShapeKind::Sphere { radius } => Some(Vector3::repeat(radius)),
            ShapeKind::Mesh { .. } => None,
        }
    }

    /// Bounding box in the link frame.
    pub fn local_bounds(&self) -> Option<Bounds> {
        let half = self.half_extents()?;
        if let ShapeKind::Sphere { radius } = self.kind {
            let centre = Point3::from(self.base.translation.vector);
            let r = Vector3::repeat(radius);
            return Some(Bounds { mins: centre - r, maxs: centre + r });
        }
        // Box around all eight rotated corners
        let mut bounds: Option<Bounds> = None;
        for &sx in &[-1.0, 1.0] {
            for &sy in &[-1.0, 1.0] {
                for &sz in &[-1.0, 1.0] {
                    let corner = self.base * Point3::new(sx * half.x, sy * half.y, sz * half.z);
                    let point = Bounds { mins: corner, maxs: corner };
                    bounds = Some(match bounds {
                        Some(b) => b.merge(&point),
                        None => point,
                    });
                }
            }
        }
        bounds
    }

    /// Parry shape and its placement in the link frame. Meshes are not loaded and
    /// give `None`.
    #[cfg(feature = "collisions")]
    pub fn shared_shape(&self) -> Option<(Isometry3<f32>, SharedShape)> {
        let placement = self.base.cast::<f32>();
        match self.kind {
            ShapeKind::Box { x, y, z } => Some((placement,
                SharedShape::cuboid(0.5 * x as f32, 0.5 * y as f32, 0.5 * z as f32))),
            ShapeKind::Sphere { radius } => Some((placement, SharedShape::ball(radius as f32))),
            ShapeKind::Cylinder { radius, length } => {
                // Parry cylinders run along y
                let to_z = Isometry3::from_parts(Translation3::identity(),
                    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f32::consts::FRAC_PI_2));
                Some((placement * to_z, SharedShape::cylinder(0.5 * length as f32, radius as f32)))
            }
            ShapeKind::Mesh { .. } => None,
        }
    }
}

/// Collection of shapes attached to one link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shapes(Vec<Shape>);

impl Shapes {
    pub fn new() -> Self {
        Shapes(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.0.iter()
    }

    pub fn push(&mut self, shape: Shape) {
        self.0.push(shape);
    }

    /// Bounding box of all shapes with known extents.
    pub fn local_bounds(&self) -> Option<Bounds> {
        self.0.iter()
            .filter_map(|shape| shape.local_bounds())
            .reduce(|a, b| a.merge(&b))
    }

    /// Bounding box computed by parry, over all shapes it can represent.
    #[cfg(feature = "collisions")]
    pub fn aabb(&self) -> Option<Aabb> {
        let mut overall: Option<Aabb> = None;
        for (placement, shape) in self.0.iter().filter_map(|s| s.shared_shape()) {
            let local = shape.compute_aabb(&placement);
            overall = Some(match overall {
                Some(aabb) => aabb.merged(&local),
                None => local,
            });
        }
        overall
    }
}

impl From<Shape> for Shapes {
    fn from(shape: Shape) -> Self {
        Shapes(vec![shape])
    }
}

impl From<Vec<Shape>> for Shapes {
    fn from(shapes: Vec<Shape>) -> Self {
        Shapes(shapes)
    }
}

impl<const N: usize> From<[Shape; N]> for Shapes {
    fn from(shapes: [Shape; N]) -> Self {
        Shapes(shapes.into())
    }
}

impl FromIterator<Shape> for Shapes {
    fn from_iter<I: IntoIterator<Item = Shape>>(iter: I) -> Self {
        Shapes(iter.into_iter().collect())
    }
}
