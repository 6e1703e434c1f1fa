//! Shape mapping between URDF and the target schemas.
//!
//! URDF sizes boxes by full extent and cylinders by full length. MJCF wants
//! half-extents and half-lengths; SDF keeps the URDF convention. Spheres and
//! meshes pass through unchanged in both.
//!
//! | URDF | MJCF | SDF |
//! |------|------|-----|
//! | `box size="x y z"` | `type="box" size="x/2 y/2 z/2"` | `<box><size>x y z</size></box>` |
//! | `cylinder radius="r" length="l"` | `type="cylinder" size="r l/2"` | `<cylinder><radius>r</radius><length>l</length></cylinder>` |
//! | `sphere radius="r"` | `type="sphere" size="r"` | `<sphere><radius>r</radius></sphere>` |
//! | `mesh filename="f" scale="s"` | `<mesh file="f" scale="s"/>` asset | `<mesh><uri>f</uri><scale>s</scale></mesh>` |

use nalgebra::Vector3;

use crate::converter::fmt_vec3;
use crate::types::Geometry;

/// A shape in MJCF conventions.
#[derive(Debug, Clone, PartialEq)]
pub enum MjcfGeom {
    /// Box given by half-extents.
    Box {
        /// Half-extents along x, y, z.
        half_extents: Vector3<f64>,
    },
    /// Cylinder given by radius and half-length.
    Cylinder {
        /// Radius.
        radius: f64,
        /// Half of the full length.
        half_length: f64,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f64,
    },
    /// Mesh asset reference.
    Mesh {
        /// Mesh file, passed through.
        filename: String,
        /// Scale, passed through.
        scale: Option<Vector3<f64>>,
    },
}

impl MjcfGeom {
    /// Value of the geom `type` attribute.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Cylinder { .. } => "cylinder",
            Self::Sphere { .. } => "sphere",
            Self::Mesh { .. } => "mesh",
        }
    }

    /// Value of the geom `size` attribute. Meshes take their size from the
    /// asset and have none.
    #[must_use]
    pub fn size(&self) -> Option<String> {
        match self {
            Self::Box { half_extents } => Some(fmt_vec3(half_extents)),
            Self::Cylinder {
                radius,
                half_length,
            } => Some(format!("{radius} {half_length}")),
            Self::Sphere { radius } => Some(format!("{radius}")),
            Self::Mesh { .. } => None,
        }
    }
}

/// A shape in SDF conventions.
#[derive(Debug, Clone, PartialEq)]
pub enum SdfGeom {
    /// Box given by full size.
    Box {
        /// Full size along x, y, z.
        size: Vector3<f64>,
    },
    /// Cylinder given by radius and full length.
    Cylinder {
        /// Radius.
        radius: f64,
        /// Full length.
        length: f64,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f64,
    },
    /// Mesh reference.
    Mesh {
        /// Mesh URI, passed through from the URDF filename.
        uri: String,
        /// Scale, passed through.
        scale: Option<Vector3<f64>>,
    },
}

/// Map a URDF shape to MJCF conventions.
#[must_use]
pub fn mjcf_geom(geometry: &Geometry) -> MjcfGeom {
    match geometry {
        Geometry::Box { size } => MjcfGeom::Box {
            half_extents: size / 2.0,
        },
        Geometry::Cylinder { radius, length } => MjcfGeom::Cylinder {
            radius: *radius,
            half_length: length / 2.0,
        },
        Geometry::Sphere { radius } => MjcfGeom::Sphere { radius: *radius },
        Geometry::Mesh { filename, scale } => MjcfGeom::Mesh {
            filename: filename.clone(),
            scale: *scale,
        },
    }
}

/// Map a URDF shape to SDF conventions.
#[must_use]
pub fn sdf_geom(geometry: &Geometry) -> SdfGeom {
    match geometry {
        Geometry::Box { size } => SdfGeom::Box { size: *size },
        Geometry::Cylinder { radius, length } => SdfGeom::Cylinder {
            radius: *radius,
            length: *length,
        },
        Geometry::Sphere { radius } => SdfGeom::Sphere { radius: *radius },
        Geometry::Mesh { filename, scale } => SdfGeom::Mesh {
            uri: filename.clone(),
            scale: *scale,
        },
    }
}
