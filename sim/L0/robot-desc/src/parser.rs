//! URDF XML parser.
//!
//! Parses URDF XML into a [`KinematicTree`]. The reader is deliberately
//! tolerant of content it does not model (`<gazebo>`, `<transmission>`,
//! unknown shapes) but strict about malformed markup, unparseable numbers and
//! dangling link references.

use std::collections::HashMap;
use std::io::BufRead;

use nalgebra::Vector3;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::error::ParseError;
use crate::types::{
    Collision, Geometry, Inertia, Inertial, Joint, JointDynamics, JointLimit, JointType,
    KinematicTree, Link, Origin, Rgba, TreeBuilder, Visual,
};

type Result<T> = std::result::Result<T, ParseError>;

const DEFAULT_ROBOT_NAME: &str = "robot";
const DEFAULT_RGBA: Rgba = Rgba([0.5, 0.5, 0.5, 1.0]);
const DEFAULT_BOX_SIZE: f64 = 0.1;
const DEFAULT_RADIUS: f64 = 0.05;
const DEFAULT_CYLINDER_LENGTH: f64 = 0.1;

/// Parse a URDF string into a kinematic tree.
///
/// # Errors
///
/// Returns an error if the XML is malformed, a numeric attribute cannot be
/// parsed, link names collide, or a joint references an undefined link.
pub fn parse_urdf_str(xml: &str) -> Result<KinematicTree> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    parse_urdf_reader(&mut reader)
}

/// Parse URDF from a reader.
fn parse_urdf_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<KinematicTree> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"robot" => {
                return parse_robot(reader, e);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"robot" => {
                let name = robot_name(e);
                return Err(ParseError::NoLinks(name));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Err(ParseError::missing_element("robot", "URDF document"))
}

/// A visual whose color comes from a robot-level material defined by name.
struct MaterialRef {
    link: usize,
    visual: usize,
    material: String,
}

/// Parse the robot element and its children.
fn parse_robot<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<KinematicTree> {
    let mut links: Vec<Link> = Vec::new();
    let mut joints: Vec<Joint> = Vec::new();
    let mut materials: HashMap<String, Rgba> = HashMap::new();
    let mut material_refs: Vec<MaterialRef> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"link" => {
                        let index = links.len();
                        let (link, refs) = parse_link(reader, e)?;
                        material_refs.extend(refs.into_iter().map(|(visual, material)| {
                            MaterialRef {
                                link: index,
                                visual,
                                material,
                            }
                        }));
                        links.push(link);
                    }
                    b"joint" => {
                        joints.push(parse_joint(reader, e)?);
                    }
                    b"material" => {
                        let name = get_attribute_opt(e, "name")?;
                        let color = parse_material(reader)?;
                        if let (Some(name), Some(color)) = (name, color) {
                            materials.insert(name, color);
                        }
                    }
                    // Skip gazebo, transmission, and other elements
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"link" => {
                    // Empty link (just a name, no inertial/visual/collision)
                    let name = get_attribute(e, "name")?;
                    links.push(Link::new(name));
                }
                b"joint" => {
                    let name = get_attribute_opt(e, "name")?.unwrap_or_default();
                    return Err(ParseError::missing_element(
                        "parent",
                        format!("joint '{name}'"),
                    ));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"robot" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in robot".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    for MaterialRef {
        link,
        visual,
        material,
    } in material_refs
    {
        match materials.get(&material) {
            Some(color) => links[link].visuals[visual].color = Some(*color),
            None => warn!(
                link = %links[link].name,
                material = %material,
                "visual references an undefined material"
            ),
        }
    }

    let mut builder = TreeBuilder::new(robot_name(start));
    for link in links {
        builder.push_link(link);
    }
    for joint in joints {
        builder.push_joint(joint);
    }
    builder.build()
}

fn robot_name(e: &BytesStart) -> String {
    get_attribute_opt(e, "name")
        .ok()
        .flatten()
        .unwrap_or_else(|| DEFAULT_ROBOT_NAME.to_string())
}

/// Parse a robot-level `<material>` definition, returning its color.
fn parse_material<R: BufRead>(reader: &mut Reader<R>) -> Result<Option<Rgba>> {
    let mut color = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.name().as_ref() == b"color" => {
                color = Some(parse_color(e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"material" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in material".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(color)
}

/// Parse a link element.
///
/// Also returns `(visual index, material name)` for visuals whose color must
/// be resolved against robot-level materials.
fn parse_link<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<(Link, Vec<(usize, String)>)> {
    let name = get_attribute(start, "name")?;
    let mut link = Link::new(name);
    let mut material_refs = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"inertial" => {
                        link.inertial = Some(parse_inertial(reader)?);
                    }
                    b"visual" => {
                        if let Some((visual, material)) = parse_visual(reader, &link.name)? {
                            if let Some(material) = material {
                                material_refs.push((link.visuals.len(), material));
                            }
                            link.visuals.push(visual);
                        }
                    }
                    b"collision" => {
                        if let Some(collision) = parse_collision(reader, &link.name)? {
                            link.collisions.push(collision);
                        }
                    }
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"link" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in link".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok((link, material_refs))
}

/// Parse an inertial element.
fn parse_inertial<R: BufRead>(reader: &mut Reader<R>) -> Result<Inertial> {
    let mut inertial = Inertial::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"origin" => inertial.origin = parse_origin(e)?,
                b"mass" => inertial.mass = parse_mass(e)?,
                b"inertia" => inertial.inertia = Some(parse_inertia_element(e)?),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"inertial" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in inertial".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(inertial)
}

/// Parse origin element attributes.
fn parse_origin(e: &BytesStart) -> Result<Origin> {
    let xyz = parse_vector3_attr(e, "xyz")?.unwrap_or_else(Vector3::zeros);
    let rpy = parse_vector3_attr(e, "rpy")?.unwrap_or_else(Vector3::zeros);
    Ok(Origin::new(xyz, rpy))
}

/// Parse mass element. A `<mass>` without a value keeps the default.
fn parse_mass(e: &BytesStart) -> Result<f64> {
    Ok(parse_float_attr(e, "value")?.unwrap_or(Inertial::default().mass))
}

/// Parse inertia element attributes.
fn parse_inertia_element(e: &BytesStart) -> Result<Inertia> {
    Ok(Inertia {
        ixx: parse_float_attr(e, "ixx")?,
        ixy: parse_float_attr(e, "ixy")?,
        ixz: parse_float_attr(e, "ixz")?,
        iyy: parse_float_attr(e, "iyy")?,
        iyz: parse_float_attr(e, "iyz")?,
        izz: parse_float_attr(e, "izz")?,
    })
}

/// Parse a visual element.
///
/// Returns `None` when the visual has no recognizable shape. The second
/// tuple element is a material name still to be resolved when the visual
/// carries no inline color.
fn parse_visual<R: BufRead>(
    reader: &mut Reader<R>,
    link: &str,
) -> Result<Option<(Visual, Option<String>)>> {
    let mut origin = Origin::default();
    let mut geometry: Option<Geometry> = None;
    let mut material: Option<String> = None;
    let mut color: Option<Rgba> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"geometry" => {
                geometry = parse_geometry(reader, link)?;
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"origin" => origin = parse_origin(e)?,
                b"material" => material = get_attribute_opt(e, "name")?,
                // Only appears nested in an inline <material>
                b"color" => color = Some(parse_color(e)?),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"visual" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in visual".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    let Some(geometry) = geometry else {
        warn!(link = %link, "dropping visual without a supported geometry");
        return Ok(None);
    };

    let pending = if color.is_none() { material } else { None };
    Ok(Some((
        Visual {
            origin,
            geometry,
            color,
        },
        pending,
    )))
}

/// Parse a collision element.
fn parse_collision<R: BufRead>(reader: &mut Reader<R>, link: &str) -> Result<Option<Collision>> {
    let mut origin = Origin::default();
    let mut geometry: Option<Geometry> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"geometry" => {
                geometry = parse_geometry(reader, link)?;
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.name().as_ref() == b"origin" => {
                origin = parse_origin(e)?;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"collision" => break,
            Ok(Event::Eof) => {
                return Err(ParseError::XmlParse("unexpected EOF in collision".into()));
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    let Some(geometry) = geometry else {
        warn!(link = %link, "dropping collision without a supported geometry");
        return Ok(None);
    };

    Ok(Some(Collision { origin, geometry }))
}

/// Parse a geometry element. Unknown shapes yield `None`.
fn parse_geometry<R: BufRead>(reader: &mut Reader<R>, link: &str) -> Result<Option<Geometry>> {
    let mut buf = Vec::new();
    let mut geometry: Option<Geometry> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"box" => {
                    let size = parse_vector3_attr(e, "size")?
                        .unwrap_or_else(|| Vector3::repeat(DEFAULT_BOX_SIZE));
                    geometry = Some(Geometry::Box { size });
                }
                b"cylinder" => {
                    let radius = parse_float_attr(e, "radius")?.unwrap_or(DEFAULT_RADIUS);
                    let length = parse_float_attr(e, "length")?.unwrap_or(DEFAULT_CYLINDER_LENGTH);
                    geometry = Some(Geometry::Cylinder { radius, length });
                }
                b"sphere" => {
                    let radius = parse_float_attr(e, "radius")?.unwrap_or(DEFAULT_RADIUS);
                    geometry = Some(Geometry::Sphere { radius });
                }
                b"mesh" => {
                    let filename = get_attribute_opt(e, "filename")?.unwrap_or_default();
                    let scale = parse_vector3_attr(e, "scale")?;
                    geometry = Some(Geometry::Mesh { filename, scale });
                }
                other => {
                    warn!(
                        link = %link,
                        shape = %String::from_utf8_lossy(other),
                        "ignoring unsupported geometry shape"
                    );
                }
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"geometry" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in geometry".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(geometry)
}

/// Parse a joint element.
fn parse_joint<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Joint> {
    let name = get_attribute_opt(start, "name")?;
    let joint_type = match get_attribute_opt(start, "type")? {
        None => JointType::Revolute,
        Some(type_str) => JointType::from_str(&type_str).unwrap_or_else(|| {
            warn!(
                joint = name.as_deref().unwrap_or_default(),
                joint_type = %type_str,
                "unknown joint type"
            );
            JointType::Unknown
        }),
    };

    let mut parent: Option<String> = None;
    let mut child: Option<String> = None;
    let mut origin = Origin::default();
    let mut axis = Vector3::z();
    let mut limit: Option<JointLimit> = None;
    let mut dynamics: Option<JointDynamics> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"parent" => parent = Some(get_attribute(e, "link")?),
                b"child" => child = Some(get_attribute(e, "link")?),
                b"origin" => origin = parse_origin(e)?,
                b"axis" => {
                    if let Some(xyz) = parse_vector3_attr(e, "xyz")? {
                        axis = xyz;
                    }
                }
                b"limit" => limit = Some(parse_joint_limit(e)?),
                b"dynamics" => dynamics = Some(parse_joint_dynamics(e)?),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"joint" => break,
            Ok(Event::Eof) => return Err(ParseError::XmlParse("unexpected EOF in joint".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    let label = name.as_deref().unwrap_or_default();
    let parent =
        parent.ok_or_else(|| ParseError::missing_element("parent", format!("joint '{label}'")))?;
    let child =
        child.ok_or_else(|| ParseError::missing_element("child", format!("joint '{label}'")))?;
    let name = name.unwrap_or_else(|| format!("joint_{child}"));

    let mut joint = Joint::new(name, joint_type, parent, child)
        .with_origin(origin)
        .with_axis(axis);

    if let Some(l) = limit {
        joint = joint.with_limit(l);
    }
    if let Some(d) = dynamics {
        joint = joint.with_dynamics(d);
    }

    Ok(joint)
}

/// Parse joint limit element.
fn parse_joint_limit(e: &BytesStart) -> Result<JointLimit> {
    Ok(JointLimit {
        lower: parse_float_attr(e, "lower")?,
        upper: parse_float_attr(e, "upper")?,
        effort: parse_float_attr(e, "effort")?,
        velocity: parse_float_attr(e, "velocity")?,
    })
}

/// Parse joint dynamics element.
fn parse_joint_dynamics(e: &BytesStart) -> Result<JointDynamics> {
    Ok(JointDynamics {
        damping: parse_float_attr(e, "damping")?.unwrap_or(0.0),
        friction: parse_float_attr(e, "friction")?.unwrap_or(0.0),
    })
}

/// Parse a `<color rgba="..."/>` element.
fn parse_color(e: &BytesStart) -> Result<Rgba> {
    let Some(rgba) = get_attribute_opt(e, "rgba")? else {
        return Ok(DEFAULT_RGBA);
    };
    let values = parse_floats(&rgba)
        .ok_or_else(|| ParseError::invalid_attribute("rgba", "color", "expected numbers"))?;
    match values.as_slice() {
        [r, g, b, a] => Ok(Rgba([*r, *g, *b, *a])),
        _ => Err(ParseError::invalid_attribute(
            "rgba",
            "color",
            format!("expected 4 values, got {}", values.len()),
        )),
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required attribute value.
fn get_attribute(e: &BytesStart, name: &'static str) -> Result<String> {
    get_attribute_opt(e, name)?.ok_or_else(|| ParseError::missing_attribute(name, element_name(e)))
}

/// Get an optional attribute value, unescaping entities.
fn get_attribute_opt(e: &BytesStart, name: &'static str) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(|err| {
                ParseError::invalid_attribute(name, element_name(e), err.to_string())
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse a float attribute. Absent is `None`; present but unparseable is an
/// error.
fn parse_float_attr(e: &BytesStart, name: &'static str) -> Result<Option<f64>> {
    get_attribute_opt(e, name)?
        .map(|s| {
            s.trim().parse::<f64>().map_err(|_| {
                ParseError::invalid_attribute(name, element_name(e), format!("not a number: {s}"))
            })
        })
        .transpose()
}

/// Parse a space-separated vector3 attribute.
fn parse_vector3_attr(e: &BytesStart, name: &'static str) -> Result<Option<Vector3<f64>>> {
    get_attribute_opt(e, name)?
        .map(|s| {
            parse_vector3(&s).ok_or_else(|| {
                ParseError::invalid_attribute(
                    name,
                    element_name(e),
                    format!("expected 3 numbers, got '{s}'"),
                )
            })
        })
        .transpose()
}

/// Parse a space-separated vector3 string.
fn parse_vector3(s: &str) -> Option<Vector3<f64>> {
    match parse_floats(s)?.as_slice() {
        [x, y, z] => Some(Vector3::new(*x, *y, *z)),
        _ => None,
    }
}

fn parse_floats(s: &str) -> Option<Vec<f64>> {
    s.split_whitespace().map(|p| p.parse::<f64>().ok()).collect()
}

/// Get element name as string for error messages.
fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

/// Skip an element and all its children.
fn skip_element<R: BufRead>(reader: &mut Reader<R>, name: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == name => {
                depth += 1;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => {
                return Err(ParseError::XmlParse(format!(
                    "unexpected EOF in {}",
                    String::from_utf8_lossy(name)
                )));
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_simple_robot() {
        let xml = r#"
            <robot name="test_robot">
                <link name="base_link">
                    <inertial>
                        <mass value="1.0"/>
                        <inertia ixx="0.1" iyy="0.1" izz="0.1"/>
                    </inertial>
                </link>
                <link name="link1"/>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        assert_eq!(robot.name(), "test_robot");
        assert_eq!(robot.links().len(), 2);

        let base = robot.link("base_link").expect("base_link should exist");
        let inertial = base.inertial.expect("should have inertial");
        assert_relative_eq!(inertial.mass, 1.0);
        let inertia = inertial.inertia.expect("should have inertia");
        assert_eq!(inertia.ixx, Some(0.1));
        assert_eq!(inertia.ixy, None);
    }

    #[test]
    fn test_parse_joint() {
        let xml = r#"
            <robot name="test">
                <link name="base"/>
                <link name="child"/>
                <joint name="joint1" type="revolute">
                    <parent link="base"/>
                    <child link="child"/>
                    <axis xyz="0 0 1"/>
                    <limit lower="-1.57" upper="1.57" effort="10" velocity="1"/>
                    <dynamics damping="0.5"/>
                </joint>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        assert_eq!(robot.joints().len(), 1);

        let joint = robot.joint("joint1").expect("joint1 should exist");
        assert_eq!(joint.joint_type, JointType::Revolute);
        assert_eq!(joint.parent, "base");
        assert_eq!(joint.child, "child");
        assert_relative_eq!(joint.axis.z, 1.0, epsilon = 1e-10);

        let limit = joint.limit.expect("should have limit");
        assert_eq!(limit.lower, Some(-1.57));
        assert_eq!(limit.upper, Some(1.57));
        assert_eq!(limit.effort, Some(10.0));

        let dynamics = joint.dynamics.expect("should have dynamics");
        assert_relative_eq!(dynamics.damping, 0.5);
        assert_relative_eq!(dynamics.friction, 0.0);
    }

    #[test]
    fn test_parse_origin() {
        let xml = r#"
            <robot name="test">
                <link name="base">
                    <inertial>
                        <origin xyz="1 2 3" rpy="0.1 0.2 0.3"/>
                        <mass value="1"/>
                    </inertial>
                </link>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        let inertial = robot.root().inertial.expect("should have inertial");

        assert_relative_eq!(inertial.origin.xyz.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(inertial.origin.xyz.y, 2.0, epsilon = 1e-10);
        assert_relative_eq!(inertial.origin.xyz.z, 3.0, epsilon = 1e-10);
        assert_relative_eq!(inertial.origin.rpy.x, 0.1, epsilon = 1e-10);
        assert!(inertial.inertia.is_none());
    }

    #[test]
    fn test_parse_collision_geometry() {
        let xml = r#"
            <robot name="test">
                <link name="base">
                    <collision>
                        <geometry>
                            <box size="1 2 3"/>
                        </geometry>
                    </collision>
                    <collision>
                        <geometry>
                            <sphere radius="0.5"/>
                        </geometry>
                    </collision>
                    <collision>
                        <geometry>
                            <capsule radius="0.5" length="1"/>
                        </geometry>
                    </collision>
                </link>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        let base = robot.link("base").expect("base should exist");
        // The capsule is not a URDF primitive and is dropped
        assert_eq!(base.collisions.len(), 2);

        match &base.collisions[0].geometry {
            Geometry::Box { size } => {
                assert_relative_eq!(size.x, 1.0, epsilon = 1e-10);
                assert_relative_eq!(size.y, 2.0, epsilon = 1e-10);
                assert_relative_eq!(size.z, 3.0, epsilon = 1e-10);
            }
            other => panic!("expected box geometry, got {other:?}"),
        }

        match &base.collisions[1].geometry {
            Geometry::Sphere { radius } => {
                assert_relative_eq!(*radius, 0.5, epsilon = 1e-10);
            }
            other => panic!("expected sphere geometry, got {other:?}"),
        }
    }

    #[test]
    fn test_geometry_defaults() {
        let xml = r#"
            <robot name="test">
                <link name="base">
                    <visual><geometry><cylinder/></geometry></visual>
                    <visual><geometry><box/></geometry></visual>
                    <visual><geometry><mesh filename="package://bot/base.stl" scale="2 2 2"/></geometry></visual>
                </link>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        let visuals = &robot.root().visuals;
        assert_eq!(visuals[0].geometry, Geometry::cylinder(0.05, 0.1));
        assert_eq!(visuals[1].geometry, Geometry::box_shape(0.1, 0.1, 0.1));
        assert_eq!(
            visuals[2].geometry,
            Geometry::mesh("package://bot/base.stl", Some(Vector3::new(2.0, 2.0, 2.0)))
        );
    }

    #[test]
    fn test_material_colors() {
        let xml = r#"
            <robot name="test">
                <link name="base">
                    <visual>
                        <geometry><box size="1 1 1"/></geometry>
                        <material name="inline"><color rgba="1 0 0 1"/></material>
                    </visual>
                    <visual>
                        <geometry><sphere radius="0.1"/></geometry>
                        <material name="blue"/>
                    </visual>
                    <visual>
                        <geometry><sphere radius="0.1"/></geometry>
                    </visual>
                </link>
                <material name="blue">
                    <color rgba="0 0 0.8 1"/>
                </material>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        let visuals = &robot.root().visuals;
        assert_eq!(visuals[0].color, Some(Rgba([1.0, 0.0, 0.0, 1.0])));
        assert_eq!(visuals[1].color, Some(Rgba([0.0, 0.0, 0.8, 1.0])));
        assert_eq!(visuals[2].color, None);
    }

    #[test]
    fn test_joint_defaults() {
        let xml = r#"
            <robot name="test">
                <link name="a"/>
                <link name="b"/>
                <joint>
                    <parent link="a"/>
                    <child link="b"/>
                </joint>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).expect("should parse");
        let joint = &robot.joints()[0];
        assert_eq!(joint.name, "joint_b");
        assert_eq!(joint.joint_type, JointType::Revolute);
        assert_eq!(joint.axis, Vector3::z());
        assert_eq!(joint.origin, Origin::default());
        assert!(joint.limit.is_none());
    }

    #[test]
    fn test_unknown_joint_type_is_kept_distinct() {
        let xml = r#"
            <robot name="test">
                <link name="a"/>
                <link name="b"/>
                <joint name="j" type="screw">
                    <parent link="a"/>
                    <child link="b"/>
                </joint>
            </robot>
        "#;
        let robot = parse_urdf_str(xml).expect("should parse");
        assert_eq!(robot.joints()[0].joint_type, JointType::Unknown);
    }

    #[test]
    fn test_parse_vector3() {
        let v = parse_vector3("1.0 2.0 3.0").expect("should parse");
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-10);
        assert_relative_eq!(v.y, 2.0, epsilon = 1e-10);
        assert_relative_eq!(v.z, 3.0, epsilon = 1e-10);

        // With extra whitespace
        let v = parse_vector3("  1   2   3  ").expect("should parse");
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-10);

        assert!(parse_vector3("1 2").is_none());
        assert!(parse_vector3("1 two 3").is_none());
    }

    #[test]
    fn test_missing_robot_name_defaults() {
        let robot = parse_urdf_str(r#"<robot><link name="base"/></robot>"#).expect("should parse");
        assert_eq!(robot.name(), "robot");
    }

    #[test]
    fn test_malformed_markup() {
        let result = parse_urdf_str(r#"<robot name="x"><link name="a"></robot>"#);
        assert!(matches!(result, Err(ParseError::XmlParse(_))));

        let result = parse_urdf_str(r#"<robot name="x"><link name="a"/>"#);
        assert!(matches!(result, Err(ParseError::XmlParse(_))));

        let result = parse_urdf_str("no markup here");
        assert!(matches!(result, Err(ParseError::MissingElement { .. })));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let xml = r#"
            <robot name="test">
                <link name="a"/>
                <link name="b"/>
                <joint name="j" type="revolute">
                    <parent link="a"/>
                    <child link="b"/>
                    <limit effort="strong"/>
                </joint>
            </robot>
        "#;
        let result = parse_urdf_str(xml);
        assert!(matches!(
            result,
            Err(ParseError::InvalidAttribute {
                attribute: "effort",
                ..
            })
        ));
    }

    #[test]
    fn test_undefined_link_reference() {
        let xml = r#"
            <robot name="test">
                <link name="a"/>
                <joint name="j" type="fixed">
                    <parent link="a"/>
                    <child link="ghost"/>
                </joint>
            </robot>
        "#;
        let result = parse_urdf_str(xml);
        assert_eq!(result, Err(ParseError::undefined_link("ghost", "j")));
    }

    #[test]
    fn test_skips_unknown_elements() {
        let xml = r#"
            <robot name="test">
                <gazebo reference="a"><mu1>0.2</mu1><link name="not_a_link"/></gazebo>
                <link name="a"/>
            </robot>
        "#;
        let robot = parse_urdf_str(xml).expect("should parse");
        assert_eq!(robot.links().len(), 1);
    }
}
