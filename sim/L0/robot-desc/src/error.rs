//! Error types for parsing, validating, and converting robot descriptions.
//!
//! Parsing failures and structural-validation failures are kept in separate
//! enums so callers can tell a malformed document apart from a well-formed
//! one that would misbehave in simulation. [`Error`] wraps both, along with
//! simulator failures.

use thiserror::Error;

use crate::oracle::OracleError;

/// Errors raised while turning a URDF document into a [`KinematicTree`].
///
/// [`KinematicTree`]: crate::KinematicTree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The markup is not well-formed XML.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Missing required element.
    #[error("missing required element: {element} in {context}")]
    MissingElement {
        /// The missing element name.
        element: &'static str,
        /// Where the element was expected.
        context: String,
    },

    /// Missing required attribute.
    #[error("missing required attribute: {attribute} on {element}")]
    MissingAttribute {
        /// The missing attribute name.
        attribute: &'static str,
        /// The element that should have the attribute.
        element: String,
    },

    /// An attribute is present but its value cannot be used.
    #[error("invalid value for {attribute} on {element}: {message}")]
    InvalidAttribute {
        /// The attribute with the invalid value.
        attribute: &'static str,
        /// The element containing the attribute.
        element: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// A joint references a link that is not defined.
    #[error("reference to undefined link: {link_name} in joint {joint_name}")]
    UndefinedLink {
        /// The link name that was referenced.
        link_name: String,
        /// The joint that referenced it.
        joint_name: String,
    },

    /// Two links share a name.
    #[error("duplicate link name: {0}")]
    DuplicateLink(String),

    /// The robot element contains no links.
    #[error("robot '{0}' defines no links")]
    NoLinks(String),
}

impl ParseError {
    /// Create a missing element error.
    pub fn missing_element(element: &'static str, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element,
            context: context.into(),
        }
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(attribute: &'static str, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            element: element.into(),
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(
        attribute: &'static str,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            attribute,
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an undefined link error.
    pub fn undefined_link(link_name: impl Into<String>, joint_name: impl Into<String>) -> Self {
        Self::UndefinedLink {
            link_name: link_name.into(),
            joint_name: joint_name.into(),
        }
    }
}

/// Structural checks that reject a parsed tree before it is simulated.
///
/// The display text is phrased as actionable feedback because it is handed
/// back to whoever authored the document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A child link sits on top of its parent.
    #[error(
        "Link '{child}' is at same position as parent. \
         Offset must be > {min_offset:.2}m to avoid self-collision."
    )]
    TooClose {
        /// Joint whose origin is degenerate.
        joint: String,
        /// Child link of that joint.
        child: String,
        /// Norm of the joint origin translation.
        distance: f64,
        /// Minimum offset reported to the author.
        min_offset: f64,
    },

    /// A joint limit declares an effort below the floor.
    #[error("Joint effort {effort} is too weak. Use at least {floor} for heavy robots.")]
    WeakActuator {
        /// Joint carrying the limit.
        joint: String,
        /// The declared effort.
        effort: f64,
        /// The configured floor.
        floor: f64,
    },

    /// Negative or non-finite mass.
    #[error("invalid mass for link {link_name}: {mass}")]
    InvalidMass {
        /// The link with invalid mass.
        link_name: String,
        /// The invalid mass value.
        mass: f64,
    },

    /// Inertia tensor with negative or non-finite entries.
    #[error("invalid inertia tensor for link {link_name}: {message}")]
    InvalidInertia {
        /// The link with invalid inertia.
        link_name: String,
        /// Description of why the inertia is invalid.
        message: String,
    },
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document parsed but failed a structural check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The simulator could not run the document.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Result type for robot description operations.
pub type Result<T> = std::result::Result<T, Error>;
