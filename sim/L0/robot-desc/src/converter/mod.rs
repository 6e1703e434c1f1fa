//! Emitters that re-serialize a [`KinematicTree`] for other simulators.
//!
//! - [`mjcf`]: MuJoCo, which expresses kinematics by nesting bodies.
//! - [`sdf`]: Gazebo, which lists links and joints flat and references
//!   parents and children by name.
//!
//! Both emitters are pure functions of the tree: the same tree always
//! produces byte-identical output.
//!
//! [`KinematicTree`]: crate::KinematicTree

use std::borrow::Cow;

use nalgebra::Vector3;
use quick_xml::escape::escape;

pub mod mjcf;
pub mod sdf;

/// Declaration line that prefixes every emitted document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Target schema for conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// MuJoCo MJCF (tree-structured).
    Mjcf,
    /// Gazebo SDF (flat-list).
    Sdf,
}

impl TargetFormat {
    /// Name of the root element of documents in this format.
    #[must_use]
    pub fn root_tag(&self) -> &'static str {
        match self {
            Self::Mjcf => "mujoco",
            Self::Sdf => "sdf",
        }
    }
}

/// Format a vector as space-separated components.
pub(crate) fn fmt_vec3(v: &Vector3<f64>) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

/// Escape text for use inside an attribute value or element body.
pub(crate) fn esc(text: &str) -> Cow<'_, str> {
    escape(text)
}

/// Indented line-oriented XML output buffer.
#[derive(Debug)]
pub(crate) struct XmlWriter {
    output: String,
    indent: usize,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        let mut output = String::with_capacity(4096);
        output.push_str(XML_DECLARATION);
        output.push('\n');
        Self { output, indent: 0 }
    }

    /// Write one line at the current indentation.
    pub(crate) fn line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Write an opening tag and indent.
    pub(crate) fn open(&mut self, tag: &str) {
        self.line(tag);
        self.indent += 1;
    }

    /// Dedent and write a closing tag.
    pub(crate) fn close(&mut self, tag: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(tag);
    }

    /// Write `<name>text</name>` on one line.
    pub(crate) fn text_element(&mut self, name: &str, text: &str) {
        self.line(&format!("<{name}>{}</{name}>", esc(text)));
    }

    /// Append pre-rendered lines at the current indentation.
    pub(crate) fn lines(&mut self, block: &[String]) {
        for line in block {
            self.line(line);
        }
    }

    pub(crate) fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_indents() {
        let mut w = XmlWriter::new();
        w.open("<a>");
        w.text_element("b", "x & y");
        w.close("</a>");
        let out = w.finish();
        assert_eq!(
            out,
            format!("{XML_DECLARATION}\n<a>\n  <b>x &amp; y</b>\n</a>\n")
        );
    }

    #[test]
    fn test_fmt_vec3() {
        assert_eq!(fmt_vec3(&Vector3::new(0.2, 0.0, -1.5)), "0.2 0 -1.5");
    }
}
