//! Resource resolution.
//!
//! The interpreter never walks the document object model itself; everything
//! it needs from outside the content stream is obtained through the
//! [`Resolver`] capability.

use vireo_syntax::object::dict::keys;
use vireo_syntax::object::{Dict, Object};

/// The resource categories a content stream can refer to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Color spaces.
    ColorSpace,
    /// Fonts.
    Font,
    /// External objects (images and forms).
    XObject,
    /// Patterns.
    Pattern,
    /// Shadings.
    Shading,
    /// External graphics states.
    ExtGState,
    /// Marked-content property lists.
    Properties,
}

/// A capability for resolving named resources.
///
/// Implementations must be usable through a shared reference from multiple
/// interpreter instances at once; the interpreter itself never mutates
/// resolver state.
pub trait Resolver {
    /// Resolve a name within a category to the underlying object, or `None`
    /// if no such resource exists.
    fn resolve(&self, category: Category, name: &[u8]) -> Option<Object<'_>>;
}

/// A [`Resolver`] backed by a resources dictionary, with one sub-dictionary
/// per category.
#[derive(Debug, Clone, Default)]
pub struct DictResolver<'a> {
    color_spaces: Dict<'a>,
    fonts: Dict<'a>,
    x_objects: Dict<'a>,
    patterns: Dict<'a>,
    shadings: Dict<'a>,
    ext_g_states: Dict<'a>,
    properties: Dict<'a>,
}

impl<'a> DictResolver<'a> {
    /// Create a new resolver from a resources dictionary.
    pub fn new(resources: &Dict<'a>) -> Self {
        Self {
            color_spaces: resources.get::<Dict<'_>>(keys::COLORSPACE).unwrap_or_default(),
            fonts: resources.get::<Dict<'_>>(keys::FONT).unwrap_or_default(),
            x_objects: resources.get::<Dict<'_>>(keys::XOBJECT).unwrap_or_default(),
            patterns: resources.get::<Dict<'_>>(keys::PATTERN).unwrap_or_default(),
            shadings: resources.get::<Dict<'_>>(keys::SHADING).unwrap_or_default(),
            ext_g_states: resources.get::<Dict<'_>>(keys::EXT_G_STATE).unwrap_or_default(),
            properties: resources.get::<Dict<'_>>(keys::PROPERTIES).unwrap_or_default(),
        }
    }

    /// Create a resolver from the raw bytes of a resources dictionary.
    pub fn from_bytes(data: &'a [u8]) -> Option<Self> {
        Dict::from_bytes(data).map(|d| Self::new(&d))
    }
}

impl Resolver for DictResolver<'_> {
    fn resolve(&self, category: Category, name: &[u8]) -> Option<Object<'_>> {
        let dict = match category {
            Category::ColorSpace => &self.color_spaces,
            Category::Font => &self.fonts,
            Category::XObject => &self.x_objects,
            Category::Pattern => &self.patterns,
            Category::Shading => &self.shadings,
            Category::ExtGState => &self.ext_g_states,
            Category::Properties => &self.properties,
        };

        dict.get::<Object<'_>>(name)
    }
}
