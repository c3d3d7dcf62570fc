//! Colors and color spaces.
//!
//! Color spaces are resolved into immutable descriptors that know their
//! component count and initial color. The numeric transforms of the
//! individual spaces are left to the consumer of the drawing intents; this
//! module only does resolution and validation.

use log::warn;
use smallvec::{SmallVec, smallvec};
use std::ops::Deref;
use std::sync::Arc;
use vireo_syntax::object::dict::keys;
use vireo_syntax::object::{Array, Dict, Name, Object};

/// A storage for the components of colors.
pub type ColorComponents = SmallVec<[f32; 4]>;

#[derive(Debug)]
enum Repr {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray {
        white_point: [f32; 3],
    },
    CalRgb {
        white_point: [f32; 3],
    },
    Lab {
        white_point: [f32; 3],
        range: [f32; 4],
    },
    IccBased {
        components: usize,
        alternate: Option<ColorSpace>,
    },
    Indexed {
        base: ColorSpace,
        hival: u8,
        lookup: Vec<u8>,
    },
    Separation {
        names: Vec<String>,
        alternate: ColorSpace,
    },
    DeviceN {
        names: Vec<String>,
        alternate: ColorSpace,
    },
    Pattern(Option<ColorSpace>),
}

/// A resolved color space.
///
/// Color spaces are immutable once resolved and cheap to share; cloning
/// only bumps a reference count.
#[derive(Debug, Clone)]
pub struct ColorSpace(Arc<Repr>);

impl ColorSpace {
    /// Return the device gray color space.
    pub fn device_gray() -> Self {
        Self(Arc::new(Repr::DeviceGray))
    }

    /// Return the device RGB color space.
    pub fn device_rgb() -> Self {
        Self(Arc::new(Repr::DeviceRgb))
    }

    /// Return the device CMYK color space.
    pub fn device_cmyk() -> Self {
        Self(Arc::new(Repr::DeviceCmyk))
    }

    /// Create a new color space from a bare name, without resource lookup.
    ///
    /// This covers the device spaces, their inline-image abbreviations and
    /// the pattern space; everything else needs to be resolved through the
    /// resource dictionary.
    pub(crate) fn from_name(name: &Name<'_>) -> Option<Self> {
        match name.deref() {
            keys::DEVICE_GRAY | keys::G => Some(Self::device_gray()),
            keys::DEVICE_RGB | keys::RGB => Some(Self::device_rgb()),
            keys::DEVICE_CMYK | keys::CMYK => Some(Self::device_cmyk()),
            keys::PATTERN => Some(Self(Arc::new(Repr::Pattern(None)))),
            _ => None,
        }
    }

    /// Create a new color space from a resolved resource object.
    pub(crate) fn from_object(object: &Object<'_>) -> Option<Self> {
        if let Some(name) = object.clone().into_name() {
            return Self::from_name(&name);
        }

        let array = object.clone().into_array()?;
        let mut iter = array.flex_iter();
        let name = iter.next::<Name<'_>>()?;

        match name.deref() {
            keys::DEVICE_GRAY | keys::G => Some(Self::device_gray()),
            keys::DEVICE_RGB | keys::RGB => Some(Self::device_rgb()),
            keys::DEVICE_CMYK | keys::CMYK => Some(Self::device_cmyk()),
            keys::CAL_GRAY => {
                let dict = iter.next::<Dict<'_>>()?;

                Some(Self(Arc::new(Repr::CalGray {
                    white_point: white_point(&dict),
                })))
            }
            keys::CAL_RGB => {
                let dict = iter.next::<Dict<'_>>()?;

                Some(Self(Arc::new(Repr::CalRgb {
                    white_point: white_point(&dict),
                })))
            }
            keys::LAB => {
                let dict = iter.next::<Dict<'_>>()?;
                let range = dict
                    .get::<Array<'_>>(keys::RANGE)
                    .and_then(|a| {
                        let mut iter = a.iter::<f32>();
                        Some([iter.next()?, iter.next()?, iter.next()?, iter.next()?])
                    })
                    .unwrap_or([-100.0, 100.0, -100.0, 100.0]);

                Some(Self(Arc::new(Repr::Lab {
                    white_point: white_point(&dict),
                    range,
                })))
            }
            keys::ICC_BASED => {
                // The ICC profile itself lives in a stream the document
                // model owns; all that matters here is the component count
                // and the alternate space.
                let dict = iter.next::<Dict<'_>>()?;
                let alternate = dict
                    .get::<Object<'_>>(keys::ALTERNATE)
                    .and_then(|o| Self::from_object(&o));
                let components = dict
                    .get::<usize>(keys::N)
                    .or_else(|| alternate.as_ref().map(|a| a.components()))?;

                Some(Self(Arc::new(Repr::IccBased {
                    components,
                    alternate,
                })))
            }
            keys::INDEXED | keys::I => {
                let base = Self::from_object(&iter.next::<Object<'_>>()?)?;
                let hival = iter.next::<u8>()?;
                let lookup = iter.next::<vireo_syntax::object::string::String<'_>>()?;
                let lookup = lookup.get().into_owned();

                let required = (hival as usize + 1) * base.components();
                if lookup.len() < required {
                    warn!(
                        "indexed lookup table has {} bytes, needs {}",
                        lookup.len(),
                        required
                    );

                    return None;
                }

                Some(Self(Arc::new(Repr::Indexed {
                    base,
                    hival,
                    lookup,
                })))
            }
            keys::SEPARATION => {
                let colorant = iter.next::<Name<'_>>()?;
                let alternate = Self::from_object(&iter.next::<Object<'_>>()?)?;

                Some(Self(Arc::new(Repr::Separation {
                    names: vec![colorant.as_str().to_string()],
                    alternate,
                })))
            }
            keys::DEVICE_N => {
                let names = iter
                    .next::<Array<'_>>()?
                    .iter::<Name<'_>>()
                    .map(|n| n.as_str().to_string())
                    .collect::<Vec<_>>();
                let alternate = Self::from_object(&iter.next::<Object<'_>>()?)?;

                if names.is_empty() {
                    return None;
                }

                Some(Self(Arc::new(Repr::DeviceN { names, alternate })))
            }
            keys::PATTERN => {
                let base = iter.next::<Object<'_>>().and_then(|o| Self::from_object(&o));

                Some(Self(Arc::new(Repr::Pattern(base))))
            }
            _ => {
                warn!("unsupported color space: {}", name.as_str());

                None
            }
        }
    }

    /// The number of components a color in this space has.
    pub fn components(&self) -> usize {
        match self.0.as_ref() {
            Repr::DeviceGray | Repr::CalGray { .. } => 1,
            Repr::DeviceRgb | Repr::CalRgb { .. } | Repr::Lab { .. } => 3,
            Repr::DeviceCmyk => 4,
            Repr::IccBased { components, .. } => *components,
            Repr::Indexed { .. } => 1,
            Repr::Separation { .. } => 1,
            Repr::DeviceN { names, .. } => names.len(),
            Repr::Pattern(base) => base.as_ref().map(|b| b.components()).unwrap_or(0),
        }
    }

    /// The initial color that selecting this space establishes.
    pub fn initial_color(&self) -> ColorComponents {
        match self.0.as_ref() {
            Repr::DeviceGray | Repr::CalGray { .. } | Repr::Indexed { .. } => smallvec![0.0],
            Repr::DeviceRgb | Repr::CalRgb { .. } | Repr::Lab { .. } => smallvec![0.0, 0.0, 0.0],
            Repr::DeviceCmyk => smallvec![0.0, 0.0, 0.0, 1.0],
            Repr::IccBased { components, .. } => smallvec![0.0; *components],
            Repr::Separation { .. } => smallvec![1.0],
            Repr::DeviceN { names, .. } => smallvec![1.0; names.len()],
            Repr::Pattern(_) => smallvec![],
        }
    }

    /// Return `true` if this is the pattern color space.
    pub fn is_pattern(&self) -> bool {
        matches!(self.0.as_ref(), Repr::Pattern(_))
    }

    /// The underlying space of an uncolored pattern space, if any.
    pub fn pattern_base(&self) -> Option<Self> {
        match self.0.as_ref() {
            Repr::Pattern(base) => base.clone(),
            _ => None,
        }
    }

    /// The alternate space of an ICC-based, separation or DeviceN space.
    pub fn alternate(&self) -> Option<Self> {
        match self.0.as_ref() {
            Repr::IccBased { alternate, .. } => alternate.clone(),
            Repr::Separation { alternate, .. } | Repr::DeviceN { alternate, .. } => {
                Some(alternate.clone())
            }
            _ => None,
        }
    }

    /// The colorant names of a separation or DeviceN space.
    pub fn colorants(&self) -> Option<&[String]> {
        match self.0.as_ref() {
            Repr::Separation { names, .. } | Repr::DeviceN { names, .. } => Some(names),
            _ => None,
        }
    }

    /// The base space, highest index and lookup table of an indexed space.
    pub fn indexed_parts(&self) -> Option<(Self, u8, &[u8])> {
        match self.0.as_ref() {
            Repr::Indexed {
                base,
                hival,
                lookup,
            } => Some((base.clone(), *hival, lookup)),
            _ => None,
        }
    }

    /// The white point of a CIE-based space.
    pub fn white_point(&self) -> Option<[f32; 3]> {
        match self.0.as_ref() {
            Repr::CalGray { white_point }
            | Repr::CalRgb { white_point }
            | Repr::Lab { white_point, .. } => Some(*white_point),
            _ => None,
        }
    }

    /// The component ranges of a Lab space.
    pub fn lab_range(&self) -> Option<[f32; 4]> {
        match self.0.as_ref() {
            Repr::Lab { range, .. } => Some(*range),
            _ => None,
        }
    }

    /// A short name for the space, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.0.as_ref() {
            Repr::DeviceGray => "DeviceGray",
            Repr::DeviceRgb => "DeviceRGB",
            Repr::DeviceCmyk => "DeviceCMYK",
            Repr::CalGray { .. } => "CalGray",
            Repr::CalRgb { .. } => "CalRGB",
            Repr::Lab { .. } => "Lab",
            Repr::IccBased { .. } => "ICCBased",
            Repr::Indexed { .. } => "Indexed",
            Repr::Separation { .. } => "Separation",
            Repr::DeviceN { .. } => "DeviceN",
            Repr::Pattern(_) => "Pattern",
        }
    }
}

impl PartialEq for ColorSpace {
    fn eq(&self, other: &Self) -> bool {
        // Pointer equality is enough for sharing within one invocation;
        // freshly built device spaces compare by kind.
        Arc::ptr_eq(&self.0, &other.0)
            || matches!(
                (self.0.as_ref(), other.0.as_ref()),
                (Repr::DeviceGray, Repr::DeviceGray)
                    | (Repr::DeviceRgb, Repr::DeviceRgb)
                    | (Repr::DeviceCmyk, Repr::DeviceCmyk)
            )
    }
}

fn white_point(dict: &Dict<'_>) -> [f32; 3] {
    dict.get::<Array<'_>>(keys::WHITE_POINT)
        .and_then(|a| {
            let mut iter = a.iter::<f32>();
            Some([iter.next()?, iter.next()?, iter.next()?])
        })
        .unwrap_or([1.0, 1.0, 1.0])
}
