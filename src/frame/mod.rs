//! Coordinate frames: axis semantics for N-dimensional spaces
//!
//! A [`Frame`] attaches meaning to the axes of a coordinate space: labels,
//! units, symbols and plotting direction per axis, plus frame-level title,
//! domain, coordinate system identity and (where relevant) epoch and
//! equinox. The axis count is fixed at construction.
//!
//! Per-axis attributes use the indexed form `Label(2)`, `Unit(1)` and so
//! on, with 1-based axis numbering.

pub mod frameset;

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::object::{split_indexed, AttrKind, AttrValue, Object};
use crate::Result;

pub use frameset::FrameSet;

/// Coordinate system identity of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum System {
    #[default]
    Cartesian,
    Equatorial,
    Galactic,
    Ecliptic,
}

impl System {
    pub fn name(&self) -> &'static str {
        match self {
            System::Cartesian => "Cartesian",
            System::Equatorial => "Equatorial",
            System::Galactic => "Galactic",
            System::Ecliptic => "Ecliptic",
        }
    }

    pub fn from_name(name: &str) -> Option<System> {
        match name {
            "Cartesian" => Some(System::Cartesian),
            "Equatorial" => Some(System::Equatorial),
            "Galactic" => Some(System::Galactic),
            "Ecliptic" => Some(System::Ecliptic),
            _ => None,
        }
    }
}

/// Per-axis metadata; unset fields serve computed defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
    pub unit: Option<String>,
    pub symbol: Option<String>,
    /// Plot direction; true means increasing left-to-right
    pub direction: Option<bool>,
}

/// Semantic description of an N-dimensional coordinate space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    naxes: usize,
    pub(crate) id: Option<String>,
    title: Option<String>,
    domain: Option<String>,
    system: Option<System>,
    epoch: Option<f64>,
    equinox: Option<f64>,
    axes: Vec<Axis>,
}

impl Frame {
    /// A frame with `naxes` axes and every attribute at its default
    pub fn new(naxes: usize) -> Self {
        Self {
            naxes,
            id: None,
            title: None,
            domain: None,
            system: None,
            epoch: None,
            equinox: None,
            axes: vec![Axis::default(); naxes],
        }
    }

    pub fn naxes(&self) -> usize {
        self.naxes
    }

    /// Axis label; defaults to `Axis N`
    pub fn label(&self, axis: usize) -> Result<String> {
        let ax = self.axis(axis)?;
        Ok(ax.label.clone().unwrap_or_else(|| format!("Axis {axis}")))
    }

    pub fn set_label(&mut self, axis: usize, label: impl Into<String>) -> Result<()> {
        self.axis_mut(axis)?.label = Some(label.into());
        Ok(())
    }

    /// Axis unit; defaults to the empty string
    pub fn unit(&self, axis: usize) -> Result<String> {
        Ok(self.axis(axis)?.unit.clone().unwrap_or_default())
    }

    pub fn set_unit(&mut self, axis: usize, unit: impl Into<String>) -> Result<()> {
        self.axis_mut(axis)?.unit = Some(unit.into());
        Ok(())
    }

    /// Axis symbol; defaults to `xN`
    pub fn symbol(&self, axis: usize) -> Result<String> {
        let ax = self.axis(axis)?;
        Ok(ax.symbol.clone().unwrap_or_else(|| format!("x{axis}")))
    }

    pub fn set_symbol(&mut self, axis: usize, symbol: impl Into<String>) -> Result<()> {
        self.axis_mut(axis)?.symbol = Some(symbol.into());
        Ok(())
    }

    /// Frame title; defaults to `N-d coordinate system`
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{}-d coordinate system", self.naxes))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Frame domain, stored uppercase; defaults to the empty string
    pub fn domain(&self) -> String {
        self.domain.clone().unwrap_or_default()
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = Some(domain.into().to_uppercase());
    }

    pub fn system(&self) -> System {
        self.system.unwrap_or_default()
    }

    pub fn set_system(&mut self, system: System) {
        self.system = Some(system);
    }

    pub fn epoch(&self) -> Option<f64> {
        self.epoch
    }

    pub fn set_epoch(&mut self, epoch: f64) {
        self.epoch = Some(epoch);
    }

    pub fn equinox(&self) -> Option<f64> {
        self.equinox
    }

    pub fn set_equinox(&mut self, equinox: f64) {
        self.equinox = Some(equinox);
    }

    /// Structural equality ignoring identity attributes
    pub fn same_as(&self, other: &Frame) -> bool {
        self.naxes == other.naxes
            && self.title == other.title
            && self.domain == other.domain
            && self.system == other.system
            && self.epoch == other.epoch
            && self.equinox == other.equinox
            && self.axes == other.axes
    }

    fn axis(&self, axis: usize) -> Result<&Axis> {
        if axis == 0 || axis > self.naxes {
            return Err(WcsError::bad_attr_value(
                "axis",
                format!("axis {axis} out of range 1..={}", self.naxes),
            ));
        }
        Ok(&self.axes[axis - 1])
    }

    fn axis_mut(&mut self, axis: usize) -> Result<&mut Axis> {
        if axis == 0 || axis > self.naxes {
            return Err(WcsError::bad_attr_value(
                "axis",
                format!("axis {axis} out of range 1..={}", self.naxes),
            ));
        }
        Ok(&mut self.axes[axis - 1])
    }
}

impl Object for Frame {
    fn class_name(&self) -> &'static str {
        "Frame"
    }

    fn get_attr(&self, name: &str) -> Result<AttrValue> {
        if let Some((base, axis)) = split_indexed(name) {
            if axis > self.naxes {
                return Err(WcsError::unknown_attr("Frame", name));
            }
            return match base {
                "Label" => Ok(AttrValue::Str(self.label(axis)?)),
                "Unit" => Ok(AttrValue::Str(self.unit(axis)?)),
                "Symbol" => Ok(AttrValue::Str(self.symbol(axis)?)),
                "Direction" => Ok(AttrValue::Bool(
                    self.axis(axis)?.direction.unwrap_or(true),
                )),
                _ => Err(WcsError::unknown_attr("Frame", name)),
            };
        }
        match name {
            "Class" => Ok(AttrValue::Str(self.class_name().to_string())),
            "ID" => Ok(AttrValue::Str(self.id.clone().unwrap_or_default())),
            "Naxes" => Ok(AttrValue::Int(self.naxes as i64)),
            "Title" => Ok(AttrValue::Str(self.title())),
            "Domain" => Ok(AttrValue::Str(self.domain())),
            "System" => Ok(AttrValue::Str(self.system().name().to_string())),
            "Epoch" => Ok(AttrValue::Float(self.epoch.unwrap_or(2000.0))),
            "Equinox" => Ok(AttrValue::Float(self.equinox.unwrap_or(2000.0))),
            _ => Err(WcsError::unknown_attr("Frame", name)),
        }
    }

    fn set_attr(&mut self, name: &str, value: &str) -> Result<()> {
        if let Some((base, axis)) = split_indexed(name) {
            if axis > self.naxes {
                return Err(WcsError::unknown_attr("Frame", name));
            }
            return match base {
                "Label" => self.set_label(axis, value),
                "Unit" => self.set_unit(axis, value),
                "Symbol" => self.set_symbol(axis, value),
                "Direction" => {
                    let v = AttrValue::parse(name, AttrKind::Bool, value)?;
                    self.axis_mut(axis)?.direction = v.as_bool();
                    Ok(())
                }
                _ => Err(WcsError::unknown_attr("Frame", name)),
            };
        }
        match name {
            "ID" => {
                self.id = Some(value.to_string());
                Ok(())
            }
            "Title" => {
                self.set_title(value);
                Ok(())
            }
            "Domain" => {
                self.set_domain(value);
                Ok(())
            }
            "System" => match System::from_name(value) {
                Some(system) => {
                    self.set_system(system);
                    Ok(())
                }
                None => Err(WcsError::bad_attr_value(
                    "System",
                    format!("unknown system `{value}`"),
                )),
            },
            "Epoch" => {
                let v = AttrValue::parse(name, AttrKind::Float, value)?;
                self.epoch = v.as_float();
                Ok(())
            }
            "Equinox" => {
                let v = AttrValue::parse(name, AttrKind::Float, value)?;
                self.equinox = v.as_float();
                Ok(())
            }
            "Class" | "Naxes" => Err(WcsError::ReadOnlyAttribute {
                class: "Frame".to_string(),
                name: name.to_string(),
            }),
            _ => Err(WcsError::unknown_attr("Frame", name)),
        }
    }

    fn attr_is_set(&self, name: &str) -> bool {
        if let Some((base, axis)) = split_indexed(name) {
            if axis == 0 || axis > self.naxes {
                return false;
            }
            let ax = &self.axes[axis - 1];
            return match base {
                "Label" => ax.label.is_some(),
                "Unit" => ax.unit.is_some(),
                "Symbol" => ax.symbol.is_some(),
                "Direction" => ax.direction.is_some(),
                _ => false,
            };
        }
        match name {
            "ID" => self.id.is_some(),
            "Title" => self.title.is_some(),
            "Domain" => self.domain.is_some(),
            "System" => self.system.is_some(),
            "Epoch" => self.epoch.is_some(),
            "Equinox" => self.equinox.is_some(),
            _ => false,
        }
    }

    fn clear_attr(&mut self, name: &str) -> Result<()> {
        if let Some((base, axis)) = split_indexed(name) {
            if axis > self.naxes {
                return Err(WcsError::unknown_attr("Frame", name));
            }
            let ax = self.axis_mut(axis)?;
            return match base {
                "Label" => {
                    ax.label = None;
                    Ok(())
                }
                "Unit" => {
                    ax.unit = None;
                    Ok(())
                }
                "Symbol" => {
                    ax.symbol = None;
                    Ok(())
                }
                "Direction" => {
                    ax.direction = None;
                    Ok(())
                }
                _ => Err(WcsError::unknown_attr("Frame", name)),
            };
        }
        match name {
            "ID" => self.id = None,
            "Title" => self.title = None,
            "Domain" => self.domain = None,
            "System" => self.system = None,
            "Epoch" => self.epoch = None,
            "Equinox" => self.equinox = None,
            _ => return Err(WcsError::unknown_attr("Frame", name)),
        }
        Ok(())
    }
}
