use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};
use crate::render::StyleRef;

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub const fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn validate(self) -> PlotResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PlotError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: Color,
    #[serde(default)]
    pub cap: LineCap,
    /// Alternating dash/gap lengths; empty draws a solid line.
    #[serde(default)]
    pub dash_pattern: Vec<f64>,
}

impl LineStyle {
    #[must_use]
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            cap: LineCap::Butt,
            dash_pattern: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dash_pattern(mut self, pattern: Vec<f64>) -> Self {
        self.dash_pattern = pattern;
        self
    }

    pub fn validate(&self) -> PlotResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(PlotError::InvalidData(
                "line width must be finite and > 0".to_owned(),
            ));
        }
        if self
            .dash_pattern
            .iter()
            .any(|length| !length.is_finite() || *length < 0.0)
        {
            return Err(PlotError::InvalidData(
                "dash lengths must be finite and >= 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillStyle {
    Solid { color: Color },
    /// Linear gradient along `angle_degrees` measured counter-clockwise from +x.
    LinearGradient {
        start: Color,
        end: Color,
        angle_degrees: f64,
    },
}

impl FillStyle {
    pub fn validate(self) -> PlotResult<()> {
        match self {
            Self::Solid { color } => color.validate(),
            Self::LinearGradient {
                start,
                end,
                angle_degrees,
            } => {
                if !angle_degrees.is_finite() {
                    return Err(PlotError::InvalidData(
                        "gradient angle must be finite".to_owned(),
                    ));
                }
                start.validate()?;
                end.validate()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolShape {
    #[default]
    Ellipse,
    Rectangle,
    Triangle,
    Diamond,
    Cross,
    Plus,
    Star,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolStyle {
    pub shape: SymbolShape,
    /// Symbol extent in renderer units.
    pub size: f64,
    #[serde(default)]
    pub fill: Option<FillStyle>,
    #[serde(default)]
    pub outline: Option<LineStyle>,
}

impl SymbolStyle {
    pub fn validate(&self) -> PlotResult<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(PlotError::InvalidData(
                "symbol size must be finite and > 0".to_owned(),
            ));
        }
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        if let Some(outline) = &self.outline {
            outline.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn validate(&self) -> PlotResult<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(PlotError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Drawing attributes a renderer resolves for one [`StyleRef`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub line: Option<LineStyle>,
    #[serde(default)]
    pub fill: Option<FillStyle>,
    #[serde(default)]
    pub symbol: Option<SymbolStyle>,
    #[serde(default)]
    pub text: Option<TextStyle>,
}

impl Style {
    #[must_use]
    pub fn line(line: LineStyle) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fill(fill: FillStyle) -> Self {
        Self {
            fill: Some(fill),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn symbol(symbol: SymbolStyle) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(text: TextStyle) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        if let Some(line) = &self.line {
            line.validate()?;
        }
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        if let Some(symbol) = &self.symbol {
            symbol.validate()?;
        }
        if let Some(text) = &self.text {
            text.validate()?;
        }
        Ok(())
    }
}

/// Immutable table of styles keyed by [`StyleRef`].
///
/// Plots and axes only carry style handles; a theme is resolved by whoever
/// draws the primitives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    name: String,
    styles: IndexMap<StyleRef, Style>,
}

impl Theme {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            styles: IndexMap::new(),
        }
    }

    /// Black strokes and text on a white background.
    #[must_use]
    pub fn plain_white() -> Self {
        Self::plain("plain_white", Color::BLACK, Color::gray(0.85))
    }

    /// White strokes and text on a black background.
    #[must_use]
    pub fn plain_black() -> Self {
        Self::plain("plain_black", Color::WHITE, Color::gray(0.25))
    }

    fn plain(name: &str, ink: Color, grid: Color) -> Self {
        let label = TextStyle {
            font_family: "Helvetica".to_owned(),
            font_size: 12.0,
            color: ink,
        };
        Self::new(name)
            .with_style(StyleRef::AXIS_LINE, Style::line(LineStyle::solid(1.0, ink)))
            .with_style(StyleRef::MAJOR_TICK, Style::line(LineStyle::solid(1.0, ink)))
            .with_style(StyleRef::MINOR_TICK, Style::line(LineStyle::solid(0.5, ink)))
            .with_style(StyleRef::MAJOR_GRID, Style::line(LineStyle::solid(0.75, grid)))
            .with_style(
                StyleRef::MINOR_GRID,
                Style::line(LineStyle::solid(0.25, grid).with_dash_pattern(vec![2.0, 2.0])),
            )
            .with_style(StyleRef::AXIS_LABEL, Style::text(label.clone()))
            .with_style(StyleRef::DATA_LINE, Style::line(LineStyle::solid(1.5, ink)))
            .with_style(
                StyleRef::DATA_SYMBOL,
                Style::symbol(SymbolStyle {
                    shape: SymbolShape::Ellipse,
                    size: 6.0,
                    fill: Some(FillStyle::Solid { color: ink }),
                    outline: None,
                }),
            )
            .with_style(
                StyleRef::DATA_FILL,
                Style::fill(FillStyle::Solid {
                    color: Color::rgba(ink.red, ink.green, ink.blue, 0.25),
                }),
            )
            .with_style(StyleRef::DATA_LABEL, Style::text(label))
            .with_style(
                StyleRef::RISING,
                Style::fill(FillStyle::Solid {
                    color: Color::rgb(0.15, 0.65, 0.35),
                }),
            )
            .with_style(
                StyleRef::FALLING,
                Style::fill(FillStyle::Solid {
                    color: Color::rgb(0.85, 0.25, 0.25),
                }),
            )
    }

    #[must_use]
    pub fn with_style(mut self, key: StyleRef, style: Style) -> Self {
        self.styles.insert(key, style);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn resolve(&self, key: StyleRef) -> Option<&Style> {
        self.styles.get(&key)
    }

    pub fn validate(&self) -> PlotResult<()> {
        for style in self.styles.values() {
            style.validate()?;
        }
        Ok(())
    }
}
