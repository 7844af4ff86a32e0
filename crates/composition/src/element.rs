//! Timeline elements: the timed, positioned items that live on tracks.
//!
//! Every element shares a positional/temporal base; type-specific fields
//! (media source, text styling, shape kind) live in a tagged [`ElementKind`]
//! union flattened into the same JSON object.

use serde::{Deserialize, Serialize};

use cutreel_common::element_id;

/// Minimum element duration in seconds. Trim and resize clamp to this floor.
pub const MIN_DURATION: f64 = 0.1;

/// Identifier of an element within a composition.
pub type ElementId = String;

/// One timed item on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique element identifier.
    pub id: ElementId,

    /// Human-readable name shown in the timeline.
    #[serde(default)]
    pub name: String,

    /// Type-specific payload, tagged by `type` in JSON.
    #[serde(flatten)]
    pub kind: ElementKind,

    /// Timeline start in seconds.
    pub time: f64,

    /// Timeline duration in seconds.
    pub duration: f64,

    /// Offset into the referenced media where this segment begins, seconds.
    #[serde(default)]
    pub trim_start: f64,

    /// Unused tail of the referenced media, seconds.
    #[serde(default)]
    pub trim_end: f64,

    /// Center position, percent of composition or absolute pixels.
    #[serde(default = "Dim::half")]
    pub x: Dim,
    #[serde(default = "Dim::half")]
    pub y: Dim,

    /// Target box size, percent of composition or absolute pixels.
    #[serde(default = "Dim::full")]
    pub width: Dim,
    #[serde(default = "Dim::full")]
    pub height: Dim,

    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,

    /// Opacity in [0, 1].
    #[serde(default = "default_one")]
    pub opacity: f64,

    /// Aspect-preserving fit of the media into the target box.
    #[serde(default)]
    pub fit: Fit,

    /// Audible volume in [0, 1] when this element governs its source.
    #[serde(default = "default_one")]
    pub volume: f64,

    /// Linear fade-in length at the start of the element, seconds.
    #[serde(default)]
    pub fade_in: f64,

    /// Linear fade-out length at the end of the element, seconds.
    #[serde(default)]
    pub fade_out: f64,

    /// Effect identifiers applied by the external renderer.
    #[serde(default)]
    pub effects: Vec<String>,

    /// Transition descriptor, opaque to the engine.
    #[serde(default)]
    pub transition: Option<serde_json::Value>,

    /// Key used by template substitution (`resolve_modifications`).
    #[serde(default)]
    pub modification_key: Option<String>,
}

fn default_one() -> f64 {
    1.0
}

/// Type-specific element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Video {
        #[serde(default)]
        source: Option<String>,
    },
    Image {
        #[serde(default)]
        source: Option<String>,
    },
    Audio {
        #[serde(default)]
        source: Option<String>,
    },
    Text {
        text: String,
        #[serde(default = "default_font_family")]
        font_family: String,
        #[serde(default = "default_font_size")]
        font_size: f64,
        #[serde(default = "default_font_weight")]
        font_weight: u32,
        #[serde(default = "default_text_color")]
        color: String,
        #[serde(default)]
        align: TextAlign,
        #[serde(default)]
        stroke_color: Option<String>,
        #[serde(default)]
        stroke_width: f64,
    },
    Shape {
        shape: ShapeKind,
        #[serde(default = "default_text_color")]
        color: String,
    },
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f64 {
    48.0
}

fn default_font_weight() -> u32 {
    700
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Shape primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// Aspect-preserving fit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fill the target box, cropping overflow.
    #[default]
    Cover,
    /// Fit entirely inside the target box, leaving letterbox space.
    Contain,
}

/// A dimension expressed either as a percentage of the composition
/// (serialized as `"50%"`) or as absolute pixels (serialized as a number).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimRepr", into = "DimRepr")]
pub enum Dim {
    Percent(f64),
    Px(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimRepr {
    Num(f64),
    Str(String),
}

impl From<Dim> for DimRepr {
    fn from(dim: Dim) -> Self {
        match dim {
            Dim::Percent(p) => DimRepr::Str(format!("{}%", p)),
            Dim::Px(px) => DimRepr::Num(px),
        }
    }
}

impl TryFrom<DimRepr> for Dim {
    type Error = String;

    fn try_from(repr: DimRepr) -> Result<Self, Self::Error> {
        match repr {
            DimRepr::Num(n) => Ok(Dim::Px(n)),
            DimRepr::Str(s) => {
                if let Some(pct) = s.strip_suffix('%') {
                    pct.trim()
                        .parse::<f64>()
                        .map(Dim::Percent)
                        .map_err(|e| format!("invalid percentage {:?}: {}", s, e))
                } else {
                    s.trim()
                        .parse::<f64>()
                        .map(Dim::Px)
                        .map_err(|e| format!("invalid dimension {:?}: {}", s, e))
                }
            }
        }
    }
}

impl Dim {
    pub fn half() -> Self {
        Dim::Percent(50.0)
    }

    pub fn full() -> Self {
        Dim::Percent(100.0)
    }

    /// Resolve to absolute units against a composition dimension.
    pub fn resolve(&self, total: f64) -> f64 {
        match self {
            Dim::Percent(p) => p / 100.0 * total,
            Dim::Px(px) => *px,
        }
    }

    /// Resolve a size, treating zero as "fill the composition dimension".
    pub fn resolve_size(&self, total: f64) -> f64 {
        let v = self.resolve(total);
        if v == 0.0 {
            total
        } else {
            v
        }
    }
}

impl Element {
    /// Create an element with type-appropriate defaults.
    ///
    /// Media elements fill the composition with cover fit; image and text
    /// elements get a half-width contain box whose height compensates for
    /// the composition aspect ratio so the box reads as square on screen.
    pub fn new(name: impl Into<String>, kind: ElementKind, comp_width: u32, comp_height: u32) -> Self {
        let (width, height, fit) = match kind {
            ElementKind::Image { .. } | ElementKind::Text { .. } => {
                let width_pct = 50.0;
                let height_pct =
                    (width_pct * comp_width as f64 / comp_height.max(1) as f64 * 100.0).round()
                        / 100.0;
                (
                    Dim::Percent(width_pct),
                    Dim::Percent(height_pct),
                    Fit::Contain,
                )
            }
            _ => (Dim::full(), Dim::full(), Fit::Cover),
        };

        Self {
            id: element_id(),
            name: name.into(),
            kind,
            time: 0.0,
            duration: 5.0,
            trim_start: 0.0,
            trim_end: 0.0,
            x: Dim::half(),
            y: Dim::half(),
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
            fit,
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            effects: Vec::new(),
            transition: None,
            modification_key: None,
        }
    }

    /// Timeline end of the element, in seconds.
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }

    /// Whether the element is active at timeline time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        self.time <= t && t < self.end()
    }

    /// Media-local time for timeline time `t` (caller ensures activity).
    pub fn local_time(&self, t: f64) -> f64 {
        t - self.time + self.trim_start
    }

    /// The media source this element plays from, if any.
    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Video { source }
            | ElementKind::Image { source }
            | ElementKind::Audio { source } => source.as_deref(),
            _ => None,
        }
    }

    pub fn set_source(&mut self, new_source: impl Into<String>) {
        if let ElementKind::Video { source }
        | ElementKind::Image { source }
        | ElementKind::Audio { source } = &mut self.kind
        {
            *source = Some(new_source.into());
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self.kind, ElementKind::Audio { .. })
    }

    pub fn is_video(&self) -> bool {
        matches!(self.kind, ElementKind::Video { .. })
    }

    /// Whether the element's source has an independent decode clock.
    pub fn is_decodable(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Video { .. } | ElementKind::Audio { .. }
        ) && self.source().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(source: &str) -> Element {
        Element::new(
            "clip",
            ElementKind::Video {
                source: Some(source.to_string()),
            },
            1080,
            1920,
        )
    }

    #[test]
    fn active_window_is_half_open() {
        let mut el = video("media://a.mp4");
        el.time = 2.0;
        el.duration = 3.0;
        assert!(!el.is_active(1.999));
        assert!(el.is_active(2.0));
        assert!(el.is_active(4.999));
        assert!(!el.is_active(5.0));
    }

    #[test]
    fn local_time_accounts_for_trim() {
        let mut el = video("media://a.mp4");
        el.time = 10.0;
        el.trim_start = 4.0;
        assert_eq!(el.local_time(12.5), 6.5);
    }

    #[test]
    fn dim_parses_percent_and_pixels() {
        let pct: Dim = serde_json::from_str("\"50%\"").unwrap();
        assert_eq!(pct, Dim::Percent(50.0));
        let px: Dim = serde_json::from_str("240.5").unwrap();
        assert_eq!(px, Dim::Px(240.5));
        let numeric_str: Dim = serde_json::from_str("\"120\"").unwrap();
        assert_eq!(numeric_str, Dim::Px(120.0));
    }

    #[test]
    fn dim_serializes_percent_as_string() {
        let json = serde_json::to_string(&Dim::Percent(50.0)).unwrap();
        assert_eq!(json, "\"50%\"");
        let json = serde_json::to_string(&Dim::Px(100.0)).unwrap();
        assert_eq!(json, "100.0");
    }

    #[test]
    fn dim_resolves_against_composition() {
        assert_eq!(Dim::Percent(50.0).resolve(1080.0), 540.0);
        assert_eq!(Dim::Px(300.0).resolve(1080.0), 300.0);
        assert_eq!(Dim::Px(0.0).resolve_size(1080.0), 1080.0);
    }

    #[test]
    fn element_roundtrips_through_json() {
        let el = video("media://a.mp4");
        let json = serde_json::to_string(&el).unwrap();
        assert!(json.contains("\"type\":\"video\""));
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn text_defaults_fill_in() {
        let json = r#"{
            "id": "el_1", "type": "text", "text": "Hello",
            "time": 0.0, "duration": 2.0
        }"#;
        let el: Element = serde_json::from_str(json).unwrap();
        match &el.kind {
            ElementKind::Text {
                font_size, align, ..
            } => {
                assert_eq!(*font_size, 48.0);
                assert_eq!(*align, TextAlign::Center);
            }
            other => panic!("expected text, got {:?}", other),
        }
        assert_eq!(el.opacity, 1.0);
    }
}
