//! Named color palette used for variant color chips.
//!
//! Variant colors are free text ("Navy", "Blue Houndstooth"). The palette
//! maps such names to CSS colors so they can be drawn as swatches; names
//! that are not in the palette are used verbatim, which works for anything
//! the browser already understands ("red", "#fff").

use std::collections::BTreeMap;

use serde::Serialize;

/// Entries present before any customisation.
pub const DEFAULT_COLORS: &[(&str, &str)] = &[("blue houndstooth", "#a5bde0"), ("navy", "#22274c")];

/// Luminance above which a color counts as light.
const LIGHT_LUMINANCE_THRESHOLD: f64 = 200.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("color name cannot be empty")]
    EmptyName,
    #[error("\"{0}\" is not a valid CSS color")]
    InvalidColor(String),
    #[error("a color named \"{0}\" already exists")]
    Duplicate(String),
    #[error("no color named \"{0}\"")]
    NotFound(String),
}

/// Swatch data for rendering one color chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorChip {
    /// Name as shown in tooltips.
    pub name: String,
    /// Resolved CSS color.
    pub css: String,
    /// Whether the browser can paint `css`.
    pub valid: bool,
    /// Light swatches get a darker border.
    pub light: bool,
}

/// Name → CSS color mapping. Names are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorPalette {
    colors: BTreeMap<String, String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_COLORS
                .iter()
                .map(|(name, css)| ((*name).to_owned(), (*css).to_owned())),
        )
    }
}

impl ColorPalette {
    /// Palette with no entries.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// Build a palette from stored entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            colors: entries
                .into_iter()
                .map(|(name, css)| (normalize_name(&name), css.trim().to_owned()))
                .collect(),
        }
    }

    /// Palette as read from storage.
    ///
    /// `customised` is set once a palette has been saved; it stays set even
    /// when every entry was removed. Only an uncustomised, empty store means
    /// the defaults.
    pub fn from_store(entries: Vec<(String, String)>, customised: bool) -> Self {
        if entries.is_empty() && !customised {
            Self::default()
        } else {
            Self::from_entries(entries)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(&normalize_name(name)).map(String::as_str)
    }

    /// All entries ordered by name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors
            .iter()
            .map(|(name, css)| (name.as_str(), css.as_str()))
    }

    /// CSS color for a variant color name: the palette entry if present,
    /// otherwise the name itself.
    #[must_use]
    pub fn chip_color<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// Whether `color` (a hex value or palette name) is light.
    ///
    /// Uses perceived luminance `0.299r + 0.587g + 0.114b`. Anything that
    /// does not resolve to a 3- or 6-digit hex value is treated as dark.
    #[must_use]
    pub fn is_light(&self, color: &str) -> bool {
        let hex = if color.starts_with('#') {
            color
        } else {
            self.get(color).unwrap_or(color)
        };
        is_light_hex(hex)
    }

    /// Foreground color readable on top of `color`.
    #[must_use]
    pub fn text_color_for(&self, color: &str) -> &'static str {
        if self.is_light(color) { "#000" } else { "#fff" }
    }

    /// Everything a template needs to draw the swatch for `name`.
    #[must_use]
    pub fn chip(&self, name: &str) -> ColorChip {
        let css = self.chip_color(name).to_owned();
        ColorChip {
            name: name.to_owned(),
            valid: is_valid_css_color(&css),
            light: self.is_light(&css),
            css,
        }
    }

    /// Add a new entry.
    ///
    /// # Errors
    ///
    /// Rejects blank names, invalid colors and names already present.
    pub fn insert(&mut self, name: &str, css: &str) -> Result<(), PaletteError> {
        let name = normalize_name(name);
        let css = validate_color(css)?;
        if name.is_empty() {
            return Err(PaletteError::EmptyName);
        }
        if self.colors.contains_key(&name) {
            return Err(PaletteError::Duplicate(name));
        }
        self.colors.insert(name, css);
        Ok(())
    }

    /// Change an entry's color and optionally its name.
    ///
    /// # Errors
    ///
    /// Fails if `current` is unknown, the new name is blank or taken by a
    /// different entry, or the color is invalid.
    pub fn update(&mut self, current: &str, name: &str, css: &str) -> Result<(), PaletteError> {
        let current = normalize_name(current);
        let name = normalize_name(name);
        let css = validate_color(css)?;
        if name.is_empty() {
            return Err(PaletteError::EmptyName);
        }
        if !self.colors.contains_key(&current) {
            return Err(PaletteError::NotFound(current));
        }
        if name != current && self.colors.contains_key(&name) {
            return Err(PaletteError::Duplicate(name));
        }
        self.colors.remove(&current);
        self.colors.insert(name, css);
        Ok(())
    }

    /// Remove an entry; returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.colors.remove(&normalize_name(name)).is_some()
    }

    /// Entries whose name contains `term`, case-insensitively.
    ///
    /// A blank term matches everything.
    #[must_use]
    pub fn filter(&self, term: &str) -> Vec<(&str, &str)> {
        let term = term.trim().to_lowercase();
        self.entries()
            .filter(|(name, _)| term.is_empty() || name.contains(&term))
            .collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_color(css: &str) -> Result<String, PaletteError> {
    let css = css.trim();
    if is_valid_css_color(css) {
        Ok(css.to_owned())
    } else {
        Err(PaletteError::InvalidColor(css.to_owned()))
    }
}

/// Luminance test on a `#rgb`/`#rrggbb` value (the `#` is optional).
#[must_use]
pub fn is_light_hex(color: &str) -> bool {
    let Some([r, g, b]) = parse_hex_rgb(color) else {
        return false;
    };
    let luminance = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    luminance > LIGHT_LUMINANCE_THRESHOLD
}

fn parse_hex_rgb(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_owned(),
        _ => return None,
    };
    let channel = |start: usize| {
        expanded
            .get(start..start + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Whether a browser would accept `color` as a CSS color value.
///
/// Accepts hex notation (3, 4, 6 or 8 digits), the functional `rgb()`,
/// `rgba()`, `hsl()` and `hsla()` forms, and CSS named colors.
#[must_use]
pub fn is_valid_css_color(color: &str) -> bool {
    let color = color.trim().to_ascii_lowercase();
    if let Some(hex) = color.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    for function in ["rgb(", "rgba(", "hsl(", "hsla("] {
        if let Some(args) = color.strip_prefix(function) {
            return args
                .strip_suffix(')')
                .is_some_and(valid_color_arguments);
        }
    }
    CSS_NAMED_COLORS.binary_search(&color.as_str()).is_ok()
}

fn valid_color_arguments(inner: &str) -> bool {
    let parts: Vec<&str> = inner
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    (3..=4).contains(&parts.len())
        && parts.iter().all(|part| {
            let number = part
                .strip_suffix('%')
                .or_else(|| part.strip_suffix("deg"))
                .unwrap_or(part);
            number.parse::<f64>().is_ok()
        })
}

/// CSS Color Module Level 4 named colors, sorted for binary search.
const CSS_NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "currentcolor", "cyan",
    "darkblue", "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "transparent", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];
