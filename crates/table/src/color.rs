use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const LIGHT_BLUE: Color = Color::rgb(173, 216, 230);
    pub const CORAL: Color = Color::rgb(255, 127, 80);
    pub const LIGHT_CORAL: Color = Color::rgb(240, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to the 0.0..=1.0 range PDF colour operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Parse a hex color string (#RGB or #RRGGBB format)
    pub fn parse_hex(s: &str) -> Result<Color, String> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("Color must start with #, got: {}", s))?;

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid hex color: {}", s));
        }

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|e| format!("Invalid color component '{}': {}", digits, e))
        };
        match hex.len() {
            3 => Ok(Color {
                r: channel(&hex[0..1].repeat(2))?,
                g: channel(&hex[1..2].repeat(2))?,
                b: channel(&hex[2..3].repeat(2))?,
            }),
            6 => Ok(Color {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => Err(format!("Invalid hex color length: expected 3 or 6, got {}", hex.len())),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s).map_err(de::Error::custom)
    }
}

/// Background colours for a rendered table page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellPalette {
    /// Header row and row-label column.
    pub header: Color,
    /// Body cells the predicate did not flag.
    pub neutral: Color,
    /// Body cells the predicate flagged.
    pub flagged: Color,
}

impl CellPalette {
    pub const fn coral() -> Self {
        Self {
            header: Color::LIGHT_BLUE,
            neutral: Color::WHITE,
            flagged: Color::CORAL,
        }
    }

    pub const fn light_coral() -> Self {
        Self {
            header: Color::LIGHT_BLUE,
            neutral: Color::WHITE,
            flagged: Color::LIGHT_CORAL,
        }
    }

    pub fn fill_for(&self, highlighted: bool) -> Color {
        if highlighted { self.flagged } else { self.neutral }
    }
}

impl Default for CellPalette {
    fn default() -> Self {
        Self::coral()
    }
}
