//! Physical page sizes, in PDF points.
use crate::error::TableError;
use serde::ser::SerializeMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    A4,
    Letter,
    Legal,
    /// 11 x 8.5 inches, the default report canvas.
    #[default]
    Report,
    Custom { width: f32, height: f32 },
}

impl PageSize {
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Report => (792.0, 612.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }

    pub fn validate(&self) -> Result<(f32, f32), TableError> {
        let (width, height) = self.dimensions_pt();
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok((width, height))
        } else {
            Err(TableError::InvalidPageSize { width, height })
        }
    }

    /// Parse a page size name (e.g., "A4", "Letter", "Legal", "Report")
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            "report" => Ok(PageSize::Report),
            _ => Err(format!("Unknown page size: {}", s)),
        }
    }
}

impl Serialize for PageSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PageSize::A4 => serializer.serialize_str("a4"),
            PageSize::Letter => serializer.serialize_str("letter"),
            PageSize::Legal => serializer.serialize_str("legal"),
            PageSize::Report => serializer.serialize_str("report"),
            PageSize::Custom { width, height } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("width", width)?;
                map.serialize_entry("height", height)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PageSizeDef {
            Str(String),
            Map { width: f32, height: f32 },
        }

        match PageSizeDef::deserialize(deserializer)? {
            PageSizeDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            PageSizeDef::Map { width, height } => Ok(PageSize::Custom { width, height }),
        }
    }
}
