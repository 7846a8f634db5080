//! Weather code → icon mapping and the asset registry behind it.

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

/// Shown in place of an icon for unknown codes or missing assets.
pub const PLACEHOLDER: &str = "<img>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconId {
    ClearSky,
    PartlyCloudy,
    Fog,
    Drizzle,
    FreezingRain,
    Rain,
    Snow,
    Thunderstorm,
}

impl IconId {
    pub const fn all() -> &'static [IconId] {
        &[
            IconId::ClearSky,
            IconId::PartlyCloudy,
            IconId::Fog,
            IconId::Drizzle,
            IconId::FreezingRain,
            IconId::Rain,
            IconId::Snow,
            IconId::Thunderstorm,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconId::ClearSky => "clear_sky",
            IconId::PartlyCloudy => "partly_cloudy",
            IconId::Fog => "fog",
            IconId::Drizzle => "drizzle",
            IconId::FreezingRain => "freezing_rain",
            IconId::Rain => "rain",
            IconId::Snow => "snow",
            IconId::Thunderstorm => "thunderstorm",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.as_str())
    }

    /// Icon for a WMO weather code, or `None` outside the known set.
    pub fn for_code(code: i64) -> Option<IconId> {
        let id = match code {
            0 => IconId::ClearSky,
            1..=3 => IconId::PartlyCloudy,
            45 | 48 => IconId::Fog,
            51 | 53 | 55 => IconId::Drizzle,
            56 | 57 | 66 | 67 => IconId::FreezingRain,
            61 | 63 | 65 => IconId::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => IconId::Snow,
            80 | 81 | 82 | 95 | 96 | 99 => IconId::Thunderstorm,
            _ => return None,
        };
        Some(id)
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a display slot shows for its weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconSlot {
    Icon(IconId),
    Placeholder,
}

impl fmt::Display for IconSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconSlot::Icon(id) => write!(f, "{id}"),
            IconSlot::Placeholder => f.write_str(PLACEHOLDER),
        }
    }
}

/// Provider codes arrive as floats; anything non-finite is no code at all.
fn code_from_value(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

/// Icons that can actually be shown, checked once at startup.
#[derive(Debug, Clone)]
pub struct IconRegistry {
    dir: Option<PathBuf>,
    available: HashSet<IconId>,
}

impl IconRegistry {
    /// Icon ids only, with no backing files; for text front ends.
    pub fn builtin() -> Self {
        Self {
            dir: None,
            available: IconId::all().iter().copied().collect(),
        }
    }

    /// Validate the asset directory. Icons whose file is missing are
    /// rendered as placeholders from then on.
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let (available, missing): (Vec<IconId>, Vec<IconId>) = IconId::all()
            .iter()
            .copied()
            .partition(|id| dir.join(id.file_name()).is_file());

        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(IconId::as_str).collect();
            tracing::warn!(
                "{} of {} weather icons missing under {}: {}; those slots show a placeholder",
                missing.len(),
                IconId::all().len(),
                dir.display(),
                names.join(", ")
            );
        }

        Self {
            dir: Some(dir),
            available: available.into_iter().collect(),
        }
    }

    pub fn from_config(icons_dir: Option<&Path>) -> Self {
        match icons_dir {
            Some(dir) => Self::load(dir),
            None => Self::builtin(),
        }
    }

    pub fn is_available(&self, id: IconId) -> bool {
        self.available.contains(&id)
    }

    /// Asset file for `id`, if the registry is backed by a directory.
    pub fn path(&self, id: IconId) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        self.is_available(id).then(|| dir.join(id.file_name()))
    }

    pub fn icon_for_code(&self, code: i64) -> IconSlot {
        match IconId::for_code(code) {
            Some(id) if self.is_available(id) => IconSlot::Icon(id),
            _ => IconSlot::Placeholder,
        }
    }

    /// Icon for a code as delivered by the provider; missing codes get the placeholder.
    pub fn icon_for(&self, code: Option<f64>) -> IconSlot {
        code.and_then(code_from_value)
            .map_or(IconSlot::Placeholder, |c| self.icon_for_code(c))
    }

    /// Icon for a textual code such as "2"; unparseable text gets the placeholder.
    pub fn icon_for_str(&self, code: &str) -> IconSlot {
        code.trim()
            .parse::<i64>()
            .map_or(IconSlot::Placeholder, |c| self.icon_for_code(c))
    }
}
