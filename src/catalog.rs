//! Built-in cities and colour themes.
//!
//! Lookups are forgiving: city names match case-insensitively in English or
//! exactly in Arabic, and an unknown theme id falls back to the first theme.

use crossterm::style::Color;
use serde::Serialize;

use crate::geo::Coordinate;

/// A selectable city with its prayer-time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub arabic_name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

pub const CITIES: &[City] = &[
    City {
        name: "Buraidah",
        arabic_name: "بريدة",
        latitude: 26.3273,
        longitude: 43.9750,
    },
    City {
        name: "Riyadh",
        arabic_name: "الرياض",
        latitude: 24.7136,
        longitude: 46.6753,
    },
    City {
        name: "Jeddah",
        arabic_name: "جدة",
        latitude: 21.5433,
        longitude: 39.1728,
    },
    City {
        name: "Makkah",
        arabic_name: "مكة المكرمة",
        latitude: 21.3891,
        longitude: 39.8579,
    },
    City {
        name: "Madinah",
        arabic_name: "المدينة المنورة",
        latitude: 24.4672,
        longitude: 39.6068,
    },
    City {
        name: "Dammam",
        arabic_name: "الدمام",
        latitude: 26.4207,
        longitude: 50.0888,
    },
    City {
        name: "Abha",
        arabic_name: "أبها",
        latitude: 18.2164,
        longitude: 42.5053,
    },
    City {
        name: "Tabuk",
        arabic_name: "تبوك",
        latitude: 28.3835,
        longitude: 36.5662,
    },
];

/// Find a city by English (any case) or Arabic name.
pub fn find_city(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CITIES
        .iter()
        .find(|city| city.name.eq_ignore_ascii_case(name) || city.arabic_name == name)
}

/// Comma-separated English names, for error messages.
pub fn city_names() -> String {
    CITIES
        .iter()
        .map(|city| city.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A colour theme for terminal highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub arabic_name: &'static str,
    #[serde(skip)]
    pub rgb: (u8, u8, u8),
}

impl Theme {
    pub fn color(&self) -> Color {
        let (r, g, b) = self.rgb;
        Color::Rgb { r, g, b }
    }

    /// Truecolor foreground escape for use inside log lines.
    pub fn ansi(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("\x1b[38;2;{r};{g};{b}m")
    }
}

pub const THEMES: &[Theme] = &[
    Theme {
        id: "emerald",
        arabic_name: "زمردي",
        rgb: (16, 185, 129),
    },
    Theme {
        id: "indigo",
        arabic_name: "نيلي",
        rgb: (99, 102, 241),
    },
    Theme {
        id: "slate",
        arabic_name: "رصاصي",
        rgb: (100, 116, 139),
    },
    Theme {
        id: "rose",
        arabic_name: "وردي",
        rgb: (244, 63, 94),
    },
];

pub fn find_theme(id: &str) -> Option<&'static Theme> {
    let id = id.trim();
    THEMES.iter().find(|theme| theme.id.eq_ignore_ascii_case(id))
}

/// Resolve a theme id, falling back to the first theme.
pub fn theme_or_default(id: &str) -> &'static Theme {
    find_theme(id).unwrap_or(&THEMES[0])
}

pub fn theme_ids() -> String {
    THEMES
        .iter()
        .map(|theme| theme.id)
        .collect::<Vec<_>>()
        .join(", ")
}
