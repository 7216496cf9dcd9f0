use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Formatter;

use plotters::style::RGBColor;
use serde::Serialize;

/// The colors handed out to topics, in allocation order.
pub const PALETTE: [u32; 104] = [
    0xFF6F61, 0x6B5B95, 0x88B04B, 0xF7CAC9, 0x92A8D1, 0x955251,
    0xB565A7, 0x009B77, 0xDD4124, 0x45B8AC, 0xEFC050, 0x5B5EA6,
    0x9B2335, 0xBC243C, 0xC3447A, 0x98B4D4, 0xC97D60, 0xFFD662,
    0x00A591, 0x4B9CD3, 0xE08119, 0x7F4145, 0xCE5B78, 0x00758F,
    0xD4B9DA, 0xDEC1A3, 0x6CACE4, 0xD1B6C3, 0xF7786B, 0xE15D44,
    0x7D8B8F, 0x9B6376, 0x2A4B7C, 0xDC4C46, 0xE94B3C, 0xDFCFBE,
    0x9B1B30, 0x55B4B0, 0xB55A30, 0x9A8B4F, 0x0B5369, 0xBCB4A4,
    0xD69C2F, 0x4A772F, 0xD94F70, 0xCF1020, 0x9E1030, 0x4A7C59,
    0xD2C29D, 0x91A8D0, 0xF6A6B6, 0xD2386C, 0x78C0A8, 0xF4A7B9,
    0xD2691E, 0xB3B3B3, 0xE2725B, 0x4B5335, 0x6A5ACD, 0x8E6B23,
    0xBD3F32, 0xFFA07A, 0x4682B4, 0xDDA0DD, 0x8FBC8F, 0x66CDAA,
    0xB22222, 0xFFD700, 0x708090, 0x778899, 0xB0E0E6, 0xAFEEEE,
    0x7FFF00, 0x40E0D0, 0xFF6347, 0xFF4500, 0x2E8B57, 0x8A2BE2,
    0xA52A2A, 0x9932CC, 0xDC143C, 0xFF8C00, 0xFFDAB9, 0xDB7093,
    0x4B0082, 0xFF1493, 0xE9967A, 0xFF69B4, 0xCD5C5C, 0xFFA500,
    0x7B68EE, 0xBA55D3, 0x9370DB, 0xDA70D6, 0xC71585, 0xFF00FF,
    0x1F77B4, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0x17BECF,
    0xBCBD22, 0x7F7F7F,
];

/// A `0xRRGGBB` color assigned to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PlotColor(u32);

impl PlotColor {
    pub const fn from_rgb(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    pub fn rgb(&self) -> RGBColor {
        let [_, r, g, b] = self.0.to_be_bytes();
        RGBColor(r, g, b)
    }
}

impl Display for PlotColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Assigns every topic a color that stays the same across all the plots of a process.
///
/// Colors are allocated from [`PALETTE`] on the first request for a topic. Once the
/// palette is exhausted the allocation wraps around and starts over from the first
/// color. Assignments are never removed.
///
/// The registry is owned by a single caller; share it behind a lock if topics are
/// ever processed concurrently.
#[derive(Debug, Default)]
pub struct ColorRegistry {
    assigned: HashMap<String, PlotColor>,
    next: usize,
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_color(&mut self, topic: &str) -> PlotColor {
        if let Some(color) = self.assigned.get(topic) {
            return *color;
        }

        let color = PlotColor(PALETTE[self.next]);
        self.next = (self.next + 1) % PALETTE.len();
        self.assigned.insert(topic.to_owned(), color);

        color
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
