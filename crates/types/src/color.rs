//! 24-bit RGB color used for every pixel on the matrix.

use serde::{Deserialize, Serialize};

/// RGB color, 8 bits per channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const LIGHT_GRAY: Rgb = Rgb::new(200, 200, 200);
    pub const WARM_YELLOW: Rgb = Rgb::new(255, 255, 128);
    pub const ORANGE: Rgb = Rgb::new(255, 128, 64);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// True for every color except pure black (an unlit LED)
    pub fn is_lit(&self) -> bool {
        *self != Self::BLACK
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_is_unlit() {
        assert!(!Rgb::BLACK.is_lit());
        assert!(Rgb::new(0, 0, 1).is_lit());
    }

    #[test]
    fn test_color_serialization() {
        let json = serde_json::to_string(&Rgb::ORANGE).unwrap();
        assert_eq!(json, r#"{"r":255,"g":128,"b":64}"#);
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::ORANGE);
    }
}
