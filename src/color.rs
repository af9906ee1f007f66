// Simple color struct, created from an unsigned 32 representing RRGGBBAA

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    /// `#rrggbb`, alpha is applied separately through the context's global alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `rgba(r, g, b, alpha)` with `alpha` scaled by the color's own alpha byte.
    pub fn to_rgba(&self, alpha: f64) -> String {
        let alpha = alpha * (self.a as f64 / 255.0);
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

// Brand palette: mid green, accent, deep green
pub const PALETTE: [Color; 3] = [
    Color::from_u32(0x16965cff),
    Color::from_u32(0x38ef7dff),
    Color::from_u32(0x1a3c34ff),
];

pub const LINK_COLOR: Color = Color::from_u32(0x1a3c34ff);
