//! Marker colors for presentation adapters.
//!
//! The core never renders anything; these helpers turn the configured
//! `colormap` name into one RGB color per bodypart so an adapter can draw
//! markers consistently.

/// Parse a hex color string (e.g., "#ff0000") to an RGB triple.
pub fn parse_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    } else {
        None
    }
}

/// Evenly sample the named palette into `n` colors, one per bodypart in
/// configured order. Unknown palette names fall back to `"jet"`.
pub fn marker_colors(colormap: &str, n: usize) -> Vec<(u8, u8, u8)> {
    let stops = palette_stops(colormap);
    (0..n)
        .map(|i| {
            let t = if n <= 1 {
                0.0
            } else {
                i as f64 / (n - 1) as f64
            };
            sample(stops, t)
        })
        .collect()
}

fn palette_stops(name: &str) -> &'static [(u8, u8, u8)] {
    match name {
        "viridis" => VIRIDIS,
        "plasma" => PLASMA,
        "cool" => COOL,
        _ => JET,
    }
}

const JET: &[(u8, u8, u8)] = &[
    (0, 0, 143),
    (0, 0, 255),
    (0, 255, 255),
    (255, 255, 0),
    (255, 0, 0),
    (128, 0, 0),
];

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PLASMA: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

const COOL: &[(u8, u8, u8)] = &[(0, 255, 255), (255, 0, 255)];

/// Linear interpolation between adjacent palette stops at `t` in [0, 1].
fn sample(stops: &[(u8, u8, u8)], t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let pos = t * (stops.len() - 1) as f64;
    let i = pos.floor() as usize;
    if i + 1 >= stops.len() {
        return stops[stops.len() - 1];
    }
    let frac = pos - i as f64;
    let (r0, g0, b0) = stops[i];
    let (r1, g1, b1) = stops[i + 1];
    let lerp = |a: u8, b: u8| -> u8 {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8
    };
    (lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#ff0000"), Some((255, 0, 0)));
        assert_eq!(parse_color("00ff7f"), Some((0, 255, 127)));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn one_color_per_bodypart() {
        let colors = marker_colors("viridis", 7);
        assert_eq!(colors.len(), 7);
        assert_eq!(colors[0], VIRIDIS[0]);
        assert_eq!(colors[6], VIRIDIS[VIRIDIS.len() - 1]);
    }

    #[test]
    fn unknown_palette_falls_back_to_jet() {
        assert_eq!(marker_colors("nope", 2), marker_colors("jet", 2));
    }

    #[test]
    fn single_color_request_takes_the_first_stop() {
        assert_eq!(marker_colors("cool", 1), vec![COOL[0]]);
    }
}
