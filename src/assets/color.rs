use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{DpError, DpResult};

/// Parse a CSS color string into premultiplied RGBA8.
///
/// Supported forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
/// (channels 0..=255, alpha 0..=1) and a handful of named colors.
pub fn parse_css_color(s: &str) -> DpResult<Rgba8Premul> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_fn(args);
    }

    named(&lower)
        .map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a))
        .ok_or_else(|| DpError::validation(format!("unsupported color \"{s}\"")))
}

fn parse_hex(hex: &str) -> DpResult<Rgba8Premul> {
    fn nibble(c: u8) -> DpResult<u8> {
        (c as char)
            .to_digit(16)
            .map(|v| v as u8)
            .ok_or_else(|| DpError::validation(format!("invalid hex digit '{}'", c as char)))
    }

    let b = hex.as_bytes();
    let (r, g, bl, a) = match b.len() {
        3 | 4 => {
            let expand = |c: u8| -> DpResult<u8> { nibble(c).map(|v| v * 17) };
            let a = if b.len() == 4 { expand(b[3])? } else { 255 };
            (expand(b[0])?, expand(b[1])?, expand(b[2])?, a)
        }
        6 | 8 => {
            let byte = |i: usize| -> DpResult<u8> { Ok(nibble(b[i])? * 16 + nibble(b[i + 1])?) };
            let a = if b.len() == 8 { byte(6)? } else { 255 };
            (byte(0)?, byte(2)?, byte(4)?, a)
        }
        _ => {
            return Err(DpError::validation(
                "hex color must be #rgb, #rgba, #rrggbb or #rrggbbaa",
            ));
        }
    };
    Ok(Rgba8Premul::from_straight_rgba(r, g, bl, a))
}

fn parse_rgb_fn(args: &str) -> DpResult<Rgba8Premul> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(DpError::validation("rgb()/rgba() expects 3 or 4 components"));
    }

    let channel = |p: &str| -> DpResult<u8> {
        let v: f64 = p
            .parse()
            .map_err(|_| DpError::validation(format!("invalid color channel \"{p}\"")))?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            let v: f64 = p
                .parse()
                .map_err(|_| DpError::validation(format!("invalid alpha \"{p}\"")))?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Ok(Rgba8Premul::from_straight_rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named(name: &str) -> Option<[u8; 4]> {
    Some(match name {
        "transparent" => [0, 0, 0, 0],
        "black" => [0, 0, 0, 255],
        "white" => [255, 255, 255, 255],
        "red" => [255, 0, 0, 255],
        "green" => [0, 128, 0, 255],
        "blue" => [0, 0, 255, 255],
        "yellow" => [255, 255, 0, 255],
        "orange" => [255, 165, 0, 255],
        "purple" => [128, 0, 128, 255],
        "gray" | "grey" => [128, 128, 128, 255],
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
