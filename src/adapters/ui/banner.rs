//! Welcome banner: "STRATEGIST" in the figlet standard font with a vertical gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Signal Orange (#ff7a18).
const SIGNAL_ORANGE: (u8, u8, u8) = (0xff, 0x7a, 0x18);
/// Budget Teal (#12c2b6).
const BUDGET_TEAL: (u8, u8, u8) = (0x12, 0xc2, 0xb6);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

fn banner_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("STRATEGIST").map(|figure| figure.to_string()))
        .unwrap_or_else(|| "STRATEGIST".to_string())
}

/// Prints the banner, then version and a one-line tagline.
pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art();
    let lines: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(SIGNAL_ORANGE, BUDGET_TEAL, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: BUDGET_TEAL.0,
        g: BUDGET_TEAL.1,
        b: BUDGET_TEAL.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Ad budget strategies from a URL and a goal\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints() {
        assert_eq!(lerp_rgb(SIGNAL_ORANGE, BUDGET_TEAL, 0.0), SIGNAL_ORANGE);
        assert_eq!(lerp_rgb(SIGNAL_ORANGE, BUDGET_TEAL, 1.0), BUDGET_TEAL);
    }

    #[test]
    fn art_is_multiline() {
        assert!(banner_art().lines().count() > 1);
    }
}
