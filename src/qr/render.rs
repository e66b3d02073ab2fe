use anyhow::Context;
use base64::Engine;
use image::{imageops, Rgba, RgbaImage};
use qrcode::{render::svg, QrCode};

/// Target canvas edge in pixels; the module size is chosen so the rendered
/// code is at least this large.
pub const QR_SIZE: u32 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrFormat {
    #[default]
    Svg,
    Png,
}

impl QrFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "svg" => Some(QrFormat::Svg),
            "png" => Some(QrFormat::Png),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            QrFormat::Svg => "image/svg+xml",
            QrFormat::Png => "image/png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoShape {
    #[default]
    None,
    Circle,
    Square,
}

impl LogoShape {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(LogoShape::None),
            "circle" => Some(LogoShape::Circle),
            "square" => Some(LogoShape::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogoOverlay {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Edge length as a fraction of the QR canvas.
    pub size: f32,
    pub padding: u32,
    pub shape: LogoShape,
    pub background: [u8; 3],
}

impl LogoOverlay {
    pub fn new(bytes: Vec<u8>, content_type: String) -> Self {
        Self {
            bytes,
            content_type,
            size: 0.22,
            padding: 8,
            shape: LogoShape::None,
            background: [0xFF, 0xFF, 0xFF],
        }
    }
}

#[derive(Debug, Clone)]
pub struct QrStyle {
    pub fg: [u8; 3],
    pub bg: [u8; 3],
    pub logo: Option<LogoOverlay>,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            fg: [0x00, 0x00, 0x00],
            bg: [0xFF, 0xFF, 0xFF],
            logo: None,
        }
    }
}

pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some([r, g, b])
}

fn hex_string(c: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2])
}

/// Pixel-per-module and final edge length. The quiet zone is four modules
/// on each side.
fn geometry(code: &QrCode) -> (u32, u32) {
    let modules = code.width() as u32 + 8;
    let module_px = (QR_SIZE + modules - 1) / modules;
    (module_px, modules * module_px)
}

pub fn render_svg(url: &str, style: &QrStyle) -> anyhow::Result<String> {
    let code = QrCode::new(url.as_bytes()).context("encode qr payload")?;
    let (module_px, size) = geometry(&code);
    let fg = hex_string(style.fg);
    let bg = hex_string(style.bg);
    let mut svg_data = code
        .render::<svg::Color>()
        .module_dimensions(module_px, module_px)
        .dark_color(svg::Color(&fg))
        .light_color(svg::Color(&bg))
        .build();

    if let Some(logo) = &style.logo {
        svg_data = inject_logo(svg_data, size, logo);
    }
    Ok(svg_data)
}

/// Center logo overlay for the SVG export: an optional backing shape plus
/// the image itself, embedded as a data URI.
fn inject_logo(svg_data: String, size: u32, logo: &LogoOverlay) -> String {
    let logo_px = ((size as f32) * logo.size).round() as u32;
    let center = size / 2;
    let x = center.saturating_sub(logo_px / 2);
    let y = x;

    let mut overlay = String::new();
    match logo.shape {
        LogoShape::Circle => {
            let r = logo_px / 2 + logo.padding;
            overlay.push_str(&format!(
                r#"<circle cx="{center}" cy="{center}" r="{r}" fill="{}"/>"#,
                hex_string(logo.background)
            ));
        }
        LogoShape::Square => {
            let edge = logo_px + logo.padding * 2;
            let corner = center.saturating_sub(edge / 2);
            overlay.push_str(&format!(
                r#"<rect x="{corner}" y="{corner}" width="{edge}" height="{edge}" rx="10" fill="{}"/>"#,
                hex_string(logo.background)
            ));
        }
        LogoShape::None => {}
    }

    let b64 = base64::engine::general_purpose::STANDARD.encode(&logo.bytes);
    overlay.push_str(&format!(
        r#"<image href="data:{};base64,{b64}" x="{x}" y="{y}" width="{logo_px}" height="{logo_px}" preserveAspectRatio="xMidYMid meet"/>"#,
        logo.content_type
    ));

    svg_data.replace(
        "</svg>",
        &format!(r#"<g id="qr-logo-overlay">{overlay}</g></svg>"#),
    )
}

pub fn render_png(url: &str, style: &QrStyle) -> anyhow::Result<Vec<u8>> {
    let code = QrCode::new(url.as_bytes()).context("encode qr payload")?;
    let (module_px, _) = geometry(&code);
    let mut img: RgbaImage = code
        .render::<Rgba<u8>>()
        .module_dimensions(module_px, module_px)
        .dark_color(Rgba([style.fg[0], style.fg[1], style.fg[2], 0xFF]))
        .light_color(Rgba([style.bg[0], style.bg[1], style.bg[2], 0xFF]))
        .build();

    if let Some(logo) = &style.logo {
        overlay_logo(&mut img, logo)?;
    }

    let mut out = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut out),
        image::ImageFormat::Png,
    )
    .context("encode png")?;
    Ok(out)
}

fn overlay_logo(img: &mut RgbaImage, logo: &LogoOverlay) -> anyhow::Result<()> {
    let size = img.width().min(img.height());
    let logo_px = ((size as f32) * logo.size).round() as u32;
    if logo_px == 0 {
        return Ok(());
    }

    let decoded = image::load_from_memory(&logo.bytes).context("decode logo image")?;
    let scaled = imageops::resize(
        &decoded.to_rgba8(),
        logo_px,
        logo_px,
        imageops::FilterType::Triangle,
    );

    let cx = img.width() / 2;
    let cy = img.height() / 2;
    let bg = Rgba([logo.background[0], logo.background[1], logo.background[2], 0xFF]);
    match logo.shape {
        LogoShape::Circle => fill_disc(img, cx, cy, logo_px / 2 + logo.padding, bg),
        LogoShape::Square => {
            let edge = logo_px + logo.padding * 2;
            let x0 = cx.saturating_sub(edge / 2);
            let y0 = cy.saturating_sub(edge / 2);
            fill_rect(img, x0, y0, edge, edge, bg);
        }
        LogoShape::None => {}
    }

    imageops::overlay(
        img,
        &scaled,
        i64::from(cx.saturating_sub(logo_px / 2)),
        i64::from(cy.saturating_sub(logo_px / 2)),
    );
    Ok(())
}

fn fill_disc(img: &mut RgbaImage, cx: u32, cy: u32, r: u32, color: Rgba<u8>) {
    let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
    for y in (cy - r).max(0)..=(cy + r).min(img.height() as i64 - 1) {
        for x in (cx - r).max(0)..=(cx + r).min(img.width() as i64 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn fill_rect(img: &mut RgbaImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgba<u8>) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_and_without_hash() {
        assert_eq!(parse_hex_color("#00F7FF"), Some([0x00, 0xF7, 0xFF]));
        assert_eq!(parse_hex_color("a855f7"), Some([0xA8, 0x55, 0xF7]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn svg_export_uses_the_requested_colors() {
        let style = QrStyle {
            fg: [0x00, 0xF7, 0xFF],
            ..Default::default()
        };
        let svg_data = render_svg("http://localhost:8080/menu", &style).unwrap();
        assert!(svg_data.contains("#00F7FF"));
        assert!(!svg_data.contains("qr-logo-overlay"));
    }

    #[test]
    fn svg_export_embeds_the_logo_overlay() {
        let style = QrStyle {
            logo: Some(LogoOverlay {
                shape: LogoShape::Circle,
                ..LogoOverlay::new(vec![1, 2, 3], "image/png".into())
            }),
            ..Default::default()
        };
        let svg_data = render_svg("http://localhost:8080/menu", &style).unwrap();
        assert!(svg_data.contains("qr-logo-overlay"));
        assert!(svg_data.contains("data:image/png;base64,"));
        assert!(svg_data.contains("<circle"));
        assert!(svg_data.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn png_export_is_decodable_and_square() {
        let png = render_png("http://localhost:8080/menu", &QrStyle::default()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), decoded.height());
        assert!(decoded.width() >= QR_SIZE);
    }
}
