use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};

use crate::encoder::{EncodeOptions, QrMatrix};
use crate::error::Result;
use crate::style::Color;

/// Light modules around the symbol on each side.
pub const QUIET_ZONE: u32 = 4;

/// Pixels per module when the requested width is too small to fit the symbol.
pub const FALLBACK_SCALE: u32 = 4;

/*---- Utilities ----*/

// Returns a string of SVG code for an image depicting
// the given QR matrix, with the given number of border modules.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(qr: &QrMatrix, border: u32, dark: Color, light: Color) -> String {
	let border = border as i32;
	let size = qr.width() as i32;
	let dimension = size + border * 2;
	let mut result = String::new();
	result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
	result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
	result += &format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n", dimension);
	result += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", light);
	result += "\t<path d=\"";
	let mut first = true;
	for y in 0 .. size {
		for x in 0 .. size {
			if qr.get_module(x, y) {
				if !first {
					result += " ";
				}
				first = false;
				result += &format!("M{},{}h1v1h-1z", x + border, y + border);
			}
		}
	}
	result += &format!("\" fill=\"{}\"/>\n", dark);
	result += "</svg>\n";
	result
}

/// Renders the matrix as console art, two characters per module,
/// surrounded by a quiet zone.
pub fn qr_to_text(qr: &QrMatrix) -> String {
	let border = QUIET_ZONE as i32;
	let size = qr.width() as i32;
	let mut out = String::new();
	for y in -border .. size + border {
		for x in -border .. size + border {
			let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
			out.push(c);
			out.push(c);
		}
		out.push('\n');
	}
	out
}

/// Prints the given matrix to the console.
pub fn print_qr(qr: &QrMatrix) {
	println!("{}", qr_to_text(qr));
}

/// Paints the matrix into an RGBA image.
///
/// When `options.width` can hold every module plus the quiet zone, the image
/// is exactly `width` pixels wide and each pixel takes the color of the
/// module under it. Otherwise each module is drawn as a
/// [`FALLBACK_SCALE`]-pixel square.
///
/// # Example
///
/// ```rust
/// use qrsession::encoder::{EncodeOptions, ErrorCorrection, QrMatrix};
/// use qrsession::helper::render_rgba;
/// use qrsession::style::Color;
///
/// let qr = QrMatrix::encode("Hello, World!", ErrorCorrection::Low).unwrap();
/// let options = EncodeOptions { width: 200, color_dark: Color::BLACK, color_light: Color::WHITE };
/// let img = render_rgba(&qr, &options);
/// assert_eq!(img.dimensions(), (200, 200));
/// ```
pub fn render_rgba(qr: &QrMatrix, options: &EncodeOptions) -> RgbaImage {
    let total = qr.width() as u32 + 2 * QUIET_ZONE;
    let size = if options.width >= total {
        options.width
    } else {
        total * FALLBACK_SCALE
    };

    let dark = Rgba(options.color_dark.to_rgba());
    let light = Rgba(options.color_light.to_rgba());
    let mut img = ImageBuffer::from_pixel(size, size, light);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        // floor(pixel / scale) where scale = size / total
        let qr_x = (u64::from(x) * u64::from(total) / u64::from(size)) as i32 - QUIET_ZONE as i32;
        let qr_y = (u64::from(y) * u64::from(total) / u64::from(size)) as i32 - QUIET_ZONE as i32;
        if qr.get_module(qr_x, qr_y) {
            *pixel = dark;
        }
    }

    img
}

/// Encodes an image as PNG bytes.
pub fn to_png_bytes(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Wraps PNG bytes in a `data:` URL.
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ErrorCorrection;

    fn hello() -> QrMatrix {
        QrMatrix::encode("HELLO WORLD", ErrorCorrection::Low).unwrap()
    }

    fn options(width: u32) -> EncodeOptions {
        EncodeOptions {
            width,
            color_dark: Color::rgb(255, 0, 0),
            color_light: Color::rgb(0, 0, 255),
        }
    }

    #[test]
    fn test_to_svg_string() {
        let svg = to_svg_string(&hello(), 4, Color::BLACK, Color::rgb(255, 165, 0));

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        assert!(svg.contains("fill=\"#FFA500\""));
        assert!(svg.contains("fill=\"#000000\""));
        assert!(svg.contains("M4,4h1v1h-1z"));
    }

    #[test]
    fn test_render_exact_width_uses_colors() {
        let img = render_rgba(&hello(), &options(180));
        assert_eq!(img.dimensions(), (180, 180));

        // Quiet zone is light, the finder pattern corner is dark.
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        // Module (0, 0) starts at pixel ceil(4 * 180 / 29) = 25.
        assert_eq!(*img.get_pixel(25, 25), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_render_too_small_falls_back_to_fixed_scale() {
        // 21 modules + 8 quiet zone = 29 > 20
        let img = render_rgba(&hello(), &options(20));
        assert_eq!(img.dimensions(), (29 * FALLBACK_SCALE, 29 * FALLBACK_SCALE));
    }

    #[test]
    fn test_qr_to_text_dimensions() {
        let text = qr_to_text(&hello());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 29);
        assert!(lines.iter().all(|line| line.chars().count() == 58));
    }

    #[test]
    fn test_png_bytes_decode() {
        let img = render_rgba(&hello(), &options(100));
        let png = to_png_bytes(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let url = to_data_url(&png);
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
    }
}
