//! Named transform methods: each translates a semantic request into one or
//! more queued operations at a fixed priority, then returns the pipeline
//! for chaining.
//!
//! ## Priority table
//!
//! The tiers encode required application order — cropping must happen after
//! resizing, and the background must be set before gravity/extent for
//! correct compositing:
//!
//! | Tier | Operations |
//! |---|---|
//! | 1 | resize, scale |
//! | 2 | background |
//! | 3 | gravity / align |
//! | 4 | extent, crop, sepia's modulate step |
//! | 5 | quality |
//! | 8 | rotate |
//! | 10 | blur, normalize, flip, flop, grayscale, bit depth, color count, sepia's colorize step, minify, raw `command` default |

use super::Pipeline;

const PRIORITY_RESIZE: i32 = 1;
const PRIORITY_BACKGROUND: i32 = 2;
const PRIORITY_GRAVITY: i32 = 3;
const PRIORITY_EXTENT: i32 = 4;
const PRIORITY_QUALITY: i32 = 5;
const PRIORITY_ROTATE: i32 = 8;
const PRIORITY_DEFAULT: i32 = 10;

/// Geometry string from optional width/height: `WxH`, `W`, `xH`, or empty.
fn size_spec(width: Option<u32>, height: Option<u32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        (Some(w), None) => w.to_string(),
        (None, Some(h)) => format!("x{h}"),
        (None, None) => String::new(),
    }
}

impl Pipeline {
    /// Resize to the given geometry. `options` carries geometry modifiers
    /// appended verbatim (`^` fill, `!` exact, `>` shrink-only, …).
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>, options: &str) -> &mut Self {
        let size = size_spec(width, height);
        self.append("-resize", Some(format!("{size}{options}")), PRIORITY_RESIZE)
    }

    /// Like [`resize`](Self::resize) but with the tool's cheaper `-scale`
    /// resampling.
    pub fn scale(&mut self, width: Option<u32>, height: Option<u32>, options: &str) -> &mut Self {
        let size = size_spec(width, height);
        self.append("-scale", Some(format!("{size}{options}")), PRIORITY_RESIZE)
    }

    /// Crop to `WxH` at offset `+x+y`.
    pub fn crop(&mut self, width: u32, height: u32, x: u32, y: u32) -> &mut Self {
        self.append(
            "-crop",
            Some(format!("{width}x{height}+{x}+{y}")),
            PRIORITY_EXTENT,
        )
    }

    /// Extend (pad) the canvas to the given geometry.
    pub fn extent(&mut self, width: Option<u32>, height: Option<u32>) -> &mut Self {
        let size = size_spec(width, height);
        self.append("-extent", Some(size), PRIORITY_EXTENT)
    }

    /// Lossy encoding quality in percent.
    pub fn quality(&mut self, percentage: u32) -> &mut Self {
        self.append("-quality", Some(percentage.to_string()), PRIORITY_QUALITY)
    }

    /// Rotate by degrees (clockwise for positive values).
    pub fn rotate(&mut self, degrees: i32) -> &mut Self {
        self.append("-rotate", Some(degrees.to_string()), PRIORITY_ROTATE)
    }

    /// Gaussian blur with the given radius.
    pub fn blur(&mut self, radius: f64) -> &mut Self {
        self.append("-blur", Some(radius.to_string()), PRIORITY_DEFAULT)
    }

    /// Stretch contrast to cover the full intensity range.
    pub fn normalize(&mut self) -> &mut Self {
        self.append("-normalize", None, PRIORITY_DEFAULT)
    }

    /// Mirror vertically.
    pub fn flip(&mut self) -> &mut Self {
        self.append("-flip", None, PRIORITY_DEFAULT)
    }

    /// Mirror horizontally.
    pub fn flop(&mut self) -> &mut Self {
        self.append("-flop", None, PRIORITY_DEFAULT)
    }

    /// Convert to the Gray colorspace.
    pub fn grayscale(&mut self) -> &mut Self {
        self.append("-colorspace", Some("Gray".to_string()), PRIORITY_DEFAULT)
    }

    /// Bits per channel.
    pub fn bit_depth(&mut self, bits: u32) -> &mut Self {
        self.append("-depth", Some(bits.to_string()), PRIORITY_DEFAULT)
    }

    /// Reduce to at most `count` colors.
    pub fn colors(&mut self, count: u32) -> &mut Self {
        self.append("-colors", Some(count.to_string()), PRIORITY_DEFAULT)
    }

    /// Background color used by later padding/compositing operations.
    pub fn background(&mut self, color: &str) -> &mut Self {
        self.append("-background", Some(color.to_string()), PRIORITY_BACKGROUND)
    }

    /// Strip embedded profiles (EXIF, ICC) to shrink the output.
    pub fn minify(&mut self) -> &mut Self {
        self.append("+profile", Some("*".to_string()), PRIORITY_DEFAULT)
    }

    /// Sepia tone: desaturate via `-modulate`, then tint via `-colorize`.
    pub fn sepia(&mut self) -> &mut Self {
        self.append("-modulate", Some("115,0,100".to_string()), PRIORITY_EXTENT)
            .append("-colorize", Some("7,21,50".to_string()), PRIORITY_DEFAULT)
    }

    /// Set gravity from a human-readable direction ("top left", "center",
    /// "bottom-right", …). An unrecognized direction is passed through to
    /// the tool unchanged — permissive by design, so callers can use raw
    /// compass tokens directly.
    pub fn align(&mut self, direction: &str) -> &mut Self {
        let gravity = match direction.to_lowercase().replace('-', " ").as_str() {
            "left top" | "top left" => "NorthWest",
            "left bottom" | "bottom left" => "SouthWest",
            "right top" | "top right" => "NorthEast",
            "right bottom" | "bottom right" => "SouthEast",
            "left center" | "center left" | "left" => "West",
            "right center" | "center right" | "right" => "East",
            "bottom center" | "center bottom" | "bottom" => "South",
            "top center" | "center top" | "top" => "North",
            "center center" | "center" => "Center",
            _ => direction,
        };
        self.append("-gravity", Some(gravity.to_string()), PRIORITY_GRAVITY)
    }

    /// Alias for [`align`](Self::align).
    pub fn gravity(&mut self, direction: &str) -> &mut Self {
        self.align(direction)
    }

    /// Pad-to-exact-size thumbnail: fit within `WxH`, then pad to exactly
    /// `WxH` on a colored background (default white).
    pub fn miniature(&mut self, width: u32, height: u32, color: Option<&str>) -> &mut Self {
        self.resize(Some(width), Some(height), "")
            .background(color.unwrap_or("white"))
            .align("center")
            .extent(Some(width), Some(height))
    }

    /// Fill-and-crop thumbnail: cover `WxH` with the `^` fill modifier,
    /// then center-crop to exactly `WxH`.
    pub fn resize_center(&mut self, width: u32, height: u32, color: Option<&str>) -> &mut Self {
        self.resize(Some(width), Some(height), "^")
            .background(color.unwrap_or("white"))
            .align("center")
            .crop(width, height, 0, 0)
    }

    /// Escape hatch: queue a raw flag/value pair at an explicit priority,
    /// or the default tier when `None`.
    pub fn command(
        &mut self,
        flag: &str,
        value: Option<&str>,
        priority: Option<i32>,
    ) -> &mut Self {
        self.append(
            flag,
            value.map(str::to_string),
            priority.unwrap_or(PRIORITY_DEFAULT),
        )
    }
}
