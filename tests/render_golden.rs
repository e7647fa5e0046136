//! Golden-output tests over the public surface.
//!
//! The compiled shell string and argv list are the crate's two output
//! formats; both must be exactly reproducible for the same pipeline and
//! dialect, so these tests pin them byte for byte. Measurement tests run
//! against real files on disk through `FsByteSource`.

use magickpipe::{Dialect, Dimensions, FsByteSource, OutputTarget, Pipeline};
use std::path::PathBuf;
use tempfile::TempDir;

/// A representative pipeline touching every priority tier, appended in a
/// deliberately scrambled order.
fn scrambled_pipeline(dialect: Dialect) -> Pipeline {
    let mut pipe = Pipeline::from_file("photos/input.jpg", dialect);
    pipe.flip()
        .rotate(90)
        .quality(85)
        .extent(Some(400), Some(500))
        .align("center")
        .background("white")
        .resize(Some(400), Some(500), "^");
    pipe
}

#[test]
fn shell_golden_graphicsmagick() {
    let pipe = scrambled_pipeline(Dialect::GraphicsMagick);
    assert_eq!(
        pipe.shell_command("out/thumb.jpg"),
        "gm -convert \"photos/input.jpg\" \
         -resize \"400x500^\" -background \"white\" -gravity \"Center\" \
         -extent \"400x500\" -quality \"85\" -rotate \"90\" -flip \
         \"out/thumb.jpg\""
    );
}

#[test]
fn shell_golden_imagemagick() {
    let pipe = scrambled_pipeline(Dialect::ImageMagick);
    assert_eq!(
        pipe.shell_command("out/thumb.jpg"),
        "convert \"photos/input.jpg\" \
         -resize \"400x500^\" -background \"white\" -gravity \"Center\" \
         -extent \"400x500\" -quality \"85\" -rotate \"90\" -flip \
         \"out/thumb.jpg\""
    );
}

#[test]
fn argv_golden_both_dialects() {
    let gm = scrambled_pipeline(Dialect::GraphicsMagick);
    assert_eq!(
        gm.argv(&OutputTarget::Stream {
            format: "png".to_string()
        }),
        [
            "-convert",
            "photos/input.jpg",
            "-resize",
            "400x500^",
            "-background",
            "white",
            "-gravity",
            "Center",
            "-extent",
            "400x500",
            "-quality",
            "85",
            "-rotate",
            "90",
            "-flip",
            "png:-",
        ]
    );

    let im = scrambled_pipeline(Dialect::ImageMagick);
    assert_eq!(
        im.argv(&OutputTarget::File(PathBuf::from("out/thumb.jpg"))),
        [
            "photos/input.jpg",
            "-resize",
            "400x500^",
            "-background",
            "white",
            "-gravity",
            "Center",
            "-extent",
            "400x500",
            "-quality",
            "85",
            "-rotate",
            "90",
            "-flip",
            "out/thumb.jpg",
        ]
    );
}

#[test]
fn rendering_is_deterministic_across_calls() {
    let pipe = scrambled_pipeline(Dialect::GraphicsMagick);
    let target = OutputTarget::Stream {
        format: "png".to_string(),
    };
    assert_eq!(pipe.shell_command("o.jpg"), pipe.shell_command("o.jpg"));
    assert_eq!(pipe.argv(&target), pipe.argv(&target));
}

#[test]
fn argv_tokens_never_carry_shell_quotes() {
    let mut pipe = Pipeline::from_file("in.jpg", Dialect::ImageMagick);
    pipe.background("white").command("-comment", Some("say \"cheese\""), None);

    // The shell encoding quotes every value…
    let shell = pipe.shell_command("out.jpg");
    assert!(shell.contains("-background \"white\""));

    // …and the argv encoding strips every quote.
    let argv = pipe.argv(&OutputTarget::File(PathBuf::from("out.jpg")));
    assert!(argv.iter().all(|token| !token.contains('"')));
    assert!(argv.contains(&"say cheese".to_string()));
}

// =========================================================================
// Measurement against real files
// =========================================================================

fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn measure(path: PathBuf) -> Option<Dimensions> {
    Pipeline::from_file(path, Dialect::GraphicsMagick)
        .measure(&FsByteSource::new())
        .unwrap()
}

#[test]
fn measures_gif_from_disk() {
    let dir = TempDir::new().unwrap();
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&[100, 0, 50, 0, 0, 0, 0]);
    let path = write_fixture(&dir, "tiny.gif", &gif);

    assert_eq!(
        measure(path),
        Some(Dimensions {
            width: 100,
            height: 50
        })
    );
}

#[test]
fn measures_png_from_disk() {
    let dir = TempDir::new().unwrap();
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&800u32.to_be_bytes());
    png.extend_from_slice(&600u32.to_be_bytes());
    png.extend_from_slice(&[8, 6, 0, 0, 0]);
    let path = write_fixture(&dir, "shot.png", &png);

    assert_eq!(
        measure(path),
        Some(Dimensions {
            width: 800,
            height: 600
        })
    );
}

#[test]
fn measures_jpeg_with_sof_past_the_png_sized_prefix() {
    // The SOF sits after a 2 KiB metadata segment — well past the 24-byte
    // prefix used for PNG/GIF, comfortably inside the JPEG bound.
    let dir = TempDir::new().unwrap();
    let segment_len: u16 = 2048;
    let mut jpg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpg.extend_from_slice(&segment_len.to_be_bytes());
    jpg.extend(vec![0u8; segment_len as usize - 2]);
    jpg.extend_from_slice(&[0xFF, 0xC0]);
    jpg.extend_from_slice(&17u16.to_be_bytes());
    jpg.push(8);
    jpg.extend_from_slice(&768u16.to_be_bytes());
    jpg.extend_from_slice(&1024u16.to_be_bytes());
    let path = write_fixture(&dir, "photo.jpg", &jpg);

    assert_eq!(
        measure(path),
        Some(Dimensions {
            width: 1024,
            height: 768
        })
    );
}

#[test]
fn jpeg_without_frame_header_reports_not_found() {
    let dir = TempDir::new().unwrap();
    // Valid SOI, then only skippable APP segments to EOF.
    let mut jpg = vec![0xFF, 0xD8, 0xFF, 0xE0];
    jpg.extend_from_slice(&64u16.to_be_bytes());
    jpg.extend(vec![0u8; 62]);
    let path = write_fixture(&dir, "headerless.jpg", &jpg);

    assert_eq!(measure(path), None);
}

#[test]
fn measures_svg_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "logo.svg",
        br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="120" height="80"></svg>"#,
    );

    assert_eq!(
        measure(path),
        Some(Dimensions {
            width: 120,
            height: 80
        })
    );
}

#[test]
fn extension_dispatch_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&[10, 0, 20, 0]);
    let path = write_fixture(&dir, "SHOUT.GIF", &gif);

    assert_eq!(
        measure(path),
        Some(Dimensions {
            width: 10,
            height: 20
        })
    );
}
