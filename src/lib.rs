//! # magickpipe
//!
//! Describe a sequence of image transformations and compile it into a
//! GraphicsMagick or ImageMagick invocation — plus header-level sniffers
//! that read an image's pixel dimensions straight from its encoded bytes,
//! no external tool required.
//!
//! # Architecture
//!
//! The crate splits into pure-data compilation and thin collaborator
//! seams:
//!
//! ```text
//! transform methods → OperationSet → compiler → shell string / argv list
//!                                                      │
//!                                            ProcessLauncher (seam)
//! byte prefix → sniffers → Dimensions          ByteSource (seam)
//! ```
//!
//! Everything left of the seams is deterministic and synchronous: the same
//! operation queue and dialect always render to bit-identical output, in
//! ascending priority order with append order among ties. Process
//! lifecycle, stdio wiring, and file reads live behind the two traits so
//! tests run against recording mocks.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | `Pipeline` instance: transform methods, the operation queue, both renderers, save/stream/measure/identify |
//! | [`sniff`] | Pure dimension sniffers for GIF, PNG, JPEG, and SVG byte prefixes |
//! | [`exec`] | `ProcessLauncher` + `ByteSource` traits and their `std` implementations |
//!
//! # Example
//!
//! ```
//! use magickpipe::{Dialect, Pipeline};
//!
//! let mut pipe = Pipeline::from_file("portrait.jpg", Dialect::GraphicsMagick);
//! pipe.resize_center(400, 500, None).quality(85);
//!
//! assert_eq!(
//!     pipe.shell_command("thumb.jpg"),
//!     "gm -convert \"portrait.jpg\" -resize \"400x500^\" -background \"white\" \
//!      -gravity \"Center\" -crop \"400x500+0+0\" -quality \"85\" \"thumb.jpg\""
//! );
//! ```

pub mod exec;
pub mod pipeline;
pub mod sniff;

pub use exec::{ByteSource, ByteStream, FsByteSource, ProcessLauncher, SystemLauncher};
pub use pipeline::{Dialect, IdentifyInfo, OutputTarget, Pipeline, PipelineError};
pub use sniff::Dimensions;
