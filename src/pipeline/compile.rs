//! Rendering an [`OperationSet`] into the two invocation encodings.
//!
//! The same sorted operation sequence has two incompatible serializations:
//! a quoted shell command line (for `sh -c` execution) and an argv token
//! list (for direct spawning, no shell, no quoting). Both are independent
//! pure functions over the set — neither shares intermediate state with
//! the other, and both are bit-for-bit reproducible for the same set and
//! dialect.

use super::builder::OperationSet;
use std::path::PathBuf;

/// Which vendor of the external tool the pipeline targets. Fixed at
/// pipeline construction; decides the binary name and whether a
/// `-convert` subcommand token is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    GraphicsMagick,
    ImageMagick,
}

impl Dialect {
    /// Program name for direct argv spawning.
    pub fn binary(self) -> &'static str {
        match self {
            Dialect::GraphicsMagick => "gm",
            Dialect::ImageMagick => "convert",
        }
    }

    /// Leading command text for the shell encoding.
    fn shell_prefix(self) -> &'static str {
        match self {
            Dialect::GraphicsMagick => "gm -convert",
            Dialect::ImageMagick => "convert",
        }
    }

    /// Shell command text for the dimension-identify helper.
    pub fn identify_prefix(self) -> &'static str {
        match self {
            Dialect::GraphicsMagick => "gm identify",
            Dialect::ImageMagick => "identify",
        }
    }
}

/// Where a rendered invocation writes its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to a named file; the path is passed through verbatim.
    File(PathBuf),
    /// Write to stdout, tagged with an output format (`png:-`). An empty
    /// format degrades to a bare `-`.
    Stream { format: String },
}

impl OutputTarget {
    /// The final argv token for this target.
    pub fn token(&self) -> String {
        match self {
            OutputTarget::File(path) => path.display().to_string(),
            OutputTarget::Stream { format } if format.is_empty() => "-".to_string(),
            OutputTarget::Stream { format } => format!("{format}:-"),
        }
    }
}

/// Render the shell encoding: `<prefix> "<input>" <op…> "<output>"`.
///
/// Input and output are double-quoted; each operation renders as its flag
/// alone, or `flag "value"`, in `(priority, sequence)` order, joined by
/// single spaces.
pub fn render_shell_command(
    dialect: Dialect,
    ops: &OperationSet,
    input: &str,
    output: &str,
) -> String {
    let mut parts = vec![dialect.shell_prefix().to_string(), format!("\"{input}\"")];

    for op in ops.sorted() {
        match &op.value {
            Some(value) => parts.push(format!("{} \"{}\"", op.flag, value)),
            None => parts.push(op.flag.clone()),
        }
    }

    parts.push(format!("\"{output}\""));
    parts.join(" ")
}

/// Render the argv encoding for direct spawning of [`Dialect::binary`].
///
/// GraphicsMagick needs a leading `-convert` subcommand token. No shell is
/// involved, so no quoting: values are emitted as single tokens with any
/// double-quote characters stripped. Values must already be argv-atomic —
/// an internal space stays inside its token.
pub fn render_argv(
    dialect: Dialect,
    ops: &OperationSet,
    input: &str,
    output: &OutputTarget,
) -> Vec<String> {
    let mut argv = Vec::with_capacity(ops.len() * 2 + 3);

    if dialect == Dialect::GraphicsMagick {
        argv.push("-convert".to_string());
    }
    argv.push(input.to_string());

    for op in ops.sorted() {
        argv.push(op.flag.clone());
        if let Some(value) = &op.value {
            argv.push(value.replace('"', ""));
        }
    }

    argv.push(output.token());
    argv
}
