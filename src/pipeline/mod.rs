//! Filter-pipeline compiler for GraphicsMagick/ImageMagick.
//!
//! A [`Pipeline`] owns one input (a file path or a byte stream), a
//! [`Dialect`], and the queue of pending operations. Transform methods
//! (see [`transform`]) accumulate operations; the compiler (see
//! [`compile`]) renders them deterministically into either a shell
//! command line or an argv token list; the execution helpers hand the
//! rendered invocation to a [`ProcessLauncher`].
//!
//! ## State rules
//!
//! One instance is single-threaded mutable state — no internal locking.
//! [`save`](Pipeline::save) is a one-shot render-to-completion and clears
//! the operation queue afterwards so the instance can be reused.
//! [`stream`](Pipeline::stream) returns before the external process
//! finishes, so it deliberately does **not** clear — the caller owns the
//! reset decision.

pub mod builder;
pub mod compile;
mod transform;

pub use builder::{Operation, OperationSet};
pub use compile::{Dialect, OutputTarget};

use crate::exec::{ByteSource, ByteStream, LaunchError, ProcessLauncher};
use crate::sniff::{self, Dimensions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("operation requires a file input, not a stream")]
    StreamInput,
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("no output path given and the input is not a file")]
    MissingOutputPath,
    #[error("pipeline has no queued operations")]
    EmptyPipeline,
    #[error("{program} failed (exit {code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("could not parse identify output: {0:?}")]
    IdentifyParse(String),
}

/// The pipeline's input, chosen once at construction.
enum Input {
    File(PathBuf),
    /// Fed to the external tool's stdin; consumed by the first execution.
    Stream(Option<ByteStream>),
}

/// Result of the external `identify` helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifyInfo {
    /// Format name as reported by the tool (`JPEG`, `PNG`, …).
    pub format: String,
    pub width: u32,
    pub height: u32,
}

/// One image-transformation pipeline instance.
pub struct Pipeline {
    input: Input,
    dialect: Dialect,
    /// Output type tag for streaming targets. Derived from the input
    /// filename's extension unless overridden via
    /// [`output_format`](Self::output_format).
    output_format: String,
    ops: OperationSet,
}

impl Pipeline {
    /// Pipeline reading from a named file. The output format defaults to
    /// the file's extension (empty when there is none).
    pub fn from_file(path: impl Into<PathBuf>, dialect: Dialect) -> Self {
        let path = path.into();
        let output_format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        Self {
            input: Input::File(path),
            dialect,
            output_format,
            ops: OperationSet::new(),
        }
    }

    /// Pipeline reading from a byte stream via the tool's stdin. The
    /// output format defaults to `jpg`.
    pub fn from_stream(reader: ByteStream, dialect: Dialect) -> Self {
        Self {
            input: Input::Stream(Some(reader)),
            dialect,
            output_format: "jpg".to_string(),
            ops: OperationSet::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The queued operations, read-only.
    pub fn operations(&self) -> &OperationSet {
        &self.ops
    }

    /// Override the streaming output format. A leading dot is stripped, so
    /// both `png` and `.png` work.
    pub fn output_format(&mut self, format: &str) -> &mut Self {
        self.output_format = format.strip_prefix('.').unwrap_or(format).to_string();
        self
    }

    /// Queue a raw operation. The named transform methods all funnel
    /// through here; no validation of flag/value content happens at this
    /// level.
    pub fn append(
        &mut self,
        flag: impl Into<String>,
        value: Option<String>,
        priority: i32,
    ) -> &mut Self {
        self.ops.push(flag, value, priority);
        self
    }

    /// Drop all queued operations.
    pub fn clear(&mut self) -> &mut Self {
        self.ops.clear();
        self
    }

    /// Input token for the rendered invocation: the file path, or `-` for
    /// stdin.
    fn input_token(&self) -> String {
        match &self.input {
            Input::File(path) => path.display().to_string(),
            Input::Stream(_) => "-".to_string(),
        }
    }

    fn input_path(&self) -> Option<&Path> {
        match &self.input {
            Input::File(path) => Some(path),
            Input::Stream(_) => None,
        }
    }

    fn take_stdin(&mut self) -> Option<ByteStream> {
        match &mut self.input {
            Input::File(_) => None,
            Input::Stream(reader) => reader.take(),
        }
    }

    // =====================================================================
    // Rendering
    // =====================================================================

    /// Render the shell-command encoding of the current queue.
    pub fn shell_command(&self, output: &str) -> String {
        compile::render_shell_command(self.dialect, &self.ops, &self.input_token(), output)
    }

    /// Render the argv encoding of the current queue for
    /// [`Dialect::binary`].
    pub fn argv(&self, output: &OutputTarget) -> Vec<String> {
        compile::render_argv(self.dialect, &self.ops, &self.input_token(), output)
    }

    /// Argv encoding for a streaming render, using the configured output
    /// format when `format` is `None`.
    pub fn stream_argv(&self, format: Option<&str>) -> Vec<String> {
        let target = OutputTarget::Stream {
            format: format.unwrap_or(&self.output_format).to_string(),
        };
        self.argv(&target)
    }

    // =====================================================================
    // Measurement
    // =====================================================================

    /// Sniff the input file's pixel dimensions from a bounded byte prefix,
    /// without invoking any external tool.
    ///
    /// `Ok(None)` means the sniffer did not find the expected structure in
    /// the prefix (for JPEG this can simply mean "insufficient data").
    /// Stream inputs and unsupported extensions are hard errors.
    pub fn measure(
        &self,
        source: &impl ByteSource,
    ) -> Result<Option<Dimensions>, PipelineError> {
        let path = self.input_path().ok_or(PipelineError::StreamInput)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let limit =
            sniff::prefix_len(&ext).ok_or_else(|| PipelineError::UnsupportedExtension(ext.clone()))?;

        let prefix = source.prefix(path, limit)?;
        Ok(sniff::sniff(&ext, &prefix))
    }

    /// Ask the external tool for format and dimensions (`gm identify` /
    /// `identify`). Unlike [`measure`](Self::measure) this spawns a
    /// process and understands every format the tool does.
    pub fn identify(
        &self,
        launcher: &impl ProcessLauncher,
    ) -> Result<IdentifyInfo, PipelineError> {
        let path = self.input_path().ok_or(PipelineError::StreamInput)?;
        let command = format!("{} \"{}\"", self.dialect.identify_prefix(), path.display());

        let output = launcher.run_shell(&command, None)?;
        if !output.success {
            return Err(PipelineError::CommandFailed {
                program: self.dialect.identify_prefix().to_string(),
                code: output.code,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        parse_identify(&String::from_utf8_lossy(&output.stdout))
    }

    // =====================================================================
    // Execution
    // =====================================================================

    /// Render and run the pipeline to completion, writing to `output` (or
    /// in place over a file input when `output` is `None`).
    ///
    /// An empty queue skips execution and returns the resolved path. The
    /// queue is cleared after the run — success or failure — so the
    /// instance is ready for a fresh transformation.
    pub fn save(
        &mut self,
        launcher: &impl ProcessLauncher,
        output: Option<&Path>,
    ) -> Result<PathBuf, PipelineError> {
        let output = match (output, self.input_path()) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => path.to_path_buf(),
            (None, None) => return Err(PipelineError::MissingOutputPath),
        };

        if self.ops.is_empty() {
            return Ok(output);
        }

        let command = self.shell_command(&output.display().to_string());
        let stdin = self.take_stdin();
        let result = launcher.run_shell(&command, stdin);
        self.ops.clear();

        let run = result?;
        if !run.success {
            return Err(PipelineError::CommandFailed {
                program: self.dialect.binary().to_string(),
                code: run.code,
                stderr: String::from_utf8_lossy(&run.stderr).into_owned(),
            });
        }
        Ok(output)
    }

    /// Render and spawn the pipeline with output on stdout, returning the
    /// live byte stream. `format` overrides the configured output format
    /// for this render only.
    ///
    /// The queue is **not** cleared: this call returns while the external
    /// process is still running, so clearing here would be premature.
    pub fn stream(
        &mut self,
        launcher: &impl ProcessLauncher,
        format: Option<&str>,
    ) -> Result<ByteStream, PipelineError> {
        if self.ops.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }

        let argv = self.stream_argv(format);
        let stdin = self.take_stdin();
        Ok(launcher.spawn_stream(self.dialect.binary(), &argv, stdin)?)
    }
}

/// Parse `identify` stdout of the shape `name FORMAT WxH+0+0 …`.
fn parse_identify(stdout: &str) -> Result<IdentifyInfo, PipelineError> {
    let bad = || PipelineError::IdentifyParse(stdout.trim().to_string());

    let mut fields = stdout.split_whitespace();
    let _name = fields.next().ok_or_else(bad)?;
    let format = fields.next().ok_or_else(bad)?;
    let geometry = fields.next().ok_or_else(bad)?;

    // Geometry is `WxH` possibly followed by `+x+y` offsets.
    let (w, rest) = geometry.split_once('x').ok_or_else(bad)?;
    let h: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let width = w.parse().map_err(|_| bad())?;
    let height = h.parse().map_err(|_| bad())?;

    Ok(IdentifyInfo {
        format: format.to_string(),
        width,
        height,
    })
}
