//! Structured command specifications.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// The three external tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Raster image tool; also emits PDF from images and rasterizes PDFs.
    Rasterizer,
    /// Office-document converter.
    OfficeConverter,
    /// Audio/video transcoder.
    MediaTranscoder,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::Rasterizer,
        ToolKind::OfficeConverter,
        ToolKind::MediaTranscoder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rasterizer => "rasterizer",
            Self::OfficeConverter => "office_converter",
            Self::MediaTranscoder => "media_transcoder",
        }
    }

    /// Flag that makes the tool print its version and exit.
    fn version_flag(&self) -> &'static str {
        match self {
            Self::MediaTranscoder => "-version",
            Self::Rasterizer | Self::OfficeConverter => "--version",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool invocation: which tool, and its argument list.
///
/// Arguments are kept as separate values and handed to the process as-is,
/// never joined into a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub tool: ToolKind,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new<I, A>(tool: ToolKind, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            tool,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `<input> <output>` through the raster image tool. The output format
    /// follows the output extension.
    pub fn rasterize(input: &Path, output: &Path) -> Self {
        Self::new(
            ToolKind::Rasterizer,
            [input.as_os_str().to_owned(), output.as_os_str().to_owned()],
        )
    }

    /// `-density <dpi> <input> <output>`; a multi-page input yields
    /// `<output-stem>-N.<ext>` files instead of `<output>`.
    pub fn rasterize_pages(input: &Path, output: &Path, density: u32) -> Self {
        Self::new(
            ToolKind::Rasterizer,
            [
                OsString::from("-density"),
                OsString::from(density.to_string()),
                input.as_os_str().to_owned(),
                output.as_os_str().to_owned(),
            ],
        )
    }

    /// `--headless --convert-to <ext> --outdir <dir> <input>`; the converter
    /// writes `<dir>/<input-stem>.<ext>`.
    pub fn office_convert(input: &Path, target_ext: &str, outdir: &Path) -> Self {
        Self::new(
            ToolKind::OfficeConverter,
            [
                OsString::from("--headless"),
                OsString::from("--convert-to"),
                OsString::from(target_ext),
                OsString::from("--outdir"),
                outdir.as_os_str().to_owned(),
                input.as_os_str().to_owned(),
            ],
        )
    }

    /// `-y -loglevel <level> -i <input> <output>`.
    pub fn transcode(input: &Path, output: &Path, log_level: &str) -> Self {
        Self::new(
            ToolKind::MediaTranscoder,
            [
                OsString::from("-y"),
                OsString::from("-loglevel"),
                OsString::from(log_level),
                OsString::from("-i"),
                input.as_os_str().to_owned(),
                output.as_os_str().to_owned(),
            ],
        )
    }

    /// Prints the tool's version; used for availability probes.
    pub fn version(tool: ToolKind) -> Self {
        Self::new(tool, [tool.version_flag()])
    }

    pub fn is_version_probe(&self) -> bool {
        self.args.len() == 1 && self.args[0] == self.tool.version_flag()
    }

    /// Value following `flag`, if present.
    pub fn flag_value(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
    }

    /// Trailing positional arguments as paths.
    pub fn trailing_paths(&self, count: usize) -> Vec<PathBuf> {
        let start = self.args.len().saturating_sub(count);
        self.args[start..].iter().map(PathBuf::from).collect()
    }
}
