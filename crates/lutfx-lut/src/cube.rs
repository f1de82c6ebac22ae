//! Adobe/Resolve `.cube` LUT format support.
//!
//! The `.cube` format is a simple text-based LUT format widely supported
//! by DaVinci Resolve, Adobe applications, and most compositors.
//!
//! # Format
//!
//! ```text
//! # Comment
//! TITLE "LUT Name"
//! LUT_3D_SIZE 33
//! 0.0 0.0 0.0
//! ...
//! 1.0 1.0 1.0
//! ```
//!
//! Data lines follow [`GridIndex`](crate::GridIndex) order (red fastest).
//! Keywords are matched case-insensitively.
//!
//! # Leniency
//!
//! Reading is permissive: a data line that does not consist of exactly three
//! numbers is skipped and counted in [`CubeFile::skipped`] instead of failing
//! the whole file. Only a missing or invalid `LUT_3D_SIZE` is fatal. Whether
//! the remaining samples form a complete cube is checked separately by
//! [`CubeFile::into_lut`].
//!
//! # Example
//!
//! ```rust,ignore
//! use lutfx_lut::cube;
//!
//! let lut = cube::read("grade.cube")?.into_lut()?;
//! cube::write("copy.cube", &lut, &cube::CubeHeader::titled("Copy"))?;
//! ```

use crate::{GridIndex, Lut3D, LutError, LutResult, MAX_SIZE};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Result of parsing a `.cube` file, before completeness is validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeFile {
    /// Text of the `TITLE "..."` line, if present.
    pub title: Option<String>,
    /// Value of `LUT_3D_SIZE`.
    pub size: usize,
    /// Successfully parsed samples in file order.
    pub samples: Vec<[f32; 3]>,
    /// Number of malformed data lines that were skipped.
    pub skipped: usize,
}

impl CubeFile {
    /// Number of samples a complete cube of this size holds.
    pub fn expected_samples(&self) -> usize {
        GridIndex::new(self.size).len()
    }

    /// True if the sample count matches `size^3`.
    pub fn is_complete(&self) -> bool {
        self.samples.len() == self.expected_samples()
    }

    /// Validates the parsed data and converts it to a [`Lut3D`].
    ///
    /// Fails with [`LutError::InvalidSize`] for sizes outside
    /// `2..=MAX_SIZE` and with
    /// [`LutError::SampleCount`] if the file did not contain exactly
    /// `size^3` usable samples.
    pub fn into_lut(self) -> LutResult<Lut3D> {
        let lut = Lut3D::from_samples(self.size, self.samples)?;
        Ok(match self.title {
            Some(title) => lut.with_title(title),
            None => lut,
        })
    }
}

/// Header lines written in front of the sample data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CubeHeader {
    /// `TITLE` line content.
    pub title: Option<String>,
    /// Comment lines, written without the leading `# `.
    pub comments: Vec<String>,
}

impl CubeHeader {
    /// Header with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            comments: Vec::new(),
        }
    }

    /// Adds a comment line.
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comments.push(text.into());
        self
    }
}

/// Reads a `.cube` file.
pub fn read<P: AsRef<Path>>(path: P) -> LutResult<CubeFile> {
    let file = File::open(path.as_ref())?;
    parse(BufReader::new(file))
}

/// Parses a `.cube` file from a reader.
pub fn parse<R: BufRead>(reader: R) -> LutResult<CubeFile> {
    let mut title = None;
    let mut size: Option<usize> = None;
    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let upper = line.to_ascii_uppercase();
        if let Some(rest) = keyword_value(line, &upper, "TITLE") {
            if let Some(t) = parse_title(rest) {
                title = Some(t);
            }
        } else if let Some(rest) = keyword_value(line, &upper, "LUT_3D_SIZE") {
            size = Some(parse_size(rest)?);
        } else if upper.starts_with("LUT_1D_SIZE") {
            return Err(LutError::Format("1D LUTs are not supported".into()));
        } else if upper.starts_with("DOMAIN_MIN") || upper.starts_with("DOMAIN_MAX") {
            // Only the unit domain is supported; the bounds are informational.
        } else {
            match parse_rgb(line) {
                Some(rgb) => samples.push(rgb),
                None => {
                    warn!(line = line_no + 1, content = line, "skipping malformed data line");
                    skipped += 1;
                }
            }
        }
    }

    let size = size.ok_or_else(|| LutError::Format("missing LUT_3D_SIZE".into()))?;
    debug!(size, samples = samples.len(), skipped, "parsed cube file");

    Ok(CubeFile {
        title,
        size,
        samples,
        skipped,
    })
}

/// Writes a 3D LUT to a `.cube` file.
pub fn write<P: AsRef<Path>>(path: P, lut: &Lut3D, header: &CubeHeader) -> LutResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, lut, header)?;
    writer.flush()?;
    Ok(())
}

/// Serializes a 3D LUT in `.cube` format to any writer.
pub fn write_to<W: Write>(writer: &mut W, lut: &Lut3D, header: &CubeHeader) -> LutResult<()> {
    if let Some(title) = header.title.as_deref().or(lut.title()) {
        writeln!(writer, "TITLE \"{}\"", title)?;
    }
    for comment in &header.comments {
        writeln!(writer, "# {}", comment)?;
    }
    writeln!(writer, "LUT_3D_SIZE {}", lut.size())?;

    for rgb in lut.samples() {
        writeln!(writer, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2])?;
    }

    Ok(())
}

// Helper functions

/// Text following `keyword` if the line starts with it, in any case.
fn keyword_value<'a>(line: &'a str, upper: &str, keyword: &str) -> Option<&'a str> {
    upper.starts_with(keyword).then(|| &line[keyword.len()..])
}

fn parse_title(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let rest = &line[start + 1..];
    let end = rest.rfind('"').unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

fn parse_size(rest: &str) -> LutResult<usize> {
    let value = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| LutError::Format("LUT_3D_SIZE without a value".into()))?;
    let size: i64 = value
        .parse()
        .map_err(|_| LutError::Format(format!("invalid LUT_3D_SIZE value: {}", value)))?;
    if size <= 0 {
        return Err(LutError::Format(format!(
            "LUT_3D_SIZE must be positive, got {}",
            size
        )));
    }
    if size > MAX_SIZE as i64 {
        return Err(LutError::Format(format!(
            "LUT_3D_SIZE {} exceeds the maximum of {}",
            size, MAX_SIZE
        )));
    }
    Ok(size as usize)
}

fn parse_rgb(line: &str) -> Option<[f32; 3]> {
    let mut parts = line.split_whitespace();
    let rgb = [
        parts.next()?.parse().ok()?,
        parts.next()?.parse().ok()?,
        parts.next()?.parse().ok()?,
    ];
    if parts.next().is_some() {
        return None;
    }
    Some(rgb)
}
