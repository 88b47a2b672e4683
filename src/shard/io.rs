//! Plain-text persistence for shard calibration.
//!
//! `<name>_points.txt` holds a count `N` followed by `N` blocks of two
//! `"<x> <y>"` lines (live point, then display point). `<name>_mask.txt`
//! holds a count `M` followed by `M` live-space perimeter points. Readers
//! tokenize on whitespace, so line layout is not significant.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::{
    core::Point,
    error::{ShardmapError, ShardmapResult},
};

pub const POINTS_SUFFIX: &str = "_points.txt";
pub const MASK_SUFFIX: &str = "_mask.txt";

/// Paired live/display calibration points, index-aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Correspondences {
    pub live: Vec<Point>,
    pub display: Vec<Point>,
}

impl Correspondences {
    pub fn len(&self) -> usize {
        self.live.len().min(self.display.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn points_path(base: &Path) -> PathBuf {
    with_suffix(base, POINTS_SUFFIX)
}

pub fn mask_path(base: &Path) -> PathBuf {
    with_suffix(base, MASK_SUFFIX)
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
    what: &'static str,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str, what: &'static str) -> Self {
        Self {
            iter: text.split_whitespace(),
            what,
        }
    }

    fn count(&mut self) -> ShardmapResult<usize> {
        let tok = self
            .iter
            .next()
            .ok_or_else(|| ShardmapError::parse(format!("{}: missing point count", self.what)))?;
        tok.parse::<usize>()
            .map_err(|_| ShardmapError::parse(format!("{}: bad point count {tok:?}", self.what)))
    }

    fn point(&mut self) -> ShardmapResult<Point> {
        let x = self.coord()?;
        let y = self.coord()?;
        Ok(Point::new(x, y))
    }

    fn coord(&mut self) -> ShardmapResult<f64> {
        let tok = self
            .iter
            .next()
            .ok_or_else(|| ShardmapError::parse(format!("{}: unexpected end of file", self.what)))?;
        let v = tok
            .parse::<f64>()
            .map_err(|_| ShardmapError::parse(format!("{}: bad coordinate {tok:?}", self.what)))?;
        if !v.is_finite() {
            return Err(ShardmapError::parse(format!(
                "{}: non-finite coordinate {tok:?}",
                self.what
            )));
        }
        Ok(v)
    }
}

pub fn parse_points(text: &str) -> ShardmapResult<Correspondences> {
    let mut tokens = Tokens::new(text, "points file");
    let n = tokens.count()?;
    // The count header is untrusted; grow with the points actually present.
    let mut out = Correspondences::default();
    for _ in 0..n {
        out.live.push(tokens.point()?);
        out.display.push(tokens.point()?);
    }
    Ok(out)
}

pub fn parse_mask(text: &str) -> ShardmapResult<Vec<Point>> {
    let mut tokens = Tokens::new(text, "mask file");
    let n = tokens.count()?;
    (0..n).map(|_| tokens.point()).collect()
}

pub fn format_points(c: &Correspondences) -> String {
    let n = c.len();
    let mut out = format!("{n}\n");
    for (l, d) in c.live.iter().zip(&c.display).take(n) {
        out.push_str(&format!("{} {}\n{} {}\n", l.x, l.y, d.x, d.y));
    }
    out
}

pub fn format_mask(points: &[Point]) -> String {
    let mut out = format!("{}\n", points.len());
    for p in points {
        out.push_str(&format!("{} {}\n", p.x, p.y));
    }
    out
}

pub fn read_points(path: &Path) -> ShardmapResult<Correspondences> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read points file {}", path.display()))?;
    parse_points(&text)
}

/// Read a mask file, or `Ok(None)` when it does not exist.
pub fn read_mask(path: &Path) -> ShardmapResult<Option<Vec<Point>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read mask file {}", path.display()))?;
    parse_mask(&text).map(Some)
}

pub fn write_points(path: &Path, c: &Correspondences) -> ShardmapResult<()> {
    std::fs::write(path, format_points(c))
        .with_context(|| format!("write points file {}", path.display()))?;
    Ok(())
}

pub fn write_mask(path: &Path, points: &[Point]) -> ShardmapResult<()> {
    std::fs::write(path, format_mask(points))
        .with_context(|| format!("write mask file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/shard/io.rs"]
mod tests;
