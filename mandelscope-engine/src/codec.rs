//! Session files: one value per line, in this order.
//!
//! ```text
//! resolution
//! resolution
//! min_re
//! max_re
//! min_im
//! max_im
//! max_iterations
//! radius_squared
//! color theme identifier
//! magnification
//! resolution² escape times, row-major
//! ```
//!
//! Decoding builds the whole snapshot before returning it, so a caller that
//! only commits `Ok` results never sees a half-loaded session.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use mandelscope_core::{Bounds, ColorTheme, EscapeParams, ViewportModel};

use crate::error::PersistenceError;
use crate::grid::EscapeGrid;

/// Lines preceding the grid cells.
pub const PARAMETER_LINES: usize = 10;

/// A decoded session: viewport scalars plus the grid they produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub viewport: ViewportModel,
    pub grid: EscapeGrid,
}

/// Write `viewport` and `grid` in session-file format.
pub fn encode<W: Write>(
    mut out: W,
    viewport: &ViewportModel,
    grid: &EscapeGrid,
) -> std::io::Result<()> {
    debug_assert_eq!(grid.width(), grid.height(), "session grids are square");
    let b = viewport.bounds();
    writeln!(out, "{}", grid.width())?;
    writeln!(out, "{}", grid.height())?;
    writeln!(out, "{:?}", b.min_re)?;
    writeln!(out, "{:?}", b.max_re)?;
    writeln!(out, "{:?}", b.min_im)?;
    writeln!(out, "{:?}", b.max_im)?;
    writeln!(out, "{}", viewport.max_iterations())?;
    writeln!(out, "{:?}", viewport.radius_squared())?;
    writeln!(out, "{}", viewport.color_theme())?;
    writeln!(out, "{:?}", viewport.magnification())?;
    for value in grid.cells() {
        writeln!(out, "{value}")?;
    }
    Ok(())
}

fn field<T>(lines: &[&str], index: usize, what: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let line = index + 1;
    let raw = lines
        .get(index)
        .ok_or_else(|| PersistenceError::corrupt(line, format!("missing {what}")))?;
    raw.trim()
        .parse()
        .map_err(|e| PersistenceError::corrupt(line, format!("invalid {what} {raw:?}: {e}")))
}

/// Parse and validate a session file against the expected `resolution`.
pub fn decode(text: &str, resolution: u32) -> Result<SessionSnapshot, PersistenceError> {
    let lines: Vec<&str> = text.lines().collect();

    for index in 0..2 {
        let found: u32 = field(&lines, index, "resolution")?;
        if found != resolution {
            return Err(PersistenceError::InvalidResolution {
                expected: resolution,
                found,
            });
        }
    }

    let side = resolution as usize;
    let expected = PARAMETER_LINES + side * side;
    if lines.len() != expected {
        return Err(PersistenceError::corrupt(
            lines.len(),
            format!("expected {expected} lines, found {}", lines.len()),
        ));
    }

    let bounds = Bounds::new(
        field(&lines, 2, "min_re")?,
        field(&lines, 3, "max_re")?,
        field(&lines, 4, "min_im")?,
        field(&lines, 5, "max_im")?,
    )
    .map_err(|e| PersistenceError::corrupt(3, e.to_string()))?;

    let params = EscapeParams::new(
        field(&lines, 6, "max iterations")?,
        field(&lines, 7, "radius squared")?,
    )
    .map_err(|e| PersistenceError::corrupt(7, e.to_string()))?;

    let theme: ColorTheme = field(&lines, 8, "color theme")?;
    let magnification: f64 = field(&lines, 9, "magnification")?;
    let viewport = ViewportModel::restore(bounds, params, theme, magnification)
        .map_err(|e| PersistenceError::corrupt(10, e.to_string()))?;

    let cap = params.max_iterations;
    let mut cells = Vec::with_capacity(side * side);
    for (offset, raw) in lines[PARAMETER_LINES..].iter().enumerate() {
        let line = PARAMETER_LINES + offset + 1;
        let value: u32 = raw.trim().parse().map_err(|e| {
            PersistenceError::corrupt(line, format!("invalid escape time {raw:?}: {e}"))
        })?;
        if value > cap {
            return Err(PersistenceError::corrupt(
                line,
                format!("escape time {value} exceeds iteration cap {cap}"),
            ));
        }
        cells.push(value);
    }
    let grid = EscapeGrid::from_cells(resolution, resolution, cap, cells)
        .map_err(|e| PersistenceError::corrupt(PARAMETER_LINES + 1, e.to_string()))?;

    Ok(SessionSnapshot { viewport, grid })
}

/// Write a session file to `path`, replacing any existing file.
///
/// The finished file is marked read-only so it is not edited by accident.
/// An earlier read-only save at the same path is removed first.
pub fn save(path: &Path, viewport: &ViewportModel, grid: &EscapeGrid) -> Result<(), PersistenceError> {
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_file() && meta.permissions().readonly() {
            debug!(path = %path.display(), "Replacing read-only session file");
            fs::remove_file(path)?;
        }
    }
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer, viewport, grid)?;
    writer.flush()?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    let mut permissions = file.metadata()?.permissions();
    permissions.set_readonly(true);
    file.set_permissions(permissions)?;

    info!(path = %path.display(), "Session saved");
    Ok(())
}

/// Read and validate the session file at `path`.
pub fn load(path: &Path, resolution: u32) -> Result<SessionSnapshot, PersistenceError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| PersistenceError::corrupt(1, "file is not UTF-8 text"))?;
    let snapshot = decode(&text, resolution)?;
    debug!(path = %path.display(), "Session file decoded");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::compute;
    use crate::error::PersistenceErrorKind;

    const RES: u32 = 8;

    fn sample() -> (ViewportModel, EscapeGrid) {
        let mut vp = ViewportModel::default();
        vp.set_bounds(Bounds::new(-1.1, -0.3, -0.2, 0.6).unwrap())
            .unwrap();
        vp.set_max_iterations(50).unwrap();
        vp.set_color_theme(ColorTheme::Red);
        let grid = compute(RES, RES, &vp.bounds(), &vp.params()).unwrap();
        (vp, grid)
    }

    fn encoded() -> String {
        let (vp, grid) = sample();
        let mut out = Vec::new();
        encode(&mut out, &vp, &grid).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn replace_line(text: &str, index: usize, value: &str) -> String {
        let mut lines: Vec<&str> = text.lines().collect();
        lines[index] = value;
        lines.join("\n") + "\n"
    }

    #[test]
    fn layout_matches_format() {
        let text = encoded();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), PARAMETER_LINES + 64);
        assert_eq!(lines[0], "8");
        assert_eq!(lines[1], "8");
        assert_eq!(lines[2], "-1.1");
        assert_eq!(lines[6], "50");
        assert_eq!(lines[7], "4.0");
        assert_eq!(lines[8], "red");
    }

    #[test]
    fn decode_restores_everything() {
        let (vp, grid) = sample();
        let snap = decode(&encoded(), RES).unwrap();
        assert_eq!(snap.viewport, vp);
        assert_eq!(snap.grid, grid);
        assert!((snap.viewport.color_scale() - 5.1).abs() < 1e-12);
    }

    #[test]
    fn wrong_resolution_is_reported_as_such() {
        let err = decode(&encoded(), 16).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::InvalidResolution {
                expected: 16,
                found: 8
            }
        ));
        assert_eq!(err.kind(), PersistenceErrorKind::InvalidResolution);

        let text = replace_line(&encoded(), 1, "9");
        assert_eq!(
            decode(&text, RES).unwrap_err().kind(),
            PersistenceErrorKind::InvalidResolution
        );
    }

    #[test]
    fn non_numeric_resolution_is_corrupt() {
        let text = replace_line(&encoded(), 0, "eight");
        assert_eq!(
            decode(&text, RES).unwrap_err().kind(),
            PersistenceErrorKind::CorruptData
        );
    }

    #[test]
    fn truncated_or_padded_files_are_corrupt() {
        let text = encoded();
        let short: String = text.lines().take(30).map(|l| format!("{l}\n")).collect();
        assert!(matches!(
            decode(&short, RES),
            Err(PersistenceError::CorruptData { .. })
        ));

        let long = format!("{text}0\n");
        assert!(matches!(
            decode(&long, RES),
            Err(PersistenceError::CorruptData { .. })
        ));
        assert!(decode("", RES).is_err());
    }

    #[test]
    fn out_of_range_cell_is_corrupt() {
        let text = replace_line(&encoded(), PARAMETER_LINES + 5, "51");
        match decode(&text, RES) {
            Err(PersistenceError::CorruptData { line, .. }) => assert_eq!(line, 16),
            other => panic!("expected corrupt data, got {other:?}"),
        }
        let text = replace_line(&encoded(), PARAMETER_LINES, "-1");
        assert!(decode(&text, RES).is_err());
    }

    #[test]
    fn bad_scalars_are_corrupt() {
        for (index, value) in [
            (2, "abc"),
            (3, "-5.0"),
            (6, "0"),
            (7, "-4.0"),
            (8, "pink"),
            (9, "NaN"),
        ] {
            let text = replace_line(&encoded(), index, value);
            assert_eq!(
                decode(&text, RES).unwrap_err().kind(),
                PersistenceErrorKind::CorruptData,
                "line {} = {value}",
                index + 1
            );
        }
    }

    #[test]
    fn saved_file_is_read_only_and_can_be_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.txt");
        let (vp, grid) = sample();

        save(&path, &vp, &grid).unwrap();
        assert!(fs::metadata(&path).unwrap().permissions().readonly());

        let mut zoomed = vp;
        zoomed
            .set_bounds(Bounds::new(-1.0, -0.5, 0.0, 0.5).unwrap())
            .unwrap();
        save(&path, &zoomed, &grid).unwrap();
        assert!(fs::metadata(&path).unwrap().permissions().readonly());
        assert_eq!(load(&path, RES).unwrap().viewport, zoomed);
    }

    #[test]
    fn missing_file_is_io_failure() {
        let err = load(Path::new("/definitely/not/here.txt"), RES).unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::IoFailure);
    }
}
