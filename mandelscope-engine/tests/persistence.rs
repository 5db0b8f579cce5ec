use std::fs;
use std::path::Path;

use mandelscope_core::{ColorTheme, PixelPoint};
use mandelscope_engine::{
    PersistenceErrorKind, Session, SessionDefaults, PARAMETER_LINES,
};

const RES: u32 = 40;

fn session() -> Session {
    Session::with_resolution(RES, SessionDefaults::default()).unwrap()
}

fn explored() -> Session {
    let mut s = session();
    s.zoom_to(PixelPoint::new(5.0, 8.0), PixelPoint::new(25.0, 30.0))
        .unwrap();
    s.set_max_iterations(50).unwrap();
    s.set_color_theme(ColorTheme::Red).unwrap();
    s
}

fn assert_untouched(s: &mut Session, path: &Path, kind: PersistenceErrorKind) {
    let viewport = *s.current_viewport();
    let grid = s.current_grid().clone();
    let undo_depth = s.history().undo_depth();

    let err = s.load_from(path).unwrap_err();
    assert_eq!(err.kind(), kind, "{err}");
    assert_eq!(s.current_viewport(), &viewport);
    assert_eq!(s.current_grid(), &grid);
    assert_eq!(s.history().undo_depth(), undo_depth);
}

#[test]
fn save_then_load_restores_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");
    let saved = explored();
    saved.save_to(&path).unwrap();

    let mut restored = session();
    restored.load_from(&path).unwrap();

    let vp = restored.current_viewport();
    assert_eq!(vp, saved.current_viewport());
    assert_eq!(vp.color_theme(), ColorTheme::Red);
    assert_eq!(vp.max_iterations(), 50);
    assert!((vp.color_scale() - 5.1).abs() < 1e-12);
    assert_eq!(restored.current_grid(), saved.current_grid());
}

#[test]
fn load_clears_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");
    explored().save_to(&path).unwrap();

    let mut s = session();
    s.set_color_theme(ColorTheme::Blue).unwrap();
    s.undo().unwrap();
    s.set_max_iterations(12).unwrap();
    s.load_from(&path).unwrap();
    assert!(!s.history().can_undo());
    assert!(!s.history().can_redo());
}

#[test]
fn file_has_parameter_block_then_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");
    explored().save_to(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), PARAMETER_LINES + (RES * RES) as usize);
    assert_eq!(lines[0], "40");
    assert_eq!(lines[1], "40");
    assert_eq!(lines[6], "50");
    assert_eq!(lines[8], "red");
}

#[test]
fn failed_loads_leave_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    explored().save_to(&good).unwrap();
    let text = fs::read_to_string(&good).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    let mut s = session();
    s.toggle_overlay().unwrap();
    s.set_color_theme(ColorTheme::Cyan).unwrap();

    let other_res = dir.path().join("other_res.txt");
    explored_at(20).save_to(&other_res).unwrap();
    assert_untouched(&mut s, &other_res, PersistenceErrorKind::InvalidResolution);

    let truncated = dir.path().join("truncated.txt");
    fs::write(&truncated, lines[..lines.len() - 1].join("\n")).unwrap();
    assert_untouched(&mut s, &truncated, PersistenceErrorKind::CorruptData);

    let mut bad_cell = lines.clone();
    bad_cell[PARAMETER_LINES + 3] = "51";
    let out_of_range = dir.path().join("out_of_range.txt");
    fs::write(&out_of_range, bad_cell.join("\n")).unwrap();
    assert_untouched(&mut s, &out_of_range, PersistenceErrorKind::CorruptData);

    let mut bad_theme = lines.clone();
    bad_theme[8] = "purple";
    let unknown_theme = dir.path().join("unknown_theme.txt");
    fs::write(&unknown_theme, bad_theme.join("\n")).unwrap();
    assert_untouched(&mut s, &unknown_theme, PersistenceErrorKind::CorruptData);

    let binary = dir.path().join("binary.txt");
    fs::write(&binary, [0xff, 0xfe, 0x00, 0x34]).unwrap();
    assert_untouched(&mut s, &binary, PersistenceErrorKind::CorruptData);

    let missing = dir.path().join("missing.txt");
    assert_untouched(&mut s, &missing, PersistenceErrorKind::IoFailure);

    assert!(s.overlay_visible());
    assert_eq!(s.current_viewport().color_theme(), ColorTheme::Cyan);
}

#[test]
fn save_to_unwritable_path_is_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("session.txt");
    let err = session().save_to(&path).unwrap_err();
    assert_eq!(err.kind(), PersistenceErrorKind::IoFailure);
    assert!(!err.user_message().is_empty());
}

fn explored_at(resolution: u32) -> Session {
    let mut s = Session::with_resolution(resolution, SessionDefaults::default()).unwrap();
    s.set_max_iterations(50).unwrap();
    s
}
