//! Location of optional real NDFD samples.
//!
//! Real NDFD files are large and not checked in; tests that want them
//! look in a few known places and skip when nothing is found.

use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or(manifest_dir)
}

/// First existing copy of `name`.
///
/// Checked in order: `TEST_DATA_DIR`, `crates/grib2-parser/testdata/`,
/// `crates/forecast/testdata/`, then `testdata/` at the workspace root.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let root = workspace_root();
    std::env::var_os("TEST_DATA_DIR")
        .map(PathBuf::from)
        .into_iter()
        .chain([
            root.join("crates/grib2-parser/testdata"),
            root.join("crates/forecast/testdata"),
            root.join("testdata"),
        ])
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
}
