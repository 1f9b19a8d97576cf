//! Segment path derivation.

use std::path::PathBuf;

/// Archive file extension, appended to base paths that lack it.
pub const EXTENSION: &str = ".zip";

/// Zero-padding width of the segment ordinal in derived file names.
pub const ORDINAL_WIDTH: usize = 6;

/// Appends [`EXTENSION`] to `path` unless it already ends with it.
///
/// The check is case-insensitive; an existing extension keeps its
/// original case.
#[must_use]
pub fn normalize_base_path(path: &str) -> String {
    if ends_with_extension(path) {
        path.to_string()
    } else {
        format!("{path}{EXTENSION}")
    }
}

/// Derives the file name of segment `ordinal` from `base`.
///
/// The base path's stem (everything before the extension) determines
/// the shape:
///
/// - stem without a `.`: `report.zip` + 3 → `report-000003.zip`
/// - stem with a `.`: the trailing `.`-separated piece is a prior
///   disambiguation segment and is replaced, `report.old.zip` + 3 →
///   `report.000003.zip`
/// - no recognized extension (cannot occur for a normalized base):
///   `report` + 3 → `report-3`
///
/// Distinct ordinals always map to distinct paths for the same base.
#[must_use]
pub fn segment_path(base: &str, ordinal: u32, width: usize) -> PathBuf {
    if !ends_with_extension(base) {
        return PathBuf::from(format!("{base}-{ordinal}"));
    }

    let (stem, ext) = base.split_at(base.len() - EXTENSION.len());
    let name = match stem.rfind('.') {
        Some(dot) => format!("{}{ordinal:0width$}{ext}", &stem[..=dot]),
        None => format!("{stem}-{ordinal:0width$}{ext}"),
    };
    PathBuf::from(name)
}

fn ends_with_extension(path: &str) -> bool {
    path.len() >= EXTENSION.len()
        && path
            .get(path.len() - EXTENSION.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_appended_when_missing() {
        assert_eq!(normalize_base_path("out"), "out.zip");
        assert_eq!(normalize_base_path("dir/batch"), "dir/batch.zip");
    }

    #[test]
    fn extension_not_appended_twice() {
        assert_eq!(normalize_base_path("archive.zip"), "archive.zip");
        assert_eq!(normalize_base_path("ARCHIVE.ZIP"), "ARCHIVE.ZIP");
        assert_eq!(normalize_base_path("Archive.Zip"), "Archive.Zip");
    }

    #[test]
    fn plain_stem_gets_dashed_ordinal() {
        let path = segment_path("out.zip", 0, ORDINAL_WIDTH);
        assert_eq!(path, PathBuf::from("out-000000.zip"));
    }

    #[test]
    fn dotted_stem_replaces_trailing_piece() {
        let path = segment_path("batch.old.zip", 3, ORDINAL_WIDTH);
        assert_eq!(path, PathBuf::from("batch.000003.zip"));
    }

    #[test]
    fn uppercase_extension_recognized() {
        let path = segment_path("DATA.ZIP", 1, ORDINAL_WIDTH);
        assert_eq!(path, PathBuf::from("DATA-000001.ZIP"));
    }

    #[test]
    fn multibyte_base_paths_handled() {
        assert_eq!(normalize_base_path("データ"), "データ.zip");
        let path = segment_path("データ.zip", 2, ORDINAL_WIDTH);
        assert_eq!(path, PathBuf::from("データ-000002.zip"));
    }

    #[test]
    fn missing_extension_falls_back_to_unpadded() {
        let path = segment_path("raw", 7, ORDINAL_WIDTH);
        assert_eq!(path, PathBuf::from("raw-7"));
    }

    #[test]
    fn wide_ordinals_still_distinct() {
        let a = segment_path("out.zip", 999_999, ORDINAL_WIDTH);
        let b = segment_path("out.zip", 1_000_000, ORDINAL_WIDTH);
        assert_eq!(a, PathBuf::from("out-999999.zip"));
        assert_eq!(b, PathBuf::from("out-1000000.zip"));
        assert_ne!(a, b);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distinct_ordinals_distinct_paths(a in 0u32..2_000_000, b in 0u32..2_000_000) {
                prop_assume!(a != b);
                for base in ["out.zip", "batch.old.zip", "raw"] {
                    prop_assert_ne!(
                        segment_path(base, a, ORDINAL_WIDTH),
                        segment_path(base, b, ORDINAL_WIDTH)
                    );
                }
            }

            #[test]
            fn ordinal_recoverable_from_path(ordinal in 0u32..1_000_000) {
                let path = segment_path("out.zip", ordinal, ORDINAL_WIDTH);
                let name = path.to_str().unwrap();
                let digits = &name["out-".len()..name.len() - EXTENSION.len()];
                prop_assert_eq!(digits.parse::<u32>().unwrap(), ordinal);
            }
        }
    }
}
