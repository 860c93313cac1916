use std::cmp::Ordering;

/// Compare two dotted version strings.
///
/// Accepts an optional leading `v`/`V` on either input, splits on `.`, and
/// compares segment-by-segment numerically. A missing trailing segment counts
/// as `0`, so `"1.0"` equals `"1.0.0"`.
///
/// This is a pure, total function: it never fails. Non-numeric segments
/// compare as `0` (so `"1.x.0"` equals `"1.0.0"`), which is a documented
/// degradation rather than an error - malformed input degrades to a
/// best-effort numeric comparison.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use unipm::update::version::compare_versions;
///
/// assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
/// assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
/// assert_eq!(compare_versions("v2.0.0", "1.9.9"), Ordering::Greater);
/// ```
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = segments(a);
    let b = segments(b);

    for i in 0..a.len().max(b.len()) {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    Ordering::Equal
}

/// Split a version string into numeric segments, stripping a single leading
/// `v`/`V` prefix. Unparseable segments become `0`.
fn segments(version: &str) -> Vec<u64> {
    let cleaned = version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version)
        .trim();

    cleaned
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}
