//! GN label helpers

/// Returns the label with a potentially specified toolchain removed.
///
/// Example: `//a/b:c(//x/y:z)` becomes `//a/b:c`.
pub fn remove_toolchain(label: &str) -> &str {
    match label.rsplit_once('(') {
        Some((base, _)) => base,
        None => label,
    }
}
