/// Compile a regex literal once and hand out a `&'static Regex`.
///
/// Only ever called with literals, so a failed compile is a bug in this
/// crate, not in the input.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
