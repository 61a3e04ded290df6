//! Property-based tests for path resolution, mkdir and input handling

use proptest::prelude::*;
use vfsh::{load_archive, Parser, Shell, Vfs, DEFAULT_DIR_MODE};

mod strategies {
    use proptest::prelude::*;

    /// Path segment names (never `.` or `..`)
    pub fn segment() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-z][a-z0-9_]{0,7}").unwrap()
    }

    pub fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(segment(), 1..6)
    }
}

/// Join segments, inserting a `.` segment before position `i` when
/// `dots[i]` is set (the last flag appends a trailing `.`).
fn with_dots(segments: &[String], dots: &[bool]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        if dots.get(i).copied().unwrap_or(false) {
            parts.push(".");
        }
        parts.push(segment);
    }
    if dots.get(segments.len()).copied().unwrap_or(false) {
        parts.push(".");
    }
    parts.join("/")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `.` segments anywhere in a path leave the resolved node unchanged
    #[test]
    fn dot_segments_do_not_change_resolution(
        segments in strategies::segments(),
        dots in prop::collection::vec(any::<bool>(), 7),
        absolute in any::<bool>(),
    ) {
        let mut fs = Vfs::new();
        let root = fs.root();
        let plain = segments.join("/");
        let target = fs.mkdir(root, &plain, DEFAULT_DIR_MODE).unwrap();

        let dotted = with_dots(&segments, &dots);
        let dotted = if absolute { format!("/{}", dotted) } else { dotted };
        prop_assert_eq!(fs.resolve(root, &dotted).unwrap(), target);
        prop_assert_eq!(fs.resolve(root, &plain).unwrap(), target);
    }

    /// mkdir creates every missing intermediate as a directory
    #[test]
    fn mkdir_creates_all_intermediates(segments in strategies::segments()) {
        let mut fs = Vfs::new();
        let root = fs.root();
        fs.mkdir(root, &segments.join("/"), 0o750).unwrap();

        for depth in 1..=segments.len() {
            let prefix = segments[..depth].join("/");
            let id = fs.resolve(root, &prefix).unwrap();
            prop_assert!(fs.node(id).is_dir(), "{} is not a directory", prefix);
            prop_assert_eq!(fs.stat(id).mode, 0o750);
        }
    }

    /// Repeating mkdir through the shell changes nothing
    #[test]
    fn mkdir_twice_is_noop(segments in strategies::segments()) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut shell = Shell::new();
        let line = format!("mkdir {}", segments.join("/"));

        let first = rt.block_on(shell.exec(&line)).unwrap();
        let nodes = shell.fs().len();
        let second = rt.block_on(shell.exec(&line)).unwrap();

        prop_assert!(first.is_success());
        prop_assert!(second.is_success());
        prop_assert_eq!(shell.fs().len(), nodes);
    }

    /// The line parser returns a command or a parse error, never panics
    #[test]
    fn parser_never_panics(input in ".{0,80}") {
        let _ = Parser::new(&input).parse();
    }

    /// Arbitrary bytes are either an archive or an archive error
    #[test]
    fn loader_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..600)) {
        if let Err(e) = load_archive(&bytes) {
            prop_assert!(e.is_fatal());
        }
    }
}
