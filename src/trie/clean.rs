/// Lexically clean a path: collapse repeated slashes, resolve `.` and `..`
/// segments, and strip trailing slashes.
///
/// Insertion and search both clean before segmenting, so registration and
/// lookup always agree on segment boundaries. The semantics match classic
/// filesystem path cleaning: `..` above a rooted path's root is dropped, and
/// an empty result becomes `"."`.
#[must_use]
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let bytes = path.as_bytes();
    let n = bytes.len();
    let rooted = bytes[0] == b'/';

    let mut out = String::with_capacity(n);
    let mut r = 0;
    // Index past which `..` may not truncate (the root slash, or the run of
    // leading `..` segments on a relative path).
    let mut dotdot = 0;
    if rooted {
        out.push('/');
        r = 1;
        dotdot = 1;
    }

    while r < n {
        if bytes[r] == b'/' {
            r += 1;
        } else if bytes[r] == b'.' && (r + 1 == n || bytes[r + 1] == b'/') {
            r += 1;
        } else if bytes[r] == b'.' && bytes[r + 1] == b'.' && (r + 2 == n || bytes[r + 2] == b'/') {
            r += 2;
            if out.len() > dotdot {
                let keep = out[dotdot..].rfind('/').map_or(dotdot, |i| dotdot + i);
                out.truncate(keep);
            } else if !rooted {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str("..");
                dotdot = out.len();
            }
        } else {
            if (rooted && out.len() != 1) || (!rooted && !out.is_empty()) {
                out.push('/');
            }
            let start = r;
            while r < n && bytes[r] != b'/' {
                r += 1;
            }
            out.push_str(&path[start..r]);
        }
    }

    if out.is_empty() {
        return ".".to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_clean() {
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("/api/v1/users"), "/api/v1/users");
        assert_eq!(clean_path("abc/def"), "abc/def");
    }

    #[test]
    fn test_collapses_repeated_slashes() {
        assert_eq!(clean_path("/a//b"), "/a/b");
        assert_eq!(clean_path("//a///b//"), "/a/b");
    }

    #[test]
    fn test_resolves_dot_segments() {
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/a/b/."), "/a/b");
        assert_eq!(clean_path("./a"), "a");
    }

    #[test]
    fn test_resolves_dotdot_segments() {
        assert_eq!(clean_path("/a/b/.."), "/a");
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/a/b/c/../../d"), "/a/d");
        assert_eq!(clean_path("/../a"), "/a");
        assert_eq!(clean_path("/.."), "/");
    }

    #[test]
    fn test_relative_dotdot_is_preserved() {
        assert_eq!(clean_path("../a"), "../a");
        assert_eq!(clean_path("a/../../b"), "../b");
    }

    #[test]
    fn test_empty_becomes_dot() {
        assert_eq!(clean_path(""), ".");
        assert_eq!(clean_path("a/.."), ".");
    }

    #[test]
    fn test_trailing_slash_is_dropped() {
        assert_eq!(clean_path("/api/"), "/api");
        assert_eq!(clean_path("/api/v1/users/"), "/api/v1/users");
    }
}
