use crate::flags::Extensions;

/// A parsed tag path, resolved against the scope stack at render time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Path {
    /// `.`, the innermost scope value itself.
    This,
    /// `*`, the key of the nearest enclosing object iteration.
    IterKey,
    /// Dot-separated segments, `a.b[0].c`.
    Keys(Vec<Segment>),
    /// RFC 6901 reference tokens, unescaped.
    Pointer(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Name(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A condition attached to a variable or section tag, `path OP literal`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cond {
    pub(crate) op: CmpOp,
    pub(crate) literal: String,
}

pub(crate) fn parse_path(text: &str, flags: Extensions) -> Path {
    if text == "." {
        return Path::This;
    }
    if text == "*" && flags.contains(Extensions::OBJECT_ITER) {
        return Path::IterKey;
    }
    if flags.contains(Extensions::JSON_POINTER) && text.starts_with('/') {
        let tokens = text[1..]
            .split('/')
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .collect();
        return Path::Pointer(tokens);
    }
    let segments = text.split('.').flat_map(parse_segment).collect();
    Path::Keys(segments)
}

// "a", "3" and "a[3][0]" are the accepted shapes; anything else is kept
// verbatim as a key name and will simply fail to resolve.
fn parse_segment(piece: &str) -> Vec<Segment> {
    if let Ok(index) = piece.parse::<usize>() {
        return vec![Segment::Index(index)];
    }
    if let Some(open) = piece.find('[') {
        if piece.ends_with(']') {
            let mut segments = Vec::new();
            if open > 0 {
                segments.push(Segment::Name(piece[..open].to_owned()));
            }
            for part in piece[open + 1..piece.len() - 1].split("][") {
                match part.parse::<usize>() {
                    Ok(index) => segments.push(Segment::Index(index)),
                    Err(_) => return vec![Segment::Name(piece.to_owned())],
                }
            }
            return segments;
        }
    }
    vec![Segment::Name(piece.to_owned())]
}

/// Splits `key OP literal` tag content when the relevant extension is on.
/// The scan starts after the first byte so that sigil-like leading
/// characters never read as operators.
pub(crate) fn split_cond(content: &str, flags: Extensions) -> (&str, Option<Cond>) {
    let equal = flags.contains(Extensions::EQUAL);
    let compare = flags.contains(Extensions::COMPARE);
    if !equal && !compare {
        return (content, None);
    }
    let bytes = content.as_bytes();
    let mut index = 1;
    while index < bytes.len() {
        let (op, skip) = match bytes[index] {
            b'=' if equal => (CmpOp::Eq, 1),
            b'<' if compare => {
                if bytes.get(index + 1) == Some(&b'=') {
                    (CmpOp::Le, 2)
                } else {
                    (CmpOp::Lt, 1)
                }
            }
            b'>' if compare => {
                if bytes.get(index + 1) == Some(&b'=') {
                    (CmpOp::Ge, 2)
                } else {
                    (CmpOp::Gt, 1)
                }
            }
            _ => {
                index += 1;
                continue;
            }
        };
        let literal = content[index + skip..].to_owned();
        return (&content[..index], Some(Cond { op, literal }));
    }
    (content, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_and_indexed() {
        let path = parse_path("a.b[1].0", Extensions::empty());
        assert_eq!(
            path,
            Path::Keys(vec![
                Segment::Name("a".to_owned()),
                Segment::Name("b".to_owned()),
                Segment::Index(1),
                Segment::Index(0),
            ])
        );
    }

    #[test]
    fn self_path() {
        assert_eq!(parse_path(".", Extensions::empty()), Path::This);
    }

    #[test]
    fn pointer_requires_flag() {
        assert_eq!(
            parse_path("/a/~1b", Extensions::JSON_POINTER),
            Path::Pointer(vec!["a".to_owned(), "/b".to_owned()])
        );
        assert_eq!(
            parse_path("/a", Extensions::empty()),
            Path::Keys(vec![Segment::Name("/a".to_owned())])
        );
    }

    #[test]
    fn iter_key_requires_flag() {
        assert_eq!(parse_path("*", Extensions::OBJECT_ITER), Path::IterKey);
        assert_eq!(
            parse_path("*", Extensions::empty()),
            Path::Keys(vec![Segment::Name("*".to_owned())])
        );
    }

    #[test]
    fn equality_condition() {
        let (key, cond) = split_cond("name=John Smith", Extensions::EQUAL);
        assert_eq!(key, "name");
        assert_eq!(
            cond,
            Some(Cond {
                op: CmpOp::Eq,
                literal: "John Smith".to_owned()
            })
        );
    }

    #[test]
    fn comparison_operators() {
        let (key, cond) = split_cond("n>=10", Extensions::COMPARE);
        assert_eq!(key, "n");
        assert_eq!(cond.unwrap().op, CmpOp::Ge);

        let (_, cond) = split_cond("n<10", Extensions::COMPARE);
        assert_eq!(cond.unwrap().op, CmpOp::Lt);
    }

    #[test]
    fn operators_ignored_without_flags() {
        let (key, cond) = split_cond("n=1", Extensions::COMPARE);
        assert_eq!(key, "n=1");
        assert_eq!(cond, None);
    }
}
