use crate::error::Error;
use crate::flags::Extensions;

pub(crate) const MAX_TAG_LENGTH: usize = 4096;
pub(crate) const MAX_DELIMITER_LENGTH: usize = 8;

#[derive(Clone)]
pub(crate) struct Reader<'a> {
    input: &'a str,
    open_delimiter: &'a str,
    close_delimiter: &'a str,
    pos: usize,
    flags: Extensions,
    sections: Vec<&'a str>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a str, flags: Extensions) -> Self {
        Reader {
            input,
            open_delimiter: "{{",
            close_delimiter: "}}",
            pos: 0,
            flags,
            sections: Vec::new(),
        }
    }

    pub(crate) fn pop_front(&mut self) -> Result<Option<Token<'a>>, Error> {
        if self.pos == self.input.len() {
            return Ok(None);
        }
        let tail = &self.input[self.pos..];
        if tail.starts_with(self.open_delimiter) {
            self.read_tag(tail).map(Some)
        } else {
            Ok(Some(self.read_text(tail)))
        }
    }

    pub(crate) fn set_delimiters(&mut self, od: &'a str, cd: &'a str) {
        self.open_delimiter = od;
        self.close_delimiter = cd;
    }

    fn read_text(&mut self, tail: &'a str) -> Token<'a> {
        let after_text = tail.find(self.open_delimiter).unwrap_or(tail.len());
        self.pos += after_text;
        Token::Text(&tail[..after_text])
    }

    fn read_tag(&mut self, tail: &'a str) -> Result<Token<'a>, Error> {
        let tag_start = self.pos;
        let (raw, after_rel) = tail.span_tag(self.open_delimiter, self.close_delimiter)?;
        let after_tag = tag_start + after_rel;
        self.pos = after_tag;
        let content = raw.trim();
        match content.chars().next() {
            None => Err(Error::EmptyTag),
            Some('#') => self.open_section(content.trim_sigil(), false, tag_start, after_tag),
            Some('^') => self.open_section(content.trim_sigil(), true, tag_start, after_tag),
            Some('/') => self.close_section(content, tag_start, after_tag),
            Some('>') => self.partial(content.trim_sigil(), tag_start, after_tag),
            Some('!') => Ok(self.comment(tag_start, after_tag)),
            Some('=') => self.delimiters(content, tag_start, after_tag),
            Some('&') => Ok(Token::Value(required(content.trim_sigil())?, false)),
            Some('{') => {
                let name = if raw.starts_with('{') {
                    // the closing brace was part of the span pattern
                    content[1..].trim()
                } else {
                    match content[1..].strip_suffix('}') {
                        Some(inner) => inner.trim(),
                        None => return Err(Error::BadUnescapeTag),
                    }
                };
                Ok(Token::Value(required(name)?, false))
            }
            Some(_) => Ok(Token::Value(content, true)),
        }
    }

    fn open_section(
        &mut self,
        name: &'a str,
        inverted: bool,
        tag_start: usize,
        after_tag: usize,
    ) -> Result<Token<'a>, Error> {
        let name = required(name)?;
        self.sections.push(name);
        let standalone = self.consume_standalone(tag_start, after_tag).is_some();
        if inverted {
            Ok(Token::Inverted(name, standalone))
        } else {
            Ok(Token::Section(name, standalone))
        }
    }

    fn close_section(
        &mut self,
        content: &'a str,
        tag_start: usize,
        after_tag: usize,
    ) -> Result<Token<'a>, Error> {
        let name = content.trim_sigil();
        if self.sections.last() == Some(&name) {
            self.sections.pop();
        } else if name.is_empty() {
            return Err(Error::EmptyTag);
        } else if self.flags.contains(Extensions::JSON_POINTER) {
            // a slash tag that closes nothing is a pointer variable
            return Ok(Token::Value(content, true));
        }
        let standalone = self.consume_standalone(tag_start, after_tag).is_some();
        Ok(Token::Close(name, standalone))
    }

    fn partial(
        &mut self,
        name: &'a str,
        tag_start: usize,
        after_tag: usize,
    ) -> Result<Token<'a>, Error> {
        let name = required(name)?;
        match self.consume_standalone(tag_start, after_tag) {
            Some(indent) => Ok(Token::Partial(name, indent, true)),
            None => Ok(Token::Partial(name, "", false)),
        }
    }

    fn comment(&mut self, tag_start: usize, after_tag: usize) -> Token<'a> {
        let standalone = self.consume_standalone(tag_start, after_tag).is_some();
        Token::Comment(standalone)
    }

    fn delimiters(
        &mut self,
        content: &'a str,
        tag_start: usize,
        after_tag: usize,
    ) -> Result<Token<'a>, Error> {
        let body = &content[1..];
        let body = body.strip_suffix('=').unwrap_or(body);
        let (od, cd) = maybe_delimiters(body)?;
        let standalone = self.consume_standalone(tag_start, after_tag).is_some();
        Ok(Token::Delimiters(od, cd, standalone))
    }

    /// When the tag is alone on its line, advances past the trailing
    /// blanks and line end and returns the leading indent.
    fn consume_standalone(&mut self, tag_start: usize, after_tag: usize) -> Option<&'a str> {
        let start_of_line = match self.input[..tag_start].rfind('\n') {
            Some(p) => p + 1,
            None => 0,
        };
        if !self.input.is_indent(start_of_line, tag_start) {
            return None;
        }
        let bytes = self.input.as_bytes();
        let mut pos = after_tag;
        while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        let next = if pos == bytes.len() {
            pos
        } else if bytes[pos] == b'\n' {
            pos + 1
        } else if bytes[pos] == b'\r' && bytes.get(pos + 1) == Some(&b'\n') {
            pos + 2
        } else {
            return None;
        };
        self.pos = next;
        Some(&self.input[start_of_line..tag_start])
    }
}

#[derive(Clone, PartialEq, Debug)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Value(&'a str, bool),
    Section(&'a str, bool),
    Inverted(&'a str, bool),
    Close(&'a str, bool),
    Partial(&'a str, &'a str, bool),
    Comment(bool),
    Delimiters(&'a str, &'a str, bool),
}

fn required(name: &str) -> Result<&str, Error> {
    if name.is_empty() {
        Err(Error::EmptyTag)
    } else {
        Ok(name)
    }
}

fn maybe_delimiters(text: &str) -> Result<(&str, &str), Error> {
    let words = text.split_ascii_whitespace().collect::<Vec<_>>();
    match words[..] {
        [od, cd]
            if !od.contains('=')
                && !cd.contains('=')
                && od.len() <= MAX_DELIMITER_LENGTH
                && cd.len() <= MAX_DELIMITER_LENGTH =>
        {
            Ok((od, cd))
        }
        _ => Err(Error::BadSeparators),
    }
}

trait ReaderStringOps {
    fn span_tag(&self, open_delimiter: &str, close_delimiter: &str) -> Result<(&str, usize), Error>;
    fn trim_sigil(&self) -> &str;
    fn is_indent(&self, start: usize, after: usize) -> bool;
}

impl ReaderStringOps for str {
    // return the raw tag content starting at the beginning of the string
    // and the position after the tag
    fn span_tag(&self, open_delimiter: &str, close_delimiter: &str) -> Result<(&str, usize), Error> {
        let odl = open_delimiter.len();
        let rest = &self[odl..];
        let first = match rest.chars().next() {
            Some(c) => c,
            None => return Err(Error::UnexpectedEnd),
        };
        // `{{{` and `{{=` tags close with an extended pattern so that
        // the final `}` or `=` never reads as tag content
        let (pattern, search_from) = match first {
            '{' => (format!("}}{}", close_delimiter), 0),
            '=' => (format!("={}", close_delimiter), 1),
            _ => (close_delimiter.to_string(), 0),
        };
        match rest[search_from..].find(&pattern) {
            Some(p) => {
                let end = search_from + p;
                if end > MAX_TAG_LENGTH {
                    return Err(Error::TagTooLong);
                }
                Ok((&rest[..end], odl + end + pattern.len()))
            }
            None => match first {
                '{' if rest.contains(close_delimiter) => Err(Error::BadUnescapeTag),
                '=' if rest.contains(close_delimiter) => Err(Error::BadSeparators),
                _ => Err(Error::UnexpectedEnd),
            },
        }
    }

    fn trim_sigil(&self) -> &str {
        self[1..].trim_start()
    }

    fn is_indent(&self, start: usize, after: usize) -> bool {
        after == start || self[start..after].chars().all(|c| c == ' ' || c == '\t')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only() {
        expect_sequence(" 123456 ", Extensions::empty(), vec![Token::Text(" 123456 ")]);
    }

    #[test]
    fn value_with_escape() {
        expect_sequence("{{ v }}", Extensions::empty(), vec![Token::Value("v", true)]);
    }

    #[test]
    fn value_without_escape() {
        expect_sequence("{{{ v }}}", Extensions::empty(), vec![Token::Value("v", false)]);
        expect_sequence("{{& v }}", Extensions::empty(), vec![Token::Value("v", false)]);
    }

    #[test]
    fn spaced_unescape_braces() {
        expect_sequence("{{ { v } }}", Extensions::empty(), vec![Token::Value("v", false)]);
    }

    #[test]
    fn standalone_section_line_is_consumed() {
        expect_sequence(
            "x\n   {{#a}}  \ny{{/a}}",
            Extensions::empty(),
            vec![
                Token::Text("x\n   "),
                Token::Section("a", true),
                Token::Text("y"),
                Token::Close("a", false),
            ],
        );
    }

    #[test]
    fn inline_section_is_not_standalone() {
        expect_sequence(
            "x {{#a}} y{{/a}}",
            Extensions::empty(),
            vec![
                Token::Text("x "),
                Token::Section("a", false),
                Token::Text(" y"),
                Token::Close("a", false),
            ],
        );
    }

    #[test]
    fn two_tags_on_one_line_are_not_standalone() {
        expect_sequence(
            "{{#a}}{{/a}}\n",
            Extensions::empty(),
            vec![
                Token::Section("a", false),
                Token::Close("a", false),
                Token::Text("\n"),
            ],
        );
    }

    #[test]
    fn crlf_counts_as_line_end() {
        expect_sequence(
            "|\r\n{{#b}}\r\n|",
            Extensions::empty(),
            vec![
                Token::Text("|\r\n"),
                Token::Section("b", true),
                Token::Text("|"),
            ],
        );
    }

    #[test]
    fn comment_content_is_dropped() {
        expect_sequence(
            "a{{! ignore me }}b",
            Extensions::empty(),
            vec![Token::Text("a"), Token::Comment(false), Token::Text("b")],
        );
    }

    #[test]
    fn standalone_partial_keeps_indent() {
        expect_sequence(
            "  {{> p }}\nx",
            Extensions::empty(),
            vec![
                Token::Text("  "),
                Token::Partial("p", "  ", true),
                Token::Text("x"),
            ],
        );
    }

    #[test]
    fn inline_partial_has_no_indent() {
        expect_sequence(
            "a {{>p}} b",
            Extensions::empty(),
            vec![
                Token::Text("a "),
                Token::Partial("p", "", false),
                Token::Text(" b"),
            ],
        );
    }

    #[test]
    fn update_delimiters() {
        let mut reader = Reader::new("{{=| |=}}|v|x", Extensions::empty());
        assert_eq!(
            reader.pop_front().unwrap(),
            Some(Token::Delimiters("|", "|", false))
        );
        reader.set_delimiters("|", "|");
        assert_eq!(reader.pop_front().unwrap(), Some(Token::Value("v", true)));
        assert_eq!(reader.pop_front().unwrap(), Some(Token::Text("x")));
        assert_eq!(reader.pop_front().unwrap(), None);
    }

    #[test]
    fn delimiters_are_trimmed() {
        expect_sequence(
            "x{{= +++   --- =}}",
            Extensions::empty(),
            vec![Token::Text("x"), Token::Delimiters("+++", "---", false)],
        );
    }

    #[test]
    fn unmatched_slash_tag_is_a_pointer_value() {
        expect_sequence(
            "{{/a/b}}",
            Extensions::JSON_POINTER,
            vec![Token::Value("/a/b", true)],
        );
    }

    #[test]
    fn matching_close_wins_over_pointer() {
        expect_sequence(
            "{{#a/b}}{{/a/b}}",
            Extensions::JSON_POINTER,
            vec![Token::Section("a/b", false), Token::Close("a/b", false)],
        );
    }

    #[test]
    fn unmatched_close_without_pointer_flag() {
        expect_sequence(
            "x{{/a}}",
            Extensions::empty(),
            vec![Token::Text("x"), Token::Close("a", false)],
        );
    }

    #[test]
    fn missing_close_delimiter() {
        expect_error("{{ v ", Extensions::empty(), Error::UnexpectedEnd);
        expect_error("{{", Extensions::empty(), Error::UnexpectedEnd);
    }

    #[test]
    fn empty_tags() {
        expect_error("{{}}", Extensions::empty(), Error::EmptyTag);
        expect_error("{{ }}", Extensions::empty(), Error::EmptyTag);
        expect_error("{{#}}", Extensions::empty(), Error::EmptyTag);
        expect_error("{{>}}", Extensions::empty(), Error::EmptyTag);
        expect_error("{{&}}", Extensions::empty(), Error::EmptyTag);
        expect_error("{{{}}}", Extensions::empty(), Error::EmptyTag);
    }

    #[test]
    fn unescape_tag_not_closed() {
        expect_error("{{{x}}", Extensions::empty(), Error::BadUnescapeTag);
        expect_error("{{ {x }}", Extensions::empty(), Error::BadUnescapeTag);
    }

    #[test]
    fn bad_separators() {
        expect_error("{{=|=}}", Extensions::empty(), Error::BadSeparators);
        expect_error("{{= | | | =}}", Extensions::empty(), Error::BadSeparators);
        expect_error("{{= |=   | =}}", Extensions::empty(), Error::BadSeparators);
        expect_error("{{=_________ _ =}}", Extensions::empty(), Error::BadSeparators);
        expect_error("{{= +++ --- }}", Extensions::empty(), Error::BadSeparators);
    }

    #[test]
    fn overlong_tag() {
        let input = format!("{{{{{}}}}}", "a".repeat(MAX_TAG_LENGTH + 1));
        expect_error(&input, Extensions::empty(), Error::TagTooLong);
    }

    fn expect_sequence(input: &str, flags: Extensions, tokens: Vec<Token<'_>>) {
        let mut reader = Reader::new(input, flags);
        let mut expected = tokens.into_iter();
        loop {
            let token = reader.pop_front().unwrap();
            assert_eq!(token, expected.next());
            if token.is_none() {
                break;
            }
        }
    }

    fn expect_error(input: &str, flags: Extensions, error: Error) {
        let mut reader = Reader::new(input, flags);
        loop {
            match reader.pop_front() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected an error"),
                Err(e) => {
                    assert_eq!(e, error);
                    break;
                }
            }
        }
    }
}
