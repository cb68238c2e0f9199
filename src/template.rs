use std::collections::HashMap;
use std::io;

use crate::context::Node;
use crate::error::Error;
use crate::flags::Extensions;
use crate::path::{parse_path, split_cond, Cond, Path};
use crate::reader::{Reader, Token};
use crate::render;

pub(crate) const MAX_SECTION_DEPTH: usize = 256;

/// A parsed template, ready to render any number of documents.
pub struct Template {
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) flags: Extensions,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Instruction {
    Literal(String),
    Variable {
        path: Path,
        escape: bool,
        cond: Option<Cond>,
    },
    SectionOpen {
        path: Path,
        inverted: bool,
        cond: Option<Cond>,
        object_iter: bool,
        /// Index of the matching [`Instruction::SectionClose`].
        close: usize,
    },
    SectionClose,
    Partial {
        name: String,
        indent: String,
    },
    Comment,
    DelimiterChange(String, String),
}

impl Template {
    /// Parses template text under the given extension flags. The flags
    /// are bound to the template and also govern every later render.
    pub fn parse(input: &str, flags: Extensions) -> Result<Self, Error> {
        let mut reader = Reader::new(input, flags);
        let mut instructions = Vec::new();
        let mut open: Vec<(String, usize)> = Vec::new();
        while let Some(token) = reader.pop_front()? {
            match token {
                Token::Text(text) => {
                    instructions.push(Instruction::Literal(text.to_owned()));
                }
                Token::Value(content, escape) => {
                    let (key, cond) = split_cond(content, flags);
                    instructions.push(Instruction::Variable {
                        path: parse_path(key, flags),
                        escape,
                        cond,
                    });
                }
                Token::Section(name, standalone) => {
                    open_section(&mut instructions, &mut open, name, false, standalone, flags)?;
                }
                Token::Inverted(name, standalone) => {
                    open_section(&mut instructions, &mut open, name, true, standalone, flags)?;
                }
                Token::Close(name, standalone) => {
                    if standalone {
                        trim_standalone(&mut instructions);
                    }
                    let (open_name, open_index) = match open.pop() {
                        Some(entry) => entry,
                        None => return Err(Error::Closing),
                    };
                    if open_name != name {
                        return Err(Error::Closing);
                    }
                    let close = instructions.len();
                    instructions.push(Instruction::SectionClose);
                    if let Instruction::SectionOpen { close: slot, .. } =
                        &mut instructions[open_index]
                    {
                        *slot = close;
                    }
                }
                Token::Partial(name, indent, standalone) => {
                    if standalone {
                        trim_standalone(&mut instructions);
                    }
                    instructions.push(Instruction::Partial {
                        name: name.to_owned(),
                        indent: indent.to_owned(),
                    });
                }
                Token::Comment(standalone) => {
                    if standalone {
                        trim_standalone(&mut instructions);
                    }
                    instructions.push(Instruction::Comment);
                }
                Token::Delimiters(od, cd, standalone) => {
                    if standalone {
                        trim_standalone(&mut instructions);
                    }
                    reader.set_delimiters(od, cd);
                    instructions.push(Instruction::DelimiterChange(od.to_owned(), cd.to_owned()));
                }
            }
        }
        if !open.is_empty() {
            return Err(Error::UnexpectedEnd);
        }
        tracing::debug!(instructions = instructions.len(), "parsed template");
        Ok(Template {
            instructions,
            flags,
        })
    }

    pub fn render(&self, document: &dyn Node) -> Result<String, Error> {
        render::render(self, document, None)
    }

    pub fn render_with_partials(
        &self,
        document: &dyn Node,
        partials: &dyn TemplateStore,
    ) -> Result<String, Error> {
        render::render(self, document, Some(partials))
    }

    /// Renders fully, then writes the result in one call. Nothing is
    /// written when rendering fails.
    pub fn render_to(&self, output: &mut dyn io::Write, document: &dyn Node) -> Result<(), Error> {
        render::render_to(self, output, document, None)
    }

    pub fn render_to_with_partials(
        &self,
        output: &mut dyn io::Write,
        document: &dyn Node,
        partials: &dyn TemplateStore,
    ) -> Result<(), Error> {
        render::render_to(self, output, document, Some(partials))
    }
}

fn open_section(
    instructions: &mut Vec<Instruction>,
    open: &mut Vec<(String, usize)>,
    name: &str,
    inverted: bool,
    standalone: bool,
    flags: Extensions,
) -> Result<(), Error> {
    if standalone {
        trim_standalone(instructions);
    }
    if open.len() == MAX_SECTION_DEPTH {
        return Err(Error::TooDeep);
    }
    let (key, cond) = split_cond(name, flags);
    let (key, object_iter) = if cond.is_none() {
        split_object_iter(key, flags)
    } else {
        (key, false)
    };
    open.push((name.to_owned(), instructions.len()));
    instructions.push(Instruction::SectionOpen {
        path: parse_path(key, flags),
        inverted,
        cond,
        object_iter,
        close: usize::MAX,
    });
    Ok(())
}

// `name.*` iterates the members of the object under `name`, `.*` those
// of the current scope
fn split_object_iter(key: &str, flags: Extensions) -> (&str, bool) {
    if !flags.contains(Extensions::OBJECT_ITER) {
        return (key, false);
    }
    match key.strip_suffix(".*") {
        Some("") => (".", true),
        Some(stripped) => (stripped, true),
        None => (key, false),
    }
}

// a standalone tag owns its line: the blanks before it belong to the
// preceding literal and are dropped along with the tag
fn trim_standalone(instructions: &mut Vec<Instruction>) {
    if let Some(Instruction::Literal(text)) = instructions.last_mut() {
        let end = text.trim_end_matches([' ', '\t']).len();
        text.truncate(end);
        if text.is_empty() {
            instructions.pop();
        }
    }
}

/// Source of partial template text, by name.
pub trait TemplateStore {
    fn get(&self, name: &str) -> Option<&str>;
}

/// In-memory template registry. Templates added to the map can refer to
/// each other as partials and are rendered by name.
#[derive(Default)]
pub struct TemplateMap {
    templates: HashMap<String, String>,
    flags: Extensions,
}

impl TemplateMap {
    pub fn new(flags: Extensions) -> Self {
        TemplateMap {
            templates: HashMap::new(),
            flags,
        }
    }

    pub fn insert(&mut self, name: &str, input: &str) {
        self.templates.insert(name.to_owned(), input.to_owned());
    }

    pub fn render(&self, name: &str, document: &dyn Node) -> Result<String, Error> {
        let input = self.templates.get(name).ok_or(Error::ItemNotFound)?;
        let template = Template::parse(input, self.flags)?;
        template.render_with_partials(document, self)
    }
}

impl TemplateStore for TemplateMap {
    fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }
}
