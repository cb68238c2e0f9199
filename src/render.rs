use std::cmp::Ordering;
use std::io;
use std::mem;

use crate::context::{Node, Resolved, Stack};
use crate::error::Error;
use crate::flags::Extensions;
use crate::path::{parse_path, CmpOp, Cond, Path};
use crate::template::{Instruction, Template, TemplateStore};

pub(crate) const MAX_PARTIAL_NESTING: usize = 256;

struct RenderContext<'d, 's> {
    stack: Stack<'d>,
    flags: Extensions,
    store: Option<&'s dyn TemplateStore>,
    depth: usize,
    out: String,
}

pub(crate) fn render(
    template: &Template,
    document: &dyn Node,
    store: Option<&dyn TemplateStore>,
) -> Result<String, Error> {
    tracing::debug!(flags = ?template.flags, "render");
    let mut ctx = RenderContext {
        stack: Stack::new(document),
        flags: template.flags,
        store,
        depth: 0,
        out: String::new(),
    };
    run(&mut ctx, &template.instructions, 0, template.instructions.len())?;
    Ok(ctx.out)
}

pub(crate) fn render_to(
    template: &Template,
    output: &mut dyn io::Write,
    document: &dyn Node,
    store: Option<&dyn TemplateStore>,
) -> Result<(), Error> {
    let text = render(template, document, store)?;
    output.write_all(text.as_bytes()).map_err(|error| {
        tracing::debug!(%error, "output write failed");
        Error::System
    })
}

fn run(
    ctx: &mut RenderContext<'_, '_>,
    instructions: &[Instruction],
    start: usize,
    end: usize,
) -> Result<(), Error> {
    let mut index = start;
    while index < end {
        match &instructions[index] {
            Instruction::Literal(text) => ctx.out.push_str(text),
            Instruction::Variable { path, escape, cond } => {
                variable(ctx, path, *escape, cond.as_ref())?;
            }
            Instruction::SectionOpen {
                path,
                inverted,
                cond,
                object_iter,
                close,
            } => {
                match cond {
                    Some(cond) => {
                        cond_section(ctx, instructions, index + 1, *close, path, *inverted, cond)?;
                    }
                    None => {
                        section(
                            ctx,
                            instructions,
                            index + 1,
                            *close,
                            path,
                            *inverted,
                            *object_iter,
                        )?;
                    }
                }
                index = *close;
            }
            Instruction::SectionClose | Instruction::Comment | Instruction::DelimiterChange(..) => {
            }
            Instruction::Partial { name, indent } => partial(ctx, name, indent)?,
        }
        index += 1;
    }
    Ok(())
}

fn variable(
    ctx: &mut RenderContext<'_, '_>,
    path: &Path,
    escape: bool,
    cond: Option<&Cond>,
) -> Result<(), Error> {
    let (raw, number) = match ctx.stack.resolve(path) {
        Resolved::Node(node) => match node.text() {
            Some(text) => (text, node.number()),
            // containers have no direct text form
            None => return Ok(()),
        },
        Resolved::Key(key) => (key.to_owned(), None),
        Resolved::NotFound => {
            if ctx.flags.contains(Extensions::ERROR_UNDEFINED) {
                tracing::debug!("undefined variable");
                return Err(Error::UndefinedTag);
            }
            return Ok(());
        }
    };
    if let Some(cond) = cond {
        let subject = if escape && ctx.flags.contains(Extensions::ESC_FIRST_CMP) {
            html_escape(&raw)
        } else {
            raw.clone()
        };
        if !eval_cond(&subject, number, cond) {
            return Ok(());
        }
    }
    if escape {
        ctx.out.push_str(&html_escape(&raw));
    } else {
        ctx.out.push_str(&raw);
    }
    Ok(())
}

fn cond_section(
    ctx: &mut RenderContext<'_, '_>,
    instructions: &[Instruction],
    start: usize,
    end: usize,
    path: &Path,
    inverted: bool,
    cond: &Cond,
) -> Result<(), Error> {
    let (held, scope) = match ctx.stack.resolve(path) {
        Resolved::Node(node) => {
            let held = node
                .text()
                .map_or(false, |text| eval_cond(&text, node.number(), cond));
            (held, Some(node))
        }
        Resolved::Key(key) => (eval_cond(key, None, cond), None),
        Resolved::NotFound => (false, None),
    };
    if !inverted && held {
        let len = ctx.stack.len();
        if let Some(node) = scope {
            ctx.stack.push(node);
        }
        let result = run(ctx, instructions, start, end);
        ctx.stack.truncate(len);
        result?;
    } else if inverted && !held {
        run(ctx, instructions, start, end)?;
    }
    Ok(())
}

fn section(
    ctx: &mut RenderContext<'_, '_>,
    instructions: &[Instruction],
    start: usize,
    end: usize,
    path: &Path,
    inverted: bool,
    object_iter: bool,
) -> Result<(), Error> {
    let node = match ctx.stack.resolve(path) {
        Resolved::Node(node) => node,
        Resolved::Key(key) => {
            // iteration keys behave as plain nonempty scalars
            if key.is_empty() == inverted {
                run(ctx, instructions, start, end)?;
            }
            return Ok(());
        }
        Resolved::NotFound => {
            if inverted {
                run(ctx, instructions, start, end)?;
            }
            return Ok(());
        }
    };
    if object_iter {
        return entries_section(ctx, instructions, start, end, node, inverted);
    }
    if let Some(count) = node.count() {
        if inverted {
            if count == 0 {
                run(ctx, instructions, start, end)?;
            }
            return Ok(());
        }
        for index in 0..count {
            let element = match node.at(index) {
                Some(element) => element,
                None => break,
            };
            let len = ctx.stack.len();
            ctx.stack.push(element);
            let result = run(ctx, instructions, start, end);
            ctx.stack.truncate(len);
            result?;
        }
        return Ok(());
    }
    if node.is_truthy() {
        if !inverted {
            let len = ctx.stack.len();
            ctx.stack.push(node);
            let result = run(ctx, instructions, start, end);
            ctx.stack.truncate(len);
            result?;
        }
    } else if inverted {
        run(ctx, instructions, start, end)?;
    }
    Ok(())
}

fn entries_section<'d>(
    ctx: &mut RenderContext<'d, '_>,
    instructions: &[Instruction],
    start: usize,
    end: usize,
    node: &'d dyn Node,
    inverted: bool,
) -> Result<(), Error> {
    if inverted {
        if node.entries().map_or(true, |list| list.is_empty()) {
            run(ctx, instructions, start, end)?;
        }
        return Ok(());
    }
    let entries = match node.entries() {
        Some(entries) => entries,
        None => return Ok(()),
    };
    for (key, value) in entries {
        let len = ctx.stack.len();
        ctx.stack.push_entry(key, value);
        let result = run(ctx, instructions, start, end);
        ctx.stack.truncate(len);
        result?;
    }
    Ok(())
}

fn partial(ctx: &mut RenderContext<'_, '_>, name: &str, indent: &str) -> Result<(), Error> {
    if ctx.depth == MAX_PARTIAL_NESTING {
        return Err(Error::TooMuchNesting);
    }
    let text = match lookup_partial(ctx, name) {
        Some(text) => text,
        None => return Err(Error::PartialNotFound),
    };
    tracing::debug!(name, depth = ctx.depth, "expanding partial");
    let template = Template::parse(&text, ctx.flags)?;
    ctx.depth += 1;
    let saved = mem::take(&mut ctx.out);
    let result = run(ctx, &template.instructions, 0, template.instructions.len());
    let body = mem::replace(&mut ctx.out, saved);
    ctx.depth -= 1;
    result?;
    if indent.is_empty() {
        ctx.out.push_str(&body);
    } else {
        for line in body.split_inclusive('\n') {
            ctx.out.push_str(indent);
            ctx.out.push_str(line);
        }
    }
    Ok(())
}

fn lookup_partial(ctx: &RenderContext<'_, '_>, name: &str) -> Option<String> {
    if ctx.flags.contains(Extensions::PARTIAL_DATA_FIRST) {
        data_partial(ctx, name).or_else(|| store_partial(ctx, name))
    } else {
        store_partial(ctx, name).or_else(|| data_partial(ctx, name))
    }
}

fn store_partial(ctx: &RenderContext<'_, '_>, name: &str) -> Option<String> {
    ctx.store
        .and_then(|store| store.get(name))
        .map(str::to_owned)
}

fn data_partial(ctx: &RenderContext<'_, '_>, name: &str) -> Option<String> {
    let path = parse_path(name, ctx.flags);
    match ctx.stack.resolve(&path) {
        Resolved::Node(node) => node.text(),
        Resolved::Key(key) => Some(key.to_owned()),
        Resolved::NotFound => None,
    }
}

fn eval_cond(subject: &str, number: Option<f64>, cond: &Cond) -> bool {
    let ordering = match (number, cond.literal.parse::<f64>()) {
        (Some(value), Ok(literal)) => value.partial_cmp(&literal),
        _ => Some(subject.cmp(cond.literal.as_str())),
    };
    let ordering = match ordering {
        Some(ordering) => ordering,
        // NaN compares with nothing
        None => return false,
    };
    match cond.op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
    }
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
