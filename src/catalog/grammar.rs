use winnow::ascii::{digit1, space0, space1, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, opt, repeat, separated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::chamber::{SEPARATOR, WILDCARD};
use crate::{Rule, Settings, ToolInfo, ToolRuleGroup, Value};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn group_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
    })
    .parse_next(input)
}

// -- Values -----------------------------------------------------------------

/// Quoted text up to the closing quote on the same line. No escapes.
fn string_literal(input: &mut &str) -> ModalResult<String> {
    delimited(
        '"',
        take_while(0.., |c: char| c != '"' && c != '\n'),
        cut_err('"').context(expected("closing quote")),
    )
    .map(str::to_owned)
    .parse_next(input)
}

/// Optionally signed integer, or a float when a fraction follows.
fn number(input: &mut &str) -> ModalResult<Value> {
    let text = (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .parse_next(input)?;
    let parsed = if text.contains('.') {
        text.parse().ok().map(Value::Float)
    } else {
        text.parse().ok().map(Value::Int)
    };
    parsed.ok_or_else(|| ErrMode::from_input(input).cut())
}

fn list_literal(input: &mut &str) -> ModalResult<Value> {
    let items: Vec<Value> = delimited(
        '[',
        separated(0.., value, (ws, ',')),
        (ws, cut_err(']')),
    )
    .parse_next(input)?;
    Ok(Value::List(items))
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        list_literal,
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        number,
    ))
    .context(expected("value"))
    .parse_next(input)
}

// -- Tools ------------------------------------------------------------------

fn tool(input: &mut &str) -> ModalResult<ToolInfo> {
    let token = take_while(1.., |c: char| !c.is_whitespace() && c != ',').parse_next(input)?;
    Ok(match token.split_once(SEPARATOR) {
        Some((tool_id, chamber)) if !chamber.is_empty() && chamber != WILDCARD => {
            ToolInfo::new(tool_id, chamber)
        }
        Some((tool_id, _)) => ToolInfo::any_chamber(tool_id),
        None => ToolInfo::any_chamber(token),
    })
}

fn tools_line(input: &mut &str) -> ModalResult<Vec<ToolInfo>> {
    (ws, "tools", space0, ':', space0).parse_next(input)?;
    cut_err(separated(1.., tool, (space0, ',', space0)))
        .context(expected("tool list"))
        .parse_next(input)
}

// -- Rules ------------------------------------------------------------------

fn lot_types(input: &mut &str) -> ModalResult<Vec<String>> {
    let items: Vec<&str> = delimited(
        '[',
        separated(0.., take_while(1.., |c: char| c != ',' && c != ']'), ','),
        cut_err(']'),
    )
    .parse_next(input)?;
    Ok(items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect())
}

fn setting(input: &mut &str) -> ModalResult<(String, Value)> {
    ws.parse_next(input)?;
    let key = ident.parse_next(input)?;
    (space0, '=').parse_next(input)?;
    let val = cut_err(value).parse_next(input)?;
    Ok((key.to_owned(), val))
}

fn rule_def(input: &mut &str) -> ModalResult<Rule> {
    (ws, "rule", space1).parse_next(input)?;
    let rule_type = cut_err(ident)
        .context(expected("rule type"))
        .parse_next(input)?;
    space0.parse_next(input)?;
    let lots = cut_err(lot_types)
        .context(expected("lot type list"))
        .parse_next(input)?;

    let mut rule = Rule::new(rule_type).lot_types(lots);
    if opt((space0, ':')).parse_next(input)?.is_some() {
        let entries: Vec<(String, Value)> = repeat(0.., setting).parse_next(input)?;
        rule = rule.settings(entries.into_iter().collect::<Settings>());
    }
    Ok(rule)
}

// -- Groups -----------------------------------------------------------------

fn group_def(input: &mut &str) -> ModalResult<ToolRuleGroup> {
    (ws, "group", space1).parse_next(input)?;
    let name = cut_err(group_name)
        .context(expected("group name"))
        .parse_next(input)?;
    (space0, cut_err(':')).parse_next(input)?;

    let tools = opt(tools_line).parse_next(input)?.unwrap_or_default();
    let rules: Vec<Rule> = repeat(0.., rule_def).parse_next(input)?;

    let group = tools
        .into_iter()
        .fold(ToolRuleGroup::new(name), ToolRuleGroup::tool);
    Ok(rules.into_iter().fold(group, ToolRuleGroup::rule))
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_catalog(input: &mut &str) -> ModalResult<Vec<ToolRuleGroup>> {
    let groups = repeat(0.., group_def).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(groups)
}
