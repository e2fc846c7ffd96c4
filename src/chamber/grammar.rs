use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, eof, opt, repeat, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{any, rest, take_till};

use super::WILDCARD;

// -- Recipe scanning --------------------------------------------------------

fn bracket<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited('{', take_till(0.., '}'), '}').parse_next(input)
}

/// Contents of every well-formed `{...}` segment, in source order.
/// Text outside brackets, including a dangling `{`, is skipped.
fn bracket_contents<'i>(input: &mut &'i str) -> ModalResult<Vec<&'i str>> {
    let pieces: Vec<Option<&'i str>> =
        repeat(0.., alt((bracket.map(Some), any.value(None)))).parse_next(input)?;
    Ok(pieces.into_iter().flatten().collect())
}

// -- Bracket contents -------------------------------------------------------

fn token_list(input: &mut &str) -> ModalResult<Vec<String>> {
    let list = terminated(delimited('(', take_till(0.., ')'), ')'), (multispace0, eof))
        .parse_next(input)?;
    Ok(list
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect())
}

fn char_list(input: &mut &str) -> ModalResult<Vec<String>> {
    let chars = rest.parse_next(input)?;
    Ok(chars
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(String::from)
        .collect())
}

/// The OR-set of one bracket: `c` prefix stripped, then wildcard, token list or
/// character enumeration.
fn or_set(input: &mut &str) -> ModalResult<Vec<String>> {
    multispace0.parse_next(input)?;
    opt('c').parse_next(input)?;
    multispace0.parse_next(input)?;
    alt((
        eof.map(|_| vec![WILDCARD.to_owned()]),
        token_list,
        char_list,
    ))
    .parse_next(input)
}

// -- Entry point ------------------------------------------------------------

pub(crate) fn parse_brackets(recipe_id: &str) -> Vec<Vec<String>> {
    let contents = bracket_contents.parse(recipe_id).unwrap_or_default();
    contents
        .into_iter()
        .map(|content| or_set.parse(content).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_brackets() {
        assert!(parse_brackets("ETCH-MAIN-01").is_empty());
        assert!(parse_brackets("").is_empty());
    }

    #[test]
    fn empty_bracket_is_wildcard() {
        assert_eq!(parse_brackets("R-{c}"), vec![vec!["%%"]]);
        assert_eq!(parse_brackets("R-{}"), vec![vec!["%%"]]);
        assert_eq!(parse_brackets("R-{ c }"), vec![vec!["%%"]]);
    }

    #[test]
    fn character_enumeration() {
        assert_eq!(parse_brackets("R-{cEF}"), vec![vec!["E", "F"]]);
        assert_eq!(parse_brackets("R-{c134}"), vec![vec!["1", "3", "4"]]);
        assert_eq!(parse_brackets("R-{AB}"), vec![vec!["A", "B"]]);
    }

    #[test]
    fn only_one_c_prefix_is_stripped() {
        assert_eq!(parse_brackets("{ccD}"), vec![vec!["c", "D"]]);
    }

    #[test]
    fn token_list_trimmed_and_filtered() {
        assert_eq!(
            parse_brackets("R-{c(PM1; PM2;;PM3 )}"),
            vec![vec!["PM1", "PM2", "PM3"]]
        );
    }

    #[test]
    fn empty_token_list_is_empty_set() {
        assert_eq!(parse_brackets("R-{c()}"), vec![Vec::<String>::new()]);
    }

    #[test]
    fn unclosed_paren_falls_back_to_characters() {
        assert_eq!(parse_brackets("{c(ab}"), vec![vec!["(", "a", "b"]]);
    }

    #[test]
    fn multiple_brackets_in_source_order() {
        assert_eq!(
            parse_brackets("X{cEF}-Y{c134}-{c(A1;B2)}"),
            vec![vec!["E", "F"], vec!["1", "3", "4"], vec!["A1", "B2"]]
        );
    }

    #[test]
    fn dangling_open_brace_is_ignored() {
        assert!(parse_brackets("R-{cEF").is_empty());
        assert_eq!(parse_brackets("R-{cE}-{"), vec![vec!["E"]]);
    }
}
