//! Regex search over displayed values, with wraparound.

use regex::{Regex, RegexBuilder};

use crate::column::Column;
use crate::env::Env;
use crate::error::{Result, TabscopeError};
use crate::sheet::Sheet;

/// The last search on a sheet, reused by next/previous match.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub regex: Option<Regex>,
    pub columns: Vec<Column>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Matching row indices in scan order.
    pub matches: Vec<usize>,
    /// Whether the scan had to wrap past the end to find anything.
    pub wrapped: bool,
}

/// Search `sheet` for rows where any target column's displayed value
/// matches.
///
/// A new `pattern` or `columns` replaces the stored one; omitting either,
/// or giving an empty pattern, reuses what is stored. The scan starts after the cursor and wraps. With
/// `move_cursor`, the cursor goes to the first match and the scan stops.
pub fn search_regex(
    sheet: &mut Sheet,
    pattern: Option<&str>,
    columns: Option<Vec<Column>>,
    backward: bool,
    move_cursor: bool,
    env: &Env,
) -> Result<SearchOutcome> {
    if let Some(pattern) = pattern.filter(|p| !p.is_empty()) {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        sheet.search.regex = Some(regex);
    }
    if let Some(columns) = columns {
        sheet.search.columns = columns;
    }
    let regex = sheet
        .search
        .regex
        .clone()
        .ok_or_else(|| TabscopeError::user("no regex"))?;
    if sheet.search.columns.is_empty() {
        return Err(TabscopeError::user("no columns given"));
    }

    let n = sheet.rows.len();
    let cur = sheet.cursor_row.min(n);
    let (first, second): (Vec<usize>, Vec<usize>) = match backward {
        false => ((cur + 1..n).collect(), (0..(cur + 1).min(n)).collect()),
        true => ((0..cur).rev().collect(), (cur..n).rev().collect()),
    };

    let mut outcome = SearchOutcome::default();
    for (pass, range) in [first, second].into_iter().enumerate() {
        for i in range {
            if !row_matches(sheet, i, &regex, env) {
                continue;
            }
            if move_cursor {
                sheet.cursor_row = i;
                outcome.matches.push(i);
                outcome.wrapped = pass == 1;
                if outcome.wrapped {
                    env.status("search wrapped");
                }
                return Ok(outcome);
            }
            outcome.matches.push(i);
        }
    }

    if move_cursor {
        env.status(format!("no match for /{}/", regex.as_str()));
    } else {
        env.status(format!(
            "{} matches for /{}/",
            outcome.matches.len(),
            regex.as_str()
        ));
    }
    Ok(outcome)
}

fn row_matches(sheet: &Sheet, i: usize, regex: &Regex, env: &Env) -> bool {
    let row = &sheet.rows[i];
    sheet
        .search
        .columns
        .iter()
        .any(|col| regex.is_match(&col.display_text(row, env)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Accessor;
    use crate::row::Row;
    use crate::sheet::Source;
    use tabscope_engine::Value;

    fn names(values: &[&str]) -> Sheet {
        let rows = values.iter().map(|v| Row::list(vec![Value::from(*v)])).collect();
        Sheet::new("names", Source::None)
            .with_columns(vec![Column::new("name", Accessor::index(0))], 0)
            .with_rows(rows)
    }

    #[test]
    fn forward_search_is_case_insensitive() {
        let env = Env::default();
        let mut sheet = names(&["alpha", "Beta", "gamma", "beta"]);
        let cols = vec![sheet.columns[0].clone()];
        let found = search_regex(&mut sheet, Some("BETA"), Some(cols), false, true, &env).unwrap();
        assert_eq!(found.matches, [1]);
        assert_eq!(sheet.cursor_row, 1);

        let found = search_regex(&mut sheet, None, None, false, true, &env).unwrap();
        assert_eq!(found.matches, [3]);
        assert!(!found.wrapped);
    }

    #[test]
    fn backward_search_scans_towards_the_top() {
        let env = Env::default();
        let mut sheet = names(&["x", "y", "x", "y"]);
        sheet.cursor_row = 3;
        let cols = vec![sheet.columns[0].clone()];
        let found = search_regex(&mut sheet, Some("x"), Some(cols), true, true, &env).unwrap();
        assert_eq!(sheet.cursor_row, 2);
        assert!(!found.wrapped);
    }

    #[test]
    fn empty_pattern_reuses_the_stored_one() {
        let env = Env::default();
        let mut sheet = names(&["x", "y", "x", "y"]);
        let cols = vec![sheet.columns[0].clone()];
        search_regex(&mut sheet, Some("x"), Some(cols), false, true, &env).unwrap();
        assert_eq!(sheet.cursor_row, 2);
        let found = search_regex(&mut sheet, Some(""), None, false, true, &env).unwrap();
        assert_eq!(sheet.cursor_row, 0);
        assert!(found.wrapped);
        assert_eq!(sheet.search.regex.as_ref().map(|r| r.as_str()), Some("x"));
    }

    #[test]
    fn collecting_reports_the_count() {
        let env = Env::default();
        let mut sheet = names(&["ab", "cd", "abc"]);
        let cols = vec![sheet.columns[0].clone()];
        let found = search_regex(&mut sheet, Some("^ab"), Some(cols), false, false, &env).unwrap();
        assert_eq!(found.matches, [2, 0]);
        assert_eq!(sheet.cursor_row, 0);
        assert_eq!(env.status.latest().as_deref(), Some("2 matches for /^ab/"));
    }

    #[test]
    fn missing_pattern_or_columns_is_an_error() {
        let env = Env::default();
        let mut sheet = names(&["a"]);
        let err = search_regex(&mut sheet, None, None, false, true, &env).unwrap_err();
        assert_eq!(err.to_string(), "no regex");
        let err = search_regex(&mut sheet, Some("a"), None, false, true, &env).unwrap_err();
        assert_eq!(err.to_string(), "no columns given");
    }
}
