//! Rhai expressions for computed columns.
//!
//! An expression is compiled once when the column is created. At evaluation
//! time only the identifiers that actually appear in the source are
//! resolved, so a computed column pulls just the sibling columns it names.

use regex::Regex;
use rhai::{AST, Dynamic, Engine, Scope};
use std::sync::OnceLock;

use crate::error::{EngineError, Result};
use crate::value::Value;

/// A compiled column expression.
#[derive(Clone, Debug)]
pub struct Expr {
    source: String,
    ast: AST,
    names: Vec<String>,
}

impl Expr {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifiers referenced by the expression, in first-use order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Wraps the Rhai engine used by every computed column.
pub struct ExprEngine {
    engine: Engine,
}

impl Default for ExprEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprEngine {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_expr_depths(64, 32);
        engine.set_max_operations(100_000);
        Self { engine }
    }

    pub fn compile(&self, source: &str) -> Result<Expr> {
        let source = source.trim();
        if source.is_empty() {
            return Err(EngineError::Compile("empty expression".to_string()));
        }
        let ast = self
            .engine
            .compile_expression(source)
            .map_err(|e| EngineError::Compile(e.to_string()))?;
        Ok(Expr {
            source: source.to_string(),
            ast,
            names: referenced_names(source),
        })
    }

    /// Evaluate `expr`, asking `lookup` for the value of each referenced
    /// name. Names the lookup does not know are left unbound.
    pub fn eval<F>(&self, expr: &Expr, mut lookup: F) -> Result<Value>
    where
        F: FnMut(&str) -> Result<Option<Value>>,
    {
        let mut scope = Scope::new();
        for name in &expr.names {
            if let Some(value) = lookup(name)? {
                scope.push_dynamic(name.as_str(), to_dynamic(&value));
            }
        }
        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &expr.ast)?;
        Ok(from_dynamic(result))
    }
}

fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier regex"))
}

fn referenced_names(source: &str) -> Vec<String> {
    let stripped = strip_string_literals(source);
    let mut names: Vec<String> = Vec::new();
    for m in ident_re().find_iter(&stripped) {
        // Skip the tail of numeric literals such as `1e5`.
        if m.start() > 0
            && stripped.as_bytes()[m.start() - 1].is_ascii_digit()
        {
            continue;
        }
        let name = m.as_str();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn strip_string_literals(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in script.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                out.push('"');
                continue;
            }
            out.push(' ');
        } else {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
        }
    }
    out
}

pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::None => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Int(n) => Dynamic::from(*n),
        Value::Float(f) => Dynamic::from(*f),
        Value::Str(s) => Dynamic::from(s.clone()),
        Value::Bytes(_) | Value::Date(_) => Dynamic::from(value.to_string()),
        Value::List(items) => Dynamic::from_array(items.iter().map(to_dynamic).collect()),
        Value::Map(map) => {
            let mut out = rhai::Map::new();
            for (k, v) in map {
                out.insert(k.as_str().into(), to_dynamic(v));
            }
            Dynamic::from_map(out)
        }
    }
}

pub fn from_dynamic(value: Dynamic) -> Value {
    if value.is_unit() {
        Value::None
    } else if let Ok(n) = value.as_int() {
        Value::Int(n)
    } else if let Ok(f) = value.as_float() {
        Value::Float(f)
    } else if let Ok(b) = value.as_bool() {
        Value::Bool(b)
    } else if value.is_string() {
        Value::Str(value.into_string().unwrap_or_default())
    } else if value.is_array() {
        let items = value.into_array().unwrap_or_default();
        Value::List(items.into_iter().map(from_dynamic).collect())
    } else if value.is_map() {
        let map = value.cast::<rhai::Map>();
        Value::Map(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), from_dynamic(v)))
                .collect(),
        )
    } else {
        Value::Str(value.to_string())
    }
}

/// The three parts of a regex column: `expr/search/replace`.
#[derive(Clone, Debug)]
pub struct RegexSpec {
    pub expr: Expr,
    pub search: Regex,
    pub replace: String,
}

impl RegexSpec {
    pub fn parse(engine: &ExprEngine, spec: &str) -> Result<Self> {
        let parts: Vec<&str> = spec.split('/').collect();
        let [expr, search, replace] = parts.as_slice() else {
            return Err(EngineError::RegexSpec(spec.to_string()));
        };
        Ok(Self {
            expr: engine.compile(expr)?,
            search: Regex::new(search)?,
            replace: replace.to_string(),
        })
    }
}

/// Apply `search` to `input` and expand `template` from the first match.
///
/// Returns `None` when the pattern does not match. Templates may use `\1`
/// or `\g<name>` as well as the native `${1}` form.
pub fn regex_transform(input: &str, search: &Regex, template: &str) -> Option<String> {
    let caps = search.captures(input)?;
    let mut out = String::new();
    caps.expand(&native_template(template), &mut out);
    Some(out)
}

fn backref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(\d+)|\\g<(\w+)>").expect("backref regex"))
}

fn native_template(template: &str) -> String {
    if !template.contains('\\') {
        return template.to_string();
    }
    let escaped = template.replace('$', "$$");
    backref_re()
        .replace_all(&escaped, |caps: &regex::Captures| {
            let group = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!("${{{}}}", group)
        })
        .into_owned()
}
