//! Translation-unit simulator for generated headers
//!
//! Evaluates the directive subset export headers use (`#ifdef`, `#ifndef`,
//! `#if`, `#elif`, `#else`, `#endif`, `#define`, `#undef`) against a
//! [`DefineSet`], then expands object-like macros. Any other directive in an
//! active group is an error, except `#pragma` and `#line` which are ignored. This is enough to check a header on
//! disk against the resolver without invoking a compiler.

use crate::build_config::{BuildConfig, BuildMode, CompilationRole, DefineSet};
use crate::composer::{compose, Decoration};
use crate::error::{Result, VisgenError};
use crate::variant::LibraryVariant;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*"|[A-Za-z_][A-Za-z0-9_]*"#).expect("valid token regex")
    })
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    parent_active: bool,
    taken: bool,
    active: bool,
}

/// Macro state of one translation unit
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    macros: BTreeMap<String, String>,
    conflicts: Vec<String>,
    includes: usize,
}

impl TranslationUnit {
    /// Start a unit with the command-line definitions in `defines`
    pub fn new(defines: &DefineSet) -> Self {
        let mut unit = Self::default();
        for (name, value) in defines.iter() {
            unit.macros
                .insert(name.to_string(), value.unwrap_or("1").to_string());
        }
        unit
    }

    /// Process `text` as if it were `#include`d at this point
    pub fn include(&mut self, text: &str) -> Result<()> {
        self.includes += 1;
        let mut stack: Vec<Frame> = Vec::new();
        let mut in_comment = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comments(raw, &mut in_comment);
            let trimmed = line.trim_start();
            let Some(directive) = trimmed.strip_prefix('#') else {
                continue;
            };
            let directive = directive.trim_start();
            let (keyword, rest) = match directive.find(char::is_whitespace) {
                Some(pos) => (&directive[..pos], directive[pos..].trim()),
                None => (directive, ""),
            };
            let active = stack.last().map_or(true, |f| f.active);

            match keyword {
                "ifdef" | "ifndef" => {
                    let name = single_name(rest, line_no)?;
                    let defined = self.macros.contains_key(name);
                    let cond = if keyword == "ifdef" { defined } else { !defined };
                    stack.push(Frame {
                        parent_active: active,
                        taken: cond,
                        active: active && cond,
                    });
                }
                "if" => {
                    let cond = active && self.eval_condition(rest, line_no)?;
                    stack.push(Frame {
                        parent_active: active,
                        taken: cond,
                        active: active && cond,
                    });
                }
                "elif" => {
                    let frame = *stack.last().ok_or_else(|| unbalanced(line_no, "#elif"))?;
                    let cond = frame.parent_active
                        && !frame.taken
                        && self.eval_condition(rest, line_no)?;
                    if let Some(top) = stack.last_mut() {
                        top.active = cond;
                        top.taken = frame.taken || cond;
                    }
                }
                "else" => {
                    let frame = stack.last_mut().ok_or_else(|| unbalanced(line_no, "#else"))?;
                    frame.active = frame.parent_active && !frame.taken;
                    frame.taken = true;
                }
                "endif" => {
                    stack.pop().ok_or_else(|| unbalanced(line_no, "#endif"))?;
                }
                "define" if active => self.define(rest, line_no)?,
                "undef" if active => {
                    let name = single_name(rest, line_no)?;
                    self.macros.remove(name);
                }
                "error" if active => {
                    return Err(VisgenError::Preprocess {
                        line: line_no,
                        message: format!("#error {}", rest),
                    });
                }
                "define" | "undef" | "error" | "pragma" | "line" | "" => {}
                _ if !active => {}
                other => {
                    return Err(VisgenError::Preprocess {
                        line: line_no,
                        message: format!("unsupported directive #{}", other),
                    });
                }
            }
        }

        if !stack.is_empty() {
            return Err(VisgenError::Preprocess {
                line: text.lines().count(),
                message: format!("{} unterminated conditional(s)", stack.len()),
            });
        }
        Ok(())
    }

    fn define(&mut self, rest: &str, line_no: usize) -> Result<()> {
        let name_end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        if name.is_empty() {
            return Err(VisgenError::Preprocess {
                line: line_no,
                message: "#define without a macro name".to_string(),
            });
        }
        if rest[name_end..].starts_with('(') {
            return Err(VisgenError::Preprocess {
                line: line_no,
                message: format!("function-like macro {} is not supported", name),
            });
        }
        let body = normalize(&rest[name_end..]);
        if let Some(previous) = self.macros.get(name) {
            if *previous != body {
                tracing::warn!(name, previous = %previous, body = %body, "conflicting redefinition");
                self.conflicts.push(name.to_string());
            }
        }
        self.macros.insert(name.to_string(), body);
        Ok(())
    }

    fn eval_condition(&self, expr: &str, line_no: usize) -> Result<bool> {
        let expr = expr.trim();
        if let Some(inner) = expr.strip_prefix('!') {
            return Ok(!self.eval_condition(inner, line_no)?);
        }
        if let Some(name) = expr.strip_prefix("defined") {
            let name = name.trim().trim_start_matches('(').trim_end_matches(')').trim();
            return Ok(self.macros.contains_key(single_name(name, line_no)?));
        }
        if let Ok(value) = expr.parse::<i64>() {
            return Ok(value != 0);
        }
        match self.expand(expr).and_then(|v| v.parse::<i64>().ok()) {
            Some(value) => Ok(value != 0),
            None => Err(VisgenError::Preprocess {
                line: line_no,
                message: format!("unsupported #if expression: {}", expr),
            }),
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Fully expanded, whitespace-normalized body of `name`
    pub fn expand(&self, name: &str) -> Option<String> {
        let body = self.macros.get(name)?;
        let mut hidden = HashSet::new();
        hidden.insert(name.to_string());
        Some(normalize(&self.expand_text(body, &mut hidden)))
    }

    fn expand_text(&self, text: &str, hidden: &mut HashSet<String>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in token_regex().find_iter(text) {
            out.push_str(&text[last..token.start()]);
            last = token.end();
            let word = token.as_str();
            match self.macros.get(word) {
                Some(body) if !word.starts_with('"') && !hidden.contains(word) => {
                    hidden.insert(word.to_string());
                    let expanded = self.expand_text(body, hidden);
                    hidden.remove(word);
                    out.push(' ');
                    out.push_str(&expanded);
                    out.push(' ');
                }
                _ => out.push_str(word),
            }
        }
        out.push_str(&text[last..]);
        out
    }

    /// Macros whose redefinition changed their body
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn include_count(&self) -> usize {
        self.includes
    }

    pub fn macros(&self) -> &BTreeMap<String, String> {
        &self.macros
    }
}

fn strip_comments(line: &str, in_comment: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if *in_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                *in_comment = false;
                out.push(' ');
            }
            continue;
        }
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => return out,
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                *in_comment = true;
            }
            _ => out.push(c),
        }
    }
    out
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn single_name(rest: &str, line_no: usize) -> Result<&str> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(name), None) => Ok(name),
        _ => Err(VisgenError::Preprocess {
            line: line_no,
            message: format!("expected a single macro name, got {:?}", rest),
        }),
    }
}

fn unbalanced(line: usize, directive: &str) -> VisgenError {
    VisgenError::Preprocess {
        line,
        message: format!("{} without matching #if", directive),
    }
}

/// Expanded decoration macros read back from a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub export: Option<String>,
    pub no_export: Option<String>,
    pub deprecated: Option<String>,
    pub deprecated_export: Option<String>,
    pub deprecated_no_export: Option<String>,
}

impl Resolution {
    pub fn from_unit(variant: &LibraryVariant, unit: &TranslationUnit) -> Self {
        let get = |d: Decoration| unit.expand(variant.macro_name(d));
        Self {
            export: get(Decoration::Export),
            no_export: get(Decoration::NoExport),
            deprecated: get(Decoration::Deprecated),
            deprecated_export: get(Decoration::DeprecatedExport),
            deprecated_no_export: get(Decoration::DeprecatedNoExport),
        }
    }

    pub fn get(&self, decoration: Decoration) -> Option<&str> {
        match decoration {
            Decoration::Export => self.export.as_deref(),
            Decoration::NoExport => self.no_export.as_deref(),
            Decoration::Deprecated => self.deprecated.as_deref(),
            Decoration::DeprecatedExport => self.deprecated_export.as_deref(),
            Decoration::DeprecatedNoExport => self.deprecated_no_export.as_deref(),
        }
    }
}

/// A decoration whose header expansion disagrees with the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub config: BuildConfig,
    pub macro_name: String,
    pub expected: String,
    pub actual: Option<String>,
}

/// Defines a unit would see for `config` under `variant`
pub fn defines_for(variant: &LibraryVariant, config: BuildConfig) -> DefineSet {
    let mut defines = DefineSet::new();
    if config.mode == BuildMode::Static {
        defines.define(variant.static_define());
    }
    if config.role == CompilationRole::Building {
        defines.define(variant.exports_define());
    }
    defines
}

/// Check `text` against the resolver for every configuration.
///
/// Each configuration includes the header twice; a second inclusion that
/// changes any macro is an error rather than a mismatch.
pub fn verify_header(
    variant: &LibraryVariant,
    text: &str,
) -> Result<Vec<Mismatch>> {
    let mut mismatches = Vec::new();
    for requested in BuildConfig::all() {
        let defines = defines_for(variant, requested);
        let config = BuildConfig::resolve(variant, &defines);

        let mut unit = TranslationUnit::new(&defines);
        unit.include(text)?;
        let first = unit.macros().clone();
        unit.include(text)?;
        if unit.macros() != &first || !unit.conflicts().is_empty() {
            return Err(VisgenError::Preprocess {
                line: 0,
                message: format!(
                    "second inclusion changed macro definitions ({})",
                    unit.conflicts().join(", ")
                ),
            });
        }

        let resolution = Resolution::from_unit(variant, &unit);
        for decoration in Decoration::ALL {
            let expected = compose(decoration, config).render();
            let actual = resolution.get(decoration);
            if actual != Some(expected.as_str()) {
                mismatches.push(Mismatch {
                    config,
                    macro_name: variant.macro_name(decoration).to_string(),
                    expected,
                    actual: actual.map(str::to_string),
                });
            }
        }
    }
    Ok(mismatches)
}
