// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Predicate expressions over event fields.
//!
//! Backs WHERE clauses in the in-memory store and the built-in rule engine
//! that evaluates `<RuleSelector>` expressions.
//!
//! ```text
//! expr       := and (("OR" | "||") and)*
//! and        := unary (("AND" | "&&") unary)*
//! unary      := ("NOT" | "!") unary | "(" expr ")" | comparison
//! comparison := FIELD OP LITERAL
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::EventRecord;

/// Name of the built-in rule engine.
pub const SIMPLE_RULE_ENGINE: &str = "simple";

#[allow(clippy::expect_used)]
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:(?P<num>-?\d+(?:\.\d+)?)|(?P<str>'[^']*'|"[^"]*")|(?P<op>==|!=|<>|<=|>=|&&|\|\||=|<|>|!|\(|\))|(?P<word>[A-Za-z_][A-Za-z0-9_]*))"#,
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Str(String),
    Op(String),
    Word(String),
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = expr;
    while !rest.trim().is_empty() {
        let caps = TOKEN_RE
            .captures(rest)
            .ok_or_else(|| invalid(expr, &format!("unexpected input at '{}'", rest.trim())))?;
        let token = if let Some(m) = caps.name("num") {
            let n = m
                .as_str()
                .parse::<f64>()
                .map_err(|e| invalid(expr, &e.to_string()))?;
            Token::Num(n)
        } else if let Some(m) = caps.name("str") {
            let s = m.as_str();
            Token::Str(s[1..s.len() - 1].to_string())
        } else if let Some(m) = caps.name("op") {
            Token::Op(m.as_str().to_string())
        } else if let Some(m) = caps.name("word") {
            Token::Word(m.as_str().to_string())
        } else {
            return Err(invalid(expr, "unrecognized token"));
        };
        tokens.push(token);
        rest = &rest[caps.get(0).map_or(rest.len(), |m| m.end())..];
    }
    Ok(tokens)
}

fn invalid(expr: &str, reason: &str) -> Error {
    Error::Validation(format!("invalid selector '{}': {}", expr, reason))
}

/// Event attribute addressable from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AccountId,
    DeviceId,
    Timestamp,
    StatusCode,
    Latitude,
    Longitude,
    SpeedKph,
    Heading,
    Address,
    OdometerKm,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        let field = match name.to_ascii_lowercase().as_str() {
            "accountid" => Field::AccountId,
            "deviceid" => Field::DeviceId,
            "timestamp" => Field::Timestamp,
            "statuscode" => Field::StatusCode,
            "latitude" => Field::Latitude,
            "longitude" => Field::Longitude,
            "speedkph" => Field::SpeedKph,
            "heading" => Field::Heading,
            "address" => Field::Address,
            "odometerkm" => Field::OdometerKm,
            _ => return None,
        };
        Some(field)
    }

    fn value(&self, ev: &EventRecord) -> Literal {
        match self {
            Field::AccountId => Literal::Str(ev.account_id.clone()),
            Field::DeviceId => Literal::Str(ev.device_id.clone()),
            Field::Timestamp => Literal::Num(ev.timestamp as f64),
            Field::StatusCode => Literal::Num(f64::from(ev.status_code)),
            Field::Latitude => Literal::Num(ev.latitude),
            Field::Longitude => Literal::Num(ev.longitude),
            Field::SpeedKph => Literal::Num(ev.speed_kph),
            Field::Heading => Literal::Num(ev.heading),
            Field::Address => Literal::Str(ev.address.clone()),
            Field::OdometerKm => Literal::Num(ev.odometer_km),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Num(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn parse(op: &str) -> Option<Self> {
        let op = match op {
            "=" | "==" => CmpOp::Eq,
            "!=" | "<>" => CmpOp::Ne,
            "<" => CmpOp::Lt,
            "<=" => CmpOp::Le,
            ">" => CmpOp::Gt,
            ">=" => CmpOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    fn apply(&self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Eq => ord == Equal,
            CmpOp::Ne => ord != Equal,
            CmpOp::Lt => ord == Less,
            CmpOp::Le => ord != Greater,
            CmpOp::Gt => ord == Greater,
            CmpOp::Ge => ord != Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Compare(Field, CmpOp, Literal),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    fn matches(&self, ev: &EventRecord) -> bool {
        match self {
            Expr::Compare(field, op, lit) => {
                let ord = match (field.value(ev), lit) {
                    (Literal::Num(a), Literal::Num(b)) => a.partial_cmp(b),
                    (Literal::Str(a), Literal::Str(b)) => Some(a.as_str().cmp(b.as_str())),
                    (Literal::Num(a), Literal::Str(b)) => {
                        b.parse::<f64>().ok().and_then(|b| a.partial_cmp(&b))
                    }
                    (Literal::Str(a), Literal::Num(b)) => {
                        Some(a.as_str().cmp(crate::column::format_number(*b).as_str()))
                    }
                };
                ord.is_some_and(|o| op.apply(o))
            }
            Expr::And(a, b) => a.matches(ev) && b.matches(ev),
            Expr::Or(a, b) => a.matches(ev) || b.matches(ev),
            Expr::Not(p) => !p.matches(ev),
        }
    }
}

/// A parsed predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(Expr);

impl Predicate {
    /// Parse an expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(invalid(expr, "empty expression"));
        }
        let mut parser = Parser {
            expr,
            tokens,
            pos: 0,
        };
        let root = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(invalid(expr, "trailing input"));
        }
        Ok(Predicate(root))
    }

    pub fn matches(&self, ev: &EventRecord) -> bool {
        self.0.matches(ev)
    }
}

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_keyword(&self, ops: &[&str], word: &str) -> bool {
        match self.peek() {
            Some(Token::Op(op)) => ops.contains(&op.as_str()),
            Some(Token::Word(w)) => w.eq_ignore_ascii_case(word),
            _ => false,
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.at_keyword(&["||"], "OR") {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while self.at_keyword(&["&&"], "AND") {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.at_keyword(&["!"], "NOT") {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        if matches!(self.peek(), Some(Token::Op(op)) if op == "(") {
            self.pos += 1;
            let inner = self.parse_or()?;
            return match self.next() {
                Some(Token::Op(op)) if op == ")" => Ok(inner),
                _ => Err(invalid(self.expr, "missing ')'")),
            };
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let field = match self.next() {
            Some(Token::Word(name)) => Field::parse(&name)
                .ok_or_else(|| invalid(self.expr, &format!("unknown field '{}'", name)))?,
            _ => return Err(invalid(self.expr, "expected field name")),
        };
        let op = match self.next() {
            Some(Token::Op(op)) => {
                CmpOp::parse(&op).ok_or_else(|| invalid(self.expr, "expected comparison"))?
            }
            _ => return Err(invalid(self.expr, "expected comparison")),
        };
        let lit = match self.next() {
            Some(Token::Num(n)) => Literal::Num(n),
            Some(Token::Str(s)) => Literal::Str(s),
            _ => return Err(invalid(self.expr, "expected literal")),
        };
        Ok(Expr::Compare(field, op, lit))
    }
}

/// Evaluates rule selector expressions against events.
pub trait RuleEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Check selector syntax.
    fn validate(&self, selector: &str) -> Result<()>;

    fn is_match(&self, selector: &str, ev: &EventRecord) -> Result<bool>;
}

/// Rule engine backed by [`Predicate`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleRuleEngine;

impl RuleEngine for SimpleRuleEngine {
    fn name(&self) -> &str {
        SIMPLE_RULE_ENGINE
    }

    fn validate(&self, selector: &str) -> Result<()> {
        Predicate::parse(selector).map(|_| ())
    }

    fn is_match(&self, selector: &str, ev: &EventRecord) -> Result<bool> {
        Ok(Predicate::parse(selector)?.matches(ev))
    }
}

/// Rule engine registered under `name`, if any.
pub fn rule_engine_for(name: &str) -> Option<std::sync::Arc<dyn RuleEngine>> {
    if name.eq_ignore_ascii_case(SIMPLE_RULE_ENGINE) {
        Some(std::sync::Arc::new(SimpleRuleEngine))
    } else {
        None
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
