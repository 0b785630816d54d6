use std::collections::HashMap;

use crate::errors::StatementError;

/// 一次解析会话内累积的用户标量。重复赋值直接覆盖旧值（后写者胜出）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    values: HashMap<String, f64>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入标量，返回被覆盖的旧值。
    pub fn set(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Subtract,
}

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Operator(Operator),
    Value(String),
}

/// 数值字面量解析，只接受有限值，因此 `inf`、`nan` 之类会落到符号查找。
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// 求值字段表达式：字面量，或由 `+`/`-` 连接的字面量与符号，严格从左到右计算。
///
/// 首个数值在没有待定运算符时直接替换累加器，因此 `- a + 1` 与 `0 - a + 1` 等价，
/// 末尾悬空的运算符被忽略。
pub fn evaluate(raw: &str, symbols: &SymbolTable) -> Result<f64, StatementError> {
    if let Some(value) = parse_number(raw) {
        return Ok(value);
    }

    let mut pending: Option<Operator> = None;
    let mut accumulator = 0.0;
    let mut has_value = false;

    for token in tokenize(raw) {
        match token {
            ExprToken::Operator(op) => pending = Some(op),
            ExprToken::Value(text) => {
                let value = match parse_number(&text) {
                    Some(value) => value,
                    None => symbols
                        .get(&text)
                        .ok_or_else(|| StatementError::UndefinedSymbol { name: text.clone() })?,
                };
                accumulator = match pending.take() {
                    None => value,
                    Some(Operator::Add) => accumulator + value,
                    Some(Operator::Subtract) => accumulator - value,
                };
                has_value = true;
            }
        }
    }

    if has_value {
        Ok(accumulator)
    } else {
        Err(StatementError::MalformedExpression {
            expression: raw.trim().to_string(),
        })
    }
}

fn tokenize(raw: &str) -> Vec<ExprToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in raw.chars() {
        match ch {
            '+' | '-' => {
                if !current.is_empty() {
                    tokens.push(ExprToken::Value(std::mem::take(&mut current)));
                }
                let op = if ch == '+' {
                    Operator::Add
                } else {
                    Operator::Subtract
                };
                tokens.push(ExprToken::Operator(op));
            }
            c if c.is_whitespace() => continue,
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(ExprToken::Value(current));
    }
    tokens
}
