use std::fmt::{self, Display, Formatter};

use crate::Clause;
use crate::error::{RaterError, Result};

/// Binary AND/OR tree over requirement symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    // Produced only by an empty logic string: always satisfied.
    Free,
    Atom(String),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

impl Expression {
    fn make_and(left: Expression, right: Expression) -> Expression {
        Expression::And(Box::new(left), Box::new(right))
    }

    fn make_or(left: Expression, right: Expression) -> Expression {
        Expression::Or(Box::new(left), Box::new(right))
    }

    /// Flattens the tree into disjunctive normal form: each returned clause is
    /// one AND-only loadout, and the expression holds if any clause holds.
    pub fn to_clauses(&self) -> Vec<Clause> {
        match self {
            Expression::Free => vec![vec![]],
            Expression::Atom(symbol) => vec![vec![symbol.clone()]],
            Expression::And(left, right) => {
                let left_clauses = left.to_clauses();
                let right_clauses = right.to_clauses();
                let mut out = Vec::with_capacity(left_clauses.len() * right_clauses.len());
                for l in &left_clauses {
                    for r in &right_clauses {
                        let mut clause = l.clone();
                        clause.extend(r.iter().cloned());
                        out.push(clause);
                    }
                }
                out
            }
            Expression::Or(left, right) => {
                let mut out = left.to_clauses();
                out.extend(right.to_clauses());
                out
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Free => Ok(()),
            Expression::Atom(symbol) => write!(f, "{symbol}"),
            Expression::And(left, right) => write!(f, "({left} + {right})"),
            Expression::Or(left, right) => write!(f, "({left} | {right})"),
        }
    }
}

// Splits at every `+` or `|` outside of parentheses. The returned operators
// sit between consecutive tokens.
fn split_top_level(logic: &str) -> Result<(Vec<&str>, Vec<Operator>)> {
    let mut tokens: Vec<&str> = vec![];
    let mut operators: Vec<Operator> = vec![];
    let mut depth: i32 = 0;
    let mut token_start = 0;
    for (i, c) in logic.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(RaterError::malformed(logic, "unbalanced ')'"));
                }
            }
            '+' | '|' if depth == 0 => {
                tokens.push(logic[token_start..i].trim());
                operators.push(if c == '+' {
                    Operator::And
                } else {
                    Operator::Or
                });
                token_start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(RaterError::malformed(logic, "unbalanced '('"));
    }
    tokens.push(logic[token_start..].trim());
    Ok((tokens, operators))
}

fn parse_operand(logic: &str, token: &str) -> Result<Expression> {
    if token.is_empty() {
        return Err(RaterError::malformed(logic, "missing operand"));
    }
    if let Some(inner) = token.strip_prefix('(') {
        // e.g. "(((ITEM)))": drop one redundant pair and try again.
        let Some(inner) = inner.strip_suffix(')') else {
            return Err(RaterError::malformed(logic, "unexpected text after ')'"));
        };
        return parse_nonempty(inner);
    }
    if token.contains(['(', ')']) {
        return Err(RaterError::malformed(
            logic,
            &format!("unexpected parenthesis in symbol '{token}'"),
        ));
    }
    Ok(Expression::Atom(token.to_owned()))
}

fn parse_nonempty(logic: &str) -> Result<Expression> {
    let logic = logic.trim();
    let (tokens, operators) = split_top_level(logic)?;
    if operators.is_empty() {
        return parse_operand(logic, tokens[0]);
    }

    let mut operands = tokens
        .into_iter()
        .map(|token| parse_operand(logic, token))
        .collect::<Result<Vec<Expression>>>()?
        .into_iter();

    // AND binds tighter than OR: fold each run of `+` into a single term
    // first, then join the terms with `|`.
    let mut terms: Vec<Expression> = vec![];
    let Some(mut term) = operands.next() else {
        return Err(RaterError::malformed(logic, "missing operand"));
    };
    for (op, operand) in operators.into_iter().zip(operands) {
        match op {
            Operator::And => term = Expression::make_and(term, operand),
            Operator::Or => terms.push(std::mem::replace(&mut term, operand)),
        }
    }
    terms.push(term);

    let mut terms = terms.into_iter();
    let Some(first) = terms.next() else {
        return Err(RaterError::malformed(logic, "missing operand"));
    };
    Ok(terms.fold(first, Expression::make_or))
}

/// Parses an infix logic string using `+` (AND), `|` (OR) and parentheses.
/// An empty string is always satisfied.
pub fn parse_expression(logic: &str) -> Result<Expression> {
    if logic.trim().is_empty() {
        return Ok(Expression::Free);
    }
    parse_nonempty(logic)
}

pub fn compile_expression(logic: &str) -> Result<Vec<Clause>> {
    Ok(parse_expression(logic)?.to_clauses())
}
