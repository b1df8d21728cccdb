//! Arithmetic expressions and single-variable equations
//!
//! A small recursive-descent parser produces an [`Expr`] tree. Evaluation is
//! plain `f64` arithmetic; solving isolates the target variable when the
//! equation is linear in it and falls back to a numeric root search otherwise.

use std::collections::HashMap;
use std::fmt;

use super::{format_number, CalcResult};

/// Deepest expression tree accepted; evaluation and solving recurse on it
const MAX_DEPTH: usize = 256;
/// Longest token stream accepted
const MAX_TOKENS: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Func::Sqrt,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "exp" => Func::Exp,
            "log" | "ln" => Func::Ln,
            "abs" => Func::Abs,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Func::Sqrt => "sqrt",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Ln => "log",
            Func::Abs => "Abs",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sqrt => x.sqrt(),
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Ln => x.ln(),
            Func::Abs => x.abs(),
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Call(Func, Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse an expression
    pub fn parse(input: &str) -> CalcResult<Expr> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err("empty expression".to_string());
        }
        if tokens.len() > MAX_TOKENS {
            return Err(format!("expression is too long (over {} tokens)", MAX_TOKENS));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        if let Some(tok) = parser.peek() {
            return Err(format!("unexpected '{}'", tok));
        }
        if expr.depth() > MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        Ok(expr)
    }

    /// Height of the tree, measured without recursion
    fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Expr, usize)> = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            match node {
                Expr::Num(_) | Expr::Var(_) => {}
                Expr::Neg(inner) | Expr::Call(_, inner) => stack.push((inner.as_ref(), depth + 1)),
                Expr::Bin(_, lhs, rhs) => {
                    stack.push((lhs.as_ref(), depth + 1));
                    stack.push((rhs.as_ref(), depth + 1));
                }
            }
        }
        deepest
    }

    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Bin(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluate with the given variable bindings
    pub fn eval(&self, vars: &HashMap<String, f64>) -> CalcResult<f64> {
        match self {
            Expr::Num(n) => Ok(*n),
            Expr::Var(name) => vars
                .get(name)
                .copied()
                .ok_or_else(|| format!("name '{}' is not defined", name)),
            Expr::Neg(inner) => Ok(-inner.eval(vars)?),
            Expr::Call(func, arg) => Ok(func.apply(arg.eval(vars)?)),
            Expr::Bin(op, lhs, rhs) => {
                let a = lhs.eval(vars)?;
                let b = rhs.eval(vars)?;
                match op {
                    BinOp::Add => Ok(a + b),
                    BinOp::Sub => Ok(a - b),
                    BinOp::Mul => Ok(a * b),
                    BinOp::Div if b == 0.0 => Err("division by zero".to_string()),
                    BinOp::Div => Ok(a / b),
                    BinOp::FloorDiv if b == 0.0 => {
                        Err("integer division or modulo by zero".to_string())
                    }
                    BinOp::FloorDiv => Ok((a / b).floor()),
                    BinOp::Pow => Ok(a.powf(b)),
                }
            }
        }
    }

    /// Whether `var` occurs anywhere in the tree
    pub fn contains(&self, var: &str) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Var(name) => name == var,
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.contains(var),
            Expr::Bin(_, lhs, rhs) => lhs.contains(var) || rhs.contains(var),
        }
    }

    /// Names of all variables, sorted
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(name) => out.push(name.clone()),
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_vars(out),
            Expr::Bin(_, lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }

    /// Split into `(a, b)` with `self == a * var + b`, or `None` when not linear in `var`
    fn linear_in(&self, var: &str) -> Option<(Expr, Expr)> {
        if !self.contains(var) {
            return Some((Expr::Num(0.0), self.clone()));
        }
        match self {
            Expr::Var(_) => Some((Expr::Num(1.0), Expr::Num(0.0))),
            Expr::Neg(inner) => {
                let (a, b) = inner.linear_in(var)?;
                Some((Expr::Neg(Box::new(a)), Expr::Neg(Box::new(b))))
            }
            Expr::Bin(op @ (BinOp::Add | BinOp::Sub), lhs, rhs) => {
                let (a1, b1) = lhs.linear_in(var)?;
                let (a2, b2) = rhs.linear_in(var)?;
                Some((Expr::bin(*op, a1, a2), Expr::bin(*op, b1, b2)))
            }
            Expr::Bin(BinOp::Mul, lhs, rhs) if !lhs.contains(var) => {
                let (a, b) = rhs.linear_in(var)?;
                Some((
                    Expr::bin(BinOp::Mul, (**lhs).clone(), a),
                    Expr::bin(BinOp::Mul, (**lhs).clone(), b),
                ))
            }
            Expr::Bin(op @ (BinOp::Mul | BinOp::Div), lhs, rhs) if !rhs.contains(var) => {
                let (a, b) = lhs.linear_in(var)?;
                Some((
                    Expr::bin(*op, a, (**rhs).clone()),
                    Expr::bin(*op, b, (**rhs).clone()),
                ))
            }
            Expr::Bin(BinOp::Pow, base, exponent)
                if matches!(**exponent, Expr::Num(n) if n == 1.0) =>
            {
                base.linear_in(var)
            }
            _ => None,
        }
    }

    /// Fold constants and drop identities
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Num(_) | Expr::Var(_) => self.clone(),
            Expr::Neg(inner) => match inner.simplify() {
                Expr::Num(n) => Expr::Num(if n == 0.0 { 0.0 } else { -n }),
                Expr::Neg(e) => *e,
                e => Expr::Neg(Box::new(e)),
            },
            Expr::Call(func, arg) => match arg.simplify() {
                Expr::Num(n) => Expr::Num(func.apply(n)),
                e => Expr::Call(*func, Box::new(e)),
            },
            Expr::Bin(op, lhs, rhs) => simplify_bin(*op, lhs.simplify(), rhs.simplify()),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Bin(BinOp::Add | BinOp::Sub, ..) => 1,
            Expr::Bin(BinOp::Mul | BinOp::Div | BinOp::FloorDiv, ..) => 2,
            Expr::Neg(_) => 3,
            Expr::Bin(BinOp::Pow, ..) => 4,
            Expr::Num(n) if *n < 0.0 => 3,
            _ => 5,
        }
    }
}

fn is_num(e: &Expr, value: f64) -> bool {
    matches!(e, Expr::Num(n) if *n == value)
}

fn simplify_bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    if let (Expr::Num(a), Expr::Num(b)) = (&lhs, &rhs) {
        let folded = Expr::bin(op, Expr::Num(*a), Expr::Num(*b)).eval(&HashMap::new());
        if let Ok(value) = folded {
            if value.is_finite() {
                return Expr::Num(value);
            }
        }
    }

    match op {
        BinOp::Add if is_num(&lhs, 0.0) => rhs,
        BinOp::Add | BinOp::Sub if is_num(&rhs, 0.0) => lhs,
        BinOp::Sub if is_num(&lhs, 0.0) => Expr::Neg(Box::new(rhs)).simplify(),
        BinOp::Add => match rhs {
            Expr::Neg(inner) => Expr::bin(BinOp::Sub, lhs, *inner),
            rhs => Expr::bin(BinOp::Add, lhs, rhs),
        },
        BinOp::Mul if is_num(&lhs, 0.0) || is_num(&rhs, 0.0) => Expr::Num(0.0),
        BinOp::Mul if is_num(&lhs, 1.0) => rhs,
        BinOp::Mul | BinOp::Div if is_num(&rhs, 1.0) => lhs,
        BinOp::Mul if is_num(&lhs, -1.0) => Expr::Neg(Box::new(rhs)).simplify(),
        BinOp::Div if is_num(&lhs, 0.0) && !is_num(&rhs, 0.0) => Expr::Num(0.0),
        BinOp::Mul | BinOp::Div => match (lhs, rhs) {
            (a, Expr::Bin(BinOp::Div, b, c)) if op == BinOp::Div => {
                simplify_bin(BinOp::Div, simplify_bin(BinOp::Mul, a, *c), *b)
            }
            (Expr::Neg(a), Expr::Neg(b)) => simplify_bin(op, *a, *b),
            (Expr::Neg(a), b) => Expr::Neg(Box::new(simplify_bin(op, *a, b))),
            (a, Expr::Neg(b)) => Expr::Neg(Box::new(simplify_bin(op, a, *b))),
            (a, b) => Expr::bin(op, a, b),
        },
        BinOp::Pow if is_num(&rhs, 1.0) => lhs,
        _ => Expr::bin(op, lhs, rhs),
    }
}

fn wrap(f: &mut fmt::Formatter<'_>, child: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{}", format_number(*n)),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Call(func, arg) => write!(f, "{}({})", func.name(), arg),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                wrap(f, inner, inner.precedence() < 3)
            }
            Expr::Bin(op, lhs, rhs) => {
                let prec = self.precedence();
                let symbol = match op {
                    BinOp::Add => " + ",
                    BinOp::Sub => " - ",
                    BinOp::Mul => "*",
                    BinOp::Div => "/",
                    BinOp::FloorDiv => "//",
                    BinOp::Pow => "**",
                };
                let right_assoc = *op == BinOp::Pow;
                wrap(
                    f,
                    lhs,
                    lhs.precedence() < prec || (right_assoc && lhs.precedence() == prec),
                )?;
                write!(f, "{}", symbol)?;
                let rhs_parens = if right_assoc {
                    rhs.precedence() < prec
                } else {
                    rhs.precedence() < prec
                        || (rhs.precedence() == prec
                            && matches!(op, BinOp::Sub | BinOp::Div | BinOp::FloorDiv))
                };
                wrap(f, rhs, rhs_parens)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Power,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", format_number(*n)),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::DoubleSlash => write!(f, "//"),
            Token::Power => write!(f, "**"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> CalcResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", text))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Power);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Power);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current parentheses, sign and exponent nesting
    depth: usize,
}

impl Parser {
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> CalcResult<T>) -> CalcResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> CalcResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::bin(op, lhs, self.term()?);
        }
    }

    // term := unary (('*' | '/' | '//') unary)*
    fn term(&mut self) -> CalcResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::bin(op, lhs, self.unary()?);
        }
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> CalcResult<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.nested(Self::unary)?)));
        }
        if self.eat(&Token::Plus) {
            return self.nested(Self::unary);
        }
        self.power()
    }

    // power := atom ('**' unary)?
    fn power(&mut self) -> CalcResult<Expr> {
        let base = self.atom()?;
        if self.eat(&Token::Power) {
            return Ok(Expr::bin(BinOp::Pow, base, self.nested(Self::unary)?));
        }
        Ok(base)
    }

    fn atom(&mut self) -> CalcResult<Expr> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    let func = Func::from_name(&name)
                        .ok_or_else(|| format!("unknown function '{}'", name))?;
                    self.pos += 1;
                    let arg = self.nested(Self::expr)?;
                    if !self.eat(&Token::RParen) {
                        return Err("missing ')'".to_string());
                    }
                    return Ok(Expr::Call(func, Box::new(arg)));
                }
                Ok(Expr::Var(name))
            }
            Some(Token::LParen) => {
                let inner = self.nested(Self::expr)?;
                if !self.eat(&Token::RParen) {
                    return Err("missing ')'".to_string());
                }
                Ok(inner)
            }
            Some(tok) => Err(format!("unexpected '{}'", tok)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Evaluate arithmetic found in free text. Everything except digits,
/// `+ - * / ( ) .` and spaces is discarded first.
pub fn evaluate_expression(expression: &str) -> String {
    let cleaned: String = expression
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/(). ".contains(*c))
        .collect();

    match Expr::parse(&cleaned).and_then(|e| e.eval(&HashMap::new())) {
        Ok(value) => format_number(value),
        Err(e) => format!("Evaluation error: {}", e),
    }
}

/// Solve `lhs = rhs` for `target_var`
pub fn solve_equation(equation: &str, target_var: &str) -> String {
    match solve(equation, target_var.trim()) {
        Ok(Some(solution)) => solution,
        Ok(None) => "No solution found".to_string(),
        Err(e) => format!("Equation solving error: {}", e),
    }
}

fn solve(equation: &str, var: &str) -> CalcResult<Option<String>> {
    let sides: Vec<&str> = equation.split('=').collect();
    let [lhs, rhs] = sides.as_slice() else {
        return Err(format!(
            "expected exactly one '=' but found {}",
            sides.len().saturating_sub(1)
        ));
    };
    if var.is_empty() {
        return Err("no target variable given".to_string());
    }

    let lhs = Expr::parse(lhs)?;
    let rhs = Expr::parse(rhs)?;
    let residual = Expr::bin(BinOp::Sub, lhs, rhs);

    if !residual.contains(var) {
        return Ok(None);
    }

    if let Some((a, b)) = residual.linear_in(var) {
        let a = a.simplify();
        if is_num(&a, 0.0) {
            return Ok(None);
        }
        let solution = Expr::bin(BinOp::Div, Expr::Neg(Box::new(b)), a).simplify();
        return Ok(Some(match solution {
            Expr::Num(n) => format_number(tidy(n)),
            other => other.to_string(),
        }));
    }

    let others: Vec<String> = residual
        .variables()
        .into_iter()
        .filter(|v| v != var)
        .collect();
    if !others.is_empty() {
        return Err(format!(
            "cannot isolate {} while {} remain symbolic",
            var,
            others.join(", ")
        ));
    }

    Ok(numeric_root(&residual, var).map(|root| format_number(tidy(root))))
}

/// Smallest real root found by scanning for sign changes, then a secant
/// search from 1.0 for roots that only touch zero.
fn numeric_root(f: &Expr, var: &str) -> Option<f64> {
    let eval = |x: f64| -> Option<f64> {
        let vars = HashMap::from([(var.to_string(), x)]);
        f.eval(&vars).ok().filter(|y| y.is_finite())
    };

    const STEP: f64 = 0.25;
    const LIMIT: f64 = 1000.0;

    let mut prev: Option<(f64, f64)> = None;
    let mut x = -LIMIT;
    while x <= LIMIT {
        if let Some(y) = eval(x) {
            if y == 0.0 {
                return Some(x);
            }
            if let Some((px, py)) = prev {
                if py.signum() != y.signum() {
                    if let Some(root) = bisect(&eval, px, x) {
                        return Some(root);
                    }
                }
            }
            prev = Some((x, y));
        } else {
            prev = None;
        }
        x += STEP;
    }

    secant(&eval, 1.0, 1.5)
}

fn bisect(eval: &impl Fn(f64) -> Option<f64>, mut lo: f64, mut hi: f64) -> Option<f64> {
    let mut f_lo = eval(lo)?;
    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        let f_mid = eval(mid)?;
        if f_mid == 0.0 || (hi - lo).abs() < 1e-13 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    // a sign change across a pole is not a root
    eval((lo + hi) / 2.0).filter(|y| y.abs() < 1e-6).map(|_| (lo + hi) / 2.0)
}

fn secant(eval: &impl Fn(f64) -> Option<f64>, mut x0: f64, mut x1: f64) -> Option<f64> {
    for _ in 0..200 {
        let f0 = eval(x0)?;
        let f1 = eval(x1)?;
        if f1.abs() < 1e-12 {
            return Some(x1);
        }
        if f1 == f0 {
            return None;
        }
        let next = x1 - f1 * (x1 - x0) / (f1 - f0);
        x0 = x1;
        x1 = next;
    }
    eval(x1).filter(|y| y.abs() < 1e-9).map(|_| x1)
}

/// Snap values within rounding noise of a short decimal
fn tidy(value: f64) -> f64 {
    let rounded = (value * 1e10).round() / 1e10;
    if (rounded - value).abs() < 1e-9 {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(evaluate_expression("2+2"), "4");
        assert_eq!(evaluate_expression("3 + 4 * (2 - 1)"), "7");
        assert_eq!(evaluate_expression("2**3**2"), "512");
        assert_eq!(evaluate_expression("-2**2"), "-4");
        assert_eq!(evaluate_expression("7/2"), "3.5");
        assert_eq!(evaluate_expression("7//2"), "3");
    }

    #[test]
    fn test_evaluate_strips_prose() {
        assert_eq!(evaluate_expression("what is 12 * 3?"), "36");
    }

    #[test]
    fn test_evaluate_errors() {
        assert_eq!(evaluate_expression("1/0"), "Evaluation error: division by zero");
        assert!(evaluate_expression("no digits").starts_with("Evaluation error:"));
        assert!(evaluate_expression("(1 + 2").starts_with("Evaluation error:"));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let deep = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
        assert!(evaluate_expression(&deep).starts_with("Evaluation error: expression is too long"));
        assert!(solve_equation(&format!("x = {}", deep), "x").starts_with("Equation solving error:"));

        let nested = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(
            evaluate_expression(&nested),
            "Evaluation error: expression nested too deeply"
        );
        assert_eq!(
            evaluate_expression(&format!("{}1", "-".repeat(400))),
            "Evaluation error: expression nested too deeply"
        );

        let chain = vec!["1"; 400].join("+");
        assert_eq!(
            evaluate_expression(&chain),
            "Evaluation error: expression nested too deeply"
        );
        assert_eq!(evaluate_expression(&format!("{}2{}", "(".repeat(100), ")".repeat(100))), "2");
    }

    #[test]
    fn test_solve_linear_numeric() {
        assert_eq!(solve_equation("2*x + 3 = 7", "x"), "2");
        assert_eq!(solve_equation("x/4 = 0.625", "x"), "2.5");
    }

    #[test]
    fn test_solve_linear_symbolic() {
        assert_eq!(solve_equation("F = m*a", "a"), "F/m");
        assert_eq!(solve_equation("v = d/t", "d"), "v*t");
    }

    #[test]
    fn test_solve_nonlinear_returns_smallest_root() {
        assert_eq!(solve_equation("x**2 = 4", "x"), "-2");
        assert_eq!(solve_equation("sqrt(x) = 3", "x"), "9");
    }

    #[test]
    fn test_solve_without_solution() {
        assert_eq!(solve_equation("x + 1 = x + 2", "x"), "No solution found");
        assert_eq!(solve_equation("y = 3", "x"), "No solution found");
        assert_eq!(solve_equation("x**2 = -1", "x"), "No solution found");
    }

    #[test]
    fn test_solve_errors() {
        assert!(solve_equation("x + 1", "x").starts_with("Equation solving error:"));
        assert!(solve_equation("x = 1 = 2", "x").starts_with("Equation solving error:"));
        assert!(solve_equation("x**2 = y", "x").starts_with("Equation solving error:"));
    }
}
