use std::cmp::Ordering;

use crate::error::FilterSyntaxError;

use super::model::{CellValue, Column, ColumnKind, HumanDevelopment, Record, Table};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Rows of `table` matching `filter`. `None` or a blank expression keeps every row.
// The UI works on row indices; this is the row-returning entry point.
#[cfg_attr(not(test), allow(dead_code))]
pub fn get_rows<'a>(
    table: &'a Table,
    filter: Option<&str>,
) -> Result<Vec<&'a Record>, FilterSyntaxError> {
    let indices = filtered_indices(table, filter)?;
    Ok(indices.into_iter().map(|i| &table.records()[i]).collect())
}

/// Indices of the rows matching `filter`, in table order.
pub fn filtered_indices(table: &Table, filter: Option<&str>) -> Result<Vec<usize>, FilterSyntaxError> {
    let Some(expr) = filter.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok((0..table.len()).collect());
    };
    let query = Query::parse(expr)?;
    Ok(table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| query.matches(record))
        .map(|(i, _)| i)
        .collect())
}

/// A compiled filter expression.
///
/// Grammar (lowest precedence first):
/// ```text
///  or_expr    := and_expr   (("or" | "|") and_expr)*
///  and_expr   := not_expr   (("and" | "&") not_expr)*
///  not_expr   := ("not" | "~") not_expr | "(" or_expr ")" | comparison
///  comparison := operand (cmp_op operand)+
///  cmp_op     := "<" | "<=" | ">" | ">=" | "==" | "!=" | "in" | "not in"
///  operand    := column | number | string | "[" literal ("," literal)* "]"
/// ```
/// A chain `a < b < c` means `(a < b) and (b < c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    root: Expr,
}

impl Query {
    pub fn parse(source: &str) -> Result<Self, FilterSyntaxError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            end: source.len(),
        };
        let root = parser.or_expr()?;
        if let Some(token) = parser.peek() {
            return Err(FilterSyntaxError::new(
                token.offset,
                format!("unexpected {}", token.kind.describe()),
            ));
        }
        log::debug!("Compiled filter {source:?}");
        Ok(Query { root })
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.root.eval(record)
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Op(CmpOp),
    And,
    Or,
    Not,
    In,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("name '{name}'"),
            TokenKind::Number(v) => format!("number {v}"),
            TokenKind::Str(s) => format!("string '{s}'"),
            TokenKind::Op(op) => format!("operator '{}'", op.symbol()),
            TokenKind::And => "'and'".into(),
            TokenKind::Or => "'or'".into(),
            TokenKind::Not => "'not'".into(),
            TokenKind::In => "'in'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Comma => "','".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, FilterSyntaxError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b'[' => {
                i += 1;
                TokenKind::LBracket
            }
            b']' => {
                i += 1;
                TokenKind::RBracket
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'&' => {
                i += 1;
                TokenKind::And
            }
            b'|' => {
                i += 1;
                TokenKind::Or
            }
            b'~' => {
                i += 1;
                TokenKind::Not
            }
            b'<' | b'>' | b'=' | b'!' => {
                let two = bytes.get(i + 1) == Some(&b'=');
                let op = match (c, two) {
                    (b'<', false) => CmpOp::Lt,
                    (b'<', true) => CmpOp::Le,
                    (b'>', false) => CmpOp::Gt,
                    (b'>', true) => CmpOp::Ge,
                    (b'=', true) => CmpOp::Eq,
                    (b'!', true) => CmpOp::Ne,
                    _ => {
                        return Err(FilterSyntaxError::new(
                            start,
                            format!("unexpected character '{}'", c as char),
                        ))
                    }
                };
                i += if two { 2 } else { 1 };
                TokenKind::Op(op)
            }
            b'\'' | b'"' => {
                let close = source[i + 1..].find(c as char).ok_or_else(|| {
                    FilterSyntaxError::new(start, "unterminated string literal")
                })?;
                let text = source[i + 1..i + 1 + close].to_string();
                i += close + 2;
                TokenKind::Str(text)
            }
            b'`' => {
                let close = source[i + 1..]
                    .find('`')
                    .ok_or_else(|| FilterSyntaxError::new(start, "unterminated quoted name"))?;
                let name = source[i + 1..i + 1 + close].to_string();
                i += close + 2;
                TokenKind::Ident(name)
            }
            b'0'..=b'9' | b'.' | b'-' => {
                i = scan_number(bytes, i);
                let text = &source[start..i];
                let value = text.parse::<f64>().map_err(|_| {
                    FilterSyntaxError::new(start, format!("invalid number '{text}'"))
                })?;
                TokenKind::Number(value)
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                match &source[start..i] {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "in" => TokenKind::In,
                    word => TokenKind::Ident(word.to_string()),
                }
            }
            _ => {
                let ch = source[i..].chars().next().unwrap_or('?');
                return Err(FilterSyntaxError::new(
                    start,
                    format!("unexpected character '{ch}'"),
                ));
            }
        };
        tokens.push(Token { kind, offset: start });
    }
    Ok(tokens)
}

/// End of a numeric literal starting at `i`: optional sign, digits, fraction, exponent.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    if bytes[i] == b'-' {
        i += 1;
    }
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

// ---------------------------------------------------------------------------
// Syntax tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    In,
    NotIn,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }

    fn is_ordering(self) -> bool {
        matches!(self, CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Column(Column),
    Literal(Literal),
    List(Vec<Literal>),
}

/// Static type of an operand, checked when the query is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandKind {
    Number,
    Text,
    Category,
    List,
}

impl Operand {
    fn kind(&self) -> OperandKind {
        match self {
            Operand::Column(column) => match column.kind() {
                ColumnKind::Numeric => OperandKind::Number,
                ColumnKind::Text => OperandKind::Text,
                ColumnKind::Category => OperandKind::Category,
            },
            Operand::Literal(Literal::Number(_)) => OperandKind::Number,
            Operand::Literal(Literal::Text(_)) => OperandKind::Text,
            Operand::List(_) => OperandKind::List,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Operand, CmpOp, Operand),
}

/// A single evaluated cell or literal.
#[derive(Debug, Clone, Copy)]
enum Scalar<'a> {
    Number(f64),
    Text(&'a str),
    Level(HumanDevelopment),
}

impl<'a> Scalar<'a> {
    fn of_literal(literal: &'a Literal) -> Self {
        match literal {
            Literal::Number(v) => Scalar::Number(*v),
            Literal::Text(s) => Scalar::Text(s),
        }
    }

    fn equals(self, other: Scalar<'_>) -> bool {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            (Scalar::Level(a), Scalar::Level(b)) => a == b,
            (Scalar::Level(level), Scalar::Text(s)) | (Scalar::Text(s), Scalar::Level(level)) => {
                HumanDevelopment::from_label(s) == Some(level)
            }
            _ => false,
        }
    }

    fn compare(self, other: Scalar<'_>) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(&b),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn scalar<'a>(operand: &'a Operand, record: &'a Record) -> Option<Scalar<'a>> {
    match operand {
        Operand::Column(column) => Some(match record.value(*column) {
            CellValue::Number(v) => Scalar::Number(v),
            CellValue::Text(s) => Scalar::Text(s),
            CellValue::Category(level) => Scalar::Level(level),
        }),
        Operand::Literal(literal) => Some(Scalar::of_literal(literal)),
        Operand::List(_) => None,
    }
}

impl Expr {
    fn eval(&self, record: &Record) -> bool {
        match self {
            Expr::Or(a, b) => a.eval(record) || b.eval(record),
            Expr::And(a, b) => a.eval(record) && b.eval(record),
            Expr::Not(inner) => !inner.eval(record),
            Expr::Compare(lhs, op, rhs) => {
                let Some(left) = scalar(lhs, record) else {
                    return false;
                };
                match op {
                    CmpOp::In | CmpOp::NotIn => {
                        let found = match rhs {
                            Operand::List(items) => items
                                .iter()
                                .any(|item| left.equals(Scalar::of_literal(item))),
                            other => scalar(other, record).is_some_and(|r| left.equals(r)),
                        };
                        found == (*op == CmpOp::In)
                    }
                    CmpOp::Eq => scalar(rhs, record).is_some_and(|r| left.equals(r)),
                    CmpOp::Ne => !scalar(rhs, record).is_some_and(|r| left.equals(r)),
                    ordering => {
                        let Some(ord) = scalar(rhs, record).and_then(|r| left.compare(r)) else {
                            return false;
                        };
                        match ordering {
                            CmpOp::Lt => ord == Ordering::Less,
                            CmpOp::Le => ord != Ordering::Greater,
                            CmpOp::Gt => ord == Ordering::Greater,
                            _ => ord != Ordering::Less,
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Offset reported for errors at end of input.
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.offset).unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> FilterSyntaxError {
        FilterSyntaxError::new(self.offset(), message)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), FilterSyntaxError> {
        if self.peek_kind() == Some(&kind) {
            self.pos += 1;
            Ok(())
        } else {
            let found = self
                .peek_kind()
                .map(TokenKind::describe)
                .unwrap_or_else(|| "end of input".into());
            Err(self.error(format!("expected {}, found {found}", kind.describe())))
        }
    }

    fn or_expr(&mut self) -> Result<Expr, FilterSyntaxError> {
        let mut expr = self.and_expr()?;
        while self.peek_kind() == Some(&TokenKind::Or) {
            self.pos += 1;
            let rhs = self.and_expr()?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, FilterSyntaxError> {
        let mut expr = self.not_expr()?;
        while self.peek_kind() == Some(&TokenKind::And) {
            self.pos += 1;
            let rhs = self.not_expr()?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn not_expr(&mut self) -> Result<Expr, FilterSyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Not) => {
                self.pos += 1;
                Ok(Expr::Not(Box::new(self.not_expr()?)))
            }
            Some(TokenKind::LParen) => {
                self.pos += 1;
                let inner = self.or_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => self.comparison(),
        }
    }

    fn comparison(&mut self) -> Result<Expr, FilterSyntaxError> {
        let start = self.offset();
        let mut lhs = self.operand()?;
        let mut links: Vec<Expr> = Vec::new();

        while let Some((op, op_offset)) = self.comparison_op() {
            let rhs_offset = self.offset();
            let rhs = self.operand()?;
            check_types(&lhs, op, &rhs, op_offset, rhs_offset, start)?;
            links.push(Expr::Compare(lhs, op, rhs.clone()));
            lhs = rhs;
        }

        let mut links = links.into_iter();
        let Some(first) = links.next() else {
            return Err(FilterSyntaxError::new(
                start,
                "expected a comparison such as `GII > 0.5`",
            ));
        };
        Ok(links.fold(first, |acc, link| Expr::And(Box::new(acc), Box::new(link))))
    }

    /// Consume a comparison operator, returning it with its offset.
    fn comparison_op(&mut self) -> Option<(CmpOp, usize)> {
        let offset = self.offset();
        let op = match self.peek_kind()?.clone() {
            TokenKind::Op(op) => op,
            TokenKind::In => CmpOp::In,
            TokenKind::Not
                if matches!(
                    self.tokens.get(self.pos + 1).map(|t| &t.kind),
                    Some(TokenKind::In)
                ) =>
            {
                self.pos += 1;
                CmpOp::NotIn
            }
            _ => return None,
        };
        self.pos += 1;
        Some((op, offset))
    }

    fn operand(&mut self) -> Result<Operand, FilterSyntaxError> {
        let offset = self.offset();
        match self.next().map(|t| t.kind) {
            Some(TokenKind::Ident(name)) => Column::from_name(&name)
                .map(Operand::Column)
                .ok_or_else(|| FilterSyntaxError::new(offset, format!("unknown column '{name}'"))),
            Some(TokenKind::Number(v)) => Ok(Operand::Literal(Literal::Number(v))),
            Some(TokenKind::Str(s)) => Ok(Operand::Literal(Literal::Text(s))),
            Some(TokenKind::LBracket) => self.list_tail().map(Operand::List),
            Some(other) => Err(FilterSyntaxError::new(
                offset,
                format!("expected a column or value, found {}", other.describe()),
            )),
            None => Err(FilterSyntaxError::new(
                offset,
                "expected a column or value, found end of input",
            )),
        }
    }

    /// Parse list items after the opening bracket. `[]` is an empty list.
    fn list_tail(&mut self) -> Result<Vec<Literal>, FilterSyntaxError> {
        let mut items = Vec::new();
        if self.peek_kind() == Some(&TokenKind::RBracket) {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            let offset = self.offset();
            match self.next().map(|t| t.kind) {
                Some(TokenKind::Number(v)) => items.push(Literal::Number(v)),
                Some(TokenKind::Str(s)) => items.push(Literal::Text(s)),
                _ => return Err(FilterSyntaxError::new(offset, "list items must be literals")),
            }
            match self.peek_kind() {
                Some(TokenKind::Comma) => self.pos += 1,
                Some(TokenKind::RBracket) => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.error("expected ',' or ']' in list")),
            }
        }
    }
}

/// Reject comparisons whose operand types can never be meaningful.
fn check_types(
    lhs: &Operand,
    op: CmpOp,
    rhs: &Operand,
    op_offset: usize,
    rhs_offset: usize,
    lhs_offset: usize,
) -> Result<(), FilterSyntaxError> {
    let (left, right) = (lhs.kind(), rhs.kind());
    if left == OperandKind::List {
        return Err(FilterSyntaxError::new(
            lhs_offset,
            "a list can only appear on the right of 'in'",
        ));
    }
    if right == OperandKind::List && !matches!(op, CmpOp::In | CmpOp::NotIn) {
        return Err(FilterSyntaxError::new(
            rhs_offset,
            "a list can only appear on the right of 'in'",
        ));
    }
    if op.is_ordering() {
        let comparable = matches!(
            (left, right),
            (OperandKind::Number, OperandKind::Number) | (OperandKind::Text, OperandKind::Text)
        );
        if !comparable {
            return Err(FilterSyntaxError::new(
                op_offset,
                format!("'{}' cannot order these operands", op.symbol()),
            ));
        }
    }
    Ok(())
}
