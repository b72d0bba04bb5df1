//! Parser for BTOR2 text.
//!
//! Accepts the subset of BTOR2 the symbolic engine understands, plus `init`,
//! `ones` and array sorts, which parse so the engine can reject them with a
//! proper diagnostic. Operands must be defined before use and lids must be
//! strictly increasing.

use crate::ir::{BinaryOp, InstKind, Instruction, Lid, SortKind};
use crate::lexer::Lexer;
use crate::token::{Line, Span, Token};
use std::collections::HashMap;
use thiserror::Error;

/// Parser error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token at {span}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("missing argument at {span}: expected {expected}")]
    MissingArgument { expected: String, span: Span },
    #[error("unsupported operator `{name}` at {span}")]
    UnsupportedOperator { name: String, span: Span },
    #[error("negated operand `{text}` at {span} is not supported")]
    NegatedOperand { text: String, span: Span },
    #[error("duplicate lid {lid} at {span}")]
    DuplicateLid { lid: Lid, span: Span },
    #[error("lid {lid} at {span} is not greater than the previous lid {previous}")]
    NonIncreasingLid { lid: Lid, previous: Lid, span: Span },
    #[error("reference to undefined lid {lid} at {span}")]
    UndefinedReference { lid: Lid, span: Span },
    #[error("lid {lid} at {span} is not a sort")]
    NotASort { lid: Lid, span: Span },
    #[error("lid {lid} at {span} is not a state")]
    NotAState { lid: Lid, span: Span },
    #[error("lid {lid} at {span} does not produce a value")]
    NotAValue { lid: Lid, span: Span },
    #[error("invalid number `{text}` at {span}")]
    InvalidNumber { text: String, span: Span },
    #[error("constant `{text}` at {span} does not fit in {width} bits")]
    ConstantOverflow {
        text: String,
        width: u32,
        span: Span,
    },
    #[error("invalid syntax at {span}: {message}")]
    InvalidSyntax { message: String, span: Span },
    #[error("sort mismatch in lid {lid} at {span}: {message}")]
    SortMismatch { lid: Lid, message: String, span: Span },
}

impl ParseError {
    /// Get the source span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::MissingArgument { span, .. }
            | ParseError::UnsupportedOperator { span, .. }
            | ParseError::NegatedOperand { span, .. }
            | ParseError::DuplicateLid { span, .. }
            | ParseError::NonIncreasingLid { span, .. }
            | ParseError::UndefinedReference { span, .. }
            | ParseError::NotASort { span, .. }
            | ParseError::NotAState { span, .. }
            | ParseError::NotAValue { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::ConstantOverflow { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::SortMismatch { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse BTOR2 source text into an ordered instruction list.
pub fn parse(source: &str) -> ParseResult<Vec<Instruction>> {
    Parser::new(source).parse_program()
}

/// What an already-defined lid can be referenced as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Defined {
    Sort(SortKind),
    State,
    Value,
    Other,
}

/// Parser for BTOR2 source text.
pub struct Parser<'a> {
    lines: Vec<Line<'a>>,
    defined: HashMap<Lid, Defined>,
    /// Bitvector width of every value-producing lid.
    widths: HashMap<Lid, u32>,
    last_lid: Lid,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: Lexer::new(source).lines(),
            defined: HashMap::new(),
            widths: HashMap::new(),
            last_lid: 0,
        }
    }

    /// Parse every line of the source.
    pub fn parse_program(&mut self) -> ParseResult<Vec<Instruction>> {
        let lines = std::mem::take(&mut self.lines);
        let mut program = Vec::with_capacity(lines.len());
        for line in &lines {
            let inst = self.parse_line(line)?;
            self.check_sorts(&inst, line)?;
            let class = match &inst.kind {
                InstKind::Sort(kind) => Defined::Sort(*kind),
                InstKind::State { .. } => Defined::State,
                _ if inst.is_value() => Defined::Value,
                _ => Defined::Other,
            };
            if inst.is_value() {
                if let Some(width) = inst.sort().and_then(|sort| self.sort_width(sort)) {
                    self.widths.insert(inst.lid, width);
                }
            }
            self.defined.insert(inst.lid, class);
            self.last_lid = inst.lid;
            program.push(inst);
        }
        Ok(program)
    }

    fn parse_line(&self, line: &Line<'a>) -> ParseResult<Instruction> {
        let mut cur = Cursor::new(line);

        let lid_tok = cur.next("lid")?;
        let lid = parse_lid(lid_tok)?;
        if self.defined.contains_key(&lid) {
            return Err(ParseError::DuplicateLid {
                lid,
                span: lid_tok.span,
            });
        }
        if lid <= self.last_lid {
            return Err(ParseError::NonIncreasingLid {
                lid,
                previous: self.last_lid,
                span: lid_tok.span,
            });
        }

        let keyword = cur.next("keyword")?;
        let kind = match keyword.text {
            "sort" => self.parse_sort(&mut cur)?,
            "input" => InstKind::Input {
                sort: self.sort_ref(&mut cur)?.0,
                name: cur.symbol()?,
            },
            "state" => InstKind::State {
                sort: self.sort_ref(&mut cur)?.0,
                name: cur.symbol()?,
            },
            "init" | "next" => {
                let sort = self.sort_ref(&mut cur)?.0;
                let state = self.state_ref(&mut cur)?;
                let value = self.operand(&mut cur)?;
                // Symbols on init/next carry no meaning for the engine.
                cur.symbol()?;
                if keyword.text == "init" {
                    InstKind::Init { sort, state, value }
                } else {
                    InstKind::Next { sort, state, value }
                }
            }
            "constraint" => InstKind::Constraint {
                cond: self.operand(&mut cur)?,
                name: cur.symbol()?,
            },
            "bad" => InstKind::Bad {
                cond: self.operand(&mut cur)?,
                name: cur.symbol()?,
            },
            "output" => InstKind::Output {
                value: self.operand(&mut cur)?,
                name: cur.symbol()?,
            },
            "const" | "constd" | "consth" => {
                let (sort, kind) = self.sort_ref(&mut cur)?;
                let width = bitvec_width(kind, &sort_span(line))?;
                let tok = cur.next("constant value")?;
                let value = parse_constant(keyword.text, tok, width)?;
                cur.symbol()?;
                InstKind::Const { sort, value }
            }
            "zero" | "one" | "ones" => {
                let sort = self.sort_ref(&mut cur)?.0;
                cur.symbol()?;
                match keyword.text {
                    "zero" => InstKind::Zero { sort },
                    "one" => InstKind::One { sort },
                    _ => InstKind::Ones { sort },
                }
            }
            "not" => {
                let sort = self.sort_ref(&mut cur)?.0;
                let operand = self.operand(&mut cur)?;
                cur.symbol()?;
                InstKind::Not { sort, operand }
            }
            "ite" => {
                let sort = self.sort_ref(&mut cur)?.0;
                let cond = self.operand(&mut cur)?;
                let then = self.operand(&mut cur)?;
                let otherwise = self.operand(&mut cur)?;
                cur.symbol()?;
                InstKind::Ite {
                    sort,
                    cond,
                    then,
                    otherwise,
                }
            }
            "uext" => {
                let sort = self.sort_ref(&mut cur)?.0;
                let operand = self.operand(&mut cur)?;
                let by = parse_u32(cur.next("extension width")?)?;
                InstKind::Uext {
                    sort,
                    operand,
                    by,
                    name: cur.symbol()?,
                }
            }
            "slice" => {
                let sort = self.sort_ref(&mut cur)?.0;
                let operand = self.operand(&mut cur)?;
                let upper_tok = cur.next("upper bit")?;
                let upper = parse_u32(upper_tok)?;
                let lower = parse_u32(cur.next("lower bit")?)?;
                if upper < lower {
                    return Err(ParseError::InvalidSyntax {
                        message: format!("slice upper bit {upper} is below lower bit {lower}"),
                        span: upper_tok.span,
                    });
                }
                let width = (upper - lower).checked_add(1).ok_or_else(|| {
                    ParseError::InvalidSyntax {
                        message: format!("slice {upper}..{lower} is too wide"),
                        span: upper_tok.span,
                    }
                })?;
                cur.symbol()?;
                InstKind::Slice {
                    sort,
                    operand,
                    lowbit: lower,
                    width,
                }
            }
            other => match BinaryOp::from_name(other) {
                Some(op) => {
                    let sort = self.sort_ref(&mut cur)?.0;
                    let lhs = self.operand(&mut cur)?;
                    let rhs = self.operand(&mut cur)?;
                    cur.symbol()?;
                    InstKind::Binary { op, sort, lhs, rhs }
                }
                None => {
                    return Err(ParseError::UnsupportedOperator {
                        name: other.to_string(),
                        span: keyword.span,
                    })
                }
            },
        };

        Ok(Instruction::new(lid, kind))
    }

    fn sort_width(&self, sort: Lid) -> Option<u32> {
        match self.defined.get(&sort) {
            Some(Defined::Sort(kind)) => kind.width(),
            _ => None,
        }
    }

    /// Check operand and result widths. Operands of array sort are left to
    /// the engine, which rejects them.
    fn check_sorts(&self, inst: &Instruction, line: &Line<'_>) -> ParseResult<()> {
        let span = line.tokens.get(1).map(|t| t.span).unwrap_or_else(|| line.span());
        let width = |lid: Lid| self.widths.get(&lid).map(|&w| u64::from(w));
        let result = inst
            .sort()
            .and_then(|sort| self.sort_width(sort))
            .map(u64::from);
        let require = |what: &str, actual: Option<u64>, expected: Option<u64>| {
            match (actual, expected) {
                (Some(actual), Some(expected)) if actual != expected => {
                    Err(ParseError::SortMismatch {
                        lid: inst.lid,
                        message: format!("{what} has width {actual}, expected {expected}"),
                        span,
                    })
                }
                _ => Ok(()),
            }
        };

        match &inst.kind {
            InstKind::Init { state, value, .. } | InstKind::Next { state, value, .. } => {
                require("state", width(*state), result)?;
                require("value", width(*value), result)
            }
            InstKind::Constraint { cond, .. } | InstKind::Bad { cond, .. } => {
                require("condition", width(*cond), Some(1))
            }
            InstKind::Not { operand, .. } => require("operand", width(*operand), result),
            InstKind::Ite {
                cond,
                then,
                otherwise,
                ..
            } => {
                require("condition", width(*cond), Some(1))?;
                require("then branch", width(*then), result)?;
                require("else branch", width(*otherwise), result)
            }
            InstKind::Uext { operand, by, .. } => {
                let extended = width(*operand).map(|w| w + u64::from(*by));
                require("result sort", result, extended)
            }
            InstKind::Slice {
                operand,
                lowbit,
                width: sliced,
                ..
            } => {
                let upper = u64::from(*lowbit) + u64::from(*sliced) - 1;
                if let Some(operand_width) = width(*operand) {
                    if upper >= operand_width {
                        return Err(ParseError::SortMismatch {
                            lid: inst.lid,
                            message: format!(
                                "slice upper bit {upper} is outside a {operand_width}-bit operand"
                            ),
                            span,
                        });
                    }
                }
                require("result sort", result, Some(u64::from(*sliced)))
            }
            InstKind::Binary { op, lhs, rhs, .. } => {
                let (wl, wr) = (width(*lhs), width(*rhs));
                let produced = match op {
                    BinaryOp::Concat => wl.zip(wr).map(|(l, r)| l + r),
                    BinaryOp::Implies | BinaryOp::Iff => {
                        require("left operand", wl, Some(1))?;
                        require("right operand", wr, Some(1))?;
                        Some(1)
                    }
                    _ => {
                        require("right operand", wr, wl)?;
                        if op.is_predicate() {
                            Some(1)
                        } else {
                            wl
                        }
                    }
                };
                require("result sort", result, produced)
            }
            InstKind::Sort(_)
            | InstKind::Input { .. }
            | InstKind::State { .. }
            | InstKind::Output { .. }
            | InstKind::Const { .. }
            | InstKind::Zero { .. }
            | InstKind::One { .. }
            | InstKind::Ones { .. } => Ok(()),
        }
    }

    fn parse_sort(&self, cur: &mut Cursor<'_, 'a>) -> ParseResult<InstKind> {
        let tag = cur.next("sort kind")?;
        let kind = match tag.text {
            "bitvec" => {
                let width_tok = cur.next("bitvector width")?;
                let width = parse_u32(width_tok)?;
                if width == 0 {
                    return Err(ParseError::InvalidSyntax {
                        message: "bitvector width must be positive".to_string(),
                        span: width_tok.span,
                    });
                }
                SortKind::BitVec { width }
            }
            "array" => SortKind::Array {
                index: self.sort_ref(cur)?.0,
                element: self.sort_ref(cur)?.0,
            },
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "`bitvec` or `array`".to_string(),
                    found: other.to_string(),
                    span: tag.span,
                })
            }
        };
        cur.symbol()?;
        Ok(InstKind::Sort(kind))
    }

    fn lookup(&self, tok: &Token<'_>) -> ParseResult<(Lid, Defined)> {
        if tok.text.starts_with('-') {
            return Err(ParseError::NegatedOperand {
                text: tok.text.to_string(),
                span: tok.span,
            });
        }
        let lid = parse_lid(tok)?;
        match self.defined.get(&lid) {
            Some(class) => Ok((lid, *class)),
            None => Err(ParseError::UndefinedReference {
                lid,
                span: tok.span,
            }),
        }
    }

    fn sort_ref(&self, cur: &mut Cursor<'_, 'a>) -> ParseResult<(Lid, SortKind)> {
        let tok = cur.next("sort id")?;
        match self.lookup(tok)? {
            (lid, Defined::Sort(kind)) => Ok((lid, kind)),
            (lid, _) => Err(ParseError::NotASort {
                lid,
                span: tok.span,
            }),
        }
    }

    fn state_ref(&self, cur: &mut Cursor<'_, 'a>) -> ParseResult<Lid> {
        let tok = cur.next("state id")?;
        match self.lookup(tok)? {
            (lid, Defined::State) => Ok(lid),
            (lid, _) => Err(ParseError::NotAState {
                lid,
                span: tok.span,
            }),
        }
    }

    fn operand(&self, cur: &mut Cursor<'_, 'a>) -> ParseResult<Lid> {
        let tok = cur.next("operand id")?;
        match self.lookup(tok)? {
            (lid, Defined::State | Defined::Value) => Ok(lid),
            (lid, _) => Err(ParseError::NotAValue {
                lid,
                span: tok.span,
            }),
        }
    }
}

/// Walks the tokens of one line.
struct Cursor<'l, 'a> {
    line: &'l Line<'a>,
    pos: usize,
}

impl<'l, 'a> Cursor<'l, 'a> {
    fn new(line: &'l Line<'a>) -> Self {
        Self { line, pos: 0 }
    }

    fn next(&mut self, expected: &str) -> ParseResult<&'l Token<'a>> {
        match self.line.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                Ok(tok)
            }
            None => Err(ParseError::MissingArgument {
                expected: expected.to_string(),
                span: self.line.end_span(),
            }),
        }
    }

    /// Optional trailing symbol; anything after it is an error.
    fn symbol(&mut self) -> ParseResult<Option<String>> {
        let name = self.line.tokens.get(self.pos).map(|t| t.text.to_string());
        if name.is_some() {
            self.pos += 1;
        }
        if let Some(extra) = self.line.tokens.get(self.pos) {
            return Err(ParseError::UnexpectedToken {
                expected: "end of line".to_string(),
                found: extra.text.to_string(),
                span: extra.span,
            });
        }
        Ok(name)
    }
}

fn sort_span(line: &Line<'_>) -> Span {
    line.tokens.get(2).map(|t| t.span).unwrap_or_else(|| line.span())
}

fn bitvec_width(kind: SortKind, span: &Span) -> ParseResult<u32> {
    kind.width().ok_or_else(|| ParseError::InvalidSyntax {
        message: "constants require a bitvector sort".to_string(),
        span: *span,
    })
}

fn parse_lid(tok: &Token<'_>) -> ParseResult<Lid> {
    match tok.text.parse::<Lid>() {
        Ok(lid) if lid > 0 => Ok(lid),
        _ => Err(ParseError::InvalidNumber {
            text: tok.text.to_string(),
            span: tok.span,
        }),
    }
}

fn parse_u32(tok: &Token<'_>) -> ParseResult<u32> {
    tok.text.parse::<u32>().map_err(|_| ParseError::InvalidNumber {
        text: tok.text.to_string(),
        span: tok.span,
    })
}

fn parse_constant(keyword: &str, tok: &Token<'_>, width: u32) -> ParseResult<u64> {
    let invalid = || ParseError::InvalidNumber {
        text: tok.text.to_string(),
        span: tok.span,
    };
    let overflow = || ParseError::ConstantOverflow {
        text: tok.text.to_string(),
        width,
        span: tok.span,
    };

    let value: u128 = match keyword {
        "const" => {
            if tok.text.len() > width as usize {
                return Err(overflow());
            }
            if tok.text.is_empty() || !tok.text.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(invalid());
            }
            u128::from_str_radix(tok.text, 2).map_err(|_| overflow())?
        }
        "consth" => u128::from_str_radix(tok.text, 16).map_err(|_| invalid())?,
        _ => {
            let signed: i128 = tok.text.parse().map_err(|_| invalid())?;
            if signed < 0 {
                if width > 64 {
                    return Err(overflow());
                }
                let modulus = 1i128 << width;
                match signed.checked_neg() {
                    Some(magnitude) if magnitude <= modulus / 2 => {}
                    _ => return Err(overflow()),
                }
                (signed + modulus) as u128
            } else {
                signed as u128
            }
        }
    };

    if width < 128 && value >> width != 0 {
        return Err(overflow());
    }
    u64::try_from(value).map_err(|_| overflow())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Instruction {
        let mut program = parse(source).unwrap_or_else(|e| panic!("parse error: {e}"));
        program.pop().unwrap()
    }

    #[test]
    fn test_sorts_and_states() {
        let program = parse("1 sort bitvec 4\n2 state 1 count\n3 input 1\n").unwrap();
        assert_eq!(
            program[0].kind,
            InstKind::Sort(SortKind::BitVec { width: 4 })
        );
        assert_eq!(
            program[1].kind,
            InstKind::State {
                sort: 1,
                name: Some("count".into())
            }
        );
        assert_eq!(program[2].kind, InstKind::Input { sort: 1, name: None });
    }

    #[test]
    fn test_constants() {
        let base = "1 sort bitvec 8\n";
        assert_eq!(
            parse_one(&format!("{base}2 const 1 00001010\n")).kind,
            InstKind::Const { sort: 1, value: 10 }
        );
        assert_eq!(
            parse_one(&format!("{base}2 constd 1 -1\n")).kind,
            InstKind::Const {
                sort: 1,
                value: 255
            }
        );
        assert_eq!(
            parse_one(&format!("{base}2 consth 1 ff\n")).kind,
            InstKind::Const {
                sort: 1,
                value: 255
            }
        );
    }

    #[test]
    fn test_constant_overflow() {
        let err = parse("1 sort bitvec 4\n2 constd 1 16\n").unwrap_err();
        assert!(matches!(err, ParseError::ConstantOverflow { width: 4, .. }));

        let err = parse("1 sort bitvec 4\n2 constd 1 -9\n").unwrap_err();
        assert!(matches!(err, ParseError::ConstantOverflow { .. }));

        let err = parse("1 sort bitvec 2\n2 const 1 101\n").unwrap_err();
        assert!(matches!(err, ParseError::ConstantOverflow { .. }));
    }

    #[test]
    fn test_slice_and_uext() {
        let base = "1 sort bitvec 8\n2 sort bitvec 3\n3 input 1 x\n";
        assert_eq!(
            parse_one(&format!("{base}4 slice 2 3 6 4\n")).kind,
            InstKind::Slice {
                sort: 2,
                operand: 3,
                lowbit: 4,
                width: 3
            }
        );
        let rename = parse_one(&format!("{base}4 uext 1 3 0 alias\n"));
        assert!(rename.is_renaming());
    }

    #[test]
    fn test_next_requires_state() {
        let err = parse("1 sort bitvec 1\n2 input 1 x\n3 next 1 2 2\n").unwrap_err();
        assert!(matches!(err, ParseError::NotAState { lid: 2, .. }));
    }

    #[test]
    fn test_undefined_reference() {
        let err = parse("1 sort bitvec 1\n2 not 1 5\n").unwrap_err();
        match err {
            ParseError::UndefinedReference { lid, span } => {
                assert_eq!(lid, 5);
                assert_eq!(span.line, 2);
                assert_eq!(span.column, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lid_order() {
        let err = parse("2 sort bitvec 1\n1 sort bitvec 2\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::NonIncreasingLid {
                lid: 1,
                previous: 2,
                ..
            }
        ));
        let err = parse("1 sort bitvec 1\n1 sort bitvec 2\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateLid { lid: 1, .. }));
    }

    #[test]
    fn test_unsupported_operator() {
        let err = parse("1 sort bitvec 1\n2 input 1\n3 redor 1 2\n").unwrap_err();
        match err {
            ParseError::UnsupportedOperator { name, span } => {
                assert_eq!(name, "redor");
                assert_eq!(span.column, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negated_operand() {
        let err = parse("1 sort bitvec 1\n2 input 1\n3 bad -2\n").unwrap_err();
        assert!(matches!(err, ParseError::NegatedOperand { .. }));
    }

    #[test]
    fn test_sort_operand_rejected() {
        let err = parse("1 sort bitvec 1\n2 bad 1\n").unwrap_err();
        assert!(matches!(err, ParseError::NotAValue { lid: 1, .. }));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse("1 sort bitvec 1\n2 input 1 x y\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_missing_argument() {
        let err = parse("1 sort bitvec 1\n2 add 1\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_unsupported_kinds_still_parse() {
        let program = parse(
            "1 sort bitvec 1\n2 sort array 1 1\n3 state 1 r\n4 zero 1\n5 init 1 3 4\n6 ones 1\n",
        )
        .unwrap();
        assert!(matches!(program[1].kind, InstKind::Sort(SortKind::Array { .. })));
        assert!(matches!(program[4].kind, InstKind::Init { state: 3, value: 4, .. }));
        assert!(matches!(program[5].kind, InstKind::Ones { sort: 1 }));
    }

    #[test]
    fn test_most_negative_decimal_is_an_overflow() {
        let err = parse("1 sort bitvec 8\n2 constd 1 -170141183460469231731687303715884105728\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::ConstantOverflow { width: 8, .. }));
        let err = parse("1 sort bitvec 64\n2 constd 1 -170141183460469231731687303715884105728\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::ConstantOverflow { .. }));
        assert_eq!(
            parse_one("1 sort bitvec 8\n2 constd 1 -128\n").kind,
            InstKind::Const {
                sort: 1,
                value: 0x80
            }
        );
    }

    fn sort_mismatch(source: &str) -> (Lid, String) {
        match parse(source) {
            Err(ParseError::SortMismatch { lid, message, .. }) => (lid, message),
            other => panic!("expected a sort mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_operand_widths_must_agree() {
        let base = "1 sort bitvec 1\n2 sort bitvec 4\n3 input 2 x\n4 input 1 y\n";
        let (lid, message) = sort_mismatch(&format!("{base}5 eq 1 3 4\n"));
        assert_eq!(lid, 5);
        assert!(message.contains("right operand"), "{message}");

        // Predicates produce one bit.
        let (lid, _) = sort_mismatch(&format!("{base}5 ult 2 3 3\n"));
        assert_eq!(lid, 5);
        // Arithmetic keeps the operand width.
        sort_mismatch(&format!("{base}5 add 1 3 3\n"));
        // Boolean connectives take single bits.
        sort_mismatch(&format!("{base}5 implies 2 3 3\n"));
    }

    #[test]
    fn test_concat_width_is_the_sum() {
        let base = "1 sort bitvec 1\n2 sort bitvec 4\n3 sort bitvec 5\n4 input 2 x\n5 input 1 y\n";
        assert!(parse(&format!("{base}6 concat 3 4 5\n")).is_ok());
        let (lid, message) = sort_mismatch(&format!("{base}6 concat 2 4 5\n"));
        assert_eq!(lid, 6);
        assert!(message.contains("width 4, expected 5"), "{message}");
    }

    #[test]
    fn test_uext_must_reach_the_declared_width() {
        let base = "1 sort bitvec 2\n2 sort bitvec 4\n3 input 1 x\n";
        assert!(parse(&format!("{base}4 uext 2 3 2\n")).is_ok());
        let (lid, message) = sort_mismatch(&format!("{base}4 uext 2 3 4\n"));
        assert_eq!(lid, 4);
        assert!(message.contains("width 4, expected 6"), "{message}");
    }

    #[test]
    fn test_slice_bounds_and_width() {
        let base = "1 sort bitvec 4\n2 sort bitvec 2\n3 input 1 x\n";
        let (_, message) = sort_mismatch(&format!("{base}4 slice 2 3 4 3\n"));
        assert!(message.contains("outside a 4-bit operand"), "{message}");
        sort_mismatch(&format!("{base}4 slice 2 3 2 0\n"));
    }

    #[test]
    fn test_conditions_are_single_bits() {
        let base = "1 sort bitvec 1\n2 sort bitvec 4\n3 input 2 x\n4 input 1 c\n";
        let (lid, _) = sort_mismatch(&format!("{base}5 bad 3\n"));
        assert_eq!(lid, 5);
        sort_mismatch(&format!("{base}5 constraint 3\n"));
        sort_mismatch(&format!("{base}5 ite 2 3 3 3\n"));
        sort_mismatch(&format!("{base}5 ite 2 4 3 4\n"));
        assert!(parse(&format!("{base}5 ite 2 4 3 3\n6 bad 4\n")).is_ok());
    }

    #[test]
    fn test_next_value_matches_the_state() {
        let base = "1 sort bitvec 1\n2 sort bitvec 4\n3 state 2 q\n4 input 1 b\n";
        let (lid, message) = sort_mismatch(&format!("{base}5 next 2 3 4\n"));
        assert_eq!(lid, 5);
        assert!(message.starts_with("value"), "{message}");
        sort_mismatch(&format!("{base}5 not 2 4\n"));
    }
}
