//! BTOR2 intermediate representation: instructions, parser, printer, and
//! the proof-schedule counter generator.

pub mod ir;
pub mod lexer;
pub mod parser;
pub mod print;
pub mod schedule;
pub mod token;

pub use ir::*;
pub use lexer::Lexer;
pub use parser::{parse, ParseError, ParseResult, Parser};
pub use print::print_program;
pub use schedule::{ProofSchedule, DEFAULT_COUNTER_NAME};
pub use token::{Line, Span, Token};
